// src/ingest/mod.rs
pub mod directory;
pub mod master_index;
pub mod types;

use crate::classifier::Classifier;
use crate::ingest::types::{FilingRecord, FilingSource};
use crate::store::SeenStore;
use crate::verdict::{Tier, Verdict};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use serde::Serialize;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scan_filings_total", "Filings returned by sources.");
        describe_counter!("scan_hits_total", "Filings classified MEDIUM or HIGH.");
        describe_counter!(
            "scan_skipped_seen_total",
            "Filings skipped because they were already alerted."
        );
        describe_counter!(
            "scan_source_errors_total",
            "Source fetch/parse errors."
        );
        describe_gauge!("scan_last_run_ts", "Unix ts when the scan pipeline last ran.");
    });
}

/// A filing that cleared the MEDIUM threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanHit {
    pub record: FilingRecord,
    pub url: Option<String>,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    pub hits: Vec<ScanHit>,
    pub fetched: usize,
    pub skipped_seen: usize,
    pub skipped_no_accession: usize,
    pub below_threshold: usize,
    pub source_errors: usize,
}

impl ScanReport {
    pub fn high(&self) -> usize {
        self.hits.iter().filter(|h| h.verdict.tier == Tier::High).count()
    }

    pub fn medium(&self) -> usize {
        self.hits.iter().filter(|h| h.verdict.tier == Tier::Medium).count()
    }
}

/// Fetch, dedup, classify. Hits are marked seen in `store` (the caller
/// saves it) and come back ordered by score, highest first.
pub async fn run_scan(
    sources: &[Box<dyn FilingSource>],
    store: &mut SeenStore,
    classifier: &Classifier,
) -> ScanReport {
    ensure_metrics_described();
    let mut report = ScanReport::default();

    for source in sources {
        let filings = match source.fetch_filings().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = ?e, source = source.name(), "source error");
                counter!("scan_source_errors_total").increment(1);
                report.source_errors += 1;
                continue;
            }
        };
        report.fetched += filings.len();
        counter!("scan_filings_total").increment(filings.len() as u64);

        for filing in filings {
            let rec = &filing.record;
            if rec.accession.is_empty() {
                report.skipped_no_accession += 1;
                continue;
            }
            if store.seen_before(&rec.cik, &rec.accession) {
                report.skipped_seen += 1;
                counter!("scan_skipped_seen_total").increment(1);
                continue;
            }

            let verdict = classifier.classify(&filing.document);
            if !verdict.tier.is_alert() {
                report.below_threshold += 1;
                continue;
            }
            tracing::info!(
                cik = %rec.cik,
                accession = %rec.accession,
                score = verdict.score,
                tier = %verdict.tier,
                "hit"
            );
            store.mark_seen(&rec.cik, &rec.accession, verdict.score);
            counter!("scan_hits_total").increment(1);
            report.hits.push(ScanHit {
                record: filing.record,
                url: filing.url,
                verdict,
            });
        }
    }

    report.hits.sort_by(|a, b| {
        b.verdict
            .score
            .total_cmp(&a.verdict.score)
            .then_with(|| a.record.accession.cmp(&b.record.accession))
    });
    gauge!("scan_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
    report
}
