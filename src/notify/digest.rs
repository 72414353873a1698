// src/notify/digest.rs
use chrono::NaiveDate;
use serde::Serialize;

use crate::ingest::ScanHit;
use crate::text::shorten;

pub const EXCERPT_WIDTH: usize = 280;

/// Plain-text alert digest for one scan run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertDigest {
    pub subject: String,
    pub body: String,
    pub high: usize,
    pub medium: usize,
}

impl AlertDigest {
    /// `hits` are rendered in the given order (the scan pipeline sorts them).
    pub fn build(hits: &[ScanHit], date: NaiveDate, high_threshold: f32) -> Self {
        let high = hits
            .iter()
            .filter(|h| h.verdict.score >= high_threshold)
            .count();
        let medium = hits.len() - high;
        let subject = format!(
            "[EDGAR] {high} high-conf + {medium} med-conf govt equity alerts · {}",
            date.format("%Y-%m-%d")
        );

        let mut lines = vec![format!(
            "Found {} potential hits (sorted by confidence):\n",
            hits.len()
        )];
        for h in hits {
            let rec = &h.record;
            let label = if h.verdict.score >= high_threshold {
                "HIGH"
            } else {
                "MEDIUM"
            };
            lines.push(format!(
                "• [{label} {:.2}] {} ({}) · {} · {}",
                h.verdict.score, rec.company, rec.cik, rec.form, rec.date
            ));
            lines.push(format!("  {}", h.url.as_deref().unwrap_or(&rec.path)));
            if let Some(ex) = &h.verdict.excerpt {
                lines.push(format!("  → {}", shorten(ex, EXCERPT_WIDTH)));
            }
            lines.push(String::new());
        }

        Self {
            subject,
            body: lines.join("\n"),
            high,
            medium,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::FilingRecord;
    use crate::verdict::{Tier, Verdict};

    fn hit(company: &str, score: f32, tier: Tier, excerpt: &str) -> ScanHit {
        let mut verdict = Verdict::none();
        verdict.matched = true;
        verdict.score = score;
        verdict.tier = tier;
        verdict.excerpt = Some(excerpt.to_string());
        ScanHit {
            record: FilingRecord {
                company: company.into(),
                cik: "50863".into(),
                form: "8-K".into(),
                date: "2025-08-14".into(),
                path: "edgar/data/50863/x.txt".into(),
                accession: "x".into(),
            },
            url: Some("https://www.sec.gov/Archives/edgar/data/50863/x.txt".into()),
            verdict,
        }
    }

    #[test]
    fn subject_counts_tiers() {
        let hits = vec![
            hit("INTEL CORP", 0.85, Tier::High, "equity stake"),
            hit("MP MATERIALS", 0.55, Tier::Medium, "preferred stock"),
        ];
        let d = AlertDigest::build(&hits, NaiveDate::from_ymd_opt(2025, 8, 14).unwrap(), 0.7);
        assert_eq!(
            d.subject,
            "[EDGAR] 1 high-conf + 1 med-conf govt equity alerts · 2025-08-14"
        );
        assert!(d.body.contains("• [HIGH 0.85] INTEL CORP (50863) · 8-K · 2025-08-14"));
        assert!(d.body.contains("• [MEDIUM 0.55] MP MATERIALS"));
        assert_eq!(d.total(), 2);
    }

    #[test]
    fn long_excerpts_are_shortened() {
        let long = "Department of Commerce equity stake ".repeat(20);
        let hits = vec![hit("INTEL CORP", 0.9, Tier::High, &long)];
        let d = AlertDigest::build(&hits, NaiveDate::from_ymd_opt(2025, 8, 14).unwrap(), 0.7);
        let line = d.body.lines().find(|l| l.starts_with("  → ")).unwrap();
        assert!(line.ends_with('…'));
        assert!(line.chars().count() <= EXCERPT_WIDTH + 4);
    }
}
