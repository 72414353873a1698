// tests/scan_pipeline.rs
//
// Directory source → run_scan → seen store → digest, on a temp "business day".

use chrono::NaiveDate;
use gov_equity_notifier::ingest::directory::{DirectorySource, MASTER_INDEX_FILE};
use gov_equity_notifier::ingest::types::FilingSource;
use gov_equity_notifier::{
    run_scan, AlertDigest, Classifier, ClassifierConfig, SeenStore, Tier,
};
use std::fs;

const INDEX: &str = "\
CIK|Company Name|Form Type|Date Filed|File Name
--------------------------------------------------------------------------------
50863|INTEL CORP|8-K|20250822|edgar/data/50863/0000050863-25-000044.txt
1801368|MP MATERIALS CORP|8-K|20250822|edgar/data/1801368/0001801368-25-000012.txt
320193|APPLE INC|8-K|20250822|edgar/data/320193/0000320193-25-000071.txt
1000001|HEDGED HOLDINGS|8-K|20250822|edgar/data/1000001/0001000001-25-000003.txt
50863|INTEL CORP|10-Q|20250822|edgar/data/50863/0000050863-25-000045.txt
";

const INTEL: &str = "<html><body>\
<p>Item 1.01 Entry into a Material Definitive Agreement.</p>\
<p>On August 22, 2025, the Company entered into a definitive agreement with the \
U.S. Department of Commerce under the CHIPS Act, pursuant to which the Department \
of Commerce will purchase common stock for $8.9 billion. The closing occurred \
on the same day.</p></body></html>";

const MP: &str = "MP Materials Corp. announced that the Department of Defense \
acquired an equity stake in the Company.";

const APPLE: &str = "Apple Inc. announced results for its fiscal third quarter.";

const HEDGED: &str = "Item 1A. Risk Factors\n\nThe Department of Energy could make an \
equity investment in companies in our industry.";

fn write_day(dir: &std::path::Path) {
    fs::write(dir.join(MASTER_INDEX_FILE), INDEX).unwrap();
    fs::write(dir.join("0000050863-25-000044.htm"), INTEL).unwrap();
    fs::write(dir.join("0001801368-25-000012.txt"), MP).unwrap();
    fs::write(dir.join("0000320193-25-000071.txt"), APPLE).unwrap();
    fs::write(dir.join("0001000001-25-000003.txt"), HEDGED).unwrap();
}

#[tokio::test]
async fn scan_orders_hits_and_dedups_across_runs() {
    let day = tempfile::tempdir().unwrap();
    write_day(day.path());
    let state = tempfile::tempdir().unwrap();
    let state_path = state.path().join("seen.json");

    let sources: Vec<Box<dyn FilingSource>> = vec![Box::new(DirectorySource::new(day.path()))];
    let classifier = Classifier::with_builtin(ClassifierConfig::default());

    // first run
    let mut store = SeenStore::open(&state_path).await.unwrap();
    let report = run_scan(&sources, &mut store, &classifier).await;
    assert_eq!(report.fetched, 4);
    assert_eq!(report.hits.len(), 2);
    assert_eq!(report.below_threshold, 2);
    assert_eq!(report.hits[0].record.company, "INTEL CORP");
    assert_eq!(report.hits[0].verdict.tier, Tier::High);
    assert_eq!(report.hits[1].record.company, "MP MATERIALS CORP");
    assert!(report.hits[0].verdict.score >= report.hits[1].verdict.score);
    assert_eq!((report.high(), report.medium()), (1, 1));
    store.save().await.unwrap();

    let digest = AlertDigest::build(
        &report.hits,
        NaiveDate::from_ymd_opt(2025, 8, 22).unwrap(),
        0.7,
    );
    assert_eq!(
        digest.subject,
        "[EDGAR] 1 high-conf + 1 med-conf govt equity alerts · 2025-08-22"
    );
    assert!(digest
        .body
        .contains("https://www.sec.gov/Archives/edgar/data/50863/0000050863-25-000044.txt"));

    // second run over the same day: nothing new
    let mut store = SeenStore::open(&state_path).await.unwrap();
    assert_eq!(store.len(), 2);
    let report = run_scan(&sources, &mut store, &classifier).await;
    assert!(report.hits.is_empty());
    assert_eq!(report.skipped_seen, 2);
    // below-threshold filings are not recorded, so they are classified again
    assert_eq!(report.below_threshold, 2);

    let stats = store.stats(0.7);
    assert_eq!((stats.processed, stats.high_confidence), (2, 1));
}

#[tokio::test]
async fn missing_directory_counts_as_source_error() {
    let tmp = tempfile::tempdir().unwrap();
    let sources: Vec<Box<dyn FilingSource>> =
        vec![Box::new(DirectorySource::new(tmp.path().join("nope")))];
    let mut store = SeenStore::in_memory();
    let classifier = Classifier::with_builtin(ClassifierConfig::default());
    let report = run_scan(&sources, &mut store, &classifier).await;
    assert_eq!(report.source_errors, 1);
    assert_eq!(report.fetched, 0);
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn unreadable_body_does_not_cost_the_other_hits() {
    let day = tempfile::tempdir().unwrap();
    fs::write(
        day.path().join(MASTER_INDEX_FILE),
        "1|BAD CORP|8-K|20250822|edgar/data/1/0000000001-25-000001.txt\n\
         2|GOOD CORP|8-K|20250822|edgar/data/2/0000000002-25-000001.txt\n",
    )
    .unwrap();
    std::os::unix::fs::symlink("/proc/self/mem", day.path().join("0000000001-25-000001.txt"))
        .unwrap();
    fs::write(
        day.path().join("0000000002-25-000001.txt"),
        "The Department of Defense made an equity investment in the Company.",
    )
    .unwrap();

    let sources: Vec<Box<dyn FilingSource>> = vec![Box::new(DirectorySource::new(day.path()))];
    let mut store = SeenStore::in_memory();
    let classifier = Classifier::with_builtin(ClassifierConfig::default());
    let report = run_scan(&sources, &mut store, &classifier).await;
    assert_eq!(report.source_errors, 0);
    assert_eq!(report.fetched, 1);
    assert_eq!(report.hits.len(), 1);
    assert_eq!(report.hits[0].record.company, "GOOD CORP");
}
