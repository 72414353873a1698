// src/classifier.rs
//! Composition root: proximity matcher → negative-context filter → scorer.
//! Pure given its inputs; the only side effect is opt-in, anonymized dev logging.

use std::sync::Arc;
use tracing::info;

use crate::config::ClassifierConfig;
use crate::dictionary::Dictionary;
use crate::document::Document;
use crate::negative::NegativeContextFilter;
use crate::proximity::find_windows;
use crate::scorer::Scorer;
use crate::verdict::Verdict;

pub const ENV_DEV_LOG: &str = "GOVEQ_DEV_LOG";
pub const ENV_APP_ENV: &str = "GOVEQ_ENV";

// Dev logging gate: GOVEQ_DEV_LOG=1 AND dev env (debug or GOVEQ_ENV in {local,development,dev})
pub(crate) fn dev_logging_enabled() -> bool {
    let on = std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var(ENV_APP_ENV)
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// Short stable id for a text: first 6 bytes of its SHA-256, hex.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

fn dev_log_verdict(event: &str, document: &Document, windows: usize, verdict: &Verdict) {
    if !dev_logging_enabled() {
        return;
    }
    let id = anon_hash(document.text());
    let reasons: Vec<&str> = verdict.reasons.iter().take(5).map(String::as_str).collect();
    // Never log raw text or excerpts.
    info!(
        target: "classifier",
        %id, event, windows,
        score = verdict.score,
        tier = %verdict.tier,
        reasons = ?reasons
    );
}

/// A dictionary + config pair, cheap to clone and share across tasks.
#[derive(Debug, Clone)]
pub struct Classifier {
    dictionary: Arc<Dictionary>,
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(dictionary: Arc<Dictionary>, config: ClassifierConfig) -> Self {
        Self { dictionary, config }
    }

    pub fn with_builtin(config: ClassifierConfig) -> Self {
        Self::new(Arc::new(Dictionary::builtin().clone()), config)
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn classify(&self, document: &Document) -> Verdict {
        classify_with(&self.dictionary, &self.config, document)
    }
}

/// Classify with the built-in dictionary.
pub fn classify(document: &Document, config: &ClassifierConfig) -> Verdict {
    classify_with(Dictionary::builtin(), config, document)
}

pub fn classify_with(
    dictionary: &Dictionary,
    config: &ClassifierConfig,
    document: &Document,
) -> Verdict {
    let text = document.text();
    if text.trim().is_empty() {
        return Verdict::none();
    }

    // 1) Candidate windows
    let windows = find_windows(
        text,
        dictionary.entities(),
        dictionary.investments(),
        config.window_chars(),
    );
    if windows.is_empty() {
        let verdict = Verdict::none();
        dev_log_verdict("no_windows", document, 0, &verdict);
        return verdict;
    }

    // 2) Per-window veto
    let filter = NegativeContextFilter::new(dictionary.negative_cues());
    let mut vetoes: Vec<String> = Vec::new();
    let mut surviving = Vec::with_capacity(windows.len());
    for w in &windows {
        match filter.find_cue(text, w) {
            Some(cue) => {
                let reason = format!("veto:{}", cue.phrase());
                if !vetoes.contains(&reason) {
                    vetoes.push(reason);
                }
            }
            None => surviving.push(*w),
        }
    }

    if surviving.is_empty() {
        let verdict = Verdict::none().with_reasons(vetoes);
        dev_log_verdict("all_vetoed", document, windows.len(), &verdict);
        return verdict;
    }

    // 3) Score
    let mut verdict = Scorer::new(dictionary.closing_terms(), config).score(document, &surviving);
    verdict.reasons.extend(vetoes);
    dev_log_verdict("scored", document, windows.len(), &verdict);
    verdict
}
