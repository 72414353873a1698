// src/lib.rs
// Public library surface for the CLI and integration tests.

pub mod classifier;
pub mod config;
pub mod dictionary;
pub mod document;
pub mod error;
pub mod negative;
pub mod proximity;
pub mod scorer;
pub mod text;
pub mod verdict;

// Outer glue: sources, dedup state, alert delivery
pub mod ingest;
pub mod notify;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::classifier::{classify, classify_with, Classifier};
pub use crate::config::{BonusToggles, ClassifierConfig, Thresholds};
pub use crate::dictionary::Dictionary;
pub use crate::document::Document;
pub use crate::error::ConfigError;
pub use crate::ingest::{run_scan, ScanHit, ScanReport};
pub use crate::notify::{AlertDigest, Notifier};
pub use crate::store::SeenStore;
pub use crate::verdict::{SignalCategory, Tier, Verdict};
