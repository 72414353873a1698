// src/store.rs
//! Seen-filing bookkeeping, persisted as a JSON state file.
//!
//! Keyed by filing identity (CIK + accession), never by verdict content, so a
//! re-run over the same business day does not alert twice.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::fs;

pub const DEFAULT_STATE_PATH: &str = "state/seen.json";
pub const ENV_STATE_PATH: &str = "GOVEQ_STATE_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeenEntry {
    pub cik: String,
    pub accession: String,
    pub confidence: f32,
    pub first_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub processed: usize,
    pub high_confidence: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    seen: BTreeMap<String, SeenEntry>,
}

#[derive(Debug)]
pub struct SeenStore {
    path: Option<PathBuf>,
    entries: BTreeMap<String, SeenEntry>,
}

fn key(cik: &str, accession: &str) -> String {
    format!("{}/{}", cik.trim(), accession.trim())
}

impl SeenStore {
    /// Open (or start) the store at `path`. A missing file is an empty store;
    /// an unreadable or corrupt one is an error.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path).await {
            Ok(s) => {
                let file: StateFile = serde_json::from_str(&s)
                    .with_context(|| format!("parse seen store {}", path.display()))?;
                file.seen
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("read seen store {}", path.display()))
            }
        };
        Ok(Self {
            path: Some(path),
            entries,
        })
    }

    /// Replace whatever is at `path` with an empty store, without reading it.
    /// Works on a corrupt state file.
    pub async fn reset(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            path: Some(path.into()),
            entries: BTreeMap::new(),
        };
        store.save().await?;
        Ok(store)
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: BTreeMap::new(),
        }
    }

    pub fn seen_before(&self, cik: &str, accession: &str) -> bool {
        self.entries.contains_key(&key(cik, accession))
    }

    /// Insert-or-ignore. Returns true when the filing was new.
    pub fn mark_seen(&mut self, cik: &str, accession: &str, confidence: f32) -> bool {
        let k = key(cik, accession);
        if self.entries.contains_key(&k) {
            return false;
        }
        self.entries.insert(
            k,
            SeenEntry {
                cik: cik.trim().to_string(),
                accession: accession.trim().to_string(),
                confidence,
                first_seen: Utc::now(),
            },
        );
        true
    }

    pub fn get(&self, cik: &str, accession: &str) -> Option<&SeenEntry> {
        self.entries.get(&key(cik, accession))
    }

    pub fn stats(&self, high_threshold: f32) -> StoreStats {
        StoreStats {
            processed: self.entries.len(),
            high_confidence: self
                .entries
                .values()
                .filter(|e| e.confidence >= high_threshold)
                .count(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the state file (temp file + rename). No-op for in-memory stores.
    pub async fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create state dir {}", dir.display()))?;
        }
        let file = StateFile {
            seen: self.entries.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&file).context("serialize seen store")?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .await
            .with_context(|| format!("replace {}", path.display()))?;
        tracing::debug!(path = %path.display(), entries = self.entries.len(), "seen store saved");
        Ok(())
    }
}
