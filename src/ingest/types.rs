// src/ingest/types.rs
use anyhow::Result;

use crate::document::Document;

/// One line of an EDGAR master index (or a synthesized equivalent).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct FilingRecord {
    pub company: String,
    pub cik: String,
    pub form: String, // e.g. "8-K"
    pub date: String, // as listed, e.g. "2025-08-14" or "20250814"
    pub path: String, // archive-relative, e.g. "edgar/data/320193/0000320193-25-000071.txt"
    pub accession: String,
}

/// A filing with its plain-text body, ready for classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Filing {
    pub record: FilingRecord,
    pub document: Document,
    pub url: Option<String>,
}

#[async_trait::async_trait]
pub trait FilingSource: Send + Sync {
    async fn fetch_filings(&self) -> Result<Vec<Filing>>;
    fn name(&self) -> &'static str;
}
