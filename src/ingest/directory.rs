// src/ingest/directory.rs
//! Filings from a local directory (a mirror of one EDGAR business day).
//!
//! With a `master.idx` present, every 8-K record maps to
//! `<accession>.txt|.htm|.html` next to it. Without one, every document file
//! becomes a filing keyed by its file stem.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::document::Document;
use crate::ingest::master_index::{archive_url, parse_filed_date, parse_master_index};
use crate::ingest::types::{Filing, FilingRecord, FilingSource};
use crate::text::filing_text;

pub const MASTER_INDEX_FILE: &str = "master.idx";
const DOC_EXTENSIONS: &[&str] = &["txt", "htm", "html"];

pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn find_body(&self, accession: &str) -> Option<PathBuf> {
        for ext in DOC_EXTENSIONS {
            let p = self.dir.join(format!("{accession}.{ext}"));
            if fs::metadata(&p).await.is_ok_and(|m| m.is_file()) {
                return Some(p);
            }
        }
        None
    }

    async fn read_filing(&self, record: FilingRecord, body_path: &Path, url: Option<String>) -> Result<Filing> {
        let raw = fs::read(body_path)
            .await
            .with_context(|| format!("read filing body {}", body_path.display()))?;
        let body = String::from_utf8_lossy(&raw);
        let mut document = Document::new(record.accession.clone(), filing_text(&body));
        if let Some(d) = parse_filed_date(&record.date) {
            document = document.filed_on(d);
        }
        Ok(Filing {
            record,
            document,
            url,
        })
    }

    async fn read_indexed(&self, index_path: &Path) -> Result<Vec<Filing>> {
        let idx = fs::read_to_string(index_path)
            .await
            .with_context(|| format!("read {}", index_path.display()))?;

        let mut out = Vec::new();
        for record in parse_master_index(&idx) {
            if record.accession.is_empty() {
                // the scan pipeline counts these; keep them without a body
                out.push(Filing {
                    document: Document::new("", ""),
                    url: None,
                    record,
                });
                continue;
            }
            let Some(body_path) = self.find_body(&record.accession).await else {
                tracing::warn!(accession = %record.accession, "no local body for index record");
                continue;
            };
            let url = Some(archive_url(&record.path));
            match self.read_filing(record, &body_path, url).await {
                Ok(filing) => out.push(filing),
                Err(e) => tracing::warn!(error = %format!("{e:#}"), "skipping unreadable filing"),
            }
        }
        Ok(out)
    }

    async fn read_all_files(&self) -> Result<Vec<Filing>> {
        let mut paths = Vec::new();
        let mut rd = fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("read dir {}", self.dir.display()))?;
        while let Some(entry) = rd.next_entry().await? {
            let p = entry.path();
            let is_doc = p
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| DOC_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
            if is_doc && entry.file_type().await?.is_file() {
                paths.push(p);
            }
        }
        paths.sort();

        let mut out = Vec::with_capacity(paths.len());
        for p in paths {
            let stem = p
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            let record = FilingRecord {
                company: stem.clone(),
                cik: "local".into(),
                form: "8-K".into(),
                date: String::new(),
                path: p.display().to_string(),
                accession: stem,
            };
            match self.read_filing(record, &p, None).await {
                Ok(filing) => out.push(filing),
                Err(e) => tracing::warn!(error = %format!("{e:#}"), "skipping unreadable filing"),
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl FilingSource for DirectorySource {
    async fn fetch_filings(&self) -> Result<Vec<Filing>> {
        let t0 = std::time::Instant::now();
        let index_path = self.dir.join(MASTER_INDEX_FILE);
        let filings = if fs::metadata(&index_path).await.is_ok() {
            self.read_indexed(&index_path).await?
        } else {
            self.read_all_files().await?
        };
        histogram!("source_read_ms").record(t0.elapsed().as_secs_f64() * 1000.0);
        Ok(filings)
    }

    fn name(&self) -> &'static str {
        "directory"
    }
}
