// src/ingest/master_index.rs
//! EDGAR daily master index parsing (`CIK|Company Name|Form Type|Date Filed|Filename`).

use chrono::NaiveDate;

use crate::ingest::types::FilingRecord;

pub const ARCHIVES_BASE: &str = "https://www.sec.gov/Archives/";
pub const TARGET_FORM: &str = "8-K";

/// 8-K records only; header and separator lines are skipped. The accession is
/// the file stem of the fourth path segment, empty when the path is shorter.
pub fn parse_master_index(text: &str) -> Vec<FilingRecord> {
    text.lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split('|').collect();
            if parts.len() < 5 || parts[2].trim() != TARGET_FORM {
                return None;
            }
            let path = parts[4].trim().to_string();
            Some(FilingRecord {
                cik: parts[0].trim().to_string(),
                company: parts[1].trim().to_string(),
                form: parts[2].trim().to_string(),
                date: parts[3].trim().to_string(),
                accession: accession_from_path(&path),
                path,
            })
        })
        .collect()
}

fn accession_from_path(path: &str) -> String {
    let Some(segment) = path.split('/').nth(3) else {
        return String::new();
    };
    match segment.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem.to_string(),
        _ => segment.to_string(),
    }
}

/// Public archive URL for a record path.
pub fn archive_url(path: &str) -> String {
    format!("{ARCHIVES_BASE}{}", path.trim_start_matches('/'))
}

/// Dates appear as `2025-08-14` in daily indexes and `20250814` in some mirrors.
pub fn parse_filed_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y%m%d"))
        .ok()
}
