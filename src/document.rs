// src/document.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Filing text handed to the classifier by the fetch layer. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    text: String,
    source_id: String,
    #[serde(default)]
    filed: Option<NaiveDate>,
}

impl Document {
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_id: source_id.into(),
            filed: None,
        }
    }

    pub fn filed_on(mut self, date: NaiveDate) -> Self {
        self.filed = Some(date);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Accession number (or whatever the fetch layer uses as identity).
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn filed(&self) -> Option<NaiveDate> {
        self.filed
    }
}
