// src/verdict.rs
//! Output of classification: matched flag, clamped score, tier, signal tags,
//! excerpt for human review and a short list of reasons.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Confidence tier derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    None,
    Medium,
    High,
}

impl Tier {
    pub fn is_alert(self) -> bool {
        self != Tier::None
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::None => "NONE",
            Tier::Medium => "MEDIUM",
            Tier::High => "HIGH",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Signal categories that contributed to a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCategory {
    EntityAgency,
    EntityProgram,
    EntityStatute,
    EntityGeneric,
    InvestmentEquity,
    InvestmentInstrument,
    InvestmentAgreement,
    InvestmentGeneric,
    DollarAmount,
    TransactionClosing,
    NamedProgram,
    MaterialAgreementItem,
    EarlyDisclosure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub matched: bool,
    pub score: f32,
    pub tier: Tier,
    #[serde(default)]
    pub categories: BTreeSet<SignalCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

impl Verdict {
    /// Nothing found (or everything vetoed).
    pub fn none() -> Self {
        Self {
            matched: false,
            score: 0.0,
            tier: Tier::None,
            categories: BTreeSet::new(),
            excerpt: None,
            reasons: Vec::new(),
        }
    }

    pub fn with_reasons(mut self, reasons: Vec<String>) -> Self {
        self.reasons = reasons;
        self
    }
}

impl Default for Verdict {
    fn default() -> Self {
        Self::none()
    }
}
