// src/config.rs
//! Classifier configuration: proximity window, tier thresholds and bonus toggles.
//!
//! Loaded from TOML (`config/classifier.toml` or `$GOVEQ_CONFIG_PATH`), then
//! env overrides are applied, then the result is validated. A
//! `ClassifierConfig` value is always valid: `window_chars > 0` and
//! `0 <= medium <= high <= 1`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::verdict::Tier;

// --- env defaults & names ---
pub const DEFAULT_CONFIG_PATH: &str = "config/classifier.toml";
pub const DEFAULT_WINDOW_CHARS: usize = 150;
pub const DEFAULT_MEDIUM_THRESHOLD: f32 = 0.4;
pub const DEFAULT_HIGH_THRESHOLD: f32 = 0.7;

pub const ENV_CONFIG_PATH: &str = "GOVEQ_CONFIG_PATH";
pub const ENV_WINDOW_CHARS: &str = "GOVEQ_WINDOW_CHARS";
pub const ENV_MEDIUM_THRESHOLD: &str = "GOVEQ_MEDIUM_THRESHOLD";
pub const ENV_HIGH_THRESHOLD: &str = "GOVEQ_HIGH_THRESHOLD";

// parse optional float env and clamp to <0.0..=1.0>
fn parse_threshold_env(raw: Option<String>) -> Option<f32> {
    raw.and_then(|s| s.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
}

fn parse_window_env(raw: Option<String>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|v| *v > 0)
}

/// MEDIUM/HIGH cut-offs. `tier_for` is the only place tiers are derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    medium: f32,
    high: f32,
}

impl Thresholds {
    pub fn new(medium: f32, high: f32) -> Result<Self, ConfigError> {
        let in_range = |x: f32| x.is_finite() && (0.0..=1.0).contains(&x);
        if !in_range(medium) || !in_range(high) || medium > high {
            return Err(ConfigError::Thresholds { medium, high });
        }
        Ok(Self { medium, high })
    }

    pub fn medium(&self) -> f32 {
        self.medium
    }

    pub fn high(&self) -> f32 {
        self.high
    }

    pub fn tier_for(&self, score: f32) -> Tier {
        if score >= self.high {
            Tier::High
        } else if score >= self.medium {
            Tier::Medium
        } else {
            Tier::None
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            medium: DEFAULT_MEDIUM_THRESHOLD,
            high: DEFAULT_HIGH_THRESHOLD,
        }
    }
}

/// Per-bonus enable flags. All on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusToggles {
    pub dollar_amount: bool,
    pub transaction_closing: bool,
    pub named_program: bool,
    pub material_agreement_item: bool,
    pub early_disclosure: bool,
}

impl Default for BonusToggles {
    fn default() -> Self {
        Self {
            dollar_amount: true,
            transaction_closing: true,
            named_program: true,
            material_agreement_item: true,
            early_disclosure: true,
        }
    }
}

impl BonusToggles {
    pub fn none() -> Self {
        Self {
            dollar_amount: false,
            transaction_closing: false,
            named_program: false,
            material_agreement_item: false,
            early_disclosure: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    window_chars: usize,
    thresholds: Thresholds,
    bonuses: BonusToggles,
}

/* ----------------------------
Config schema (from TOML)
---------------------------- */

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    classifier: RawClassifier,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawClassifier {
    window_chars: usize,
    medium_threshold: f32,
    high_threshold: f32,
    bonuses: BonusToggles,
}

impl Default for RawClassifier {
    fn default() -> Self {
        Self {
            window_chars: DEFAULT_WINDOW_CHARS,
            medium_threshold: DEFAULT_MEDIUM_THRESHOLD,
            high_threshold: DEFAULT_HIGH_THRESHOLD,
            bonuses: BonusToggles::default(),
        }
    }
}

impl RawClassifier {
    fn apply_env(&mut self) {
        if let Some(w) = parse_window_env(std::env::var(ENV_WINDOW_CHARS).ok()) {
            self.window_chars = w;
        }
        if let Some(t) = parse_threshold_env(std::env::var(ENV_MEDIUM_THRESHOLD).ok()) {
            self.medium_threshold = t;
        }
        if let Some(t) = parse_threshold_env(std::env::var(ENV_HIGH_THRESHOLD).ok()) {
            self.high_threshold = t;
        }
    }

    fn validate(self) -> Result<ClassifierConfig, ConfigError> {
        ClassifierConfig::new(
            self.window_chars,
            Thresholds::new(self.medium_threshold, self.high_threshold)?,
            self.bonuses,
        )
    }
}

impl ClassifierConfig {
    pub fn new(
        window_chars: usize,
        thresholds: Thresholds,
        bonuses: BonusToggles,
    ) -> Result<Self, ConfigError> {
        if window_chars == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        Ok(Self {
            window_chars,
            thresholds,
            bonuses,
        })
    }

    /// Load from TOML. Uses GOVEQ_CONFIG_PATH or defaults to "config/classifier.toml";
    /// a missing default file means built-in defaults. Env overrides apply last.
    pub fn from_toml() -> Result<Self, ConfigError> {
        let (path, explicit) = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => (PathBuf::from(p), true),
            Err(_) => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        let mut raw = if explicit || path.exists() {
            Self::read_raw(&path)?
        } else {
            RawClassifier::default()
        };
        raw.apply_env();
        raw.validate()
    }

    /// Load from an explicit path; env overrides still apply.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let mut raw = Self::read_raw(path)?;
        raw.apply_env();
        raw.validate()
    }

    /// Parse a TOML string as-is (no env overrides).
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(toml_str).map_err(|source| ConfigError::Parse {
            what: "classifier config",
            source,
        })?;
        file.classifier.validate()
    }

    fn read_raw(path: &Path) -> Result<RawClassifier, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            what: "classifier config",
            source,
        })?;
        Ok(file.classifier)
    }

    pub fn with_window_chars(mut self, window_chars: usize) -> Result<Self, ConfigError> {
        if window_chars == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        self.window_chars = window_chars;
        Ok(self)
    }

    pub fn with_bonuses(mut self, bonuses: BonusToggles) -> Self {
        self.bonuses = bonuses;
        self
    }

    pub fn window_chars(&self) -> usize {
        self.window_chars
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn bonuses(&self) -> &BonusToggles {
        &self.bonuses
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            window_chars: DEFAULT_WINDOW_CHARS,
            thresholds: Thresholds::default(),
            bonuses: BonusToggles::default(),
        }
    }
}
