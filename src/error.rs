// src/error.rs
//! Configuration errors. Raised at load time only; classification itself never fails.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{table}: entry with empty or whitespace-only phrase")]
    EmptyPhrase { table: &'static str },

    #[error("{table}: table must contain at least one phrase")]
    EmptyTable { table: &'static str },

    #[error("{table}: phrase `{phrase}` does not compile: {source}")]
    Pattern {
        table: &'static str,
        phrase: String,
        #[source]
        source: regex::Error,
    },

    #[error("window_chars must be a positive integer")]
    ZeroWindow,

    #[error("thresholds must satisfy 0 <= medium ({medium}) <= high ({high}) <= 1")]
    Thresholds { medium: f32, high: f32 },

    #[error("parsing {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: toml::de::Error,
    },

    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
