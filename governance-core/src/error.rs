//! Error types for config loading and other genuinely exceptional conditions.
//!
//! Policy decisions (violations, validation issues, resolution errors) are
//! never modeled as `Err` — only truly unrecoverable I/O/parse failures are.

use std::path::PathBuf;

/// Errors raised while loading or parsing governance configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
