//! Error types for resolver configuration.
//!
//! Resolution itself never fails: a miss is the `Resolution::NotFound`
//! value, not an error. Only loading and compiling a vocabulary can go wrong.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while loading or compiling a [`ResolverConfig`](crate::config::ResolverConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML did not match the config schema
    #[error("invalid config yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Similarity threshold outside the closed unit interval
    #[error("similarity threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),

    /// A word list that must not be empty was empty
    #[error("'{field}' must contain at least one entry")]
    EmptyList { field: &'static str },

    /// A word list contained a blank entry
    #[error("'{field}' contains a blank entry")]
    EmptyEntry { field: &'static str },

    /// Override marker declared with no patterns
    #[error("override marker '{key}' has no patterns")]
    MarkerWithoutPatterns { key: String },

    /// Two override markers share a key
    #[error("override marker '{key}' is declared more than once")]
    DuplicateMarker { key: String },

    /// Trailing request phrase pattern failed to compile
    #[error("failed to compile trailing phrase pattern: {0}")]
    Pattern(#[from] regex::Error),
}
