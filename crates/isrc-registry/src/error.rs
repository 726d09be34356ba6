//! # Registry Errors
//!
//! Only two failure classes reach callers of the registry: an exhausted
//! designation range and persistence I/O. Everything else (unknown codes
//! passed to `mark_used`, a missing owner identity) degrades locally.

use isrc_core::ValidationError;
use thiserror::Error;

/// Errors surfaced by [`Registry`](crate::Registry) operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The next designation would fall outside the owner's range.
    #[error("ISRC limit reached: maximum {capacity} codes per year (range {start}..={end})")]
    RangeExhausted {
        /// First designation of the range.
        start: u32,
        /// Last designation of the range.
        end: u32,
        /// Number of designations in the range.
        capacity: u32,
    },

    /// Loading or saving registry state failed.
    #[error("registry store error: {0}")]
    Store(#[from] StoreError),

    /// A code could not be formed from the registry's groups.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Registry configuration is unusable.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors from a [`RegistryStore`](crate::RegistryStore) backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted document could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from loading or checking a [`RegistryConfig`](crate::RegistryConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid YAML for the expected shape.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A field holds a value the registry cannot work with.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
