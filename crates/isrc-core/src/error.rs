//! # Validation Errors
//!
//! Structured errors for domain-primitive construction, built with
//! `thiserror`. Each variant carries the offending input so that callers can
//! report it verbatim.

use thiserror::Error;

/// A value failed the format rules of a domain primitive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The string does not match `TT-RRR-YY-NNNNN`.
    #[error("invalid ISRC {0:?}: expected TT-RRR-YY-NNNNN")]
    InvalidIsrc(String),

    /// Territory is not exactly two ASCII letters.
    #[error("invalid territory {0:?}: expected two ASCII letters")]
    InvalidTerritory(String),

    /// Registrant is not exactly three ASCII alphanumerics.
    #[error("invalid registrant {0:?}: expected three ASCII letters or digits")]
    InvalidRegistrant(String),

    /// Year is not in `0..=99`.
    #[error("invalid year {0}: expected a two-digit year")]
    InvalidYear(u32),

    /// Designation does not fit five digits.
    #[error("invalid designation {0}: expected at most five digits")]
    InvalidDesignation(u32),

    /// A timestamp string could not be parsed.
    #[error("invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        input: String,
        /// Parser diagnostic.
        reason: String,
    },
}
