//! # Codec Errors
//!
//! Codec functions return these; the [`MetadataWriter`](crate::MetadataWriter)
//! facade never does. It logs them and degrades to "no code found" or
//! "bytes unchanged".

use isrc_core::ValidationError;
use thiserror::Error;

use crate::format::ContainerFormat;

/// Failure inside a container codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The bytes carry no signature this crate recognises.
    #[error("unsupported container")]
    Unsupported,

    /// The container is truncated or structurally corrupt.
    #[error("malformed {format} at offset {offset}: {reason}")]
    Malformed {
        /// Container being parsed.
        format: ContainerFormat,
        /// Byte offset where parsing failed.
        offset: usize,
        /// What was wrong.
        reason: String,
    },

    /// A value does not fit the container's size field.
    #[error("{format} field of {size} bytes exceeds limit of {limit}")]
    TooLarge {
        /// Container being written.
        format: ContainerFormat,
        /// Size that was needed.
        size: usize,
        /// Largest size the field can encode.
        limit: usize,
    },

    /// A located field does not hold a well-formed ISRC.
    #[error("embedded text is not an ISRC: {0}")]
    InvalidCode(#[from] ValidationError),
}

impl CodecError {
    pub(crate) fn malformed(format: ContainerFormat, offset: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            format,
            offset,
            reason: reason.into(),
        }
    }
}
