//! # Metadata Writer
//!
//! The single entry point callers use. It detects the container by
//! signature, dispatches to the matching codec, and turns codec failures
//! into safe defaults:
//!
//! - [`MetadataWriter::embed()`] returns [`EmbedOutcome::Unchanged`] with the
//!   caller's original bytes. It never destroys the source file.
//! - [`MetadataWriter::extract()`] returns `None`.
//!
//! [`MetadataWriter::try_embed()`] and [`MetadataWriter::try_extract()`]
//! expose the underlying errors for callers that want them.

use isrc_core::IsrcCode;
use serde::Serialize;

use crate::audio::{BwfCodec, Id3Codec};
use crate::codec::MetadataCodec;
use crate::error::CodecError;
use crate::fields::{EmbedFields, MetadataField};
use crate::format::ContainerFormat;
use crate::image::{JpegCodec, PngCodec};

/// Result of [`MetadataWriter::embed()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedOutcome {
    /// The code was written.
    Embedded {
        /// Detected container.
        format: ContainerFormat,
        /// The new container bytes.
        bytes: Vec<u8>,
    },
    /// Nothing was written; `bytes` is a copy of the input.
    Unchanged {
        /// The original container bytes.
        bytes: Vec<u8>,
        /// Why embedding was skipped.
        reason: CodecError,
    },
}

impl EmbedOutcome {
    /// Whether the code was written.
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded { .. })
    }

    /// The resulting bytes, whichever way it went.
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Embedded { bytes, .. } | Self::Unchanged { bytes, .. } => bytes,
        }
    }

    /// Take the resulting bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Embedded { bytes, .. } | Self::Unchanged { bytes, .. } => bytes,
        }
    }
}

/// Summary of a container, as returned by [`MetadataWriter::inspect()`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerReport {
    /// Format detected from the signature.
    pub format: Option<ContainerFormat>,
    /// Format implied by the file name, if one was given.
    pub extension_format: Option<ContainerFormat>,
    /// Whether the extension disagrees with the signature.
    pub extension_mismatch: bool,
    /// Buffer length in bytes.
    pub size: usize,
    /// The embedded code, if any.
    pub extracted: Option<IsrcCode>,
    /// Where the embedded value sits.
    pub field: Option<MetadataField>,
    /// Whether a valid code was found.
    pub has_embedded: bool,
    /// Whether the detected format can be written to.
    pub supports_embedding: bool,
}

/// Signature-dispatched facade over the container codecs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataWriter;

impl MetadataWriter {
    /// Create a writer over every supported container.
    pub fn new() -> Self {
        Self
    }

    fn codec(format: ContainerFormat) -> &'static dyn MetadataCodec {
        match format {
            ContainerFormat::Mp3 => &Id3Codec,
            ContainerFormat::Wav => &BwfCodec,
            ContainerFormat::Jpeg => &JpegCodec,
            ContainerFormat::Png => &PngCodec,
        }
    }

    /// Embed `code`, surfacing any codec error.
    pub fn try_embed(
        &self,
        data: &[u8],
        code: &IsrcCode,
        fields: &EmbedFields,
    ) -> Result<(ContainerFormat, Vec<u8>), CodecError> {
        let format = ContainerFormat::detect(data).ok_or(CodecError::Unsupported)?;
        let bytes = Self::codec(format).embed(data, code, fields)?;
        Ok((format, bytes))
    }

    /// Embed `code`, falling back to the original bytes on any failure.
    pub fn embed(&self, data: &[u8], code: &IsrcCode, fields: &EmbedFields) -> EmbedOutcome {
        match self.try_embed(data, code, fields) {
            Ok((format, bytes)) => {
                tracing::debug!(%format, code = %code, before = data.len(), after = bytes.len(), "embedded ISRC");
                EmbedOutcome::Embedded { format, bytes }
            }
            Err(reason) => {
                tracing::warn!(error = %reason, "embedding skipped; returning original bytes");
                EmbedOutcome::Unchanged {
                    bytes: data.to_vec(),
                    reason,
                }
            }
        }
    }

    /// Locate the embedded field, surfacing any codec error.
    pub fn try_locate(&self, data: &[u8]) -> Result<Option<MetadataField>, CodecError> {
        let format = ContainerFormat::detect(data).ok_or(CodecError::Unsupported)?;
        Self::codec(format).locate(data)
    }

    /// The embedded field, or `None` on any failure.
    pub fn locate(&self, data: &[u8]) -> Option<MetadataField> {
        self.try_locate(data)
            .map_err(|e| tracing::debug!(error = %e, "no metadata field located"))
            .ok()
            .flatten()
    }

    /// Extract the embedded code, surfacing any codec error.
    ///
    /// Accepts both the hyphenated and the compact form and returns the
    /// canonical hyphenated code.
    pub fn try_extract(&self, data: &[u8]) -> Result<Option<IsrcCode>, CodecError> {
        match self.try_locate(data)? {
            Some(field) => Ok(Some(IsrcCode::parse_lenient(&field.text)?)),
            None => Ok(None),
        }
    }

    /// The embedded code, or `None` on any failure.
    pub fn extract(&self, data: &[u8]) -> Option<IsrcCode> {
        self.try_extract(data)
            .map_err(|e| tracing::debug!(error = %e, "no ISRC extracted"))
            .ok()
            .flatten()
    }

    /// Describe a container. `file_name` is only used to report an
    /// extension that disagrees with the signature.
    pub fn inspect(&self, data: &[u8], file_name: Option<&str>) -> ContainerReport {
        let format = ContainerFormat::detect(data);
        let extension_format = file_name.and_then(ContainerFormat::from_extension);
        let extension_mismatch = matches!((format, extension_format), (Some(a), Some(b)) if a != b);
        if extension_mismatch {
            tracing::warn!(?format, ?extension_format, "file extension does not match signature");
        }
        let field = self.locate(data);
        let extracted = field.as_ref().and_then(|f| IsrcCode::parse_lenient(&f.text).ok());
        ContainerReport {
            format,
            extension_format,
            extension_mismatch,
            size: data.len(),
            has_embedded: extracted.is_some(),
            extracted,
            field,
            supports_embedding: format.is_some(),
        }
    }
}
