//! The seam every container codec implements.

use isrc_core::IsrcCode;

use crate::error::CodecError;
use crate::fields::{EmbedFields, MetadataField};
use crate::format::ContainerFormat;

/// Reads and writes an ISRC in one container format.
///
/// Implementations are stateless. `locate` never mutates; `embed` returns
/// a new buffer.
pub trait MetadataCodec: Send + Sync {
    /// The container this codec handles.
    fn format(&self) -> ContainerFormat;

    /// Find the embedded identifier, if any.
    ///
    /// `Ok(None)` means the container parsed cleanly but carries no code.
    fn locate(&self, data: &[u8]) -> Result<Option<MetadataField>, CodecError>;

    /// Produce a copy of `data` carrying `code`.
    fn embed(&self, data: &[u8], code: &IsrcCode, fields: &EmbedFields) -> Result<Vec<u8>, CodecError>;
}
