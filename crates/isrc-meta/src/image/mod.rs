//! Image containers: JPEG with EXIF/IPTC segments and PNG with text chunks.

pub mod jpeg;
pub mod png;
pub(crate) mod scan;

pub use jpeg::JpegCodec;
pub use png::PngCodec;
