#![deny(missing_docs)]

//! # isrc-meta — ISRC Metadata Codecs
//!
//! Reads and writes an ISRC inside four binary containers without
//! disturbing the rest of the file:
//!
//! | Format | Where the code lives |
//! |--------|----------------------|
//! | MP3    | ID3v2 `TSRC` frame |
//! | WAV    | BWF `bext` chunk, ISRC field at data offset 602 |
//! | JPEG   | APP1 EXIF UserComment `ISRC:<code>` (APP1/APP13 scanned on read) |
//! | PNG    | `tEXt` chunk keyed `ISRC` (`tEXt`/`iTXt` scanned on read) |
//!
//! ## Contract
//!
//! Codecs are pure functions over byte slices: reads never mutate, writes
//! return a new buffer. The [`MetadataWriter`] facade picks a codec by
//! magic number, never by file extension, and degrades every failure to
//! "no code" or "bytes unchanged".
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - Every read from an input buffer is bounds-checked; malformed input
//!   yields [`CodecError::Malformed`], never a panic.

pub mod audio;
mod bytes;
pub mod codec;
pub mod error;
pub mod fields;
pub mod format;
pub mod image;
pub mod writer;

pub use audio::{BwfCodec, Id3Codec};
pub use codec::MetadataCodec;
pub use error::CodecError;
pub use fields::{EmbedFields, MetadataField};
pub use format::ContainerFormat;
pub use image::{JpegCodec, PngCodec};
pub use writer::{ContainerReport, EmbedOutcome, MetadataWriter};
