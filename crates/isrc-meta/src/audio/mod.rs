//! Audio containers: ID3v2-tagged MP3 and Broadcast Wave WAV.

pub mod bwf;
pub mod id3;

pub use bwf::BwfCodec;
pub use id3::Id3Codec;
