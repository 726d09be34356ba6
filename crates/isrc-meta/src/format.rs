//! # Container Formats
//!
//! Format detection is by magic number. File extensions are only a hint,
//! used for reporting a mismatch.

use std::fmt;

use serde::{Deserialize, Serialize};

const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

/// The containers this crate reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContainerFormat {
    /// MPEG audio with an optional ID3v2 tag.
    Mp3,
    /// RIFF/WAVE audio.
    Wav,
    /// JPEG/JFIF or JPEG/EXIF image.
    Jpeg,
    /// PNG image.
    Png,
}

impl ContainerFormat {
    /// Identify a container from its leading bytes.
    pub fn detect(data: &[u8]) -> Option<Self> {
        match data {
            [0x89, b'P', b'N', b'G', ..] if data.starts_with(PNG_SIGNATURE) => Some(Self::Png),
            [0xFF, 0xD8, 0xFF, ..] | [0xFF, 0xD8] => Some(Self::Jpeg),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'A', b'V', b'E', ..] => Some(Self::Wav),
            [b'I', b'D', b'3', ..] => Some(Self::Mp3),
            [0xFF, second, ..] if second & 0xE0 == 0xE0 => Some(Self::Mp3),
            _ => None,
        }
    }

    /// Map a file extension (with or without the dot) or a file name to a
    /// format.
    pub fn from_extension(name: &str) -> Option<Self> {
        let ext = name.rsplit('.').next().unwrap_or(name).to_ascii_lowercase();
        match ext.as_str() {
            "mp3" => Some(Self::Mp3),
            "wav" | "wave" | "bwf" => Some(Self::Wav),
            "jpg" | "jpeg" | "jpe" | "jfif" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Upper-case display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mp3 => "MP3",
            Self::Wav => "WAV",
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
        }
    }

    /// IANA media type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// MP3 or WAV.
    pub fn is_audio(&self) -> bool {
        matches!(self, Self::Mp3 | Self::Wav)
    }

    /// JPEG or PNG.
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Jpeg | Self::Png)
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
