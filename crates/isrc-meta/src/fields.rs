//! Values passed into and out of the codecs.

use serde::Serialize;

/// Optional descriptive fields written alongside the code.
///
/// Only the MP3 codec has room for them (`TIT2`, `TPE1`, `TCON`); the other
/// containers carry the code alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbedFields {
    /// Track title.
    pub title: Option<String>,
    /// Performing artist.
    pub artist: Option<String>,
    /// Genre.
    pub genre: Option<String>,
}

impl EmbedFields {
    /// No descriptive fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the track title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the performing artist.
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Set the genre.
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }
}

/// The located byte range holding an embedded identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataField {
    /// Offset of the value from the start of the container.
    pub offset: usize,
    /// Length of the stored value in bytes, including any padding.
    pub length: usize,
    /// The decoded value, trimmed of padding.
    pub text: String,
}
