//! Textual ISRC search over raw metadata payloads.
//!
//! EXIF, IPTC and PNG text payloads are scanned as bytes for
//! `ISRC[:\s]*<code>`, case-insensitively. Only single-byte text encodings
//! match; a UTF-16 EXIF UserComment does not.
//!
//! A candidate is either fully hyphenated or fully compact, must not run on
//! into further letters or digits, and must parse as a code. Candidates that
//! fail are skipped and the scan continues.

use std::sync::LazyLock;

use isrc_core::IsrcCode;
use regex::bytes::Regex;

static ISRC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i-u)ISRC[:\s]*([A-Z]{2}-[A-Z0-9]{3}-[0-9]{2}-[0-9]{5}|[A-Z]{2}[A-Z0-9]{3}[0-9]{7})")
        .expect("ISRC pattern compiles")
});

/// A code-shaped match inside a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScanMatch {
    /// Offset of the code within the scanned payload.
    pub start: usize,
    pub len: usize,
    pub text: String,
}

/// The first well-formed `ISRC:<code>` occurrence in `payload`.
pub(crate) fn find_isrc(payload: &[u8]) -> Option<ScanMatch> {
    ISRC_PATTERN
        .captures_iter(payload)
        .filter_map(|caps| caps.get(1))
        .filter(|group| !payload.get(group.end()).is_some_and(u8::is_ascii_alphanumeric))
        .map(|group| ScanMatch {
            start: group.start(),
            len: group.len(),
            text: String::from_utf8_lossy(group.as_bytes()).into_owned(),
        })
        .find(|m| IsrcCode::parse_lenient(&m.text).is_ok())
}
