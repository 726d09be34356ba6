//! # ISRC Code Newtype
//!
//! `IsrcCode` is the identifier this stack allocates and embeds. The
//! canonical string form is bit-exact:
//!
//! ```text
//! TT-RRR-YY-NNNNN
//! │  │   │  └── designation: 5 digits, zero-padded
//! │  │   └───── year: 2 digits
//! │  └───────── registrant: 3 ASCII letters or digits
//! └──────────── territory: 2 ASCII letters
//! ```
//!
//! ## Validation
//!
//! [`IsrcCode::parse()`] trims surrounding whitespace, accepts letters in any
//! case, and normalises them to uppercase. Only the hyphenated form is
//! accepted there. [`IsrcCode::parse_lenient()`] additionally accepts the
//! 12-character compact form (`ZA80G2500123`) found in third-party tags and
//! in the fixed-width BWF field.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Largest designation that fits the five-digit field.
pub const DESIGNATION_MAX: u32 = 99_999;

/// Length of the hyphen-free form.
const COMPACT_LEN: usize = 12;

/// A validated ISRC in canonical uppercase, hyphenated form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IsrcCode(String);

/// The four groups of an ISRC, as produced by [`IsrcCode::parts()`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IsrcParts {
    /// Two uppercase ASCII letters.
    pub territory: String,
    /// Three uppercase ASCII letters or digits.
    pub registrant: String,
    /// Two-digit year of reference.
    pub year: u8,
    /// Sequential designation, `0..=99_999`.
    pub designation: u32,
}

impl IsrcParts {
    /// Reassemble the groups into a code.
    pub fn to_code(&self) -> Result<IsrcCode, ValidationError> {
        IsrcCode::from_parts(&self.territory, &self.registrant, self.year, self.designation)
    }
}

/// Returns `true` iff `code` is a well-formed hyphenated ISRC.
///
/// Surrounding whitespace is ignored and letters may be in any case.
pub fn validate(code: &str) -> bool {
    IsrcCode::parse(code).is_ok()
}

/// Check that a territory is two ASCII letters.
pub fn validate_territory(territory: &str) -> Result<(), ValidationError> {
    if territory.len() == 2 && territory.bytes().all(|b| b.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidTerritory(territory.to_string()))
    }
}

/// Check that a registrant is three ASCII letters or digits.
pub fn validate_registrant(registrant: &str) -> Result<(), ValidationError> {
    if registrant.len() == 3 && registrant.bytes().all(|b| b.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidRegistrant(registrant.to_string()))
    }
}

fn all_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

fn digits_value(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'))
}

impl IsrcCode {
    /// Parse a hyphenated ISRC.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidIsrc`] unless the trimmed input has
    /// exactly four hyphen-delimited groups of widths 2, 3, 2 and 5 with the
    /// right character classes.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let groups: Vec<&str> = trimmed.split('-').collect();
        let [territory, registrant, year, designation] = groups.as_slice() else {
            return Err(ValidationError::InvalidIsrc(input.to_string()));
        };
        Self::from_groups(territory, registrant, year, designation)
            .ok_or_else(|| ValidationError::InvalidIsrc(input.to_string()))
    }

    /// Parse either the hyphenated or the 12-character compact form.
    pub fn parse_lenient(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.contains('-') {
            Self::parse(trimmed)
        } else {
            Self::from_compact(trimmed)
        }
    }

    /// Parse the compact form `TTRRRYYNNNNN`.
    pub fn from_compact(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.len() != COMPACT_LEN || !s.is_ascii() {
            return Err(ValidationError::InvalidIsrc(input.to_string()));
        }
        Self::from_groups(&s[0..2], &s[2..5], &s[5..7], &s[7..12])
            .ok_or_else(|| ValidationError::InvalidIsrc(input.to_string()))
    }

    /// Build a code from its numeric groups.
    ///
    /// # Errors
    ///
    /// Rejects a malformed territory or registrant, a year above 99, or a
    /// designation above [`DESIGNATION_MAX`].
    pub fn from_parts(
        territory: &str,
        registrant: &str,
        year: u8,
        designation: u32,
    ) -> Result<Self, ValidationError> {
        validate_territory(territory)?;
        validate_registrant(registrant)?;
        if year > 99 {
            return Err(ValidationError::InvalidYear(u32::from(year)));
        }
        if designation > DESIGNATION_MAX {
            return Err(ValidationError::InvalidDesignation(designation));
        }
        Ok(Self(format!(
            "{}-{}-{:02}-{:05}",
            territory.to_ascii_uppercase(),
            registrant.to_ascii_uppercase(),
            year,
            designation
        )))
    }

    fn from_groups(territory: &str, registrant: &str, year: &str, designation: &str) -> Option<Self> {
        validate_territory(territory).ok()?;
        validate_registrant(registrant).ok()?;
        if !all_digits(year, 2) || !all_digits(designation, 5) {
            return None;
        }
        Some(Self(format!(
            "{}-{}-{}-{}",
            territory.to_ascii_uppercase(),
            registrant.to_ascii_uppercase(),
            year,
            designation
        )))
    }

    /// The canonical hyphenated string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 12-character form without hyphens.
    pub fn to_compact(&self) -> String {
        self.0.chars().filter(|c| *c != '-').collect()
    }

    /// Territory group.
    pub fn territory(&self) -> &str {
        &self.0[0..2]
    }

    /// Registrant group.
    pub fn registrant(&self) -> &str {
        &self.0[3..6]
    }

    /// Two-digit year group as a number.
    pub fn year(&self) -> u8 {
        // Two ASCII digits, so the value is at most 99.
        digits_value(&self.0.as_bytes()[7..9]) as u8
    }

    /// Designation group as a number.
    pub fn designation(&self) -> u32 {
        digits_value(&self.0.as_bytes()[10..15])
    }

    /// Split into the four groups.
    pub fn parts(&self) -> IsrcParts {
        IsrcParts {
            territory: self.territory().to_string(),
            registrant: self.registrant().to_string(),
            year: self.year(),
            designation: self.designation(),
        }
    }
}

impl fmt::Display for IsrcCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for IsrcCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for IsrcCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IsrcCode> for String {
    fn from(code: IsrcCode) -> Self {
        code.0
    }
}

impl AsRef<str> for IsrcCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical() {
        let code = IsrcCode::parse("ZA-80G-25-00123").unwrap();
        assert_eq!(code.as_str(), "ZA-80G-25-00123");
        assert_eq!(code.territory(), "ZA");
        assert_eq!(code.registrant(), "80G");
        assert_eq!(code.year(), 25);
        assert_eq!(code.designation(), 123);
    }

    #[test]
    fn test_parse_normalises_case_and_whitespace() {
        let code = IsrcCode::parse("  za-80g-25-00123\n").unwrap();
        assert_eq!(code.as_str(), "ZA-80G-25-00123");
    }

    #[test]
    fn test_validate_rejects_wrong_group_count() {
        assert!(!validate("ZA-80G-25"));
        assert!(!validate("ZA-80G-25-00123-1"));
        assert!(!validate(""));
    }

    #[test]
    fn test_validate_rejects_wrong_widths() {
        assert!(!validate("ZAF-80G-25-00123"));
        assert!(!validate("ZA-80-25-00123"));
        assert!(!validate("ZA-80G-2025-00123"));
        assert!(!validate("ZA-80G-25-0123"));
        assert!(!validate("ZA-80G-25-000123"));
    }

    #[test]
    fn test_validate_rejects_wrong_classes() {
        assert!(!validate("Z1-80G-25-00123"));
        assert!(!validate("ZA-8_G-25-00123"));
        assert!(!validate("ZA-80G-2A-00123"));
        assert!(!validate("ZA-80G-25-0012X"));
    }

    #[test]
    fn test_validate_rejects_non_ascii() {
        assert!(!validate("ZÄ-80G-25-00123"));
    }

    #[test]
    fn test_compact_form() {
        let code = IsrcCode::parse("ZA-80G-25-00123").unwrap();
        assert_eq!(code.to_compact(), "ZA80G2500123");
        assert_eq!(IsrcCode::from_compact("za80g2500123").unwrap(), code);
    }

    #[test]
    fn test_compact_rejected_by_strict_parse() {
        assert!(IsrcCode::parse("ZA80G2500123").is_err());
        assert!(IsrcCode::parse_lenient("ZA80G2500123").is_ok());
        assert!(IsrcCode::parse_lenient("ZA-80G-25-00123").is_ok());
        assert!(IsrcCode::parse_lenient("ZA80G25001").is_err());
    }

    #[test]
    fn test_from_parts_zero_pads() {
        let code = IsrcCode::from_parts("za", "80g", 5, 1).unwrap();
        assert_eq!(code.as_str(), "ZA-80G-05-00001");
    }

    #[test]
    fn test_from_parts_boundaries() {
        assert!(IsrcCode::from_parts("ZA", "80G", 99, DESIGNATION_MAX).is_ok());
        assert_eq!(
            IsrcCode::from_parts("ZA", "80G", 25, 100_000),
            Err(ValidationError::InvalidDesignation(100_000))
        );
        assert_eq!(
            IsrcCode::from_parts("ZA", "80G", 100, 1),
            Err(ValidationError::InvalidYear(100))
        );
        assert!(matches!(
            IsrcCode::from_parts("ZAF", "80G", 25, 1),
            Err(ValidationError::InvalidTerritory(_))
        ));
        assert!(matches!(
            IsrcCode::from_parts("ZA", "8G", 25, 1),
            Err(ValidationError::InvalidRegistrant(_))
        ));
    }

    #[test]
    fn test_parts_roundtrip() {
        let code = IsrcCode::parse("US-RC1-76-07839").unwrap();
        assert_eq!(code.parts().to_code().unwrap(), code);
    }

    #[test]
    fn test_serde_as_string() {
        let code = IsrcCode::parse("ZA-80G-25-00123").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"ZA-80G-25-00123\"");
        let back: IsrcCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
        assert!(serde_json::from_str::<IsrcCode>("\"nope\"").is_err());
    }

    #[test]
    fn test_ordering_follows_designation() {
        let a = IsrcCode::from_parts("ZA", "80G", 25, 200).unwrap();
        let b = IsrcCode::from_parts("ZA", "80G", 25, 1_000).unwrap();
        assert!(a < b);
    }
}
