//! # Registry State
//!
//! The persisted document behind a [`Registry`](crate::Registry). It is
//! always saved whole; there is no partial-field persistence.

use std::collections::BTreeMap;

use isrc_core::{IsrcCode, Timestamp};
use serde::{Deserialize, Serialize};

use crate::range::AllocationRange;

/// Bookkeeping for one issued code.
///
/// Created at generation time, flipped to `used` once by a downstream
/// consumer, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Sanitised track title.
    pub track_title: String,
    /// Sanitised owner (artist) name.
    pub owner_name: String,
    /// When the code was issued.
    pub generated_at: Timestamp,
    /// Whether the code has been consumed.
    pub used: bool,
    /// When the code was marked used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_at: Option<Timestamp>,
    /// Free-form context supplied by the consumer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

/// One owner's registry for one calendar year.
///
/// `last_designation` sits at `range.start - 1` right after (re)initialisation,
/// so the next issued designation is `range.start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryState {
    /// Two-digit year the counter belongs to.
    pub year: String,
    /// Most recently issued designation.
    pub last_designation: u32,
    /// The owner's designation block.
    pub range: AllocationRange,
    /// Every code issued, keyed by code.
    #[serde(default)]
    pub codes: BTreeMap<IsrcCode, RegistryEntry>,
}

impl RegistryState {
    /// An empty state for `year` and `range`.
    pub fn fresh(year: impl Into<String>, range: AllocationRange) -> Self {
        Self {
            year: year.into(),
            last_designation: range.start.saturating_sub(1),
            range,
            codes: BTreeMap::new(),
        }
    }

    /// Restart the counter for a new year or range, keeping issued codes.
    pub fn reset(&mut self, year: impl Into<String>, range: AllocationRange) {
        self.year = year.into();
        self.last_designation = range.start.saturating_sub(1);
        self.range = range;
    }

    /// Aggregate counts over the issued codes.
    pub fn summary(&self) -> RegistrySummary {
        let used = self.codes.values().filter(|e| e.used).count();
        RegistrySummary {
            total: self.codes.len(),
            used,
            available: self.codes.len() - used,
            year: self.year.clone(),
            last_designation: self.last_designation,
        }
    }
}

/// Read-only aggregate returned by [`Registry::summary()`](crate::Registry::summary).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySummary {
    /// Codes issued.
    pub total: usize,
    /// Codes marked used.
    pub used: usize,
    /// Codes issued but not yet used.
    pub available: usize,
    /// Current two-digit year.
    pub year: String,
    /// Most recently issued designation.
    pub last_designation: u32,
}
