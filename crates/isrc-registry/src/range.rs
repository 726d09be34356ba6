//! # Designation Range Allocation
//!
//! Partitions the five-digit designation space into fixed 1000-code blocks
//! and assigns each owner one block, deterministically, without any central
//! coordination:
//!
//! ```text
//! digest      = SHA-256(owner_key ++ salt)
//! range_index = u32_be(digest[0..4]) mod buckets
//! start       = 200 + range_index * 1000
//! end         = start + 999
//! ```
//!
//! Designations `1..=199` are reserved. The same owner key always maps to
//! the same block, so no range table has to be persisted. When no owner
//! identity is available the allocator degrades to the fixed default block
//! `200..=1199`.
//!
//! Distinct owners may hash to the same bucket. Nothing here detects or
//! resolves that; the collision probability grows quickly with the number
//! of owners relative to [`RangeAllocator::buckets()`].

use isrc_core::{sha256_digest, DESIGNATION_MAX};
use serde::{Deserialize, Serialize};

use crate::config::RegistryConfig;

/// First designation of bucket 0.
pub const RANGE_BASE: u32 = 200;

/// Designations per bucket.
pub const RANGE_SIZE: u32 = 1_000;

/// Largest bucket count whose last block still fits five digits.
pub const MAX_BUCKETS: u32 = (DESIGNATION_MAX + 1 - RANGE_BASE) / RANGE_SIZE;

/// Owner key recorded on the degraded-mode range.
pub const DEFAULT_OWNER_KEY: &str = "default";

/// A contiguous block of designations assigned to one owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllocationRange {
    /// First designation, inclusive.
    pub start: u32,
    /// Last designation, inclusive.
    pub end: u32,
    /// The owner key the block was derived from.
    pub owner_key: String,
    /// Bucket number.
    pub range_index: u32,
}

impl AllocationRange {
    /// The block for bucket `range_index`.
    pub fn for_index(owner_key: impl Into<String>, range_index: u32) -> Self {
        let start = RANGE_BASE + range_index * RANGE_SIZE;
        Self {
            start,
            end: start + RANGE_SIZE - 1,
            owner_key: owner_key.into(),
            range_index,
        }
    }

    /// The degraded-mode block `200..=1199`.
    pub fn fallback() -> Self {
        Self::for_index(DEFAULT_OWNER_KEY, 0)
    }

    /// Number of designations in the block.
    pub fn capacity(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Whether `designation` lies inside the block.
    pub fn contains(&self, designation: u32) -> bool {
        (self.start..=self.end).contains(&designation)
    }

    /// Whether two blocks share any designation.
    pub fn overlaps(&self, other: &AllocationRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Maps owner keys to designation blocks.
#[derive(Debug, Clone)]
pub struct RangeAllocator {
    salt: String,
    buckets: u32,
}

impl RangeAllocator {
    /// Create an allocator. `buckets` is clamped to `1..=MAX_BUCKETS`.
    pub fn new(salt: impl Into<String>, buckets: u32) -> Self {
        Self {
            salt: salt.into(),
            buckets: buckets.clamp(1, MAX_BUCKETS),
        }
    }

    /// Create an allocator from registry configuration.
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(config.salt.clone(), config.buckets)
    }

    /// Number of buckets in use.
    pub fn buckets(&self) -> u32 {
        self.buckets
    }

    /// Bucket number for an owner key.
    pub fn index_for(&self, owner_key: &str) -> u32 {
        let digest = sha256_digest(format!("{owner_key}{}", self.salt).as_bytes());
        digest.prefix_u32() % self.buckets
    }

    /// The block for `owner_key`, or the default block if there is no
    /// usable owner identity.
    pub fn range_for(&self, owner_key: Option<&str>) -> AllocationRange {
        match owner_key.filter(|key| !key.trim().is_empty()) {
            Some(key) => {
                let range = AllocationRange::for_index(key, self.index_for(key));
                tracing::debug!(
                    range_index = range.range_index,
                    start = range.start,
                    end = range.end,
                    "computed designation range"
                );
                range
            }
            None => {
                tracing::warn!("no owner identity available; using default designation range");
                AllocationRange::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isrc_core::IsrcCode;

    #[test]
    fn test_max_buckets_fits_five_digits() {
        assert_eq!(MAX_BUCKETS, 99);
        let last = AllocationRange::for_index("k", MAX_BUCKETS - 1);
        assert!(last.end <= DESIGNATION_MAX);
        let beyond = AllocationRange::for_index("k", MAX_BUCKETS);
        assert!(beyond.end > DESIGNATION_MAX);
    }

    #[test]
    fn test_range_matches_digest_formula() {
        let allocator = RangeAllocator::new("x", 90);
        let expected = sha256_digest(b"user-42x").prefix_u32() % 90;
        let range = allocator.range_for(Some("user-42"));
        assert_eq!(range.range_index, expected);
        assert_eq!(range.start, 200 + expected * 1000);
        assert_eq!(range.end, range.start + 999);
        assert_eq!(range.owner_key, "user-42");
    }

    #[test]
    fn test_deterministic() {
        let allocator = RangeAllocator::new("salt", 90);
        assert_eq!(allocator.range_for(Some("alice")), allocator.range_for(Some("alice")));
    }

    #[test]
    fn test_salt_changes_assignment_input() {
        let a = RangeAllocator::new("one", 99);
        let b = RangeAllocator::new("two", 99);
        let differs = (0..50)
            .map(|i| format!("owner-{i}"))
            .any(|k| a.index_for(&k) != b.index_for(&k));
        assert!(differs);
    }

    #[test]
    fn test_fallback_without_identity() {
        let allocator = RangeAllocator::new("salt", 90);
        for key in [None, Some(""), Some("   ")] {
            let range = allocator.range_for(key);
            assert_eq!(range, AllocationRange::fallback());
            assert_eq!((range.start, range.end), (200, 1199));
        }
    }

    #[test]
    fn test_distinct_indices_do_not_overlap() {
        for i in 0..MAX_BUCKETS {
            let a = AllocationRange::for_index("a", i);
            assert!(a.overlaps(&a));
            for j in (i + 1)..MAX_BUCKETS {
                let b = AllocationRange::for_index("b", j);
                assert!(!a.overlaps(&b), "buckets {i} and {j} overlap");
            }
        }
    }

    #[test]
    fn test_every_bucket_yields_valid_codes() {
        for i in 0..MAX_BUCKETS {
            let range = AllocationRange::for_index("k", i);
            assert_eq!(range.capacity(), 1000);
            for d in [range.start, range.end] {
                let code = IsrcCode::from_parts("ZA", "80G", 25, d).unwrap();
                assert!(isrc_core::validate(code.as_str()));
            }
        }
    }

    #[test]
    fn test_bucket_count_is_clamped() {
        assert_eq!(RangeAllocator::new("s", 900).buckets(), MAX_BUCKETS);
        assert_eq!(RangeAllocator::new("s", 0).buckets(), 1);
    }

    #[test]
    fn test_contains() {
        let range = AllocationRange::fallback();
        assert!(range.contains(200));
        assert!(range.contains(1199));
        assert!(!range.contains(199));
        assert!(!range.contains(1200));
    }
}
