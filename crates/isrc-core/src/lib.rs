//! # isrc-core — Foundational Types for the ISRC Stack
//!
//! Every other crate in the workspace depends on `isrc-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrapper for the identifier.** `IsrcCode` can only be built
//!    through a validating constructor, so a value of that type is always in
//!    canonical `TT-RRR-YY-NNNNN` form. No bare strings for codes.
//!
//! 2. **UTC-only timestamps.** `Timestamp` is UTC with seconds precision and
//!    renders with a `Z` suffix, so persisted registry documents are stable.
//!
//! 3. **One digest path.** Range allocation hashes owner keys through
//!    [`sha256_digest()`] only.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `isrc-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod isrc;
pub mod temporal;

pub use digest::{sha256_digest, Sha256Digest};
pub use error::ValidationError;
pub use isrc::{validate, IsrcCode, IsrcParts, DESIGNATION_MAX};
pub use temporal::Timestamp;
