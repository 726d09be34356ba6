//! # isrc-registry — ISRC Allocation
//!
//! Issues sequential ISRC codes for an owner without any central
//! coordination.
//!
//! ## Components
//!
//! - [`RangeAllocator`]: hashes an owner key into one fixed block of 1000
//!   designations. Same key, same block; no range table is stored.
//! - [`Registry`]: the yearly counter inside that block, with used/unused
//!   bookkeeping for every code issued.
//! - [`RegistryStore`]: the persistence seam. [`MemoryStore`] and
//!   [`FileStore`] are provided.
//! - [`RegistryConfig`]: territory, registrant, salt and bucket count,
//!   loadable from YAML.
//!
//! ## Errors
//!
//! Only range exhaustion and persistence failures surface to callers.
//! A missing owner identity falls back to the default block; an unknown
//! code passed to [`Registry::mark_used()`] is a no-op.

pub mod config;
pub mod error;
pub mod range;
pub mod registry;
pub mod sanitize;
pub mod state;
pub mod store;

pub use config::RegistryConfig;
pub use error::{ConfigError, RegistryError, StoreError};
pub use range::{AllocationRange, RangeAllocator};
pub use registry::{Registry, SharedRegistry};
pub use state::{RegistryEntry, RegistryState, RegistrySummary};
pub use store::{FileStore, MemoryStore, RegistryStore};
