//! # Yearly Code Registry
//!
//! A [`Registry`] owns one [`RegistryState`]: the sequential designation
//! counter for the current year inside the owner's range, plus the
//! bookkeeping for every code it has issued.
//!
//! ## Lifecycle
//!
//! [`Registry::open()`] loads the persisted document and reinitialises the
//! counter to `range.start - 1` when there is no document, when its year is
//! not the current year, or when its range differs from the owner's range.
//! Previously issued codes are kept across a reset.
//!
//! ## Persistence
//!
//! Every mutation schedules a save of the whole document on the tokio
//! runtime and returns immediately. Saves are chained, so they land in
//! issue order, but a crash before a save completes loses the record of the
//! code (the code itself stays valid). Callers that need durability use
//! [`Registry::generate_and_flush()`] or [`Registry::flush()`].
//!
//! ## Concurrency
//!
//! Mutating operations take `&mut self`. Concurrent callers share a
//! [`SharedRegistry`], which serialises them. Two registries backed by the
//! same store are still last-write-wins.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use isrc_core::{IsrcCode, Timestamp, ValidationError};
use tokio::task::JoinHandle;

use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::range::{AllocationRange, RangeAllocator};
use crate::sanitize::sanitize_text;
use crate::state::{RegistryEntry, RegistryState, RegistrySummary};
use crate::store::RegistryStore;

/// A registry handle that can be shared between tasks.
pub type SharedRegistry = Arc<tokio::sync::Mutex<Registry>>;

/// Header row of [`Registry::export_csv()`].
pub const CSV_HEADER: &str = "ISRC,Track Title,Owner,Date Generated,Status,Used At";

/// Sequential ISRC issuer for one owner and one year.
pub struct Registry {
    config: RegistryConfig,
    store: Arc<dyn RegistryStore>,
    state: RegistryState,
    pending: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("save_pending", &self.pending.is_some())
            .finish()
    }
}

impl Registry {
    /// Load or initialise the registry for `owner_key` as of now.
    pub async fn open(
        config: RegistryConfig,
        store: Arc<dyn RegistryStore>,
        owner_key: Option<&str>,
    ) -> Result<Self, RegistryError> {
        Self::open_at(config, store, owner_key, Timestamp::now()).await
    }

    /// Load or initialise the registry for `owner_key` as of `now`.
    ///
    /// A document that cannot be read is treated as absent: the registry
    /// starts fresh and the next save replaces it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Config`] if `config` does not validate.
    pub async fn open_at(
        config: RegistryConfig,
        store: Arc<dyn RegistryStore>,
        owner_key: Option<&str>,
        now: Timestamp,
    ) -> Result<Self, RegistryError> {
        config.validate()?;
        let range = RangeAllocator::from_config(&config).range_for(owner_key);
        let year = now.year_suffix();

        let loaded = match store.load(&config.store_key).await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(error = %e, key = %config.store_key, "could not load registry; starting fresh");
                None
            }
        };

        let mut reset = false;
        let state = match loaded {
            None => {
                tracing::info!(year = %year, start = range.start, end = range.end, "initialised registry");
                RegistryState::fresh(year, range)
            }
            Some(mut state) if state.year != year || state.range != range => {
                tracing::info!(
                    from_year = %state.year,
                    to_year = %year,
                    start = range.start,
                    end = range.end,
                    "reset registry counter"
                );
                state.reset(year, range);
                reset = true;
                state
            }
            Some(mut state) => {
                let floor = state.range.start.saturating_sub(1);
                if state.last_designation < floor {
                    tracing::warn!(
                        last_designation = state.last_designation,
                        floor,
                        "counter below range; normalising"
                    );
                    state.last_designation = floor;
                }
                state
            }
        };

        let mut registry = Self {
            config,
            store,
            state,
            pending: None,
        };
        if reset {
            registry.schedule_save();
        }
        Ok(registry)
    }

    /// Wrap the registry in a [`SharedRegistry`].
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    /// The configuration the registry was opened with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The owner's designation range.
    pub fn range(&self) -> &AllocationRange {
        &self.state.range
    }

    /// The full in-memory state.
    pub fn state(&self) -> &RegistryState {
        &self.state
    }

    /// Bookkeeping for `code`, if it was issued by this registry.
    pub fn entry(&self, code: &IsrcCode) -> Option<&RegistryEntry> {
        self.state.codes.get(code)
    }

    // ─── Issuing ────────────────────────────────────────────────────

    /// Issue the next code and schedule a save.
    ///
    /// Returns before the save is confirmed.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::RangeExhausted`] when the owner's range has
    /// no designations left; the state is left untouched.
    pub async fn generate(&mut self, track_title: &str, owner_name: &str) -> Result<IsrcCode, RegistryError> {
        let code = self.issue(track_title, owner_name, Timestamp::now())?;
        self.schedule_save();
        Ok(code)
    }

    /// Issue the next code and wait until the state is persisted.
    ///
    /// # Errors
    ///
    /// As [`generate()`](Self::generate), plus [`RegistryError::Store`] if
    /// the save fails. The code stays recorded in memory in that case.
    pub async fn generate_and_flush(
        &mut self,
        track_title: &str,
        owner_name: &str,
    ) -> Result<IsrcCode, RegistryError> {
        let code = self.issue(track_title, owner_name, Timestamp::now())?;
        self.flush().await?;
        Ok(code)
    }

    /// The unused code already issued for this title and owner, or a new one.
    pub async fn obtain(&mut self, track_title: &str, owner_name: &str) -> Result<IsrcCode, RegistryError> {
        match self.find_unused_for(track_title, owner_name) {
            Some(code) => {
                tracing::debug!(code = %code, "reusing unused code");
                Ok(code)
            }
            None => self.generate(track_title, owner_name).await,
        }
    }

    fn issue(&mut self, track_title: &str, owner_name: &str, now: Timestamp) -> Result<IsrcCode, RegistryError> {
        let range = &self.state.range;
        let exhausted = || RegistryError::RangeExhausted {
            start: range.start,
            end: range.end,
            capacity: range.capacity(),
        };
        let year: u8 = self
            .state
            .year
            .parse()
            .map_err(|_| ValidationError::InvalidIsrc(format!("year group {:?}", self.state.year)))?;

        // Skip designations already on record, e.g. after switching back to
        // a range used earlier in the same year.
        let mut designation = self.state.last_designation.checked_add(1).ok_or_else(exhausted)?;
        let code = loop {
            if designation > range.end {
                return Err(exhausted());
            }
            let code = IsrcCode::from_parts(&self.config.territory, &self.config.registrant, year, designation)?;
            if !self.state.codes.contains_key(&code) {
                break code;
            }
            designation = designation.checked_add(1).ok_or_else(exhausted)?;
        };

        self.state.last_designation = designation;
        self.state.codes.insert(
            code.clone(),
            RegistryEntry {
                track_title: sanitize_text(track_title),
                owner_name: sanitize_text(owner_name),
                generated_at: now,
                used: false,
                used_at: None,
                context: None,
            },
        );
        tracing::info!(code = %code, designation, "issued ISRC");
        Ok(code)
    }

    // ─── Bookkeeping ────────────────────────────────────────────────

    /// Mark `code` as consumed and schedule a save.
    ///
    /// Returns `false`, without saving, if the registry never issued `code`.
    pub async fn mark_used(&mut self, code: &IsrcCode, context: Option<BTreeMap<String, String>>) -> bool {
        let Some(entry) = self.state.codes.get_mut(code) else {
            tracing::debug!(code = %code, "mark_used on unknown code ignored");
            return false;
        };
        entry.used = true;
        entry.used_at = Some(Timestamp::now());
        entry.context = context;
        tracing::info!(code = %code, "marked ISRC used");
        self.schedule_save();
        true
    }

    /// An unused code previously issued for this title and owner.
    ///
    /// Inputs are sanitised the same way stored values are. The lowest
    /// matching code wins.
    pub fn find_unused_for(&self, track_title: &str, owner_name: &str) -> Option<IsrcCode> {
        let title = sanitize_text(track_title);
        let owner = sanitize_text(owner_name);
        self.state
            .codes
            .iter()
            .find(|(_, e)| !e.used && e.track_title == title && e.owner_name == owner)
            .map(|(code, _)| code.clone())
    }

    /// Aggregate counts for the registry.
    pub fn summary(&self) -> RegistrySummary {
        self.state.summary()
    }

    /// Every issued code as CSV, one row per code in code order.
    pub fn export_csv(&self) -> String {
        let mut out = String::from(CSV_HEADER);
        out.push('\n');
        for (code, entry) in &self.state.codes {
            let _ = writeln!(
                out,
                "{},{},{},{},{},{}",
                code,
                csv_field(&entry.track_title),
                csv_field(&entry.owner_name),
                entry.generated_at,
                if entry.used { "Used" } else { "Available" },
                entry.used_at.map(|t| t.to_string()).unwrap_or_default(),
            );
        }
        out
    }

    // ─── Persistence ────────────────────────────────────────────────

    /// Wait for every scheduled save, then write the current state.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] if the final save fails.
    pub async fn flush(&mut self) -> Result<(), RegistryError> {
        if let Some(handle) = self.pending.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "scheduled registry save did not complete");
            }
        }
        self.store.save(&self.config.store_key, &self.state).await?;
        Ok(())
    }

    fn schedule_save(&mut self) {
        let previous = self.pending.take();
        let store = Arc::clone(&self.store);
        let key = self.config.store_key.clone();
        let snapshot = self.state.clone();
        self.pending = Some(tokio::spawn(async move {
            if let Some(previous) = previous {
                if let Err(e) = previous.await {
                    tracing::warn!(error = %e, "earlier registry save did not complete");
                }
            }
            if let Err(e) = store.save(&key, &snapshot).await {
                tracing::warn!(error = %e, key = %key, "registry save failed");
            }
        }));
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
