//! # Registry Persistence
//!
//! The registry persists its whole [`RegistryState`] under a single key on
//! every mutation. Backends implement [`RegistryStore`]; both operations
//! are asynchronous and give no ordering guarantee beyond last-write-wins.
//!
//! Two backends ship with the crate:
//!
//! - [`MemoryStore`]: process-local, cloneable, used by tests and embedders
//!   that bring their own durability.
//! - [`FileStore`]: one JSON document per key under a root directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::state::RegistryState;

/// Key-value persistence for registry documents.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Fetch the document stored under `key`, or `None` if there is none.
    async fn load(&self, key: &str) -> Result<Option<RegistryState>, StoreError>;

    /// Replace the document stored under `key`.
    async fn save(&self, key: &str, state: &RegistryState) -> Result<(), StoreError>;
}

// ─── Memory ─────────────────────────────────────────────────────────

/// Thread-safe, cloneable in-memory store.
///
/// The lock is never held across an `.await`, so a `parking_lot` lock is
/// sufficient. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<String, RegistryState>>>,
    saves: Arc<AtomicU64>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document without counting it as a save.
    pub fn insert(&self, key: impl Into<String>, state: RegistryState) -> Option<RegistryState> {
        self.data.write().insert(key.into(), state)
    }

    /// Synchronous snapshot of the document under `key`.
    pub fn get(&self, key: &str) -> Option<RegistryState> {
        self.data.read().get(key).cloned()
    }

    /// Number of completed [`RegistryStore::save`] calls.
    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RegistryStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<RegistryState>, StoreError> {
        Ok(self.get(key))
    }

    async fn save(&self, key: &str, state: &RegistryState) -> Result<(), StoreError> {
        self.data.write().insert(key.to_string(), state.clone());
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

// ─── Filesystem ─────────────────────────────────────────────────────

/// Stores each document as pretty-printed JSON at `<root>/<key>.json`.
///
/// Writes go to a hidden temporary sibling first and are renamed into
/// place, so a reader never observes a half-written document.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The document path for `key`. Characters outside `[A-Za-z0-9._-]`
    /// are replaced with `_` so a key can never escape the root.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let name = name.trim_start_matches('.');
        let name = if name.is_empty() { "_" } else { name };
        self.root.join(format!("{name}.json"))
    }
}

#[async_trait]
impl RegistryStore for FileStore {
    async fn load(&self, key: &str) -> Result<Option<RegistryState>, StoreError> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, key: &str, state: &RegistryState) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let json = serde_json::to_vec_pretty(state)?;
        tokio::fs::create_dir_all(&self.root).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = self.root.join(format!(".{file_name}.tmp"));
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::debug!(path = %path.display(), bytes = json.len(), "saved registry document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::AllocationRange;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.load("k").await.unwrap().is_none());
        let state = RegistryState::fresh("26", AllocationRange::fallback());
        store.save("k", &state).await.unwrap();
        assert_eq!(store.load("k").await.unwrap(), Some(state));
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_clones_share_data() {
        let a = MemoryStore::new();
        let b = a.clone();
        a.save("k", &RegistryState::fresh("26", AllocationRange::fallback()))
            .await
            .unwrap();
        assert!(b.get("k").is_some());
        assert_eq!(b.save_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_memory_store_counts_concurrent_saves() {
        let store = MemoryStore::new();
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let state = RegistryState::fresh("26", AllocationRange::fallback());
                    store.save(&format!("k{i}"), &state).await.unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.save_count(), 32);
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        assert!(store.load("isrc-registry").await.unwrap().is_none());

        let mut state = RegistryState::fresh("26", AllocationRange::for_index("user", 4));
        state.last_designation = 4_321;
        store.save("isrc-registry", &state).await.unwrap();

        let path = store.path_for("isrc-registry");
        assert!(path.exists());
        assert_eq!(store.load("isrc-registry").await.unwrap(), Some(state));
    }

    #[tokio::test]
    async fn test_file_store_rejects_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        std::fs::write(store.path_for("k"), b"{not json").unwrap();
        assert!(matches!(store.load("k").await, Err(StoreError::Json(_))));
    }

    #[test]
    fn test_path_for_stays_under_root() {
        let store = FileStore::new("/data");
        assert_eq!(store.path_for("isrc-registry"), PathBuf::from("/data/isrc-registry.json"));
        assert_eq!(store.path_for("../etc/passwd"), PathBuf::from("/data/_etc_passwd.json"));
        assert_eq!(store.path_for(""), PathBuf::from("/data/_.json"));
    }
}
