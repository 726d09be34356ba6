//! End-to-end registry scenarios over the public API.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use isrc_core::{validate, Timestamp};
use isrc_registry::{
    FileStore, MemoryStore, RangeAllocator, Registry, RegistryConfig, RegistryError, RegistryStore,
};

fn june(year: i32) -> Timestamp {
    Timestamp::from_utc(Utc.with_ymd_and_hms(year, 6, 1, 0, 0, 0).unwrap())
}

fn salted(salt: &str) -> RegistryConfig {
    RegistryConfig {
        salt: salt.to_string(),
        ..RegistryConfig::default()
    }
}

#[tokio::test]
async fn test_three_codes_then_mark_second_used() {
    let store: Arc<dyn RegistryStore> = Arc::new(MemoryStore::new());
    let expected = RangeAllocator::new("x", 90).range_for(Some("user-42"));

    let mut registry = Registry::open_at(salted("x"), store, Some("user-42"), june(2025))
        .await
        .unwrap();
    assert_eq!(registry.range(), &expected);

    let mut codes = Vec::new();
    for title in ["A", "B", "C"] {
        codes.push(registry.generate(title, "Artist").await.unwrap());
    }
    for (i, code) in codes.iter().enumerate() {
        assert!(validate(code.as_str()));
        assert_eq!(code.designation(), expected.start + i as u32);
        assert!(expected.contains(code.designation()));
    }

    assert!(registry.mark_used(&codes[1], None).await);
    let summary = registry.summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.used, 1);
    assert_eq!(summary.available, 2);
    assert_eq!(summary.year, "25");
}

#[tokio::test]
async fn test_full_range_then_exhausted() {
    let store: Arc<dyn RegistryStore> = Arc::new(MemoryStore::new());
    let mut registry = Registry::open_at(salted("x"), store, Some("user-42"), june(2025))
        .await
        .unwrap();
    let range = registry.range().clone();

    for i in 0..range.capacity() {
        let code = registry.generate(&format!("Track {i}"), "Artist").await.unwrap();
        assert!(validate(code.as_str()));
    }
    assert_eq!(registry.summary().last_designation, range.end);

    let err = registry.generate("Overflow", "Artist").await.unwrap_err();
    assert!(matches!(err, RegistryError::RangeExhausted { .. }));
    assert_eq!(registry.summary().total, range.capacity() as usize);
}

#[tokio::test]
async fn test_file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn RegistryStore> = Arc::new(FileStore::new(dir.path()));

    let mut registry = Registry::open_at(salted("x"), Arc::clone(&store), Some("owner"), june(2025))
        .await
        .unwrap();
    let first = registry.generate_and_flush("A", "Artist").await.unwrap();
    drop(registry);

    let mut registry = Registry::open_at(salted("x"), store, Some("owner"), june(2025))
        .await
        .unwrap();
    assert!(registry.entry(&first).is_some());
    let second = registry.generate("B", "Artist").await.unwrap();
    assert_eq!(second.designation(), first.designation() + 1);
    registry.flush().await.unwrap();
}

#[tokio::test]
async fn test_every_bucket_start_and_end_validate() {
    for buckets in [1, 90, 99] {
        let allocator = RangeAllocator::new("salt", buckets);
        for owner in ["alice", "bob", "carol", "dave"] {
            let range = allocator.range_for(Some(owner));
            for designation in [range.start, range.end] {
                let code = isrc_core::IsrcCode::from_parts("ZA", "80G", 25, designation).unwrap();
                assert!(validate(code.as_str()));
            }
        }
    }
}
