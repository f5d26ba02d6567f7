//! Key revocation: buffering, ordered flush and loss accounting.

use std::sync::Arc;

use tempfile::TempDir;
use test_fixtures::builders::event;
use vigil_core::config::StorageConfig;
use vigil_core::errors::StorageError;
use vigil_core::models::{Stage, StoredEntry};
use vigil_storage::{RecordFilter, SecureLogStore, StoreKey, SwappableKey, TimeRange};

fn setup(buffer: usize) -> (TempDir, Arc<SwappableKey>, StoreKey, SecureLogStore) {
    let dir = TempDir::new().unwrap();
    let key = StoreKey::generate();
    let provider = Arc::new(SwappableKey::new(key.clone()));
    let config = StorageConfig {
        dir: dir.path().to_string_lossy().into_owned(),
        degraded_buffer_capacity: buffer,
        ..StorageConfig::default()
    };
    let store = SecureLogStore::open(&config, provider.clone()).unwrap();
    (dir, provider, key, store)
}

#[test]
fn revoked_key_buffers_then_flushes_in_order() {
    let (_dir, provider, key, mut store) = setup(8);
    let records: Vec<_> = (0..4).map(|i| event("sess-deg", Stage::Security, i)).collect();

    store.append(StoredEntry::Event(records[0].clone())).unwrap();
    provider.revoke();
    for record in &records[1..3] {
        let err = store.append(StoredEntry::Event(record.clone())).unwrap_err();
        assert!(matches!(err, StorageError::EncryptionKeyUnavailable { buffered: true, .. }));
    }
    assert!(store.gauges().is_degraded());
    assert_eq!(store.degraded_len(), 2);
    assert_eq!(store.gauges().degraded_buffered(), 2);

    provider.restore(key);
    store.append(StoredEntry::Event(records[3].clone())).unwrap();
    assert!(!store.gauges().is_degraded());
    assert_eq!(store.degraded_len(), 0);

    let ids: Vec<String> = store
        .query(&RecordFilter::session("sess-deg"), &TimeRange::all())
        .unwrap()
        .iter()
        .map(|e| e.entry_id())
        .collect();
    let expected: Vec<String> = records.iter().map(|r| r.event_id.clone()).collect();
    assert_eq!(ids, expected);
}

#[test]
fn buffer_overflow_counts_lost_events() {
    let (_dir, provider, _key, mut store) = setup(2);
    provider.revoke();

    let mut outcomes = Vec::new();
    for i in 0..5 {
        let err = store
            .append(StoredEntry::Event(event("sess-overflow", Stage::Security, i)))
            .unwrap_err();
        match err {
            StorageError::EncryptionKeyUnavailable { buffered, .. } => outcomes.push(buffered),
            other => panic!("unexpected error {other:?}"),
        }
    }
    assert_eq!(outcomes, vec![true, true, false, false, false]);
    assert_eq!(store.gauges().lost_events(), 3);
    assert_eq!(store.stats().unwrap().lost_events, 3);
    assert_eq!(store.degraded_len(), 2);
}

#[test]
fn flush_degraded_waits_for_key() {
    let (_dir, provider, key, mut store) = setup(4);
    provider.revoke();
    let _ = store.append(StoredEntry::Event(event("sess-flush", Stage::Security, 0)));

    let err = store.flush_degraded().unwrap_err();
    assert!(matches!(err, StorageError::EncryptionKeyUnavailable { .. }));
    assert_eq!(store.degraded_len(), 1);

    provider.restore(key);
    assert_eq!(store.flush_degraded().unwrap(), 1);
    assert_eq!(store.flush_degraded().unwrap(), 0);
    assert_eq!(store.stats().unwrap().entries, 1);
}
