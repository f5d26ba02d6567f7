//! Retention tiers, audit trail and aggregate pruning.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tempfile::TempDir;
use test_fixtures::builders::session_chain;
use vigil_core::config::StorageConfig;
use vigil_core::constants::SYSTEM_SESSION_ID;
use vigil_core::models::{Stage, StageMetadata, StoredEntry};
use vigil_storage::retention::RetentionTier;
use vigil_storage::{RecordFilter, RetentionPolicy, SecureLogStore, StaticKey, StoreKey, TimeRange};

fn open(dir: &TempDir) -> SecureLogStore {
    let config = StorageConfig {
        dir: dir.path().to_string_lossy().into_owned(),
        ..StorageConfig::default()
    };
    SecureLogStore::open(&config, Arc::new(StaticKey::new(StoreKey::generate()))).unwrap()
}

#[test]
fn fresh_segments_survive_retention() {
    let dir = TempDir::new().unwrap();
    let mut store = open(&dir);
    for record in session_chain("sess-fresh") {
        store.append(StoredEntry::Event(record)).unwrap();
    }
    store.rotate().unwrap();

    let report = store.apply_retention(&RetentionPolicy::default()).unwrap();
    assert!(report.purged.is_empty());
    assert_eq!(store.stats().unwrap().entries, 4);
}

#[test]
fn expired_raw_segment_is_purged_and_audited() {
    let dir = TempDir::new().unwrap();
    let mut store = open(&dir);
    for record in session_chain("sess-old") {
        store.append(StoredEntry::Event(record)).unwrap();
    }
    store.rotate().unwrap();

    let later = Utc::now() + Duration::days(31);
    let report = store
        .apply_retention_at(&RetentionPolicy::default(), later)
        .unwrap();
    assert_eq!(report.purged.len(), 1);
    assert_eq!(report.purged[0].tier, RetentionTier::Raw);
    assert_eq!(report.entries_deleted, 4);
    assert_eq!(store.retention_log_len().unwrap(), 1);

    let old = store
        .query(&RecordFilter::session("sess-old"), &TimeRange::all())
        .unwrap();
    assert!(old.is_empty());

    let audit = store
        .query(&RecordFilter::session(SYSTEM_SESSION_ID), &TimeRange::all())
        .unwrap();
    assert_eq!(audit.len(), 1);
    let StoredEntry::Event(record) = &audit[0] else {
        panic!("expected an event");
    };
    assert_eq!(record.stage, Stage::Security);
    assert!(matches!(
        &record.metadata,
        StageMetadata::Security { action, .. } if action == "retention_purge"
    ));
}

#[test]
fn compressed_segments_outlive_raw_tier() {
    let dir = TempDir::new().unwrap();
    let mut store = open(&dir);
    for record in session_chain("sess-cold") {
        store.append(StoredEntry::Event(record)).unwrap();
    }
    store.rotate().unwrap();
    store.compact().unwrap();

    let policy = RetentionPolicy::default();
    let report = store
        .apply_retention_at(&policy, Utc::now() + Duration::days(45))
        .unwrap();
    assert!(report.purged.is_empty());

    let report = store
        .apply_retention_at(&policy, Utc::now() + Duration::days(91))
        .unwrap();
    assert_eq!(report.purged.len(), 1);
    assert_eq!(report.purged[0].tier, RetentionTier::Compressed);
}

#[test]
fn active_segment_is_never_purged() {
    let dir = TempDir::new().unwrap();
    let mut store = open(&dir);
    for record in session_chain("sess-active") {
        store.append(StoredEntry::Event(record)).unwrap();
    }

    let report = store
        .apply_retention_at(&RetentionPolicy::default(), Utc::now() + Duration::days(400))
        .unwrap();
    assert!(report.purged.is_empty());
    assert_eq!(
        store
            .query(&RecordFilter::session("sess-active"), &TimeRange::all())
            .unwrap()
            .len(),
        4
    );
}

#[test]
fn old_aggregates_are_pruned() {
    let dir = TempDir::new().unwrap();
    let mut store = open(&dir);
    for record in session_chain("sess-agg") {
        store.append(StoredEntry::Event(record)).unwrap();
    }

    let report = store
        .apply_retention_at(&RetentionPolicy::default(), Utc::now() + Duration::days(400))
        .unwrap();
    assert!(report.aggregates_pruned > 0);
    assert!(store.daily_aggregates("1970-01-01").unwrap().is_empty());
}
