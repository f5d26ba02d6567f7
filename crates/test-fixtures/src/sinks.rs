//! In-memory sinks that record what they receive.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use vigil_core::errors::{StorageError, VigilResult};
use vigil_core::models::{EventRecord, HallucinationAssessment, StoredEntry};
use vigil_core::traits::{IEventObserver, IRecordSink, IReviewIntake};

/// Keeps every submitted entry in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<StoredEntry>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<StoredEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<EventRecord> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                StoredEntry::Event(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IRecordSink for RecordingSink {
    fn submit(&self, entry: StoredEntry) -> VigilResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}

/// Rejects every submission as if the queue were full.
#[derive(Debug, Default)]
pub struct FailingSink {
    pub attempts: AtomicU64,
}

impl IRecordSink for FailingSink {
    fn submit(&self, _entry: StoredEntry) -> VigilResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::WriteQueueFull { capacity: 0 }.into())
    }
}

/// Counts observations.
#[derive(Debug, Default)]
pub struct CountingObserver {
    pub events: AtomicU64,
    pub assessments: AtomicU64,
}

impl IEventObserver for CountingObserver {
    fn observe(&self, _record: &EventRecord) -> VigilResult<()> {
        self.events.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn observe_assessment(&self, _a: &HallucinationAssessment) -> VigilResult<()> {
        self.assessments.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Remembers which assessments were handed to review.
#[derive(Debug, Default)]
pub struct RecordingIntake {
    pub received: Mutex<Vec<String>>,
}

impl IReviewIntake for RecordingIntake {
    fn enqueue(&self, assessment: &HallucinationAssessment) -> VigilResult<String> {
        self.received
            .lock()
            .unwrap()
            .push(assessment.assessment_id.clone());
        Ok(format!("item-{}", assessment.assessment_id))
    }
}
