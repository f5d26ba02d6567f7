//! [`EventLogger`]: validate, hash, sequence, emit.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use vigil_core::config::LoggerConfig;
use vigil_core::constants::MAX_SESSION_ID_LEN;
use vigil_core::errors::{VigilError, VigilResult};
use vigil_core::models::{ContentHash, EventRecord, Stage, StageMetadata, StoredEntry};
use vigil_core::traits::{IEventObserver, IRecordSink};
use vigil_observability::record_span;

use crate::fallback::{FallbackChannel, FallbackReason};
use crate::input::EventInput;
use crate::recorder::SessionRecorder;
use crate::sessions::{SessionState, SessionTable};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoggerStats {
    pub recorded: u64,
    pub validation_failures: u64,
    pub sink_failures: u64,
    pub observer_failures: u64,
    pub active_sessions: u64,
    pub fallback_entries: u64,
}

pub struct EventLogger {
    config: LoggerConfig,
    sessions: SessionTable,
    fallback: FallbackChannel,
    sink: Arc<dyn IRecordSink>,
    observer: Arc<dyn IEventObserver>,
    capture_seq: AtomicU64,
    recorded: AtomicU64,
    validation_failures: AtomicU64,
    sink_failures: AtomicU64,
    observer_failures: AtomicU64,
}

impl EventLogger {
    pub fn new(config: &LoggerConfig, sink: Arc<dyn IRecordSink>, observer: Arc<dyn IEventObserver>) -> Self {
        Self {
            config: config.clone(),
            sessions: SessionTable::new(),
            fallback: FallbackChannel::new(config.fallback_ring_capacity),
            sink,
            observer,
            capture_seq: AtomicU64::new(0),
            recorded: AtomicU64::new(0),
            validation_failures: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            observer_failures: AtomicU64::new(0),
        }
    }

    /// Record one lifecycle event and return its id.
    ///
    /// Fails only on invalid input, before any side effect other than the
    /// fallback entry describing the rejection. Sink and observer failures
    /// are absorbed.
    pub fn record(&self, input: EventInput<'_>) -> VigilResult<String> {
        self.record_event(input).map(|record| record.event_id)
    }

    /// Like [`record`](Self::record), returning the full record.
    pub fn record_event(&self, input: EventInput<'_>) -> VigilResult<EventRecord> {
        let _span = record_span!(input.stage, input.session_id).entered();

        self.validate(&input)?;
        let content_hash = input.payload.map(ContentHash::of);
        let event_id = uuid::Uuid::new_v4().to_string();

        let record = {
            let mut state = match self.sessions.map().entry(input.session_id.to_string()) {
                Entry::Occupied(occupied) => occupied.into_ref(),
                Entry::Vacant(_) if input.stage == Stage::Response => {
                    return Err(self.reject(&input, "response without a prior query in this session"));
                }
                Entry::Vacant(vacant) => vacant.insert(SessionState::new()),
            };

            let query_event_id = match input.stage {
                Stage::Query => {
                    state.query_event_id = Some(event_id.clone());
                    None
                }
                Stage::Response if state.query_event_id.is_none() => {
                    drop(state);
                    return Err(self.reject(&input, "response without a prior query in this session"));
                }
                _ => state.query_event_id.clone(),
            };

            let record = EventRecord {
                event_id,
                session_id: input.session_id.to_string(),
                stage: input.stage,
                sequence: state.advance(input.stage),
                capture_seq: self.capture_seq.fetch_add(1, Ordering::SeqCst),
                timestamp: Utc::now(),
                content_hash,
                latency_ms: input.latency_ms,
                query_event_id,
                metadata: input.metadata,
            };

            // Submitted under the session lock so the durable order matches
            // the sequence order. `submit` never blocks.
            if let Err(e) = self.sink.submit(StoredEntry::Event(record.clone())) {
                self.sink_failures.fetch_add(1, Ordering::Relaxed);
                self.fallback.record(
                    FallbackReason::SinkFailed,
                    Some(record.stage),
                    Some(&record.session_id),
                    e.to_string(),
                );
            }
            record
        };

        if let Err(e) = self.observer.observe(&record) {
            self.observer_failures.fetch_add(1, Ordering::Relaxed);
            self.fallback.record(
                FallbackReason::ObserverFailed,
                Some(record.stage),
                Some(&record.session_id),
                e.to_string(),
            );
        }

        self.recorded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            event = "event_recorded",
            event_id = %record.event_id,
            stage = %record.stage,
            sequence = record.sequence,
            "event recorded"
        );
        Ok(record)
    }

    /// Like [`record`](Self::record) for callers holding a stage name.
    pub fn record_named(
        &self,
        stage_name: &str,
        session_id: &str,
        metadata: StageMetadata,
    ) -> VigilResult<String> {
        let stage = match stage_name.parse::<Stage>() {
            Ok(stage) => stage,
            Err(e) => {
                self.validation_failures.fetch_add(1, Ordering::Relaxed);
                self.fallback
                    .record(FallbackReason::Validation, None, Some(session_id), e.to_string());
                return Err(e);
            }
        };
        self.record(EventInput::new(stage, session_id, metadata))
    }

    /// A handle recording events for one session.
    pub fn session<'a>(&'a self, session_id: &'a str) -> SessionRecorder<'a> {
        SessionRecorder::new(self, session_id)
    }

    fn validate(&self, input: &EventInput<'_>) -> VigilResult<()> {
        if input.session_id.trim().is_empty() {
            return Err(self.reject(input, "session_id must not be empty"));
        }
        if input.session_id.len() > MAX_SESSION_ID_LEN {
            return Err(self.reject(input, "session_id is too long"));
        }
        if input.metadata.stage() != input.stage {
            let reason = format!(
                "{} metadata does not belong to a {} event",
                input.metadata.stage(),
                input.stage
            );
            return Err(self.reject(input, &reason));
        }
        Ok(())
    }

    fn reject(&self, input: &EventInput<'_>, reason: &str) -> VigilError {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
        self.fallback.record(
            FallbackReason::Validation,
            Some(input.stage),
            Some(input.session_id),
            reason.to_string(),
        );
        VigilError::validation(reason)
    }

    /// Drop sessions idle beyond `session_idle_secs`.
    pub fn purge_idle_sessions(&self) -> usize {
        self.purge_sessions_idle_for(Duration::from_secs(self.config.session_idle_secs))
    }

    pub fn purge_sessions_idle_for(&self, idle: Duration) -> usize {
        let purged = self.sessions.purge_idle(idle, Instant::now());
        if purged > 0 {
            tracing::debug!(event = "sessions_purged", purged = purged, "idle sessions purged");
        }
        purged
    }

    pub fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    pub fn fallback(&self) -> &FallbackChannel {
        &self.fallback
    }

    pub fn stats(&self) -> LoggerStats {
        LoggerStats {
            recorded: self.recorded.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
            observer_failures: self.observer_failures.load(Ordering::Relaxed),
            active_sessions: self.sessions.len() as u64,
            fallback_entries: self.fallback.count(),
        }
    }
}
