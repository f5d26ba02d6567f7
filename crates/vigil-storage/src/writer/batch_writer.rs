//! [`BatchWriter`]: bounded(capacity) queue drained by one thread.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use serde::Serialize;
use vigil_core::config::StorageConfig;
use vigil_core::errors::{StorageError, VigilResult};
use vigil_core::models::StoredEntry;
use vigil_core::traits::IRecordSink;

use super::commands::WriteCommand;
use crate::gauges::StoreGauges;
use crate::retention::RetentionPolicy;
use crate::store::SecureLogStore;

/// How long the writer blocks on an empty queue before re-checking shutdown.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Outcome of [`BatchWriter::shutdown`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShutdownReport {
    /// Appends written after shutdown was requested.
    pub drained: u64,
    /// Appends abandoned at the grace deadline or failed while draining.
    pub lost: u64,
}

/// State shared between handle and thread.
#[derive(Debug, Default)]
struct Shared {
    accepting: AtomicBool,
    stopping: AtomicBool,
    running: AtomicBool,
    deadline: Mutex<Option<Instant>>,
    drained: AtomicU64,
    lost_in_shutdown: AtomicU64,
}

impl Shared {
    fn past_deadline(&self) -> bool {
        let deadline = *self.deadline.lock().unwrap_or_else(|p| p.into_inner());
        deadline.is_some_and(|d| Instant::now() >= d)
    }
}

#[derive(Debug, Clone, Copy)]
struct RetryPolicy {
    attempts: u32,
    backoff: Duration,
}

pub struct BatchWriter {
    tx: Sender<WriteCommand>,
    shared: Arc<Shared>,
    gauges: Arc<StoreGauges>,
    capacity: usize,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl BatchWriter {
    /// Move `store` onto a new writer thread.
    pub fn spawn(store: SecureLogStore, config: &StorageConfig) -> Result<Self, StorageError> {
        let capacity = config.write_queue_capacity.max(1);
        let (tx, rx) = bounded(capacity);
        let shared = Arc::new(Shared::default());
        shared.accepting.store(true, Ordering::SeqCst);
        shared.running.store(true, Ordering::SeqCst);

        let gauges = store.gauges();
        let retry = RetryPolicy {
            attempts: config.append_retry_attempts,
            backoff: Duration::from_millis(config.append_retry_backoff_ms),
        };
        let policy = RetentionPolicy::from_config(config);
        let thread_shared = Arc::clone(&shared);

        let handle = std::thread::Builder::new()
            .name("vigil-writer".to_string())
            .spawn(move || {
                let mut worker = Worker {
                    store,
                    shared: thread_shared,
                    retry,
                    policy,
                };
                worker.run(&rx);
            })
            .map_err(|e| StorageError::io("spawn writer thread", e))?;

        tracing::info!(event = "writer_started", capacity = capacity, "batch writer started");
        Ok(Self {
            tx,
            shared,
            gauges,
            capacity,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Enqueue an append without blocking. A full queue or a stopped writer
    /// drops the entry and counts it lost.
    pub fn submit_entry(&self, entry: StoredEntry) -> Result<(), StorageError> {
        if !self.shared.accepting.load(Ordering::SeqCst) {
            self.gauges.add_lost(1);
            return Err(StorageError::WriterClosed);
        }
        match self.tx.try_send(WriteCommand::Append(entry)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(cmd)) => {
                self.gauges.add_lost(1);
                tracing::warn!(
                    event = "write_queue_full",
                    command = cmd.name(),
                    capacity = self.capacity,
                    "write queue full, entry dropped"
                );
                Err(StorageError::WriteQueueFull {
                    capacity: self.capacity,
                })
            }
            Err(TrySendError::Disconnected(_)) => {
                self.gauges.add_lost(1);
                Err(StorageError::WriterClosed)
            }
        }
    }

    /// Enqueue a maintenance command. Skipped when the queue is full; the
    /// next tick sends it again.
    pub fn send_maintenance(&self, cmd: WriteCommand) -> bool {
        if !self.shared.accepting.load(Ordering::SeqCst) {
            return false;
        }
        match self.tx.try_send(cmd) {
            Ok(()) => true,
            Err(TrySendError::Full(cmd)) => {
                tracing::warn!(event = "maintenance_skipped", command = cmd.name(), "write queue full");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Wait until everything queued so far has been handled.
    pub fn flush(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let (done_tx, done_rx) = bounded(1);
        if self.tx.send_timeout(WriteCommand::Barrier(done_tx), timeout).is_err() {
            return false;
        }
        done_rx
            .recv_timeout(deadline.saturating_duration_since(Instant::now()))
            .is_ok()
    }

    pub fn gauges(&self) -> Arc<StoreGauges> {
        Arc::clone(&self.gauges)
    }

    pub fn queue_len(&self) -> usize {
        self.tx.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Stop intake, drain queued work until `grace` elapses, then seal the
    /// active segment. Anything still queued at the deadline is counted in
    /// `lost_events`.
    pub fn shutdown(&self, grace: Duration) -> ShutdownReport {
        let Some(handle) = self.handle.lock().unwrap_or_else(|p| p.into_inner()).take() else {
            return ShutdownReport::default();
        };

        self.shared.accepting.store(false, Ordering::SeqCst);
        *self.shared.deadline.lock().unwrap_or_else(|p| p.into_inner()) = Some(Instant::now() + grace);
        self.shared.stopping.store(true, Ordering::SeqCst);
        let queued = self.tx.len();
        // A full queue is fine: the writer stops once it is empty.
        let _ = self.tx.try_send(WriteCommand::Shutdown);

        if handle.join().is_err() {
            tracing::error!(event = "writer_panicked", "writer thread panicked during shutdown");
            self.gauges.add_lost(queued as u64);
            return ShutdownReport {
                drained: 0,
                lost: queued as u64,
            };
        }

        let report = ShutdownReport {
            drained: self.shared.drained.load(Ordering::SeqCst),
            lost: self.shared.lost_in_shutdown.load(Ordering::SeqCst),
        };
        tracing::info!(
            event = "writer_stopped",
            drained = report.drained,
            lost = report.lost,
            "batch writer stopped"
        );
        report
    }
}

impl Drop for BatchWriter {
    fn drop(&mut self) {
        if self.is_running() {
            self.shutdown(Duration::ZERO);
        }
    }
}

impl IRecordSink for BatchWriter {
    fn submit(&self, entry: StoredEntry) -> VigilResult<()> {
        Ok(self.submit_entry(entry)?)
    }
}

/// Thread-side half.
struct Worker {
    store: SecureLogStore,
    shared: Arc<Shared>,
    retry: RetryPolicy,
    policy: RetentionPolicy,
}

impl Worker {
    fn run(&mut self, rx: &Receiver<WriteCommand>) {
        loop {
            if self.shared.stopping.load(Ordering::SeqCst) && self.shared.past_deadline() {
                break;
            }
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(WriteCommand::Shutdown) => {
                    if rx.is_empty() {
                        break;
                    }
                }
                Ok(cmd) => self.handle(cmd),
                Err(RecvTimeoutError::Timeout) => {
                    if self.shared.stopping.load(Ordering::SeqCst) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        let abandoned = rx.try_iter().filter(WriteCommand::is_append).count() as u64;
        if abandoned > 0 {
            self.store.gauges().add_lost(abandoned);
            self.shared.lost_in_shutdown.fetch_add(abandoned, Ordering::SeqCst);
            tracing::error!(
                event = "shutdown_entries_lost",
                lost = abandoned,
                "grace period elapsed with entries still queued"
            );
        }
        if let Err(e) = self.store.close() {
            tracing::error!(event = "store_close_failed", error = %e, "failed to seal active segment");
        }
        self.shared.running.store(false, Ordering::SeqCst);
    }

    fn handle(&mut self, cmd: WriteCommand) {
        let result = match cmd {
            WriteCommand::Append(entry) => {
                let written = self.append_with_retry(entry);
                if self.shared.stopping.load(Ordering::SeqCst) {
                    let counter = if written {
                        &self.shared.drained
                    } else {
                        &self.shared.lost_in_shutdown
                    };
                    counter.fetch_add(1, Ordering::SeqCst);
                }
                Ok(())
            }
            WriteCommand::Rotate => self.store.rotate().map(|_| ()),
            WriteCommand::CheckRotation => self.store.rotate_if_due().map(|_| ()),
            WriteCommand::Compact => self.store.compact().map(|_| ()),
            WriteCommand::Retention => self.store.apply_retention(&self.policy).map(|_| ()),
            WriteCommand::FlushDegraded => match self.store.flush_degraded() {
                Err(StorageError::EncryptionKeyUnavailable { .. }) => Ok(()),
                other => other.map(|_| ()),
            },
            WriteCommand::Barrier(done) => {
                let _ = done.send(());
                Ok(())
            }
            WriteCommand::Shutdown => Ok(()),
        };
        if let Err(e) = result {
            tracing::warn!(event = "maintenance_failed", error = %e, "maintenance command failed");
        }
    }

    /// Returns true when the entry is durable or held in the degraded buffer.
    fn append_with_retry(&mut self, entry: StoredEntry) -> bool {
        let mut attempt = 0;
        loop {
            match self.store.append(entry.clone()) {
                Ok(_) => return true,
                Err(StorageError::EncryptionKeyUnavailable { buffered, .. }) => return buffered,
                Err(StorageError::DuplicateEntry { entry_id }) => {
                    tracing::warn!(event = "duplicate_entry", entry_id = %entry_id, "entry already stored");
                    return false;
                }
                Err(e) if e.is_retryable() && attempt < self.retry.attempts && !self.shared.past_deadline() => {
                    let delay = self.retry.backoff.saturating_mul(1 << attempt.min(16));
                    tracing::debug!(event = "append_retry", attempt = attempt + 1, error = %e, "retrying append");
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => {
                    self.store.gauges().add_lost(1);
                    tracing::error!(
                        event = "append_failed",
                        entry_id = %entry.entry_id(),
                        attempts = attempt + 1,
                        error = %e,
                        "entry could not be persisted"
                    );
                    return false;
                }
            }
        }
    }
}
