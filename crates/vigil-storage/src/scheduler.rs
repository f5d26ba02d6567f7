//! Periodic maintenance on independent schedules. The scheduler owns no
//! store state; it only enqueues commands for the writer thread.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, never, select, tick, Receiver, Sender};
use vigil_core::config::StorageConfig;
use vigil_core::errors::StorageError;

use crate::writer::{BatchWriter, WriteCommand};

/// Interval per maintenance task. `None` disables the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaintenanceIntervals {
    pub rotate: Option<Duration>,
    pub compact: Option<Duration>,
    pub retention: Option<Duration>,
    pub flush_degraded: Option<Duration>,
}

impl MaintenanceIntervals {
    /// Intervals of 0 seconds in the config disable the task. Degraded-mode
    /// flushing runs on the rotation-check interval.
    pub fn from_config(config: &StorageConfig) -> Self {
        let secs = |s: u64| (s > 0).then(|| Duration::from_secs(s));
        Self {
            rotate: secs(config.rotate_check_interval_secs),
            compact: secs(config.compaction_interval_secs),
            retention: secs(config.retention_interval_secs),
            flush_degraded: secs(config.rotate_check_interval_secs),
        }
    }
}

fn ticker(interval: Option<Duration>) -> Receiver<std::time::Instant> {
    match interval {
        Some(every) => tick(every),
        None => never(),
    }
}

pub struct MaintenanceScheduler {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<u64>>,
}

impl MaintenanceScheduler {
    /// Start the scheduler thread. `send` enqueues one command and reports
    /// whether it was accepted.
    pub fn start<F>(intervals: MaintenanceIntervals, send: F) -> Result<Self, StorageError>
    where
        F: Fn(WriteCommand) -> bool + Send + 'static,
    {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let handle = std::thread::Builder::new()
            .name("vigil-maintenance".to_string())
            .spawn(move || {
                let rotate = ticker(intervals.rotate);
                let compact = ticker(intervals.compact);
                let retention = ticker(intervals.retention);
                let flush = ticker(intervals.flush_degraded);
                let mut sent = 0u64;
                loop {
                    let next = select! {
                        recv(stop_rx) -> _ => None,
                        recv(rotate) -> _ => Some(WriteCommand::CheckRotation),
                        recv(compact) -> _ => Some(WriteCommand::Compact),
                        recv(retention) -> _ => Some(WriteCommand::Retention),
                        recv(flush) -> _ => Some(WriteCommand::FlushDegraded),
                    };
                    let Some(cmd) = next else {
                        break;
                    };
                    tracing::trace!(event = "maintenance_tick", command = cmd.name());
                    if send(cmd) {
                        sent += 1;
                    }
                }
                sent
            })
            .map_err(|e| StorageError::io("spawn maintenance thread", e))?;

        tracing::info!(
            event = "scheduler_started",
            rotate_secs = intervals.rotate.map(|d| d.as_secs()),
            compact_secs = intervals.compact.map(|d| d.as_secs()),
            retention_secs = intervals.retention.map(|d| d.as_secs()),
            "maintenance scheduler started"
        );
        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Schedule maintenance onto `writer`'s queue.
    pub fn for_writer(writer: Arc<BatchWriter>, intervals: MaintenanceIntervals) -> Result<Self, StorageError> {
        Self::start(intervals, move |cmd| writer.send_maintenance(cmd))
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel every schedule and join the thread. Returns the number of
    /// commands that were accepted by the writer.
    pub fn stop(&mut self) -> u64 {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        let sent = match self.handle.take() {
            Some(handle) => handle.join().unwrap_or(0),
            None => 0,
        };
        tracing::info!(event = "scheduler_stopped", commands_sent = sent, "maintenance scheduler stopped");
        sent
    }
}

impl Drop for MaintenanceScheduler {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop();
        }
    }
}
