//! Background purge of idle sessions, so the session table stays bounded in a
//! long-running process without anyone calling `purge_idle_sessions`.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Sender};
use vigil_core::config::LoggerConfig;
use vigil_core::errors::{StorageError, VigilResult};

use crate::logger::EventLogger;

pub struct SessionSweeper {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<u64>>,
}

impl SessionSweeper {
    /// Every `every`, drop sessions idle longer than `idle`.
    pub fn start(logger: Arc<EventLogger>, every: Duration, idle: Duration) -> VigilResult<Self> {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let handle = std::thread::Builder::new()
            .name("vigil-session-sweeper".to_string())
            .spawn(move || {
                let ticks = tick(every);
                let mut purged = 0u64;
                loop {
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticks) -> _ => {
                            purged += logger.purge_sessions_idle_for(idle) as u64;
                        }
                    }
                }
                purged
            })
            .map_err(|e| StorageError::io("spawn session sweeper", e))?;

        tracing::info!(
            event = "session_sweeper_started",
            every_secs = every.as_secs(),
            idle_secs = idle.as_secs(),
            "session sweeper started"
        );
        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// `None` when `session_sweep_interval_secs` is 0.
    pub fn from_config(logger: Arc<EventLogger>, config: &LoggerConfig) -> VigilResult<Option<Self>> {
        if config.session_sweep_interval_secs == 0 {
            return Ok(None);
        }
        Self::start(
            logger,
            Duration::from_secs(config.session_sweep_interval_secs),
            Duration::from_secs(config.session_idle_secs),
        )
        .map(Some)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop and join. Returns the number of sessions purged over its lifetime.
    pub fn stop(&mut self) -> u64 {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        let purged = match self.handle.take() {
            Some(handle) => handle.join().unwrap_or(0),
            None => 0,
        };
        tracing::info!(event = "session_sweeper_stopped", purged = purged, "session sweeper stopped");
        purged
    }
}

impl Drop for SessionSweeper {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop();
        }
    }
}
