//! # vigil-logger
//!
//! Captures every stage of a query's lifecycle as an [`EventRecord`]
//! (hashed, sequenced, validated) and hands it to the durable write path and
//! the metrics path. Neither sink can fail a call.
//!
//! [`EventRecord`]: vigil_core::EventRecord

pub mod fallback;
pub mod input;
pub mod logger;
pub mod recorder;
pub mod sessions;
pub mod sweeper;

pub use fallback::{FallbackChannel, FallbackEntry, FallbackReason};
pub use input::EventInput;
pub use logger::{EventLogger, LoggerStats};
pub use recorder::SessionRecorder;
pub use sessions::{SessionState, SessionTable};
pub use sweeper::SessionSweeper;
