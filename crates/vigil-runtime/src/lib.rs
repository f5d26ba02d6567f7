//! # vigil-runtime
//!
//! [`VigilEngine`] owns one instance of every component and the threads
//! behind them. Open it once per process; call
//! [`shutdown`](VigilEngine::shutdown) before exit to drain the write queue.
//!
//! ```text
//! caller ──▶ EventLogger ──┬──▶ BatchWriter ──▶ SecureLogStore
//!                          └──▶ MetricsAggregator
//! caller ──▶ HallucinationDetector ──┬──▶ BatchWriter
//!                                    ├──▶ MetricsAggregator
//!                                    └──▶ ReviewQueue ──▶ BatchWriter
//! MaintenanceScheduler ──▶ BatchWriter
//! ```

pub mod engine;

pub use engine::VigilEngine;
pub use vigil_storage::{PaginatedResult, RecordFilter, ShutdownReport, TimeRange};
