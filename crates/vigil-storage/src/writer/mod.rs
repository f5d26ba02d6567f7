//! Async write path: crossbeam-channel bounded queue, dedicated writer thread
//! that owns every store mutation.

pub mod batch_writer;
pub mod commands;

pub use batch_writer::{BatchWriter, ShutdownReport};
pub use commands::WriteCommand;
