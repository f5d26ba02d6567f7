//! Error taxonomy. One enum per subsystem, aggregated by [`VigilError`].

mod config_error;
mod review_error;
mod storage_error;
mod vigil_error;

pub use config_error::ConfigError;
pub use review_error::ReviewError;
pub use storage_error::StorageError;
pub use vigil_error::{VigilError, VigilResult};
