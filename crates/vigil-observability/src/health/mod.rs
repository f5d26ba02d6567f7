//! Component health derived from plain counters the runtime gathers.

mod checks;
mod reporter;

pub use checks::HealthChecker;
pub use reporter::{ComponentHealth, HealthInputs, HealthReport, HealthStatus};
