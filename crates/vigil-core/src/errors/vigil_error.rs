use super::{ConfigError, ReviewError, StorageError};

/// Top-level error for every Vigil operation.
#[derive(Debug, thiserror::Error)]
pub enum VigilError {
    /// Malformed input, rejected before any side effect.
    #[error("validation failed: {reason}")]
    ValidationError { reason: String },

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("review error: {0}")]
    ReviewError(#[from] ReviewError),

    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A component is running in a reduced mode.
    #[error("{component} degraded, using {fallback}")]
    DegradedMode { component: String, fallback: String },
}

impl VigilError {
    /// Shorthand for [`VigilError::ValidationError`].
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::ValidationError {
            reason: reason.into(),
        }
    }

    /// Whether the caller may retry the same operation unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::StorageError(e) => e.is_retryable(),
            _ => false,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError { .. })
    }
}

/// Convenience alias used across all crates.
pub type VigilResult<T> = Result<T, VigilError>;
