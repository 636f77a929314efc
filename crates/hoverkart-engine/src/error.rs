//! Engine error types.

use std::path::PathBuf;

use hoverkart_errors::{HoverkartError, ValidationError};
use hoverkart_faults::FaultError;

/// Errors raised while loading configuration or assembling the loop.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid JSON for [`KartConfig`](crate::KartConfig).
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A configuration value was rejected.
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    /// The fault reporter rejected its configuration.
    #[error("Fault reporter setup failed: {0}")]
    Faults(#[from] FaultError),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

impl From<EngineError> for HoverkartError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Io { source, .. } => HoverkartError::Io(source),
            EngineError::Validation(v) | EngineError::Faults(FaultError::InvalidConfig(v)) => {
                HoverkartError::Validation(v)
            }
            other => HoverkartError::config(other.to_string()),
        }
    }
}
