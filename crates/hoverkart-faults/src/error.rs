//! Error types for fault reporter operations.

use hoverkart_errors::ValidationError;

/// Fault reporter errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FaultError {
    /// `clear` was called with no active fault.
    #[error("No active fault to clear")]
    NoActiveFault,

    /// The reporter configuration was rejected.
    #[error("Invalid fault reporter configuration: {0}")]
    InvalidConfig(#[from] ValidationError),
}

/// Result type for fault reporter operations.
pub type FaultResult<T> = Result<T, FaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_active_fault_display() {
        assert_eq!(FaultError::NoActiveFault.to_string(), "No active fault to clear");
    }

    #[test]
    fn test_invalid_config_wraps_validation() {
        let err: FaultError = ValidationError::constraint("dwell_ms must be positive").into();
        assert!(err.to_string().contains("dwell_ms"));
    }
}
