//! Top-level error type and classification shared by every hoverkart crate.

use core::fmt;

use crate::{ActuatorError, SensorError, ValidationError};

/// Top-level error type wrapping all hoverkart sub-errors.
#[derive(Debug, thiserror::Error)]
pub enum HoverkartError {
    /// Proximity sensor errors
    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),

    /// Motor driver errors
    #[error("Actuator error: {0}")]
    Actuator(#[from] ActuatorError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl HoverkartError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            HoverkartError::Sensor(_) => ErrorCategory::Sensor,
            HoverkartError::Actuator(_) => ErrorCategory::Actuator,
            HoverkartError::Validation(_) => ErrorCategory::Validation,
            HoverkartError::Io(_) => ErrorCategory::IO,
            HoverkartError::Config(_) => ErrorCategory::Config,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HoverkartError::Sensor(e) => e.severity(),
            HoverkartError::Actuator(e) => e.severity(),
            HoverkartError::Validation(e) => e.severity(),
            HoverkartError::Io(_) | HoverkartError::Config(_) => ErrorSeverity::Error,
        }
    }

    /// Create a configuration error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        HoverkartError::Config(msg.into())
    }
}

impl From<std::io::Error> for HoverkartError {
    fn from(e: std::io::Error) -> Self {
        HoverkartError::Io(e)
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Proximity sensor errors
    Sensor = 0,
    /// Motor driver errors
    Actuator = 1,
    /// Configuration errors
    Config = 2,
    /// I/O errors
    IO = 3,
    /// Validation errors
    Validation = 4,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Sensor => write!(f, "Sensor"),
            ErrorCategory::Actuator => write!(f, "Actuator"),
            ErrorCategory::Config => write!(f, "Config"),
            ErrorCategory::IO => write!(f, "IO"),
            ErrorCategory::Validation => write!(f, "Validation"),
        }
    }
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, may require attention
    Warning = 1,
    /// Error, operation failed
    Error = 2,
    /// Critical, the vehicle must not keep moving
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Sensor.to_string(), "Sensor");
        assert_eq!(ErrorCategory::Actuator.to_string(), "Actuator");
        assert_eq!(ErrorCategory::Validation.to_string(), "Validation");
    }

    #[test]
    fn test_error_severity_ordering() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Error);
        assert!(ErrorSeverity::Error > ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning > ErrorSeverity::Info);
    }

    #[test]
    fn test_hoverkart_error_category() {
        let err: HoverkartError = SensorError::bus_nack(0x62).into();
        assert_eq!(err.category(), ErrorCategory::Sensor);

        let err = HoverkartError::config("bad file");
        assert_eq!(err.category(), ErrorCategory::Config);
    }

    #[test]
    fn test_actuator_disconnect_is_critical() {
        let err: HoverkartError = ActuatorError::disconnected("left").into();
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_hoverkart_error_is_std_error() {
        let err: HoverkartError = ValidationError::not_finite("kp").into();
        let _: &dyn std::error::Error = &err;
    }
}
