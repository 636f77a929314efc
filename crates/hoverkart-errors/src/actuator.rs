//! Motor-driver errors.

use crate::common::ErrorSeverity;

/// Errors raised while driving the wheel motors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActuatorError {
    /// Writing a PWM duty value failed
    #[error("PWM write failed on {channel} channel: {reason}")]
    PwmWriteFailed {
        /// Wheel channel
        channel: String,
        /// Failure reason
        reason: String,
    },

    /// The direction pins could not be set
    #[error("Direction change failed: {0}")]
    DirectionFailed(String),

    /// The motor controller is no longer reachable
    #[error("Motor controller disconnected: {0}")]
    Disconnected(String),
}

impl ActuatorError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ActuatorError::PwmWriteFailed { .. } => ErrorSeverity::Error,
            ActuatorError::DirectionFailed(_) => ErrorSeverity::Error,
            ActuatorError::Disconnected(_) => ErrorSeverity::Critical,
        }
    }

    /// Create a PWM write failure.
    pub fn pwm_write_failed(channel: impl Into<String>, reason: impl Into<String>) -> Self {
        ActuatorError::PwmWriteFailed {
            channel: channel.into(),
            reason: reason.into(),
        }
    }

    /// Create a direction failure.
    pub fn direction_failed(reason: impl Into<String>) -> Self {
        ActuatorError::DirectionFailed(reason.into())
    }

    /// Create a disconnected error.
    pub fn disconnected(controller: impl Into<String>) -> Self {
        ActuatorError::Disconnected(controller.into())
    }
}
