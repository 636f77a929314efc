//! Proximity-sensor transport errors.
//!
//! These are returned by the hardware seams (pulse-echo pins, the range
//! finder bus). An echo that simply never comes back is *not* an error at this
//! level: it is reported as a missing pulse and turned into an invalid reading
//! by the acquisition layer.

use crate::common::ErrorSeverity;

/// Sensor transport errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SensorError {
    /// A trigger or echo pin could not be driven or sampled
    #[error("Pin fault on {sensor}: {reason}")]
    PinFault {
        /// Sensor name
        sensor: String,
        /// Failure reason
        reason: String,
    },

    /// The bus device did not acknowledge its address
    #[error("No acknowledge from bus device {address:#04x}")]
    BusNack {
        /// 7-bit device address
        address: u8,
    },

    /// A bus transfer did not complete within its budget
    #[error("Bus device {address:#04x} timeout after {timeout_ms}ms")]
    BusTimeout {
        /// 7-bit device address
        address: u8,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// The sensor has not been set up yet
    #[error("Sensor not initialized: {0}")]
    NotInitialized(String),
}

impl SensorError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SensorError::PinFault { .. } => ErrorSeverity::Error,
            SensorError::BusNack { .. } => ErrorSeverity::Error,
            SensorError::BusTimeout { .. } => ErrorSeverity::Warning,
            SensorError::NotInitialized(_) => ErrorSeverity::Error,
        }
    }

    /// Check if retrying on the next cycle might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, SensorError::BusTimeout { .. })
    }

    /// Create a pin fault error.
    pub fn pin_fault(sensor: impl Into<String>, reason: impl Into<String>) -> Self {
        SensorError::PinFault {
            sensor: sensor.into(),
            reason: reason.into(),
        }
    }

    /// Create a bus NACK error.
    pub fn bus_nack(address: u8) -> Self {
        SensorError::BusNack { address }
    }

    /// Create a bus timeout error.
    pub fn bus_timeout(address: u8, timeout_ms: u64) -> Self {
        SensorError::BusTimeout {
            address,
            timeout_ms,
        }
    }
}
