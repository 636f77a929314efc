//! Sensor acquisition configuration.

use core::time::Duration;

use hoverkart_errors::ValidationError;
use serde::{Deserialize, Serialize};

use crate::{MAX_ULTRASONIC_DISTANCE, RANGE_FINDER_MAX_DISTANCE};

/// Bus address of the long-range finder.
pub const RANGE_FINDER_ADDRESS: u8 = 0x62;

/// Register that triggers a measurement and returns the distance.
pub const RANGE_FINDER_MEASURE_REGISTER: u8 = 0x00;

/// Echo round-trip time per centimeter of range, in microseconds.
pub const ECHO_MICROS_PER_CM: u64 = 58;

/// Speed of sound in centimeters per microsecond.
pub const SPEED_OF_SOUND_CM_PER_US: f64 = 0.034;

/// Sensor acquisition configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Ultrasonic maximum range in centimeters.
    pub ultrasonic_max_cm: u16,
    /// Range finder maximum range in centimeters.
    pub range_finder_max_cm: u16,
    /// Range finder 7-bit bus address.
    pub range_finder_address: u8,
    /// Speed of sound used to convert echo time to distance.
    pub speed_of_sound_cm_per_us: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            ultrasonic_max_cm: MAX_ULTRASONIC_DISTANCE,
            range_finder_max_cm: RANGE_FINDER_MAX_DISTANCE,
            range_finder_address: RANGE_FINDER_ADDRESS,
            speed_of_sound_cm_per_us: SPEED_OF_SOUND_CM_PER_US,
        }
    }
}

impl SensorConfig {
    /// Echo timeout covering the round trip at maximum ultrasonic range.
    pub fn echo_timeout(&self) -> Duration {
        Duration::from_micros(u64::from(self.ultrasonic_max_cm) * ECHO_MICROS_PER_CM)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a range is zero or above the hardware limit, the
    /// address is not a 7-bit address, or the speed of sound is not positive.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ultrasonic_max_cm == 0 || self.ultrasonic_max_cm > MAX_ULTRASONIC_DISTANCE {
            return Err(ValidationError::out_of_range(
                "ultrasonic_max_cm",
                self.ultrasonic_max_cm,
                1,
                MAX_ULTRASONIC_DISTANCE,
            ));
        }
        if self.range_finder_max_cm == 0 || self.range_finder_max_cm > RANGE_FINDER_MAX_DISTANCE {
            return Err(ValidationError::out_of_range(
                "range_finder_max_cm",
                self.range_finder_max_cm,
                1,
                RANGE_FINDER_MAX_DISTANCE,
            ));
        }
        if self.range_finder_address > 0x7F {
            return Err(ValidationError::out_of_range(
                "range_finder_address",
                self.range_finder_address,
                0,
                0x7F,
            ));
        }
        if !self.speed_of_sound_cm_per_us.is_finite() {
            return Err(ValidationError::not_finite("speed_of_sound_cm_per_us"));
        }
        if self.speed_of_sound_cm_per_us <= 0.0 {
            return Err(ValidationError::constraint(
                "speed_of_sound_cm_per_us must be positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_echo_timeout() {
        assert_eq!(
            SensorConfig::default().echo_timeout(),
            Duration::from_micros(23_200)
        );
    }

    #[test]
    fn test_default_is_valid() {
        assert_eq!(SensorConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_oversized_range() {
        let config = SensorConfig {
            ultrasonic_max_cm: 500,
            ..SensorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_rejects_nan_speed() {
        let config = SensorConfig {
            speed_of_sound_cm_per_us: f64::NAN,
            ..SensorConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::not_finite("speed_of_sound_cm_per_us"))
        );
    }
}
