//! Live-tunable parameters.

use core::time::Duration;
use std::sync::Arc;

use hoverkart_actuator::SpeedLimits;
use hoverkart_errors::ValidationError;
use hoverkart_sensors::MIN_SAFE_DISTANCE;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::PidGains;

/// Parameters an operator can change while the kart is running.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningParameters {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain.
    pub ki: f64,
    /// Derivative gain.
    pub kd: f64,
    /// Standoff to hold from the tracked source, in centimeters.
    pub following_distance_cm: i32,
    /// Front clearance threshold.
    pub front_threshold_cm: u16,
    /// Left clearance threshold.
    pub left_threshold_cm: u16,
    /// Right clearance threshold.
    pub right_threshold_cm: u16,
    /// Rear clearance threshold.
    pub rear_threshold_cm: u16,
    /// Long-range finder clearance threshold.
    pub range_finder_threshold_cm: u16,
    /// Seconds to hold in `Blocked` before attempting to reverse.
    pub wait_time_s: u32,
    /// Regulator output and command limits, applied from the next cycle.
    pub output_limits: SpeedLimits,
}

impl Default for TuningParameters {
    fn default() -> Self {
        Self {
            kp: 2.5,
            ki: 6.0,
            kd: 1.2,
            following_distance_cm: 100,
            front_threshold_cm: MIN_SAFE_DISTANCE,
            left_threshold_cm: MIN_SAFE_DISTANCE,
            right_threshold_cm: MIN_SAFE_DISTANCE,
            rear_threshold_cm: MIN_SAFE_DISTANCE,
            range_finder_threshold_cm: MIN_SAFE_DISTANCE,
            wait_time_s: 0,
            output_limits: SpeedLimits::default(),
        }
    }
}

impl TuningParameters {
    /// The PID gains.
    pub fn gains(&self) -> PidGains {
        PidGains {
            kp: self.kp,
            ki: self.ki,
            kd: self.kd,
        }
    }

    /// Wait time as a duration.
    pub fn wait_time(&self) -> Duration {
        Duration::from_secs(u64::from(self.wait_time_s))
    }

    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field: a non-finite or negative gain, a
    /// non-positive following distance, a zero threshold or inconsistent
    /// output limits.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, gain) in [("kp", self.kp), ("ki", self.ki), ("kd", self.kd)] {
            if !gain.is_finite() {
                return Err(ValidationError::not_finite(name));
            }
            if gain < 0.0 {
                return Err(ValidationError::out_of_range(name, gain, 0.0, f64::MAX));
            }
        }

        if self.following_distance_cm <= 0 {
            return Err(ValidationError::out_of_range(
                "following_distance_cm",
                self.following_distance_cm,
                1,
                i32::MAX,
            ));
        }

        for (name, threshold) in [
            ("front_threshold_cm", self.front_threshold_cm),
            ("left_threshold_cm", self.left_threshold_cm),
            ("right_threshold_cm", self.right_threshold_cm),
            ("rear_threshold_cm", self.rear_threshold_cm),
            ("range_finder_threshold_cm", self.range_finder_threshold_cm),
        ] {
            if threshold == 0 {
                return Err(ValidationError::out_of_range(name, threshold, 1, u16::MAX));
            }
        }
        self.output_limits.validate()
    }
}

/// Shared tuning block.
///
/// The configuration endpoint writes through [`update`](Self::update); the
/// control loop takes one [`snapshot`](Self::snapshot) at the start of each
/// cycle and uses it for the whole cycle.
#[derive(Debug, Clone, Default)]
pub struct TuningStore {
    inner: Arc<RwLock<TuningParameters>>,
}

impl TuningStore {
    /// Create a store holding validated parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if `params` fail validation.
    pub fn new(params: TuningParameters) -> Result<Self, ValidationError> {
        params.validate()?;
        Ok(Self {
            inner: Arc::new(RwLock::new(params)),
        })
    }

    /// Copy of the current parameters.
    pub fn snapshot(&self) -> TuningParameters {
        *self.inner.read()
    }

    /// Apply `f` to a copy of the parameters and commit it if it validates.
    ///
    /// # Errors
    ///
    /// Returns the validation error; the stored parameters are unchanged.
    pub fn update(
        &self,
        f: impl FnOnce(&mut TuningParameters),
    ) -> Result<TuningParameters, ValidationError> {
        let mut guard = self.inner.write();
        let mut next = *guard;
        f(&mut next);
        next.validate()?;
        if next != *guard {
            info!(
                kp = next.kp,
                ki = next.ki,
                kd = next.kd,
                following_distance_cm = next.following_distance_cm,
                wait_time_s = next.wait_time_s,
                "tuning updated"
            );
        }
        *guard = next;
        Ok(next)
    }

    /// Replace all parameters.
    ///
    /// # Errors
    ///
    /// Returns the validation error; the stored parameters are unchanged.
    pub fn replace(&self, params: TuningParameters) -> Result<TuningParameters, ValidationError> {
        self.update(|p| *p = params)
    }

    /// Restore defaults.
    pub fn reset_to_defaults(&self) {
        *self.inner.write() = TuningParameters::default();
    }
}
