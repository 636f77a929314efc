//! Single-channel PID controller.
//!
//! Formulated the way embedded PID libraries usually are:
//!
//! - the integral term is kept as an output sum (`Ki·e·dt` accumulated) that
//!   is clamped to the output limits every step, so it cannot wind up past
//!   what the actuator can deliver;
//! - the derivative acts on the measurement rather than the error, so a
//!   setpoint change does not produce a derivative kick;
//! - gains are passed in on every step, so retuning takes effect on the next
//!   step without disturbing the accumulated state.
//!
//! The error is `input − setpoint`: a source farther away than the setpoint
//! drives the output up.

use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Proportional, integral and derivative gains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain, per second.
    pub ki: f64,
    /// Derivative gain, seconds.
    pub kd: f64,
}

/// Smallest step used when the caller passes a zero `dt`.
pub const MIN_STEP: Duration = Duration::from_millis(1);

/// PID state for one wheel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PidController {
    output_sum: f64,
    last_input: Option<f64>,
}

impl PidController {
    /// A controller with no history.
    pub const fn new() -> Self {
        Self {
            output_sum: 0.0,
            last_input: None,
        }
    }

    /// Returns true until the first step after construction or [`reset`](Self::reset).
    pub fn is_fresh(&self) -> bool {
        self.last_input.is_none()
    }

    /// Accumulated integral output.
    pub fn output_sum(&self) -> f64 {
        self.output_sum
    }

    /// Forget all history; the next step starts from `min`.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Advance by `dt` and return an output in `[min, max]`.
    pub fn step(
        &mut self,
        setpoint: f64,
        input: f64,
        gains: &PidGains,
        dt: Duration,
        min: f64,
        max: f64,
    ) -> f64 {
        let dt = dt.max(MIN_STEP).as_secs_f64();
        let last_input = match self.last_input {
            Some(last) => last,
            None => {
                self.output_sum = min;
                input
            }
        };

        let error = input - setpoint;
        self.output_sum = (self.output_sum + gains.ki * error * dt).clamp(min, max);
        let d_input = (input - last_input) / dt;
        self.last_input = Some(input);

        let output = gains.kp * error + self.output_sum + gains.kd * d_input;
        if output.is_finite() {
            output.clamp(min, max)
        } else {
            min
        }
    }
}
