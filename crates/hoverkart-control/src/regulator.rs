//! Distance-following speed regulator.

use core::fmt;
use core::time::Duration;

use hoverkart_actuator::SpeedLimits;
use hoverkart_faults::{FaultKind, FaultReporter};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{PidController, TuningParameters};

/// Distance to the tracked source, as delivered by the distance source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackedDistance {
    /// Distance in centimeters. Negative values are garbage from the link.
    Cm(i32),
    /// No distance this cycle.
    Invalid,
}

impl TrackedDistance {
    /// Distance in centimeters if present.
    pub fn cm(&self) -> Option<i32> {
        match self {
            TrackedDistance::Cm(cm) => Some(*cm),
            TrackedDistance::Invalid => None,
        }
    }
}

impl fmt::Display for TrackedDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackedDistance::Cm(cm) => write!(f, "{cm} cm"),
            TrackedDistance::Invalid => write!(f, "invalid"),
        }
    }
}

/// Per-wheel speed commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WheelSpeeds {
    /// Left wheel command.
    pub left: u16,
    /// Right wheel command.
    pub right: u16,
}

impl WheelSpeeds {
    /// The same command on both wheels.
    pub const fn both(speed: u16) -> Self {
        Self {
            left: speed,
            right: speed,
        }
    }
}

/// Two independent PID channels holding the following distance.
#[derive(Debug, Clone)]
pub struct SpeedRegulator {
    left: PidController,
    right: PidController,
    limits: SpeedLimits,
}

impl SpeedRegulator {
    /// Create a regulator bounded by `limits`.
    pub fn new(limits: SpeedLimits) -> Self {
        Self {
            left: PidController::new(),
            right: PidController::new(),
            limits,
        }
    }

    /// Output limits.
    pub fn limits(&self) -> &SpeedLimits {
        &self.limits
    }

    /// Replace the output limits without touching controller state.
    pub fn set_limits(&mut self, limits: SpeedLimits) {
        self.limits = limits;
    }

    /// Left channel state.
    pub fn left(&self) -> &PidController {
        &self.left
    }

    /// Right channel state.
    pub fn right(&self) -> &PidController {
        &self.right
    }

    /// Clear both channels so the next output starts from the floor.
    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }

    /// Compute both wheel commands from one tracked distance.
    ///
    /// An invalid distance yields the floor speed on both wheels. A negative
    /// distance also yields the floor speed and reports a `General` fault.
    /// Neither case touches controller state.
    pub fn compute_speed(
        &mut self,
        target_distance: i32,
        current_distance: TrackedDistance,
        tuning: &TuningParameters,
        dt: Duration,
        faults: &mut FaultReporter,
    ) -> WheelSpeeds {
        let Some(input) = accept(current_distance, faults) else {
            return WheelSpeeds::both(self.limits.min);
        };
        WheelSpeeds {
            left: self.step(Wheel::Left, target_distance, input, tuning, dt),
            right: self.step(Wheel::Right, target_distance, input, tuning, dt),
        }
    }

    /// Compute each wheel from its own input.
    ///
    /// Each channel applies the same input rules as
    /// [`compute_speed`](Self::compute_speed) independently.
    pub fn compute_wheels(
        &mut self,
        target_distance: i32,
        left_input: TrackedDistance,
        right_input: TrackedDistance,
        tuning: &TuningParameters,
        dt: Duration,
        faults: &mut FaultReporter,
    ) -> WheelSpeeds {
        let left = match accept(left_input, faults) {
            Some(input) => self.step(Wheel::Left, target_distance, input, tuning, dt),
            None => self.limits.min,
        };
        let right = match accept(right_input, faults) {
            Some(input) => self.step(Wheel::Right, target_distance, input, tuning, dt),
            None => self.limits.min,
        };
        WheelSpeeds { left, right }
    }

    fn step(
        &mut self,
        wheel: Wheel,
        target_distance: i32,
        input: i32,
        tuning: &TuningParameters,
        dt: Duration,
    ) -> u16 {
        let min = self.limits.min;
        let max = self.limits.max.max(min);
        let pid = match wheel {
            Wheel::Left => &mut self.left,
            Wheel::Right => &mut self.right,
        };
        let raw = pid.step(
            f64::from(target_distance),
            f64::from(input),
            &tuning.gains(),
            dt,
            f64::from(min),
            f64::from(max),
        );
        trace!(?wheel, target_distance, input, raw, "regulator step");
        // raw is already within [min, max]
        u16::try_from(raw.round() as i64).map_or(min, |speed| speed.clamp(min, max))
    }
}

#[derive(Debug, Clone, Copy)]
enum Wheel {
    Left,
    Right,
}

fn accept(distance: TrackedDistance, faults: &mut FaultReporter) -> Option<i32> {
    match distance {
        TrackedDistance::Cm(cm) if cm >= 0 => Some(cm),
        TrackedDistance::Cm(_) => {
            faults.report(FaultKind::General, "invalid distance to tracked source");
            None
        }
        TrackedDistance::Invalid => None,
    }
}
