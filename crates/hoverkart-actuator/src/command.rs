//! Motor commands and speed limits.

use core::fmt;

use hoverkart_errors::ValidationError;
use serde::{Deserialize, Serialize};

/// Lowest PWM command; also the idle/neutral value by default.
pub const MIN_SPEED: u16 = 1000;

/// Highest PWM command.
pub const MAX_SPEED: u16 = 2000;

/// Command used for the reverse maneuver.
pub const DEFAULT_REVERSE_SPEED: u16 = 1000;

/// Wheel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Direction pins low
    #[default]
    Forward,
    /// Direction pins high
    Reverse,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Reverse => write!(f, "reverse"),
        }
    }
}

/// Allowed PWM command range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedLimits {
    /// Lowest command.
    pub min: u16,
    /// Highest command.
    pub max: u16,
    /// Command written when stopped.
    pub neutral: u16,
}

impl Default for SpeedLimits {
    fn default() -> Self {
        Self {
            min: MIN_SPEED,
            max: MAX_SPEED,
            neutral: MIN_SPEED,
        }
    }
}

impl SpeedLimits {
    /// Clamp a command into `[min, max]`.
    pub fn clamp(&self, speed: u16) -> u16 {
        speed.clamp(self.min, self.max.max(self.min))
    }

    /// Validate the limits.
    ///
    /// # Errors
    ///
    /// Returns an error unless `min <= neutral <= max` and `min < max`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min >= self.max {
            return Err(ValidationError::constraint(format!(
                "speed min ({}) must be below max ({})",
                self.min, self.max
            )));
        }
        if self.neutral < self.min || self.neutral > self.max {
            return Err(ValidationError::out_of_range(
                "neutral",
                self.neutral,
                self.min,
                self.max,
            ));
        }
        Ok(())
    }
}

/// One cycle's motor command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlCommand {
    /// Left wheel PWM command.
    pub left: u16,
    /// Right wheel PWM command.
    pub right: u16,
    /// Wheel direction.
    pub direction: Direction,
}

impl ControlCommand {
    /// Neutral speed on both wheels, direction forward.
    pub fn stop(limits: &SpeedLimits) -> Self {
        let neutral = limits.clamp(limits.neutral);
        Self {
            left: neutral,
            right: neutral,
            direction: Direction::Forward,
        }
    }

    /// Forward motion with per-wheel speeds.
    pub fn forward(left: u16, right: u16, limits: &SpeedLimits) -> Self {
        Self {
            left: limits.clamp(left),
            right: limits.clamp(right),
            direction: Direction::Forward,
        }
    }

    /// Reverse motion at a single speed.
    pub fn reverse(speed: u16, limits: &SpeedLimits) -> Self {
        let speed = limits.clamp(speed);
        Self {
            left: speed,
            right: speed,
            direction: Direction::Reverse,
        }
    }

    /// Returns true for a forward command at neutral speed.
    pub fn is_stop(&self, limits: &SpeedLimits) -> bool {
        *self == Self::stop(limits)
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} L={} R={}", self.direction, self.left, self.right)
    }
}
