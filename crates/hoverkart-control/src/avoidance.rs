//! Obstacle-avoidance and reverse-maneuver state machine.
//!
//! One [`ObstacleAvoidance::step`] per control cycle. The machine never
//! blocks: the reverse maneuver is a state with a start timestamp that is
//! re-checked on every step.
//!
//! A `Reverse` command is only ever issued on a step whose rear reading was
//! clear of the rear threshold.

use core::fmt;
use core::time::Duration;

use hoverkart_actuator::{ControlCommand, DEFAULT_REVERSE_SPEED, SpeedLimits};
use hoverkart_errors::ValidationError;
use hoverkart_faults::{FaultKind, FaultReporter};
use hoverkart_sensors::{Distance, SensorSnapshot};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{SpeedRegulator, TrackedDistance, TuningParameters};

/// Default reverse maneuver duration.
pub const DEFAULT_REVERSE_TIMEOUT_MS: u64 = 5_000;

/// Why the machine entered [`ManeuverState::EmergencyStopped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StopCause {
    /// Forward and rear both blocked.
    BlockedAllSides,
    /// Rear became blocked while reversing.
    RearBlockedDuringReverse,
    /// A motor fault was reported by another component.
    MotorFault,
}

impl fmt::Display for StopCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopCause::BlockedAllSides => write!(f, "path blocked on all sides"),
            StopCause::RearBlockedDuringReverse => write!(f, "rear path blocked during reverse"),
            StopCause::MotorFault => write!(f, "motor fault"),
        }
    }
}

/// Maneuver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ManeuverState {
    /// Regulating speed toward the tracked source.
    #[default]
    Following,
    /// Stopped in front of an obstacle.
    Blocked {
        /// When the obstacle was detected.
        since: Duration,
    },
    /// Backing away from an obstacle.
    Reversing {
        /// When the maneuver started.
        started_at: Duration,
    },
    /// Pinned to the stop command until an external reset.
    EmergencyStopped {
        /// What caused the stop.
        cause: StopCause,
    },
}

impl ManeuverState {
    /// Short state name.
    pub fn name(&self) -> &'static str {
        match self {
            ManeuverState::Following => "following",
            ManeuverState::Blocked { .. } => "blocked",
            ManeuverState::Reversing { .. } => "reversing",
            ManeuverState::EmergencyStopped { .. } => "emergency-stopped",
        }
    }

    /// Returns true in [`ManeuverState::EmergencyStopped`].
    pub fn is_emergency_stopped(&self) -> bool {
        matches!(self, ManeuverState::EmergencyStopped { .. })
    }
}

impl fmt::Display for ManeuverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static configuration of the maneuver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvoidanceConfig {
    /// Command applied to both wheels while reversing.
    pub reverse_speed: u16,
    /// Reverse maneuver duration in milliseconds.
    pub reverse_timeout_ms: u64,
    /// Hardware command envelope; the actuator clamps every write into it.
    pub limits: SpeedLimits,
}

impl Default for AvoidanceConfig {
    fn default() -> Self {
        Self {
            reverse_speed: DEFAULT_REVERSE_SPEED,
            reverse_timeout_ms: DEFAULT_REVERSE_TIMEOUT_MS,
            limits: SpeedLimits::default(),
        }
    }
}

impl AvoidanceConfig {
    /// Reverse maneuver duration.
    pub fn reverse_timeout(&self) -> Duration {
        Duration::from_millis(self.reverse_timeout_ms)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid limits, a zero timeout or a reverse
    /// speed outside the limits.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.limits.validate()?;
        if self.reverse_timeout_ms == 0 {
            return Err(ValidationError::out_of_range(
                "reverse_timeout_ms",
                self.reverse_timeout_ms,
                1,
                u64::MAX,
            ));
        }
        if self.reverse_speed < self.limits.min || self.reverse_speed > self.limits.max {
            return Err(ValidationError::out_of_range(
                "reverse_speed",
                self.reverse_speed,
                self.limits.min,
                self.limits.max,
            ));
        }
        Ok(())
    }
}

/// True if the forward path cannot be confirmed clear.
///
/// Any front or side reading at or below its threshold, or invalid, blocks.
/// The long-range finder blocks only with a valid reading at or below its
/// threshold.
pub fn is_forward_blocked(snapshot: &SensorSnapshot, tuning: &TuningParameters) -> bool {
    let ring_blocked = !snapshot.front.is_clear_of(tuning.front_threshold_cm)
        || !snapshot.left.is_clear_of(tuning.left_threshold_cm)
        || !snapshot.right.is_clear_of(tuning.right_threshold_cm);

    let long_range_blocked = matches!(
        snapshot.long_range.distance,
        Distance::Valid(cm) if cm <= tuning.range_finder_threshold_cm
    );

    ring_blocked || long_range_blocked
}

/// True if the rear reading is valid and beyond the rear threshold.
pub fn is_rear_clear(snapshot: &SensorSnapshot, tuning: &TuningParameters) -> bool {
    snapshot.rear.is_clear_of(tuning.rear_threshold_cm)
}

/// The obstacle-avoidance state machine and the regulator it drives.
#[derive(Debug, Clone)]
pub struct ObstacleAvoidance {
    state: ManeuverState,
    config: AvoidanceConfig,
    regulator: SpeedRegulator,
}

impl ObstacleAvoidance {
    /// Start in [`ManeuverState::Following`].
    pub fn new(config: AvoidanceConfig) -> Self {
        Self {
            state: ManeuverState::Following,
            config,
            regulator: SpeedRegulator::new(config.limits),
        }
    }

    /// Current state.
    pub fn state(&self) -> ManeuverState {
        self.state
    }

    /// Active configuration.
    pub fn config(&self) -> &AvoidanceConfig {
        &self.config
    }

    /// The speed regulator.
    pub fn regulator(&self) -> &SpeedRegulator {
        &self.regulator
    }

    /// External re-arm: back to `Following` from any state.
    pub fn reset(&mut self) {
        self.transition(ManeuverState::Following);
    }

    /// Run one control cycle and return the command to apply.
    pub fn step(
        &mut self,
        snapshot: &SensorSnapshot,
        tracked: TrackedDistance,
        tuning: &TuningParameters,
        now: Duration,
        dt: Duration,
        faults: &mut FaultReporter,
    ) -> ControlCommand {
        let limits = tuning.output_limits;
        self.regulator.set_limits(limits);
        let stop = ControlCommand::stop(&limits);

        if faults.take_stop_request() && !self.state.is_emergency_stopped() {
            self.transition(ManeuverState::EmergencyStopped {
                cause: StopCause::MotorFault,
            });
        }

        match self.state {
            ManeuverState::EmergencyStopped { .. } => stop,

            ManeuverState::Following => {
                if is_forward_blocked(snapshot, tuning) {
                    self.transition(ManeuverState::Blocked { since: now });
                    return stop;
                }
                let speeds = self.regulator.compute_speed(
                    tuning.following_distance_cm,
                    tracked,
                    tuning,
                    dt,
                    faults,
                );
                ControlCommand::forward(speeds.left, speeds.right, &limits)
            }

            ManeuverState::Blocked { since } => {
                let waiting = now.saturating_sub(since) < tuning.wait_time();
                if waiting {
                    if !is_forward_blocked(snapshot, tuning) {
                        self.transition(ManeuverState::Following);
                    }
                    return stop;
                }

                if is_rear_clear(snapshot, tuning) {
                    self.transition(ManeuverState::Reversing { started_at: now });
                    ControlCommand::reverse(self.config.reverse_speed, &limits)
                } else {
                    self.emergency_stop(StopCause::BlockedAllSides, faults);
                    stop
                }
            }

            ManeuverState::Reversing { started_at } => {
                if now.saturating_sub(started_at) >= self.config.reverse_timeout() {
                    self.transition(ManeuverState::Following);
                    return stop;
                }

                if is_rear_clear(snapshot, tuning) {
                    ControlCommand::reverse(self.config.reverse_speed, &limits)
                } else {
                    self.emergency_stop(StopCause::RearBlockedDuringReverse, faults);
                    stop
                }
            }
        }
    }

    fn emergency_stop(&mut self, cause: StopCause, faults: &mut FaultReporter) {
        warn!(cause = %cause, "emergency stop");
        self.transition(ManeuverState::EmergencyStopped { cause });
        faults.report(FaultKind::Motor, &cause.to_string());
        // Already stopped; drop the request this report latched.
        let _consumed = faults.take_stop_request();
    }

    fn transition(&mut self, next: ManeuverState) {
        if next == ManeuverState::Following {
            self.regulator.reset();
        }
        if self.state != next {
            info!(from = %self.state, to = %next, "maneuver state change");
        }
        self.state = next;
    }
}
