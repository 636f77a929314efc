//! Control law and safety logic for the hoverkart.
//!
//! - [`regulator`]: per-wheel PID holding the following distance to the
//!   tracked source
//! - [`avoidance`]: the obstacle-avoidance / reverse-maneuver state machine
//! - [`tuning`]: live-tunable parameters and the shared store the
//!   configuration endpoint writes into
//! - [`distance`]: the tracked-source distance seam
//!
//! # State machine
//!
//! ```text
//!   ┌───────────┐ front/side blocked ┌───────────┐  rear clear  ┌───────────┐
//!   │ Following │ ─────────────────► │  Blocked  │ ───────────► │ Reversing │
//!   └───────────┘                    └─────┬─────┘              └─────┬─────┘
//!         ▲                                │ rear blocked             │
//!         │  reverse timeout               ▼                          │ rear blocked
//!         └──────────────────────── ┌──────────────────┐ ◄────────────┘
//!                                   │ EmergencyStopped │  (external reset only)
//!                                   └──────────────────┘
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod avoidance;
pub mod distance;
pub mod pid;
pub mod prelude;
pub mod regulator;
pub mod tuning;

pub use avoidance::{
    AvoidanceConfig, DEFAULT_REVERSE_TIMEOUT_MS, ManeuverState, ObstacleAvoidance, StopCause,
    is_forward_blocked, is_rear_clear,
};
pub use distance::{DistanceLink, DistanceSource, LinkedDistanceSource, MAX_TRACKED_DISTANCE};
pub use pid::{PidController, PidGains};
pub use regulator::{SpeedRegulator, TrackedDistance, WheelSpeeds};
pub use tuning::{TuningParameters, TuningStore};
