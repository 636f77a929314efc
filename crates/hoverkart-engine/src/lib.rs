//! The hoverkart control loop.
//!
//! Wires the sensor array, the distance source, the obstacle-avoidance state
//! machine, the fault reporter and the motor actuator into one fixed-rate
//! cycle:
//!
//! ```text
//! clock ─► faults.tick ─► tuning snapshot ─► read_all ─► tracked distance
//!                                                            │
//!        CycleReport ◄── actuator.apply ◄── avoidance.step ◄─┘
//! ```
//!
//! Everything that touches hardware or wall time sits behind a trait
//! ([`Clock`], [`DistanceSource`], and the sensor / motor traits of the lower
//! crates), so the whole loop runs deterministically in tests.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

mod clock;
mod config;
mod control_loop;
mod error;
mod scheduler;

pub mod prelude;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{DEFAULT_CYCLE_PERIOD_MS, KartConfig};
pub use control_loop::{ControlLoop, CycleReport, KartHardware, RunSummary};
pub use error::{EngineError, EngineResult};
pub use hoverkart_control::{
    DistanceLink, DistanceSource, LinkedDistanceSource, MAX_TRACKED_DISTANCE, TrackedDistance,
};
pub use scheduler::{CycleMetrics, CycleScheduler};
