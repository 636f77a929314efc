//! Proximity sensor acquisition for the hoverkart control core.
//!
//! Four pulse-echo ultrasonic transducers (front, left, right, rear) and one
//! long-range finder on a two-wire bus. Every read is bounded by a timeout and
//! yields a [`DistanceReading`]: either a valid distance in centimeters or an
//! explicit invalid marker. Invalid reads also raise a fault on the shared
//! [`FaultReporter`](hoverkart_faults::FaultReporter).
//!
//! Pin and bus access sit behind the [`UltrasonicTransducer`] and
//! [`RangeFinderBus`] traits; board support code provides the implementations.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod array;
pub mod config;
pub mod hardware;
pub mod prelude;
pub mod range_finder;
pub mod reading;
pub mod ultrasonic;

pub use array::{SensorArray, UltrasonicSet};
pub use config::SensorConfig;
pub use hardware::{RangeFinderBus, UltrasonicTransducer};
pub use range_finder::RangeFinder;
pub use reading::{
    Distance, DistanceReading, InvalidReason, MAX_ULTRASONIC_DISTANCE, MIN_SAFE_DISTANCE,
    RANGE_FINDER_MAX_DISTANCE, SensorId, SensorSnapshot,
};
pub use ultrasonic::read_ultrasonic;
