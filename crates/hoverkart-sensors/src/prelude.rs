//! Prelude for convenient imports.

pub use crate::{
    MAX_ULTRASONIC_DISTANCE, MIN_SAFE_DISTANCE, RANGE_FINDER_MAX_DISTANCE,
    Distance, DistanceReading, InvalidReason, RangeFinder, RangeFinderBus, SensorArray,
    SensorConfig, SensorId, SensorSnapshot, UltrasonicSet, UltrasonicTransducer,
};
