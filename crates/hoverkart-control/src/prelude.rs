//! Prelude for convenient imports.

pub use crate::{
    AvoidanceConfig, DistanceLink, DistanceSource, LinkedDistanceSource, ManeuverState,
    ObstacleAvoidance, SpeedRegulator, StopCause, TrackedDistance, TuningParameters, TuningStore,
    WheelSpeeds,
};
