//! Prelude for convenient imports.

pub use crate::{
    Clock, ControlLoop, CycleReport, CycleScheduler, DistanceLink, DistanceSource, EngineError,
    EngineResult, KartConfig, KartHardware, LinkedDistanceSource, ManualClock, MonotonicClock,
    RunSummary, TrackedDistance,
};
