//! Convenience re-exports for common test utilities.

pub use crate::fixtures::{CLEAR_CM, SnapshotBuilder, clear_snapshot};
pub use crate::mock::{
    Echo, MotorCall, RangeReply, RecordingMotorDriver, ScriptedDistanceLink, ScriptedRangeFinder,
    ScriptedUltrasonic, echo_for_cm,
};
pub use crate::must::{must, must_some, must_with};

/// Result type for tests that propagate errors with `?`.
pub type TestResult = Result<(), Box<dyn std::error::Error>>;
