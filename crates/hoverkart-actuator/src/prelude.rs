//! Prelude for convenient imports.

pub use crate::{
    Actuator, ActuatorHandle, ControlCommand, Direction, MotorDriver, SpeedLimits,
    StopOnMotorFault,
};
