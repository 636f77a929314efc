//! Motor commands and the actuator interface for the hoverkart control core.
//!
//! The control core produces one [`ControlCommand`] per cycle. The
//! [`Actuator`] clamps it into the active [`SpeedLimits`], sets the direction
//! pins, then writes both PWM channels through a [`MotorDriver`].
//!
//! An [`ActuatorHandle`] shares one actuator between the control loop and the
//! fault recovery hook ([`StopOnMotorFault`]), so a motor fault stops the
//! wheels before `report` returns.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

mod actuator;
mod command;
mod driver;
mod recovery;

pub mod prelude;

pub use actuator::{Actuator, ActuatorHandle};
pub use command::{
    ControlCommand, DEFAULT_REVERSE_SPEED, Direction, MAX_SPEED, MIN_SPEED, SpeedLimits,
};
pub use driver::MotorDriver;
pub use recovery::StopOnMotorFault;
