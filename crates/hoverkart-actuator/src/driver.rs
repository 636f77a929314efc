//! Motor driver hardware seam.

use hoverkart_errors::ActuatorError;

use crate::Direction;

/// Pin-level access to the two wheel motors.
pub trait MotorDriver {
    /// Write PWM commands to the left and right channels.
    ///
    /// # Errors
    ///
    /// Returns an error if either channel rejects the write.
    fn write_pwm(&mut self, left: u16, right: u16) -> Result<(), ActuatorError>;

    /// Drive both direction pins.
    ///
    /// # Errors
    ///
    /// Returns an error if the pins cannot be set.
    fn set_direction(&mut self, direction: Direction) -> Result<(), ActuatorError>;
}

impl<T: MotorDriver + ?Sized> MotorDriver for Box<T> {
    fn write_pwm(&mut self, left: u16, right: u16) -> Result<(), ActuatorError> {
        (**self).write_pwm(left, right)
    }

    fn set_direction(&mut self, direction: Direction) -> Result<(), ActuatorError> {
        (**self).set_direction(direction)
    }
}
