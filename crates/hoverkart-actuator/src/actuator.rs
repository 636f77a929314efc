//! The motor actuator and its shared handle.

use std::sync::Arc;

use hoverkart_errors::ActuatorError;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::{ControlCommand, Direction, MotorDriver, SpeedLimits};

/// Clamps and writes motor commands through a [`MotorDriver`].
#[derive(Debug)]
pub struct Actuator<D> {
    driver: D,
    limits: SpeedLimits,
    last_applied: Option<ControlCommand>,
}

impl<D: MotorDriver> Actuator<D> {
    /// Create an actuator with the given limits.
    pub fn new(driver: D, limits: SpeedLimits) -> Self {
        Self {
            driver,
            limits,
            last_applied: None,
        }
    }

    /// Active limits.
    pub fn limits(&self) -> &SpeedLimits {
        &self.limits
    }

    /// The last command written successfully.
    pub fn last_applied(&self) -> Option<ControlCommand> {
        self.last_applied
    }

    /// Access the driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutable access to the driver.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Clamp both speeds, set direction, then write PWM.
    ///
    /// # Errors
    ///
    /// Returns the driver error; the last applied command is unchanged.
    pub fn set_motor_output(
        &mut self,
        left: u16,
        right: u16,
        direction: Direction,
    ) -> Result<ControlCommand, ActuatorError> {
        let command = ControlCommand {
            left: self.limits.clamp(left),
            right: self.limits.clamp(right),
            direction,
        };

        if self.last_applied.map(|c| c.direction) != Some(direction) {
            debug!(direction = %direction, "setting motor direction");
        }
        self.driver.set_direction(direction)?;
        self.driver.write_pwm(command.left, command.right)?;
        self.last_applied = Some(command);
        Ok(command)
    }

    /// Write a precomputed command.
    ///
    /// # Errors
    ///
    /// Returns the driver error.
    pub fn apply(&mut self, command: &ControlCommand) -> Result<ControlCommand, ActuatorError> {
        self.set_motor_output(command.left, command.right, command.direction)
    }

    /// Neutral speed on both wheels, direction forward.
    ///
    /// # Errors
    ///
    /// Returns the driver error.
    pub fn stop_all(&mut self) -> Result<(), ActuatorError> {
        let stop = ControlCommand::stop(&self.limits);
        info!("stopping all motors");
        self.apply(&stop).map(|_| ())
    }
}

/// Cloneable shared access to one [`Actuator`].
#[derive(Debug)]
pub struct ActuatorHandle<D> {
    inner: Arc<Mutex<Actuator<D>>>,
}

impl<D> Clone for ActuatorHandle<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: MotorDriver> ActuatorHandle<D> {
    /// Wrap an actuator for sharing.
    pub fn new(actuator: Actuator<D>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(actuator)),
        }
    }

    /// See [`Actuator::set_motor_output`].
    ///
    /// # Errors
    ///
    /// Returns the driver error.
    pub fn set_motor_output(
        &self,
        left: u16,
        right: u16,
        direction: Direction,
    ) -> Result<ControlCommand, ActuatorError> {
        self.inner.lock().set_motor_output(left, right, direction)
    }

    /// See [`Actuator::apply`].
    ///
    /// # Errors
    ///
    /// Returns the driver error.
    pub fn apply(&self, command: &ControlCommand) -> Result<ControlCommand, ActuatorError> {
        self.inner.lock().apply(command)
    }

    /// See [`Actuator::stop_all`].
    ///
    /// # Errors
    ///
    /// Returns the driver error.
    pub fn stop_all(&self) -> Result<(), ActuatorError> {
        self.inner.lock().stop_all()
    }

    /// The last command written successfully.
    pub fn last_applied(&self) -> Option<ControlCommand> {
        self.inner.lock().last_applied()
    }

    /// Active limits.
    pub fn limits(&self) -> SpeedLimits {
        *self.inner.lock().limits()
    }
}
