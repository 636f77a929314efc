//! Recovery hook that stops the motors on an immediate-stop fault.

use hoverkart_faults::{FaultAction, FaultKind, RecoveryHook};
use tracing::error;

use crate::{ActuatorHandle, MotorDriver};

/// Stops both motors when a fault dispatches [`FaultAction::ImmediateStop`].
#[derive(Debug)]
pub struct StopOnMotorFault<D> {
    actuator: ActuatorHandle<D>,
}

impl<D> Clone for StopOnMotorFault<D> {
    fn clone(&self) -> Self {
        Self {
            actuator: self.actuator.clone(),
        }
    }
}

impl<D: MotorDriver> StopOnMotorFault<D> {
    /// Create a hook bound to `actuator`.
    pub fn new(actuator: ActuatorHandle<D>) -> Self {
        Self { actuator }
    }
}

impl<D: MotorDriver + Send> RecoveryHook for StopOnMotorFault<D> {
    fn on_fault(&mut self, kind: FaultKind, action: FaultAction) {
        if !action.stops_motion() {
            return;
        }
        if let Err(e) = self.actuator.stop_all() {
            error!(kind = %kind, error = %e, "emergency stop failed");
        }
    }
}
