//! The per-cycle data flow.

use core::time::Duration;

use hoverkart_actuator::{Actuator, ActuatorHandle, ControlCommand, MotorDriver, StopOnMotorFault};
use hoverkart_control::{
    DistanceSource, ManeuverState, ObstacleAvoidance, TrackedDistance, TuningStore,
};
use hoverkart_errors::HoverkartError;
use hoverkart_faults::{Fault, FaultKind, FaultReporter};
use hoverkart_sensors::{
    RangeFinderBus, SensorArray, SensorSnapshot, UltrasonicSet, UltrasonicTransducer,
};
use tracing::{debug, error, info};

use crate::{Clock, CycleScheduler, EngineResult, KartConfig};

/// Hardware and environment the loop runs against.
#[derive(Debug)]
pub struct KartHardware<U, B, D, S, C> {
    /// Front, left, right and rear ultrasonic transducers.
    pub ultrasonics: UltrasonicSet<U>,
    /// Bus of the long-range finder.
    pub bus: B,
    /// Motor controller.
    pub driver: D,
    /// Distance to the tracked source.
    pub distance: S,
    /// Time source.
    pub clock: C,
}

/// Outcome of one control cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Cycle index, starting at 1.
    pub cycle: u64,
    /// Clock time at the start of the cycle.
    pub now: Duration,
    /// Maneuver state after the step.
    pub state: ManeuverState,
    /// Command handed to the actuator.
    pub command: ControlCommand,
    /// Sensor readings of the cycle.
    pub snapshot: SensorSnapshot,
    /// Tracked distance of the cycle.
    pub tracked: TrackedDistance,
    /// Fault active at the end of the cycle.
    pub active_fault: Option<Fault>,
}

/// Outcome of [`ControlLoop::run_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Cycles executed.
    pub cycles: u64,
    /// Maneuver state after the last cycle.
    pub final_state: ManeuverState,
    /// Faults reported since the loop was built.
    pub faults_reported: u32,
    /// Scheduler deadlines missed during the run.
    pub missed_deadlines: u64,
}

/// Fixed-rate control loop of one kart.
pub struct ControlLoop<U, B, D, S, C> {
    sensors: SensorArray<U, B>,
    actuator: ActuatorHandle<D>,
    distance: S,
    clock: C,
    faults: FaultReporter,
    tuning: TuningStore,
    avoidance: ObstacleAvoidance,
    period: Duration,
    last_cycle_at: Option<Duration>,
    cycles: u64,
}

impl<U, B, D, S, C> core::fmt::Debug for ControlLoop<U, B, D, S, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ControlLoop")
            .field("state", &self.avoidance.state())
            .field("period", &self.period)
            .field("cycles", &self.cycles)
            .field("faults", &self.faults)
            .finish_non_exhaustive()
    }
}

impl<U, B, D, S, C> ControlLoop<U, B, D, S, C>
where
    U: UltrasonicTransducer,
    B: RangeFinderBus,
    D: MotorDriver + Send + 'static,
    S: DistanceSource,
    C: Clock,
{
    /// Build a loop from a validated configuration.
    ///
    /// Motor faults stop both motors synchronously through the recovery hook.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Validation`] if `config` is invalid.
    pub fn new(config: &KartConfig, hardware: KartHardware<U, B, D, S, C>) -> EngineResult<Self> {
        config.validate()?;

        let KartHardware {
            ultrasonics,
            bus,
            driver,
            distance,
            clock,
        } = hardware;

        let actuator = ActuatorHandle::new(Actuator::new(driver, config.avoidance.limits));
        let faults = FaultReporter::with_config(config.faults)?
            .with_recovery_hook(StopOnMotorFault::new(actuator.clone()));
        let tuning = TuningStore::new(config.tuning)?;

        Ok(Self {
            sensors: SensorArray::new(ultrasonics, bus, config.sensors),
            actuator,
            distance,
            clock,
            faults,
            tuning,
            avoidance: ObstacleAvoidance::new(config.avoidance),
            period: config.cycle_period(),
            last_cycle_at: None,
            cycles: 0,
        })
    }

    /// Check for the range finder and put both motors at neutral.
    ///
    /// A failed check is reported as a `RangeFinder` fault and the loop still
    /// starts; returns whether the range finder answered.
    pub fn start(&mut self) -> bool {
        self.faults.update_time(self.clock.now());
        let detected = self.sensors.detect_range_finder(&mut self.faults);
        if let Err(e) = self.actuator.stop_all() {
            self.faults
                .report(FaultKind::Motor, &format!("actuator write failed: {e}"));
        }
        info!(
            range_finder = detected,
            period = ?self.period,
            "control loop started"
        );
        detected
    }

    /// Run one control cycle.
    pub fn run_cycle(&mut self) -> CycleReport {
        let now = self.clock.now();
        let dt = match self.last_cycle_at {
            Some(last) => now.saturating_sub(last),
            None => self.period,
        };
        self.last_cycle_at = Some(now);
        self.cycles = self.cycles.saturating_add(1);

        self.faults.update_time(now);
        if self.faults.tick() {
            debug!(cycle = self.cycles, "active fault expired");
        }

        let tuning = self.tuning.snapshot();
        let snapshot = self.sensors.read_all(&mut self.faults);
        let tracked = self.distance.tracked_distance(&mut self.faults);

        let command = self
            .avoidance
            .step(&snapshot, tracked, &tuning, now, dt, &mut self.faults);

        if let Err(e) = self.actuator.apply(&command) {
            let message = format!("actuator write failed: {e}");
            let err = HoverkartError::from(e);
            error!(
                cycle = self.cycles,
                category = %err.category(),
                severity = ?err.severity(),
                error = %err,
                "failed to apply motor command"
            );
            self.faults.report(FaultKind::Motor, &message);
        }

        CycleReport {
            cycle: self.cycles,
            now,
            state: self.avoidance.state(),
            command,
            snapshot,
            tracked,
            active_fault: self.faults.active_fault().cloned(),
        }
    }

    /// Run `cycles` cycles paced by `scheduler`.
    pub fn run_for(&mut self, cycles: u64, scheduler: &mut CycleScheduler) -> RunSummary {
        let missed_before = scheduler.metrics().missed_deadlines;
        for _ in 0..cycles {
            scheduler.wait_for_tick(&self.clock);
            let _report = self.run_cycle();
        }
        RunSummary {
            cycles,
            final_state: self.avoidance.state(),
            faults_reported: self.faults.total_reported(),
            missed_deadlines: scheduler
                .metrics()
                .missed_deadlines
                .saturating_sub(missed_before),
        }
    }

    /// External re-arm: return to `Following` and drop any pending stop.
    pub fn reset(&mut self) {
        let _dropped = self.faults.take_stop_request();
        self.avoidance.reset();
    }

    /// A scheduler paced at the configured cycle period.
    pub fn scheduler(&self) -> CycleScheduler {
        CycleScheduler::new(self.period)
    }

    /// Shared tuning store; clone it to hand to a configuration endpoint.
    pub fn tuning(&self) -> &TuningStore {
        &self.tuning
    }

    /// The fault reporter.
    pub fn faults(&self) -> &FaultReporter {
        &self.faults
    }

    /// Mutable access to the fault reporter, for reporting external faults.
    pub fn faults_mut(&mut self) -> &mut FaultReporter {
        &mut self.faults
    }

    /// Current maneuver state.
    pub fn state(&self) -> ManeuverState {
        self.avoidance.state()
    }

    /// Shared actuator handle.
    pub fn actuator(&self) -> &ActuatorHandle<D> {
        &self.actuator
    }

    /// Mutable access to the distance source.
    pub fn distance_mut(&mut self) -> &mut S {
        &mut self.distance
    }

    /// Mutable access to the sensor array.
    pub fn sensors_mut(&mut self) -> &mut SensorArray<U, B> {
        &mut self.sensors
    }

    /// Cycles run so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}
