//! End-to-end state machine scenarios.

use core::time::Duration;

use hoverkart_actuator::{ControlCommand, Direction, MAX_SPEED, MIN_SPEED, SpeedLimits};
use hoverkart_control::prelude::*;
use hoverkart_faults::{FaultKind, FaultReporter};
use hoverkart_sensors::{Distance, InvalidReason, SensorSnapshot};

const DT: Duration = Duration::from_millis(50);

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn snapshot(front: u16, left: u16, right: u16, rear: u16, long_range: u16) -> SensorSnapshot {
    SensorSnapshot::new(
        Distance::Valid(front),
        Distance::Valid(left),
        Distance::Valid(right),
        Distance::Valid(rear),
        Distance::Valid(long_range),
    )
}

struct Rig {
    avoidance: ObstacleAvoidance,
    faults: FaultReporter,
    tuning: TuningParameters,
}

impl Rig {
    fn new() -> Self {
        Self {
            avoidance: ObstacleAvoidance::new(AvoidanceConfig::default()),
            faults: FaultReporter::new(),
            tuning: TuningParameters::default(),
        }
    }

    fn step(&mut self, now: Duration, snap: SensorSnapshot, tracked: TrackedDistance) -> ControlCommand {
        self.faults.update_time(now);
        self.avoidance
            .step(&snap, tracked, &self.tuning, now, DT, &mut self.faults)
    }

    fn enter_reversing(&mut self) {
        let blocked_front = snapshot(10, 100, 100, 100, 500);
        self.step(ms(0), blocked_front, TrackedDistance::Cm(150));
        self.step(ms(50), blocked_front, TrackedDistance::Cm(150));
        assert_eq!(
            self.avoidance.state(),
            ManeuverState::Reversing { started_at: ms(50) }
        );
    }
}

fn stop() -> ControlCommand {
    ControlCommand::stop(&SpeedLimits::default())
}

#[test]
fn scenario_front_blocked_rear_clear_starts_reversing() {
    let mut rig = Rig::new();
    let snap = snapshot(10, 100, 100, 100, 500);

    let first = rig.step(ms(0), snap, TrackedDistance::Cm(150));
    assert_eq!(first, stop());
    assert_eq!(rig.avoidance.state(), ManeuverState::Blocked { since: ms(0) });

    let second = rig.step(ms(50), snap, TrackedDistance::Cm(150));
    assert!(matches!(rig.avoidance.state(), ManeuverState::Reversing { .. }));
    assert_eq!(
        second,
        ControlCommand {
            left: 1000,
            right: 1000,
            direction: Direction::Reverse,
        }
    );
    assert!(!rig.faults.is_active());
}

#[test]
fn scenario_reverse_timeout_returns_to_following() {
    let mut rig = Rig::new();
    rig.enter_reversing();
    let rear_clear = snapshot(10, 100, 100, 100, 500);

    let mid = rig.step(ms(1_050), rear_clear, TrackedDistance::Cm(150));
    assert_eq!(mid.direction, Direction::Reverse);

    let after = rig.step(ms(6_050), rear_clear, TrackedDistance::Cm(150));
    assert_eq!(rig.avoidance.state(), ManeuverState::Following);
    assert_eq!(after.direction, Direction::Forward);
    assert_eq!(after, stop());
    assert!(rig.avoidance.regulator().left().is_fresh());
}

#[test]
fn scenario_rear_blocked_mid_reverse_stops() {
    let mut rig = Rig::new();
    rig.enter_reversing();

    let cmd = rig.step(ms(1_050), snapshot(10, 100, 100, 20, 500), TrackedDistance::Cm(150));
    assert_eq!(cmd, stop());
    assert_eq!(
        rig.avoidance.state(),
        ManeuverState::EmergencyStopped {
            cause: StopCause::RearBlockedDuringReverse
        }
    );
    let fault = rig.faults.active_fault().map(|f| (f.kind, f.message.as_str().to_owned()));
    assert_eq!(
        fault,
        Some((FaultKind::Motor, "rear path blocked during reverse".to_owned()))
    );
}

#[test]
fn scenario_negative_tracked_distance_yields_floor() {
    let mut faults = FaultReporter::new();
    let mut regulator = SpeedRegulator::new(SpeedLimits::default());

    let speeds = regulator.compute_speed(
        100,
        TrackedDistance::Cm(-5),
        &TuningParameters::default(),
        DT,
        &mut faults,
    );
    assert_eq!(speeds, WheelSpeeds::both(MIN_SPEED));
    assert_eq!(faults.active_fault().map(|f| f.kind), Some(FaultKind::General));
}

#[test]
fn scenario_clear_path_regulates_between_limits() {
    let mut rig = Rig::new();
    let cmd = rig.step(ms(0), snapshot(50, 50, 50, 100, 500), TrackedDistance::Cm(200));

    assert_eq!(rig.avoidance.state(), ManeuverState::Following);
    assert_eq!(cmd.direction, Direction::Forward);
    assert!(cmd.left > MIN_SPEED && cmd.left < MAX_SPEED, "left = {}", cmd.left);
    assert!(cmd.right > MIN_SPEED && cmd.right < MAX_SPEED, "right = {}", cmd.right);
    assert_eq!(cmd.left, 1280);
}

#[test]
fn test_blocked_on_all_sides_emergency_stops() {
    let mut rig = Rig::new();
    let boxed_in = snapshot(10, 100, 100, 10, 500);

    rig.step(ms(0), boxed_in, TrackedDistance::Cm(150));
    let cmd = rig.step(ms(50), boxed_in, TrackedDistance::Cm(150));

    assert_eq!(cmd, stop());
    assert_eq!(
        rig.avoidance.state(),
        ManeuverState::EmergencyStopped {
            cause: StopCause::BlockedAllSides
        }
    );
    assert_eq!(
        rig.faults.active_fault().map(|f| f.message.as_str().to_owned()),
        Some("path blocked on all sides".to_owned())
    );
}

#[test]
fn test_emergency_stop_is_sticky_until_reset() {
    let mut rig = Rig::new();
    let boxed_in = snapshot(10, 100, 100, 10, 500);
    rig.step(ms(0), boxed_in, TrackedDistance::Cm(150));
    rig.step(ms(50), boxed_in, TrackedDistance::Cm(150));

    // Fault dwell expires, obstacles vanish: still stopped.
    let open = snapshot(300, 300, 300, 300, 800);
    rig.faults.update_time(ms(10_000));
    assert!(rig.faults.tick());
    let cmd = rig.step(ms(10_000), open, TrackedDistance::Cm(300));
    assert_eq!(cmd, stop());
    assert!(rig.avoidance.state().is_emergency_stopped());

    rig.avoidance.reset();
    let cmd = rig.step(ms(10_050), open, TrackedDistance::Cm(300));
    assert_eq!(rig.avoidance.state(), ManeuverState::Following);
    assert!(cmd.left > MIN_SPEED);
}

#[test]
fn test_external_motor_fault_forces_emergency_stop() {
    let mut rig = Rig::new();
    let open = snapshot(300, 300, 300, 300, 800);
    rig.step(ms(0), open, TrackedDistance::Cm(200));

    rig.faults.report(FaultKind::Motor, "motor controller disconnected");
    let cmd = rig.step(ms(50), open, TrackedDistance::Cm(200));

    assert_eq!(cmd, stop());
    assert_eq!(
        rig.avoidance.state(),
        ManeuverState::EmergencyStopped {
            cause: StopCause::MotorFault
        }
    );
}

#[test]
fn test_invalid_side_reading_blocks() {
    let mut rig = Rig::new();
    let snap = SensorSnapshot::new(
        Distance::Valid(200),
        Distance::Invalid(InvalidReason::Timeout),
        Distance::Valid(200),
        Distance::Valid(200),
        Distance::Valid(800),
    );
    let cmd = rig.step(ms(0), snap, TrackedDistance::Cm(200));
    assert_eq!(cmd, stop());
    assert!(matches!(rig.avoidance.state(), ManeuverState::Blocked { .. }));
}

#[test]
fn test_invalid_long_range_does_not_block_but_close_one_does() {
    let mut rig = Rig::new();
    let snap = SensorSnapshot::new(
        Distance::Valid(200),
        Distance::Valid(200),
        Distance::Valid(200),
        Distance::Valid(200),
        Distance::Invalid(InvalidReason::OutOfRange),
    );
    rig.step(ms(0), snap, TrackedDistance::Cm(200));
    assert_eq!(rig.avoidance.state(), ManeuverState::Following);

    rig.step(ms(50), snapshot(200, 200, 200, 200, 25), TrackedDistance::Cm(200));
    assert!(matches!(rig.avoidance.state(), ManeuverState::Blocked { .. }));
}

#[test]
fn test_invalid_tracked_distance_creeps_at_floor() {
    let mut rig = Rig::new();
    let cmd = rig.step(ms(0), snapshot(200, 200, 200, 200, 800), TrackedDistance::Invalid);
    assert_eq!(cmd, ControlCommand::forward(MIN_SPEED, MIN_SPEED, &SpeedLimits::default()));
    assert_eq!(rig.avoidance.state(), ManeuverState::Following);
}

#[test]
fn test_wait_mode_holds_then_resumes_when_clear() {
    let mut rig = Rig::new();
    rig.tuning.wait_time_s = 2;
    let blocked = snapshot(10, 100, 100, 100, 500);
    let open = snapshot(200, 200, 200, 200, 800);

    rig.step(ms(0), blocked, TrackedDistance::Cm(150));
    let held = rig.step(ms(1_000), blocked, TrackedDistance::Cm(150));
    assert_eq!(held, stop());
    assert!(matches!(rig.avoidance.state(), ManeuverState::Blocked { .. }));

    rig.step(ms(1_500), open, TrackedDistance::Cm(150));
    assert_eq!(rig.avoidance.state(), ManeuverState::Following);
}

#[test]
fn test_wait_mode_reverses_after_wait_expires() {
    let mut rig = Rig::new();
    rig.tuning.wait_time_s = 2;
    let blocked = snapshot(10, 100, 100, 100, 500);

    rig.step(ms(0), blocked, TrackedDistance::Cm(150));
    rig.step(ms(1_950), blocked, TrackedDistance::Cm(150));
    assert!(matches!(rig.avoidance.state(), ManeuverState::Blocked { .. }));

    let cmd = rig.step(ms(2_000), blocked, TrackedDistance::Cm(150));
    assert_eq!(cmd.direction, Direction::Reverse);
}

#[test]
fn test_retuning_keeps_integrator() {
    let mut rig = Rig::new();
    let open = snapshot(300, 300, 300, 300, 800);
    rig.step(ms(0), open, TrackedDistance::Cm(200));
    let before = rig.avoidance.regulator().left().output_sum();

    rig.tuning.kp = 10.0;
    rig.step(ms(50), open, TrackedDistance::Cm(200));
    assert!(rig.avoidance.regulator().left().output_sum() > before);
    assert!(!rig.avoidance.regulator().left().is_fresh());
}

#[test]
fn test_output_limits_retuned_mid_run() {
    let mut rig = Rig::new();
    let open = snapshot(300, 300, 300, 300, 800);
    let first = rig.step(ms(0), open, TrackedDistance::Cm(200));
    assert_eq!(first.left, 1280);

    rig.tuning.output_limits = SpeedLimits {
        min: 1100,
        max: 1200,
        neutral: 1100,
    };
    let capped = rig.step(ms(50), open, TrackedDistance::Cm(200));
    assert_eq!((capped.left, capped.right), (1200, 1200));
    assert_eq!(rig.avoidance.regulator().limits().max, 1200);

    let floor = rig.step(ms(100), open, TrackedDistance::Invalid);
    assert_eq!((floor.left, floor.right), (1100, 1100));

    let blocked = rig.step(ms(150), snapshot(10, 300, 300, 300, 800), TrackedDistance::Cm(200));
    assert_eq!(blocked, ControlCommand::stop(&rig.tuning.output_limits));
    assert_eq!(blocked.left, 1100);
}
