//! Full control cycles against scripted hardware.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use hoverkart_actuator::{ControlCommand, Direction, MIN_SPEED};
use hoverkart_control::{ManeuverState, StopCause};
use hoverkart_engine::prelude::*;
use hoverkart_faults::FaultKind;
use hoverkart_sensors::UltrasonicSet;
use hoverkart_test_helpers::prelude::*;
use parking_lot::Mutex;

const PERIOD: Duration = Duration::from_millis(50);

type Kart = ControlLoop<
    ScriptedUltrasonic,
    ScriptedRangeFinder,
    RecordingMotorDriver,
    LinkedDistanceSource<ScriptedDistanceLink>,
    ManualClock,
>;

struct Rig {
    front: ScriptedUltrasonic,
    rear: ScriptedUltrasonic,
    range: ScriptedRangeFinder,
    driver: RecordingMotorDriver,
    link: ScriptedDistanceLink,
    clock: ManualClock,
    kart: Kart,
}

impl Rig {
    fn new() -> Self {
        Self::with_config(&KartConfig::default())
    }

    fn with_config(config: &KartConfig) -> Self {
        let front = ScriptedUltrasonic::at_cm(CLEAR_CM);
        let rear = ScriptedUltrasonic::at_cm(CLEAR_CM);
        let range = ScriptedRangeFinder::at_cm(500);
        let driver = RecordingMotorDriver::new();
        let link = ScriptedDistanceLink::connected(200);
        let clock = ManualClock::new();

        let hardware = KartHardware {
            ultrasonics: UltrasonicSet {
                front: front.clone(),
                left: ScriptedUltrasonic::at_cm(CLEAR_CM),
                right: ScriptedUltrasonic::at_cm(CLEAR_CM),
                rear: rear.clone(),
            },
            bus: range.clone(),
            driver: driver.clone(),
            distance: LinkedDistanceSource::new(link.clone()),
            clock: clock.clone(),
        };
        let kart = must(ControlLoop::new(config, hardware));

        Self {
            front,
            rear,
            range,
            driver,
            link,
            clock,
            kart,
        }
    }

    fn cycle(&mut self) -> CycleReport {
        let report = self.kart.run_cycle();
        self.clock.advance(PERIOD);
        report
    }
}

fn active_kind(report: &CycleReport) -> Option<FaultKind> {
    report.active_fault.as_ref().map(|f| f.kind)
}

#[test]
fn test_following_cycle_drives_forward() {
    let mut rig = Rig::new();
    let report = rig.cycle();

    assert_eq!(report.cycle, 1);
    assert_eq!(report.state, ManeuverState::Following);
    assert_eq!(report.tracked, TrackedDistance::Cm(200));
    assert_eq!(report.command.direction, Direction::Forward);
    // 100 cm behind the following distance: 2.5*100 + 1000 + 6*100*0.05
    assert_eq!((report.command.left, report.command.right), (1280, 1280));
    assert_eq!(rig.driver.last_pwm(), Some((1280, 1280)));
    assert_eq!(report.active_fault, None);
    assert_eq!(report.snapshot.invalid_count(), 0);
}

#[test]
fn test_start_detects_and_parks_motors() {
    let mut rig = Rig::new();
    assert!(rig.kart.start());
    assert_eq!(rig.driver.last_pwm(), Some((MIN_SPEED, MIN_SPEED)));
    assert_eq!(rig.driver.last_direction(), Some(Direction::Forward));
    assert!(rig.range.writes().iter().any(|(_, bytes)| bytes.is_empty()));
}

#[test]
fn test_start_with_absent_range_finder_reports_fault() {
    let mut rig = Rig::new();
    rig.range.set(RangeReply::Nack);
    assert!(!rig.kart.start());

    let fault = must_some(rig.kart.faults().active_fault(), "detection fault");
    assert_eq!(fault.kind, FaultKind::RangeFinder);
    assert_eq!(fault.message.as_str(), "range finder initialization failed");
}

#[test]
fn test_front_obstacle_reverses_then_emergency_stops() {
    let mut rig = Rig::new();
    rig.front.set(Echo::Cm(10));

    let blocked = rig.cycle();
    assert_eq!(blocked.state, ManeuverState::Blocked { since: Duration::ZERO });
    assert_eq!(blocked.command, ControlCommand::stop(&Default::default()));

    let reversing = rig.cycle();
    assert_eq!(reversing.state, ManeuverState::Reversing { started_at: PERIOD });
    assert_eq!(reversing.command.direction, Direction::Reverse);
    assert_eq!(rig.driver.last_direction(), Some(Direction::Reverse));
    assert_eq!(rig.driver.last_pwm(), Some((MIN_SPEED, MIN_SPEED)));

    rig.rear.set(Echo::Cm(10));
    let stopped = rig.cycle();
    assert_eq!(
        stopped.state,
        ManeuverState::EmergencyStopped {
            cause: StopCause::RearBlockedDuringReverse
        }
    );
    let fault = must_some(stopped.active_fault, "motor fault");
    assert_eq!(fault.kind, FaultKind::Motor);
    assert_eq!(fault.message.as_str(), "rear path blocked during reverse");
    assert_eq!(rig.driver.last_direction(), Some(Direction::Forward));
    assert_eq!(rig.driver.last_pwm(), Some((MIN_SPEED, MIN_SPEED)));
}

#[test]
fn test_emergency_stop_holds_until_reset() {
    let mut rig = Rig::new();
    rig.front.set(Echo::Cm(10));
    rig.rear.set(Echo::Cm(10));

    rig.cycle();
    let stopped = rig.cycle();
    assert_eq!(
        stopped.state,
        ManeuverState::EmergencyStopped {
            cause: StopCause::BlockedAllSides
        }
    );

    rig.front.set(Echo::Cm(CLEAR_CM));
    rig.rear.set(Echo::Cm(CLEAR_CM));
    for _ in 0..5 {
        assert!(rig.cycle().state.is_emergency_stopped());
    }

    rig.kart.reset();
    let resumed = rig.cycle();
    assert_eq!(resumed.state, ManeuverState::Following);
    assert_eq!(resumed.command.direction, Direction::Forward);
    assert!(resumed.command.left > MIN_SPEED);
}

#[test]
fn test_front_timeout_blocks_and_reports_sensor_fault() {
    let mut rig = Rig::new();
    rig.front.set(Echo::Silent);

    let report = rig.cycle();
    assert_eq!(report.state, ManeuverState::Blocked { since: Duration::ZERO });
    assert_eq!(report.snapshot.invalid_count(), 1);
    let fault = must_some(report.active_fault, "sensor fault");
    assert_eq!(fault.kind, FaultKind::Sensor);
    assert_eq!(fault.message.as_str(), "front ultrasonic sensor timeout");
}

#[test]
fn test_disconnected_link_creeps_at_floor() {
    let mut rig = Rig::new();
    rig.link.set_connected(false);

    let report = rig.cycle();
    assert_eq!(report.tracked, TrackedDistance::Invalid);
    assert_eq!(report.state, ManeuverState::Following);
    assert_eq!((report.command.left, report.command.right), (MIN_SPEED, MIN_SPEED));
    assert_eq!(active_kind(&report), Some(FaultKind::Communication));
}

#[test]
fn test_out_of_range_link_value_is_rejected() {
    let mut rig = Rig::new();
    rig.link.set_distance(Some(1500));

    let report = rig.cycle();
    assert_eq!(report.tracked, TrackedDistance::Invalid);
    assert_eq!(active_kind(&report), Some(FaultKind::General));
}

#[test]
fn test_actuator_failure_forces_emergency_stop_next_cycle() {
    let mut rig = Rig::new();
    rig.driver.set_failing(true);

    let first = rig.cycle();
    assert_eq!(first.state, ManeuverState::Following);
    let fault = must_some(first.active_fault, "actuator fault");
    assert_eq!(fault.kind, FaultKind::Motor);
    assert!(fault.message.starts_with("actuator write failed"));

    let second = rig.cycle();
    assert_eq!(
        second.state,
        ManeuverState::EmergencyStopped {
            cause: StopCause::MotorFault
        }
    );
}

#[test]
fn test_fault_expires_after_dwell() {
    let mut rig = Rig::new();
    rig.link.set_connected(false);
    assert_eq!(active_kind(&rig.cycle()), Some(FaultKind::Communication));

    rig.link.set_connected(true);
    rig.clock.advance(Duration::from_millis(5_000));
    let report = rig.cycle();
    assert_eq!(report.active_fault, None);
    assert_eq!(rig.kart.faults().occurrences(FaultKind::Communication), 1);
}

#[test]
fn test_tuning_update_applies_on_next_cycle() {
    let mut rig = Rig::new();
    let first = rig.cycle();
    assert_eq!(first.command.left, 1280);

    let store = rig.kart.tuning().clone();
    must(store.update(|p| p.following_distance_cm = 200));

    // Zero error: only the accumulated integral remains.
    let second = rig.cycle();
    assert_eq!(second.command.left, 1030);
}

#[test]
fn test_output_limits_change_while_running() {
    let mut rig = Rig::new();
    assert_eq!(rig.cycle().command.left, 1280);

    must(rig.kart.tuning().update(|p| p.output_limits.max = 1200));
    let capped = rig.cycle();
    assert_eq!((capped.command.left, capped.command.right), (1200, 1200));
    assert_eq!(rig.driver.last_pwm(), Some((1200, 1200)));
}

#[test]
fn test_rejected_tuning_update_keeps_previous_parameters() {
    let rig = Rig::new();
    let before = rig.kart.tuning().snapshot();
    assert!(rig.kart.tuning().update(|p| p.kp = f64::NAN).is_err());
    assert_eq!(rig.kart.tuning().snapshot(), before);
}

#[test]
fn test_run_for_paces_cycles() {
    let mut rig = Rig::new();
    let mut scheduler = rig.kart.scheduler();

    let summary = rig.kart.run_for(10, &mut scheduler);
    assert_eq!(summary.cycles, 10);
    assert_eq!(summary.final_state, ManeuverState::Following);
    assert_eq!(summary.faults_reported, 0);
    assert_eq!(summary.missed_deadlines, 0);
    assert_eq!(rig.clock.now(), PERIOD * 9);
    assert_eq!(rig.kart.cycles(), 10);
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = KartConfig::default();
    config.cycle_period_ms = 0;

    let hardware = KartHardware {
        ultrasonics: UltrasonicSet {
            front: ScriptedUltrasonic::at_cm(CLEAR_CM),
            left: ScriptedUltrasonic::at_cm(CLEAR_CM),
            right: ScriptedUltrasonic::at_cm(CLEAR_CM),
            rear: ScriptedUltrasonic::at_cm(CLEAR_CM),
        },
        bus: ScriptedRangeFinder::at_cm(500),
        driver: RecordingMotorDriver::new(),
        distance: LinkedDistanceSource::new(ScriptedDistanceLink::connected(100)),
        clock: ManualClock::new(),
    };
    assert!(matches!(
        ControlLoop::new(&config, hardware),
        Err(EngineError::Validation(_))
    ));
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_emergency_stop_is_logged() {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut rig = Rig::new();
        rig.front.set(Echo::Cm(10));
        rig.rear.set(Echo::Cm(10));
        rig.cycle();
        rig.cycle();
    });

    let logs = String::from_utf8_lossy(&buffer.0.lock()).into_owned();
    assert!(logs.contains("emergency stop"), "logs: {logs}");
    assert!(logs.contains("maneuver state change"), "logs: {logs}");
    assert!(logs.contains("path blocked on all sides"), "logs: {logs}");
}

#[test]
fn test_actuator_failure_is_logged_with_category() {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::ERROR)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut rig = Rig::new();
        rig.driver.set_failing(true);
        rig.cycle();
    });

    let logs = String::from_utf8_lossy(&buffer.0.lock()).into_owned();
    assert!(logs.contains("failed to apply motor command"), "logs: {logs}");
    assert!(logs.contains("category=Actuator"), "logs: {logs}");
}
