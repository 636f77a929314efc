//! Scripted hardware for driving the control core in tests.
//!
//! Every mock is a cheap handle over shared state: keep a clone in the test,
//! move the other into the code under test, and script or inspect through the
//! clone while it runs.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use hoverkart_actuator::{Direction, MotorDriver};
use hoverkart_control::DistanceLink;
use hoverkart_errors::{ActuatorError, SensorError};
use hoverkart_sensors::config::SPEED_OF_SOUND_CM_PER_US;
use hoverkart_sensors::{RangeFinderBus, UltrasonicTransducer};
use parking_lot::Mutex;

/// Echo width that converts back to exactly `cm` whole centimeters.
pub fn echo_for_cm(cm: u16) -> Duration {
    let micros = (f64::from(cm) * 2.0 / SPEED_OF_SOUND_CM_PER_US).ceil() as u64;
    Duration::from_micros(micros + 1)
}

/// Outcome of one ultrasonic measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    /// Echo of an obstacle at this distance.
    Cm(u16),
    /// No echo before the timeout.
    Silent,
    /// The trigger pin fails.
    PinFault,
}

#[derive(Debug)]
struct Script<T> {
    queued: VecDeque<T>,
    steady: T,
}

impl<T: Copy> Script<T> {
    fn new(steady: T) -> Self {
        Self {
            queued: VecDeque::new(),
            steady,
        }
    }

    fn next(&mut self) -> T {
        self.queued.pop_front().unwrap_or(self.steady)
    }
}

#[derive(Debug)]
struct UltrasonicState {
    script: Script<Echo>,
    current: Echo,
    triggers: u32,
}

/// Ultrasonic transducer returning scripted echoes.
///
/// Queued echoes are consumed one per measurement; afterwards the steady echo
/// repeats.
#[derive(Debug, Clone)]
pub struct ScriptedUltrasonic {
    state: Arc<Mutex<UltrasonicState>>,
}

impl ScriptedUltrasonic {
    /// Transducer that always returns `echo`.
    pub fn new(echo: Echo) -> Self {
        Self {
            state: Arc::new(Mutex::new(UltrasonicState {
                script: Script::new(echo),
                current: echo,
                triggers: 0,
            })),
        }
    }

    /// Transducer that always sees an obstacle at `cm`.
    pub fn at_cm(cm: u16) -> Self {
        Self::new(Echo::Cm(cm))
    }

    /// Transducer that never hears an echo.
    pub fn silent() -> Self {
        Self::new(Echo::Silent)
    }

    /// Replace the steady echo and drop anything queued.
    pub fn set(&self, echo: Echo) {
        let mut state = self.state.lock();
        state.script.queued.clear();
        state.script.steady = echo;
    }

    /// Queue a one-shot echo ahead of the steady one.
    pub fn push(&self, echo: Echo) {
        self.state.lock().script.queued.push_back(echo);
    }

    /// Number of triggers so far.
    pub fn triggers(&self) -> u32 {
        self.state.lock().triggers
    }
}

impl UltrasonicTransducer for ScriptedUltrasonic {
    fn trigger(&mut self) -> Result<(), SensorError> {
        let mut state = self.state.lock();
        state.triggers += 1;
        state.current = state.script.next();
        match state.current {
            Echo::PinFault => Err(SensorError::pin_fault("ultrasonic", "trigger pin stuck")),
            _ => Ok(()),
        }
    }

    fn measure_echo(&mut self, _timeout: Duration) -> Result<Option<Duration>, SensorError> {
        match self.state.lock().current {
            Echo::Cm(cm) => Ok(Some(echo_for_cm(cm))),
            Echo::Silent => Ok(None),
            Echo::PinFault => Err(SensorError::pin_fault("ultrasonic", "echo pin stuck")),
        }
    }
}

/// Outcome of one range finder transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeReply {
    /// Device answers with this distance.
    Cm(u16),
    /// Device does not acknowledge its address.
    Nack,
    /// Device answers with a single byte.
    Short,
}

#[derive(Debug)]
struct RangeFinderState {
    script: Script<RangeReply>,
    current: RangeReply,
    writes: Vec<(u8, Vec<u8>)>,
}

/// Range finder bus returning scripted replies.
///
/// Each measure-register write advances the script; presence checks (empty writes)
/// only look at the steady reply.
#[derive(Debug, Clone)]
pub struct ScriptedRangeFinder {
    state: Arc<Mutex<RangeFinderState>>,
}

impl ScriptedRangeFinder {
    /// Bus that always replies with `reply`.
    pub fn new(reply: RangeReply) -> Self {
        Self {
            state: Arc::new(Mutex::new(RangeFinderState {
                script: Script::new(reply),
                current: reply,
                writes: Vec::new(),
            })),
        }
    }

    /// Device that always measures `cm`.
    pub fn at_cm(cm: u16) -> Self {
        Self::new(RangeReply::Cm(cm))
    }

    /// Device that never acknowledges.
    pub fn absent() -> Self {
        Self::new(RangeReply::Nack)
    }

    /// Replace the steady reply and drop anything queued.
    pub fn set(&self, reply: RangeReply) {
        let mut state = self.state.lock();
        state.script.queued.clear();
        state.script.steady = reply;
    }

    /// Queue a one-shot reply.
    pub fn push(&self, reply: RangeReply) {
        self.state.lock().script.queued.push_back(reply);
    }

    /// Every write so far, as `(address, bytes)`.
    pub fn writes(&self) -> Vec<(u8, Vec<u8>)> {
        self.state.lock().writes.clone()
    }
}

impl RangeFinderBus for ScriptedRangeFinder {
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), SensorError> {
        let mut state = self.state.lock();
        state.writes.push((address, bytes.to_vec()));
        let reply = if bytes.is_empty() {
            state.script.steady
        } else {
            state.script.next()
        };
        state.current = reply;
        match reply {
            RangeReply::Nack => Err(SensorError::bus_nack(address)),
            _ => Ok(()),
        }
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, SensorError> {
        match self.state.lock().current {
            RangeReply::Cm(cm) => {
                let bytes = cm.to_be_bytes();
                let n = buf.len().min(bytes.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            RangeReply::Short => match buf.first_mut() {
                Some(b) => {
                    *b = 0;
                    Ok(1)
                }
                None => Ok(0),
            },
            RangeReply::Nack => Err(SensorError::bus_nack(address)),
        }
    }
}

/// One call received by a [`RecordingMotorDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorCall {
    /// `write_pwm(left, right)`.
    Pwm(u16, u16),
    /// `set_direction(direction)`.
    Direction(Direction),
}

#[derive(Debug, Default)]
struct MotorState {
    calls: Vec<MotorCall>,
    failing: bool,
}

/// Motor driver that records every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingMotorDriver {
    state: Arc<Mutex<MotorState>>,
}

impl RecordingMotorDriver {
    /// A working driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// A driver whose PWM writes fail.
    pub fn failing() -> Self {
        let driver = Self::new();
        driver.set_failing(true);
        driver
    }

    /// Make PWM writes fail or succeed.
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().failing = failing;
    }

    /// Every call so far.
    pub fn calls(&self) -> Vec<MotorCall> {
        self.state.lock().calls.clone()
    }

    /// PWM writes so far, as `(left, right)`.
    pub fn pwm_writes(&self) -> Vec<(u16, u16)> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                MotorCall::Pwm(l, r) => Some((*l, *r)),
                MotorCall::Direction(_) => None,
            })
            .collect()
    }

    /// Most recent PWM write.
    pub fn last_pwm(&self) -> Option<(u16, u16)> {
        self.pwm_writes().last().copied()
    }

    /// Most recent direction.
    pub fn last_direction(&self) -> Option<Direction> {
        self.state.lock().calls.iter().rev().find_map(|c| match c {
            MotorCall::Direction(d) => Some(*d),
            MotorCall::Pwm(..) => None,
        })
    }

    /// Forget recorded calls.
    pub fn clear(&self) {
        self.state.lock().calls.clear();
    }
}

impl MotorDriver for RecordingMotorDriver {
    fn write_pwm(&mut self, left: u16, right: u16) -> Result<(), ActuatorError> {
        let mut state = self.state.lock();
        if state.failing {
            return Err(ActuatorError::pwm_write_failed("left", "driver not responding"));
        }
        state.calls.push(MotorCall::Pwm(left, right));
        Ok(())
    }

    fn set_direction(&mut self, direction: Direction) -> Result<(), ActuatorError> {
        self.state.lock().calls.push(MotorCall::Direction(direction));
        Ok(())
    }
}

#[derive(Debug)]
struct LinkState {
    connected: bool,
    distance: Option<i32>,
}

/// Distance link with a scripted connection and latest value.
#[derive(Debug, Clone)]
pub struct ScriptedDistanceLink {
    state: Arc<Mutex<LinkState>>,
}

impl ScriptedDistanceLink {
    /// Connected link reporting `cm`.
    pub fn connected(cm: i32) -> Self {
        Self {
            state: Arc::new(Mutex::new(LinkState {
                connected: true,
                distance: Some(cm),
            })),
        }
    }

    /// Link with no peer.
    pub fn disconnected() -> Self {
        Self {
            state: Arc::new(Mutex::new(LinkState {
                connected: false,
                distance: None,
            })),
        }
    }

    /// Connect or disconnect the peer.
    pub fn set_connected(&self, connected: bool) {
        self.state.lock().connected = connected;
    }

    /// Set the value delivered on every read.
    pub fn set_distance(&self, distance: Option<i32>) {
        self.state.lock().distance = distance;
    }
}

impl DistanceLink for ScriptedDistanceLink {
    fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    fn latest_distance(&mut self) -> Option<i32> {
        self.state.lock().distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoverkart_sensors::SensorConfig;

    #[test]
    fn test_echo_for_cm_round_trips_through_conversion() {
        let config = SensorConfig::default();
        for cm in [1u16, 17, 29, 30, 31, 100, 250, 399] {
            let us = echo_for_cm(cm).as_micros() as f64;
            let back = (us * config.speed_of_sound_cm_per_us / 2.0) as u16;
            assert_eq!(back, cm);
        }
    }

    #[test]
    fn test_ultrasonic_queue_then_steady() {
        let mut sensor = ScriptedUltrasonic::at_cm(100);
        let handle = sensor.clone();
        handle.push(Echo::Silent);

        sensor.trigger().unwrap();
        assert_eq!(sensor.measure_echo(Duration::ZERO).unwrap(), None);
        sensor.trigger().unwrap();
        assert_eq!(
            sensor.measure_echo(Duration::ZERO).unwrap(),
            Some(echo_for_cm(100))
        );
        assert_eq!(handle.triggers(), 2);
    }

    #[test]
    fn test_range_finder_encodes_big_endian() {
        let mut bus = ScriptedRangeFinder::at_cm(0x0102);
        bus.write(0x62, &[0x00]).unwrap();
        let mut buf = [0u8; 2];
        assert_eq!(bus.read(0x62, &mut buf).unwrap(), 2);
        assert_eq!(buf, [0x01, 0x02]);
    }

    #[test]
    fn test_recording_driver_shares_log() {
        let mut driver = RecordingMotorDriver::new();
        let handle = driver.clone();
        driver.set_direction(Direction::Reverse).unwrap();
        driver.write_pwm(1000, 1000).unwrap();
        assert_eq!(handle.last_pwm(), Some((1000, 1000)));
        assert_eq!(handle.last_direction(), Some(Direction::Reverse));

        handle.set_failing(true);
        assert!(driver.write_pwm(1500, 1500).is_err());
        assert_eq!(handle.pwm_writes().len(), 1);
    }
}
