//! Hardware seams for proximity sensors.

use core::time::Duration;

use hoverkart_errors::SensorError;

/// A pulse-echo ultrasonic transducer.
pub trait UltrasonicTransducer {
    /// Emit the trigger pulse: 2 µs low, 10 µs high, then low.
    ///
    /// # Errors
    ///
    /// Returns an error if the trigger pin cannot be driven.
    fn trigger(&mut self) -> Result<(), SensorError>;

    /// Wait for the echo pulse and return its high time.
    ///
    /// Returns `Ok(None)` when no echo starts and ends before `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the echo pin cannot be sampled.
    fn measure_echo(&mut self, timeout: Duration) -> Result<Option<Duration>, SensorError>;
}

impl<T: UltrasonicTransducer + ?Sized> UltrasonicTransducer for Box<T> {
    fn trigger(&mut self) -> Result<(), SensorError> {
        (**self).trigger()
    }

    fn measure_echo(&mut self, timeout: Duration) -> Result<Option<Duration>, SensorError> {
        (**self).measure_echo(timeout)
    }
}

/// A two-wire bus carrying the long-range finder.
///
/// Each transfer is bounded by a timeout inside the implementation.
pub trait RangeFinderBus {
    /// Write `bytes` to the device at `address`. An empty write is an
    /// address check.
    ///
    /// # Errors
    ///
    /// Returns an error if the device does not acknowledge or the bus times out.
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), SensorError>;

    /// Read up to `buf.len()` bytes from the device at `address`, returning
    /// how many arrived.
    ///
    /// # Errors
    ///
    /// Returns an error if the device does not acknowledge or the bus times out.
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, SensorError>;
}

impl<T: RangeFinderBus + ?Sized> RangeFinderBus for Box<T> {
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), SensorError> {
        (**self).write(address, bytes)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, SensorError> {
        (**self).read(address, buf)
    }
}
