//! Long-range finder on a two-wire bus.

use hoverkart_faults::{FaultKind, FaultReporter};
use tracing::debug;

use crate::config::RANGE_FINDER_MEASURE_REGISTER;
use crate::{DistanceReading, InvalidReason, RangeFinderBus, SensorConfig, SensorId};

/// Reads distances from the range finder.
///
/// Protocol: write the measure register, then read a two-byte big-endian
/// distance in centimeters.
#[derive(Debug)]
pub struct RangeFinder<B> {
    bus: B,
    address: u8,
    max_cm: u16,
}

impl<B: RangeFinderBus> RangeFinder<B> {
    /// Create a range finder on `bus` using the configured address and range.
    pub fn new(bus: B, config: &SensorConfig) -> Self {
        Self {
            bus,
            address: config.range_finder_address,
            max_cm: config.range_finder_max_cm,
        }
    }

    /// Device address.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Access the underlying bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutable access to the underlying bus.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Check the device address with an empty write.
    ///
    /// Reports a `RangeFinder` fault and returns false if the device does not
    /// answer.
    pub fn detect(&mut self, faults: &mut FaultReporter) -> bool {
        match self.bus.write(self.address, &[]) {
            Ok(()) => true,
            Err(e) => {
                debug!(address = self.address, error = %e, "range finder detection failed");
                faults.report(FaultKind::RangeFinder, "range finder initialization failed");
                false
            }
        }
    }

    /// Perform one measurement.
    pub fn read(&mut self, faults: &mut FaultReporter) -> DistanceReading {
        const SENSOR: SensorId = SensorId::LongRange;

        if let Err(e) = self.bus.write(self.address, &[RANGE_FINDER_MEASURE_REGISTER]) {
            debug!(error = %e, "range finder register write failed");
            faults.report(FaultKind::RangeFinder, "range finder read failed");
            return DistanceReading::invalid(SENSOR, InvalidReason::Transport);
        }

        let mut buf = [0u8; 2];
        match self.bus.read(self.address, &mut buf) {
            Ok(2) => {}
            Ok(n) => {
                debug!(bytes = n, "range finder short read");
                faults.report(FaultKind::RangeFinder, "range finder read failed");
                return DistanceReading::invalid(SENSOR, InvalidReason::Malformed);
            }
            Err(e) => {
                debug!(error = %e, "range finder read failed");
                faults.report(FaultKind::RangeFinder, "range finder read failed");
                return DistanceReading::invalid(SENSOR, InvalidReason::Transport);
            }
        }

        let cm = u16::from_be_bytes(buf);
        if cm == 0 || cm > self.max_cm {
            debug!(cm, "range finder distance out of range");
            faults.report(FaultKind::RangeFinder, "range finder invalid distance");
            return DistanceReading::invalid(SENSOR, InvalidReason::OutOfRange);
        }

        DistanceReading::valid(SENSOR, cm)
    }
}
