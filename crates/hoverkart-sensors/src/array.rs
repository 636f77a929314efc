//! The full sensor ring: four ultrasonics plus the range finder.

use hoverkart_faults::FaultReporter;

use crate::{
    DistanceReading, RangeFinder, RangeFinderBus, SensorConfig, SensorId, SensorSnapshot,
    UltrasonicTransducer, read_ultrasonic,
};

/// The four ultrasonic transducers, one per side.
#[derive(Debug, Clone, Default)]
pub struct UltrasonicSet<U> {
    /// Front transducer
    pub front: U,
    /// Left transducer
    pub left: U,
    /// Right transducer
    pub right: U,
    /// Rear transducer
    pub rear: U,
}

impl<U> UltrasonicSet<U> {
    fn get_mut(&mut self, sensor: SensorId) -> Option<&mut U> {
        match sensor {
            SensorId::Front => Some(&mut self.front),
            SensorId::Left => Some(&mut self.left),
            SensorId::Right => Some(&mut self.right),
            SensorId::Rear => Some(&mut self.rear),
            SensorId::LongRange => None,
        }
    }
}

/// Owns every proximity sensor and produces one snapshot per cycle.
#[derive(Debug)]
pub struct SensorArray<U, B> {
    ultrasonics: UltrasonicSet<U>,
    range_finder: RangeFinder<B>,
    config: SensorConfig,
}

impl<U, B> SensorArray<U, B>
where
    U: UltrasonicTransducer,
    B: RangeFinderBus,
{
    /// Assemble the array.
    pub fn new(ultrasonics: UltrasonicSet<U>, bus: B, config: SensorConfig) -> Self {
        Self {
            ultrasonics,
            range_finder: RangeFinder::new(bus, &config),
            config,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Mutable access to the ultrasonic transducers.
    pub fn ultrasonics_mut(&mut self) -> &mut UltrasonicSet<U> {
        &mut self.ultrasonics
    }

    /// Mutable access to the range finder.
    pub fn range_finder_mut(&mut self) -> &mut RangeFinder<B> {
        &mut self.range_finder
    }

    /// Check for the range finder at start-up.
    pub fn detect_range_finder(&mut self, faults: &mut FaultReporter) -> bool {
        self.range_finder.detect(faults)
    }

    /// Read one sensor.
    pub fn read_distance(&mut self, sensor: SensorId, faults: &mut FaultReporter) -> DistanceReading {
        match self.ultrasonics.get_mut(sensor) {
            Some(transducer) => read_ultrasonic(sensor, transducer, &self.config, faults),
            None => self.range_finder.read(faults),
        }
    }

    /// Read every sensor once, in acquisition order.
    pub fn read_all(&mut self, faults: &mut FaultReporter) -> SensorSnapshot {
        SensorSnapshot {
            front: self.read_distance(SensorId::Front, faults),
            left: self.read_distance(SensorId::Left, faults),
            right: self.read_distance(SensorId::Right, faults),
            rear: self.read_distance(SensorId::Rear, faults),
            long_range: self.read_distance(SensorId::LongRange, faults),
        }
    }
}
