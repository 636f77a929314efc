//! Sensor identities and per-cycle distance readings.

use core::fmt;

/// Maximum range of an ultrasonic transducer in centimeters.
pub const MAX_ULTRASONIC_DISTANCE: u16 = 400;

/// Maximum range of the long-range finder in centimeters.
pub const RANGE_FINDER_MAX_DISTANCE: u16 = 1200;

/// Default clearance threshold in centimeters.
pub const MIN_SAFE_DISTANCE: u16 = 30;

/// Proximity sensor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorId {
    /// Front ultrasonic
    Front,
    /// Left ultrasonic
    Left,
    /// Right ultrasonic
    Right,
    /// Rear ultrasonic
    Rear,
    /// Forward-facing long-range finder
    LongRange,
}

impl SensorId {
    /// All sensors in acquisition order.
    pub const ALL: [SensorId; 5] = [
        SensorId::Front,
        SensorId::Left,
        SensorId::Right,
        SensorId::Rear,
        SensorId::LongRange,
    ];

    /// Maximum distance this sensor can report.
    pub const fn max_range_cm(&self) -> u16 {
        match self {
            SensorId::LongRange => RANGE_FINDER_MAX_DISTANCE,
            SensorId::Front | SensorId::Left | SensorId::Right | SensorId::Rear => {
                MAX_ULTRASONIC_DISTANCE
            }
        }
    }

    /// Returns true for the pulse-echo transducers.
    pub const fn is_ultrasonic(&self) -> bool {
        !matches!(self, SensorId::LongRange)
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorId::Front => write!(f, "front"),
            SensorId::Left => write!(f, "left"),
            SensorId::Right => write!(f, "right"),
            SensorId::Rear => write!(f, "rear"),
            SensorId::LongRange => write!(f, "long-range"),
        }
    }
}

/// Why a reading carries no distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidReason {
    /// No echo or reply before the deadline
    Timeout,
    /// The device answered with a distance outside its range
    OutOfRange,
    /// The reply had the wrong length
    Malformed,
    /// The pin or bus layer failed
    Transport,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::Timeout => write!(f, "timeout"),
            InvalidReason::OutOfRange => write!(f, "out of range"),
            InvalidReason::Malformed => write!(f, "malformed reply"),
            InvalidReason::Transport => write!(f, "transport error"),
        }
    }
}

/// A distance measurement, or the reason there is none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Distance {
    /// Measured distance in centimeters
    Valid(u16),
    /// No usable measurement
    Invalid(InvalidReason),
}

/// One sensor's reading for one control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DistanceReading {
    /// Which sensor produced it.
    pub sensor: SensorId,
    /// The measurement.
    pub distance: Distance,
}

impl DistanceReading {
    /// A valid reading, clamped to the sensor's maximum range.
    pub fn valid(sensor: SensorId, cm: u16) -> Self {
        Self {
            sensor,
            distance: Distance::Valid(cm.min(sensor.max_range_cm())),
        }
    }

    /// An invalid reading.
    pub const fn invalid(sensor: SensorId, reason: InvalidReason) -> Self {
        Self {
            sensor,
            distance: Distance::Invalid(reason),
        }
    }

    /// Distance in centimeters, if valid.
    pub const fn cm(&self) -> Option<u16> {
        match self.distance {
            Distance::Valid(cm) => Some(cm),
            Distance::Invalid(_) => None,
        }
    }

    /// Returns true if the reading is valid.
    pub const fn is_valid(&self) -> bool {
        matches!(self.distance, Distance::Valid(_))
    }

    /// Returns true only for a valid distance strictly greater than
    /// `threshold_cm`. An invalid reading is never clear.
    pub const fn is_clear_of(&self, threshold_cm: u16) -> bool {
        match self.distance {
            Distance::Valid(cm) => cm > threshold_cm,
            Distance::Invalid(_) => false,
        }
    }
}

impl fmt::Display for DistanceReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.distance {
            Distance::Valid(cm) => write!(f, "{}: {} cm", self.sensor, cm),
            Distance::Invalid(reason) => write!(f, "{}: invalid ({})", self.sensor, reason),
        }
    }
}

/// All readings of one control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorSnapshot {
    /// Front ultrasonic.
    pub front: DistanceReading,
    /// Left ultrasonic.
    pub left: DistanceReading,
    /// Right ultrasonic.
    pub right: DistanceReading,
    /// Rear ultrasonic.
    pub rear: DistanceReading,
    /// Long-range finder.
    pub long_range: DistanceReading,
}

impl SensorSnapshot {
    /// Build a snapshot from per-sensor distances.
    pub fn new(
        front: Distance,
        left: Distance,
        right: Distance,
        rear: Distance,
        long_range: Distance,
    ) -> Self {
        let reading = |sensor: SensorId, distance: Distance| match distance {
            Distance::Valid(cm) => DistanceReading::valid(sensor, cm),
            Distance::Invalid(reason) => DistanceReading::invalid(sensor, reason),
        };
        Self {
            front: reading(SensorId::Front, front),
            left: reading(SensorId::Left, left),
            right: reading(SensorId::Right, right),
            rear: reading(SensorId::Rear, rear),
            long_range: reading(SensorId::LongRange, long_range),
        }
    }

    /// Reading for a given sensor.
    pub fn get(&self, sensor: SensorId) -> &DistanceReading {
        match sensor {
            SensorId::Front => &self.front,
            SensorId::Left => &self.left,
            SensorId::Right => &self.right,
            SensorId::Rear => &self.rear,
            SensorId::LongRange => &self.long_range,
        }
    }

    /// Readings in acquisition order.
    pub fn iter(&self) -> impl Iterator<Item = &DistanceReading> + '_ {
        SensorId::ALL.into_iter().map(|id| self.get(id))
    }

    /// Number of invalid readings in this cycle.
    pub fn invalid_count(&self) -> usize {
        self.iter().filter(|r| !r.is_valid()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_is_strict() {
        let r = DistanceReading::valid(SensorId::Front, 30);
        assert!(!r.is_clear_of(30));
        assert!(r.is_clear_of(29));
    }

    #[test]
    fn test_invalid_is_never_clear() {
        let r = DistanceReading::invalid(SensorId::Rear, InvalidReason::Timeout);
        assert!(!r.is_clear_of(0));
        assert_eq!(r.cm(), None);
    }

    #[test]
    fn test_valid_is_clamped_to_sensor_range() {
        assert_eq!(DistanceReading::valid(SensorId::Left, 9_999).cm(), Some(400));
        assert_eq!(
            DistanceReading::valid(SensorId::LongRange, 9_999).cm(),
            Some(1200)
        );
    }

    #[test]
    fn test_snapshot_get_matches_fields() {
        let snap = SensorSnapshot::new(
            Distance::Valid(10),
            Distance::Valid(20),
            Distance::Valid(30),
            Distance::Valid(40),
            Distance::Invalid(InvalidReason::Malformed),
        );
        assert_eq!(snap.get(SensorId::Right).cm(), Some(30));
        assert_eq!(snap.get(SensorId::LongRange).sensor, SensorId::LongRange);
        assert_eq!(snap.invalid_count(), 1);
    }

    #[test]
    fn test_reading_display() {
        assert_eq!(
            DistanceReading::valid(SensorId::Front, 120).to_string(),
            "front: 120 cm"
        );
        assert_eq!(
            DistanceReading::invalid(SensorId::LongRange, InvalidReason::OutOfRange).to_string(),
            "long-range: invalid (out of range)"
        );
    }
}
