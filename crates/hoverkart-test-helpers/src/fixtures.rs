//! Sensor snapshot builders.

use hoverkart_sensors::{Distance, InvalidReason, SensorSnapshot};

/// Distance every sensor reports in [`clear_snapshot`].
pub const CLEAR_CM: u16 = 200;

/// Builder for a [`SensorSnapshot`]; every sensor starts at [`CLEAR_CM`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotBuilder {
    front: Distance,
    left: Distance,
    right: Distance,
    rear: Distance,
    long_range: Distance,
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        let clear = Distance::Valid(CLEAR_CM);
        Self {
            front: clear,
            left: clear,
            right: clear,
            rear: clear,
            long_range: clear,
        }
    }
}

impl SnapshotBuilder {
    /// Start from an all-clear snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Front distance in centimeters.
    pub fn front(mut self, cm: u16) -> Self {
        self.front = Distance::Valid(cm);
        self
    }

    /// Left distance in centimeters.
    pub fn left(mut self, cm: u16) -> Self {
        self.left = Distance::Valid(cm);
        self
    }

    /// Right distance in centimeters.
    pub fn right(mut self, cm: u16) -> Self {
        self.right = Distance::Valid(cm);
        self
    }

    /// Rear distance in centimeters.
    pub fn rear(mut self, cm: u16) -> Self {
        self.rear = Distance::Valid(cm);
        self
    }

    /// Long-range distance in centimeters.
    pub fn long_range(mut self, cm: u16) -> Self {
        self.long_range = Distance::Valid(cm);
        self
    }

    /// Mark the front reading as timed out.
    pub fn front_timeout(mut self) -> Self {
        self.front = Distance::Invalid(InvalidReason::Timeout);
        self
    }

    /// Mark the rear reading as timed out.
    pub fn rear_timeout(mut self) -> Self {
        self.rear = Distance::Invalid(InvalidReason::Timeout);
        self
    }

    /// Mark the long-range reading as failed.
    pub fn long_range_failed(mut self) -> Self {
        self.long_range = Distance::Invalid(InvalidReason::Transport);
        self
    }

    /// Finish the snapshot.
    pub fn build(self) -> SensorSnapshot {
        SensorSnapshot::new(self.front, self.left, self.right, self.rear, self.long_range)
    }
}

/// A snapshot with every sensor at [`CLEAR_CM`].
pub fn clear_snapshot() -> SensorSnapshot {
    SnapshotBuilder::new().build()
}
