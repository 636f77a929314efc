//! Distance to the tracked source.

use hoverkart_faults::{FaultKind, FaultReporter};
use tracing::debug;

use crate::TrackedDistance;

/// Largest tracked distance accepted from a link, in centimeters.
pub const MAX_TRACKED_DISTANCE: i32 = 1000;

/// Polled once per cycle for the distance to the tracked source.
pub trait DistanceSource {
    /// Current distance, reporting any link fault on `faults`.
    fn tracked_distance(&mut self, faults: &mut FaultReporter) -> TrackedDistance;
}

impl<T: DistanceSource + ?Sized> DistanceSource for Box<T> {
    fn tracked_distance(&mut self, faults: &mut FaultReporter) -> TrackedDistance {
        (**self).tracked_distance(faults)
    }
}

/// A wireless link delivering raw distance values.
pub trait DistanceLink {
    /// Returns true while a peer is connected.
    fn is_connected(&self) -> bool;

    /// The latest raw distance, if one arrived.
    fn latest_distance(&mut self) -> Option<i32>;
}

/// Adapts a [`DistanceLink`] into a [`DistanceSource`].
///
/// - disconnected: `Communication` fault, [`TrackedDistance::Invalid`]
/// - nothing received: [`TrackedDistance::Invalid`]
/// - above [`MAX_TRACKED_DISTANCE`]: `General` fault, [`TrackedDistance::Invalid`]
///
/// Negative values pass through; the regulator rejects them.
#[derive(Debug, Clone)]
pub struct LinkedDistanceSource<L> {
    link: L,
}

impl<L: DistanceLink> LinkedDistanceSource<L> {
    /// Wrap a link.
    pub fn new(link: L) -> Self {
        Self { link }
    }

    /// Access the link.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Mutable access to the link.
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }
}

impl<L: DistanceLink> DistanceSource for LinkedDistanceSource<L> {
    fn tracked_distance(&mut self, faults: &mut FaultReporter) -> TrackedDistance {
        if !self.link.is_connected() {
            faults.report(FaultKind::Communication, "distance source not connected");
            return TrackedDistance::Invalid;
        }

        match self.link.latest_distance() {
            None => {
                debug!("no distance received this cycle");
                TrackedDistance::Invalid
            }
            Some(cm) if cm > MAX_TRACKED_DISTANCE => {
                faults.report(FaultKind::General, "tracked distance out of range");
                TrackedDistance::Invalid
            }
            Some(cm) => TrackedDistance::Cm(cm),
        }
    }
}
