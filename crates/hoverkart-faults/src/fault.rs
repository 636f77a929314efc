//! Fault kinds, recovery actions and fault records.

use core::fmt;
use core::time::Duration;

use hoverkart_errors::ErrorSeverity;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of bytes kept from a fault message.
pub const FAULT_MESSAGE_CAPACITY: usize = 96;

/// Bounded fault message text.
pub type FaultMessage = heapless::String<FAULT_MESSAGE_CAPACITY>;

/// Category of a reported fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FaultKind {
    /// An ultrasonic proximity sensor failed to produce a reading
    Sensor,
    /// Motion cannot continue safely
    Motor,
    /// The tracked distance source is unavailable
    Communication,
    /// The long-range finder failed or returned garbage
    RangeFinder,
    /// The wireless configuration link failed
    Wireless,
    /// Anything else, including invalid inputs to the regulator
    General,
}

impl FaultKind {
    /// Number of fault kinds.
    pub const COUNT: usize = 6;

    /// All fault kinds in declaration order.
    pub const ALL: [FaultKind; Self::COUNT] = [
        FaultKind::Sensor,
        FaultKind::Motor,
        FaultKind::Communication,
        FaultKind::RangeFinder,
        FaultKind::Wireless,
        FaultKind::General,
    ];

    /// Recovery action dispatched when a fault of this kind is reported.
    pub fn action(&self) -> FaultAction {
        match self {
            FaultKind::Motor => FaultAction::ImmediateStop,
            FaultKind::Sensor
            | FaultKind::Communication
            | FaultKind::RangeFinder
            | FaultKind::Wireless
            | FaultKind::General => FaultAction::LogAndContinue,
        }
    }

    /// Severity used when the fault is logged.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            FaultKind::Motor => ErrorSeverity::Critical,
            FaultKind::Sensor | FaultKind::RangeFinder => ErrorSeverity::Error,
            FaultKind::Communication | FaultKind::Wireless | FaultKind::General => {
                ErrorSeverity::Warning
            }
        }
    }

    /// Stable index in `0..COUNT`.
    pub(crate) fn index(&self) -> usize {
        match self {
            FaultKind::Sensor => 0,
            FaultKind::Motor => 1,
            FaultKind::Communication => 2,
            FaultKind::RangeFinder => 3,
            FaultKind::Wireless => 4,
            FaultKind::General => 5,
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::Sensor => write!(f, "SENSOR"),
            FaultKind::Motor => write!(f, "MOTOR"),
            FaultKind::Communication => write!(f, "COMMUNICATION"),
            FaultKind::RangeFinder => write!(f, "RANGE_FINDER"),
            FaultKind::Wireless => write!(f, "WIRELESS"),
            FaultKind::General => write!(f, "GENERAL"),
        }
    }
}

/// Recovery action for a fault kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FaultAction {
    /// Stop both motors now and latch a stop request for the state machine.
    ImmediateStop,
    /// Record the fault and keep running.
    LogAndContinue,
}

impl FaultAction {
    /// Returns true if this action halts motion.
    pub fn stops_motion(&self) -> bool {
        matches!(self, FaultAction::ImmediateStop)
    }
}

impl fmt::Display for FaultAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultAction::ImmediateStop => write!(f, "immediate stop"),
            FaultAction::LogAndContinue => write!(f, "log and continue"),
        }
    }
}

/// A reported fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Fault category.
    pub kind: FaultKind,
    /// Human-readable description, truncated to [`FAULT_MESSAGE_CAPACITY`] bytes.
    pub message: FaultMessage,
    /// Reporter time when the fault was raised.
    pub timestamp: Duration,
}

impl Fault {
    /// Create a fault, truncating `message` at a char boundary if it is too long.
    pub fn new(kind: FaultKind, message: &str, timestamp: Duration) -> Self {
        Self {
            kind,
            message: truncate_message(message),
            timestamp,
        }
    }

    /// Age of the fault at `now`, zero if `now` precedes the timestamp.
    pub fn age(&self, now: Duration) -> Duration {
        now.saturating_sub(self.timestamp)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} ms] {}: {}",
            self.timestamp.as_millis(),
            self.kind,
            self.message
        )
    }
}

/// Entry in the bounded diagnostic history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultRecord {
    /// Monotonic report counter, starting at 1.
    pub sequence: u32,
    /// The reported fault.
    pub fault: Fault,
    /// Action dispatched for it.
    pub action: FaultAction,
}

impl fmt::Display for FaultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.fault, f)
    }
}

fn truncate_message(message: &str) -> FaultMessage {
    let mut out = FaultMessage::new();
    for ch in message.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
