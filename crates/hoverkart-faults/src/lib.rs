//! Fault reporting for the hoverkart control core.
//!
//! A single [`FaultReporter`] is owned by the control loop and passed by
//! `&mut` to every component that can detect a fault. It keeps at most one
//! active fault (the most recent one wins), dispatches a recovery action per
//! fault kind and clears the active fault once it has aged past the dwell time.
//!
//! # Recovery policy
//!
//! | Kind | Action |
//! |------|--------|
//! | `Motor` | [`FaultAction::ImmediateStop`]: stop motors now, latch a stop request |
//! | everything else | [`FaultAction::LogAndContinue`] |
//!
//! # Lifecycle
//!
//! ```text
//! ┌─────────────┐    report()     ┌─────────────┐
//! │    Clear    │ ──────────────► │   Active    │ ◄─┐ report() overwrites
//! └─────────────┘                 └──────┬──────┘ ──┘
//!        ▲                               │
//!        │  tick() after dwell, clear()  │
//!        └───────────────────────────────┘
//! ```
//!
//! Time is injected with [`FaultReporter::update_time`]; the reporter never
//! reads a clock on its own.
//!
//! # Example
//!
//! ```rust
//! use core::time::Duration;
//! use hoverkart_faults::{FaultKind, FaultReporter};
//!
//! let mut faults = FaultReporter::new();
//! faults.update_time(Duration::from_millis(1_000));
//! faults.report(FaultKind::Sensor, "front ultrasonic sensor timeout");
//! assert!(faults.is_active());
//!
//! faults.update_time(Duration::from_millis(6_001));
//! assert!(faults.tick());
//! assert!(!faults.is_active());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod fault;
mod reporter;

pub mod prelude;

pub use error::{FaultError, FaultResult};
pub use fault::{FAULT_MESSAGE_CAPACITY, Fault, FaultAction, FaultKind, FaultMessage, FaultRecord};
pub use reporter::{
    DEFAULT_DWELL_MS, FAULT_HISTORY_CAPACITY, FaultReporter, FaultReporterConfig, RecoveryHook,
};
