//! Centralized error types for the hoverkart control core.
//!
//! The control core separates two kinds of failure:
//!
//! - **Faults** are domain events (a sensor timed out, the path is blocked on
//!   all sides). They are recorded by `hoverkart-faults` and drive motion
//!   decisions.
//! - **Errors** are the Rust `Result` values returned by hardware seams and
//!   configuration code. They live here.
//!
//! # Modules
//!
//! - [`common`]: Top-level [`HoverkartError`] and its classification
//! - [`sensor`]: Proximity-sensor transport errors
//! - [`actuator`]: Motor-driver errors
//! - [`validation`]: Configuration and tuning validation errors
//!
//! # Example
//!
//! ```
//! use hoverkart_errors::prelude::*;
//!
//! fn check_gain(kp: f64) -> Result<f64> {
//!     if !kp.is_finite() || kp < 0.0 {
//!         return Err(ValidationError::out_of_range("kp", kp, 0.0, f64::MAX).into());
//!     }
//!     Ok(kp)
//! }
//!
//! assert!(check_gain(2.5).is_ok());
//! assert!(check_gain(-1.0).is_err());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod actuator;
pub mod common;
pub mod prelude;
pub mod sensor;
pub mod validation;

pub use actuator::ActuatorError;
pub use common::{ErrorCategory, ErrorSeverity, HoverkartError};
pub use sensor::SensorError;
pub use validation::ValidationError;

/// A specialized `Result` type for hoverkart operations.
pub type Result<T> = std::result::Result<T, HoverkartError>;
