//! Prelude module for convenient error handling imports.
//!
//! ```
//! use hoverkart_errors::prelude::*;
//!
//! fn load() -> Result<()> {
//!     Err(HoverkartError::config("missing tuning block"))
//! }
//!
//! assert!(load().is_err());
//! ```

pub use crate::{
    Result,
    actuator::ActuatorError,
    common::{ErrorCategory, ErrorSeverity, HoverkartError},
    sensor::SensorError,
    validation::ValidationError,
};
