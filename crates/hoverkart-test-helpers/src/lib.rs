//! Shared test utilities for the hoverkart control core.
//!
//! # Modules
//!
//! - [`mod@must`] - Unwrap helpers with good error messages and `#[track_caller]`
//! - [`mock`] - Scripted hardware: ultrasonic transducers, range finder bus,
//!   motor driver and distance link
//! - [`fixtures`] - Sensor snapshot builders
//! - [`prelude`] - Convenience re-exports
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! hoverkart-test-helpers = { workspace = true }
//! ```
//!
//! ```rust,ignore
//! use hoverkart_test_helpers::prelude::*;
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::unwrap_used, clippy::panic, reason = "test-only crate")]

pub mod fixtures;
pub mod mock;
pub mod must;
pub mod prelude;

pub use must::*;
