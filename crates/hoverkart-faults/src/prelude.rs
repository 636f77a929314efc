//! Prelude for convenient imports.
//!
//! ```rust
//! use hoverkart_faults::prelude::*;
//!
//! let faults = FaultReporter::new();
//! assert!(!faults.is_active());
//! ```

pub use crate::{
    Fault, FaultAction, FaultError, FaultKind, FaultRecord, FaultReporter, FaultReporterConfig,
    FaultResult, RecoveryHook,
};
