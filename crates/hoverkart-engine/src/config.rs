//! Kart configuration file.

use core::time::Duration;
use std::path::Path;

use hoverkart_control::{AvoidanceConfig, TuningParameters};
use hoverkart_errors::ValidationError;
use hoverkart_faults::FaultReporterConfig;
use hoverkart_sensors::SensorConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{EngineError, EngineResult};

/// Default control cycle period in milliseconds.
pub const DEFAULT_CYCLE_PERIOD_MS: u64 = 50;

/// Longest accepted cycle period in milliseconds.
const MAX_CYCLE_PERIOD_MS: u64 = 1_000;

/// Complete configuration of one kart.
///
/// Every section is optional in the JSON form; missing fields take their
/// defaults.
///
/// ```
/// use hoverkart_engine::KartConfig;
///
/// let config = KartConfig::from_json_str(r#"{ "tuning": { "kp": 3.0 } }"#)?;
/// assert_eq!(config.tuning.kp, 3.0);
/// assert_eq!(config.cycle_period_ms, 50);
/// # Ok::<(), hoverkart_engine::EngineError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KartConfig {
    /// Sensor acquisition.
    pub sensors: SensorConfig,
    /// Avoidance maneuver and motor limits.
    pub avoidance: AvoidanceConfig,
    /// Fault latching.
    pub faults: FaultReporterConfig,
    /// Initial tuning parameters.
    pub tuning: TuningParameters,
    /// Control cycle period in milliseconds.
    pub cycle_period_ms: u64,
}

impl Default for KartConfig {
    fn default() -> Self {
        Self {
            sensors: SensorConfig::default(),
            avoidance: AvoidanceConfig::default(),
            faults: FaultReporterConfig::default(),
            tuning: TuningParameters::default(),
            cycle_period_ms: DEFAULT_CYCLE_PERIOD_MS,
        }
    }
}

impl KartConfig {
    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Parse`] for malformed JSON and
    /// [`EngineError::Validation`] for out-of-range values.
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] if the file cannot be read, otherwise as
    /// [`KartConfig::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        debug!(path = %path.display(), "loaded kart configuration");
        Ok(config)
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Parse`] if serialization fails.
    pub fn to_json_pretty(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first section error found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.sensors.validate()?;
        self.avoidance.validate()?;
        self.faults.validate()?;
        self.tuning.validate()?;
        let envelope = self.avoidance.limits;
        let output = self.tuning.output_limits;
        if output.min < envelope.min || output.max > envelope.max {
            return Err(ValidationError::constraint(format!(
                "tuning output limits [{}, {}] exceed the motor envelope [{}, {}]",
                output.min, output.max, envelope.min, envelope.max
            )));
        }
        if self.cycle_period_ms == 0 || self.cycle_period_ms > MAX_CYCLE_PERIOD_MS {
            return Err(ValidationError::out_of_range(
                "cycle_period_ms",
                self.cycle_period_ms,
                1,
                MAX_CYCLE_PERIOD_MS,
            ));
        }
        Ok(())
    }

    /// Control cycle period.
    pub fn cycle_period(&self) -> Duration {
        Duration::from_millis(self.cycle_period_ms)
    }
}
