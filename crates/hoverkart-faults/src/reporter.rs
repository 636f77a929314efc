//! The fault reporter: active fault, dwell expiry, recovery dispatch.

use core::fmt;
use core::time::Duration;

use heapless::HistoryBuffer;
use hoverkart_errors::ValidationError;
use tracing::{debug, error, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Fault, FaultAction, FaultError, FaultKind, FaultRecord, FaultResult};

/// Default time an active fault stays latched before `tick` clears it.
pub const DEFAULT_DWELL_MS: u64 = 5_000;

/// Number of fault records kept for diagnostics.
pub const FAULT_HISTORY_CAPACITY: usize = 32;

/// Receives recovery dispatches from [`FaultReporter::report`].
///
/// Called synchronously, before `report` returns, once per reported fault.
/// Never called from [`FaultReporter::tick`].
pub trait RecoveryHook: Send {
    /// Handle a freshly reported fault.
    fn on_fault(&mut self, kind: FaultKind, action: FaultAction);
}

impl<F> RecoveryHook for F
where
    F: FnMut(FaultKind, FaultAction) + Send,
{
    fn on_fault(&mut self, kind: FaultKind, action: FaultAction) {
        self(kind, action);
    }
}

/// Fault reporter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FaultReporterConfig {
    /// Milliseconds an active fault stays latched.
    pub dwell_ms: u64,
}

impl Default for FaultReporterConfig {
    fn default() -> Self {
        Self {
            dwell_ms: DEFAULT_DWELL_MS,
        }
    }
}

impl FaultReporterConfig {
    /// Dwell time as a duration.
    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the dwell time is zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.dwell_ms == 0 {
            return Err(ValidationError::out_of_range(
                "dwell_ms",
                self.dwell_ms,
                1,
                u64::MAX,
            ));
        }
        Ok(())
    }
}

/// Owns the single active fault and the diagnostic history.
pub struct FaultReporter {
    config: FaultReporterConfig,
    now: Duration,
    active: Option<Fault>,
    stop_requested: bool,
    sequence: u32,
    occurrences: [u32; FaultKind::COUNT],
    history: HistoryBuffer<FaultRecord, FAULT_HISTORY_CAPACITY>,
    hook: Option<Box<dyn RecoveryHook>>,
}

impl Default for FaultReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FaultReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaultReporter")
            .field("config", &self.config)
            .field("now", &self.now)
            .field("active", &self.active)
            .field("stop_requested", &self.stop_requested)
            .field("history_len", &self.history.len())
            .field("has_hook", &self.hook.is_some())
            .finish()
    }
}

impl FaultReporter {
    /// Create a reporter with the default dwell time and no recovery hook.
    pub fn new() -> Self {
        Self {
            config: FaultReporterConfig::default(),
            now: Duration::ZERO,
            active: None,
            stop_requested: false,
            sequence: 0,
            occurrences: [0; FaultKind::COUNT],
            history: HistoryBuffer::new(),
            hook: None,
        }
    }

    /// Create a reporter with a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FaultError::InvalidConfig`] if the configuration is rejected.
    pub fn with_config(config: FaultReporterConfig) -> FaultResult<Self> {
        config.validate()?;
        let mut reporter = Self::new();
        reporter.config = config;
        Ok(reporter)
    }

    /// Install the recovery hook, replacing any previous one.
    pub fn set_recovery_hook(&mut self, hook: impl RecoveryHook + 'static) {
        self.hook = Some(Box::new(hook));
    }

    /// Builder form of [`set_recovery_hook`](Self::set_recovery_hook).
    pub fn with_recovery_hook(mut self, hook: impl RecoveryHook + 'static) -> Self {
        self.set_recovery_hook(hook);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &FaultReporterConfig {
        &self.config
    }

    /// Current reporter time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Advance the reporter time. Timestamps of new faults use this value.
    pub fn update_time(&mut self, now: Duration) {
        self.now = now;
    }

    /// Record a fault and dispatch its recovery action.
    ///
    /// Overwrites any active fault. For [`FaultAction::ImmediateStop`] a stop
    /// request is latched until [`take_stop_request`](Self::take_stop_request).
    pub fn report(&mut self, kind: FaultKind, message: &str) {
        let action = kind.action();
        let fault = Fault::new(kind, message, self.now);
        let timestamp_ms = millis(self.now);

        match action {
            FaultAction::ImmediateStop => error!(
                kind = %kind,
                action = %action,
                timestamp_ms,
                message = %fault.message
            ),
            FaultAction::LogAndContinue => warn!(
                kind = %kind,
                action = %action,
                timestamp_ms,
                message = %fault.message
            ),
        }

        self.sequence = self.sequence.wrapping_add(1);
        if let Some(count) = self.occurrences.get_mut(kind.index()) {
            *count = count.saturating_add(1);
        }
        self.history.write(FaultRecord {
            sequence: self.sequence,
            fault: fault.clone(),
            action,
        });
        self.active = Some(fault);

        if action.stops_motion() {
            self.stop_requested = true;
        }

        if let Some(hook) = self.hook.as_mut() {
            hook.on_fault(kind, action);
        }
    }

    /// Returns true while a fault is latched.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The latched fault, if any.
    pub fn active_fault(&self) -> Option<&Fault> {
        self.active.as_ref()
    }

    /// Clear the active fault once it is older than the dwell time.
    ///
    /// Returns true only on the call that cleared it. Never invokes the
    /// recovery hook and never touches a latched stop request.
    pub fn tick(&mut self) -> bool {
        let now = self.now;
        let dwell = self.config.dwell();
        let Some(fault) = self.active.take_if(|fault| fault.age(now) > dwell) else {
            return false;
        };
        info!(
            kind = %fault.kind,
            timestamp_ms = millis(now),
            "fault dwell expired, clearing"
        );
        true
    }

    /// Clear the active fault immediately.
    ///
    /// # Errors
    ///
    /// Returns [`FaultError::NoActiveFault`] if nothing is latched.
    pub fn clear(&mut self) -> FaultResult<Fault> {
        let fault = self.active.take().ok_or(FaultError::NoActiveFault)?;
        debug!(kind = %fault.kind, "fault cleared");
        Ok(fault)
    }

    /// Consume the latched stop request.
    pub fn take_stop_request(&mut self) -> bool {
        core::mem::replace(&mut self.stop_requested, false)
    }

    /// Returns true if a stop request is latched, without consuming it.
    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Diagnostic history, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &FaultRecord> + '_ {
        self.history.oldest_ordered()
    }

    /// Most recent history record.
    pub fn last_record(&self) -> Option<&FaultRecord> {
        self.history.recent()
    }

    /// Number of faults of `kind` reported since construction.
    pub fn occurrences(&self, kind: FaultKind) -> u32 {
        self.occurrences.get(kind.index()).copied().unwrap_or(0)
    }

    /// Total number of faults reported since construction.
    pub fn total_reported(&self) -> u32 {
        self.sequence
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
