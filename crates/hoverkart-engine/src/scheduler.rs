//! Fixed-rate cycle scheduler with deadline tracking.

use core::time::Duration;

use tracing::warn;

use crate::Clock;

/// Timing statistics of a [`CycleScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleMetrics {
    /// Ticks released so far.
    pub total_ticks: u64,
    /// Ticks that started after their deadline.
    pub missed_deadlines: u64,
    /// Largest lateness observed.
    pub max_jitter: Duration,
    /// Lateness of the most recent tick.
    pub last_jitter: Duration,
}

/// Releases one tick per period against absolute deadlines.
///
/// Deadlines advance by exactly one period so sleep error does not
/// accumulate. When a cycle overruns, the schedule is rebased to
/// `now + period` instead of bursting to catch up.
#[derive(Debug, Clone)]
pub struct CycleScheduler {
    period: Duration,
    next_deadline: Option<Duration>,
    metrics: CycleMetrics,
}

impl CycleScheduler {
    /// Create a scheduler; a zero period is raised to one millisecond.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            next_deadline: None,
            metrics: CycleMetrics::default(),
        }
    }

    /// Scheduler period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Timing statistics so far.
    pub fn metrics(&self) -> &CycleMetrics {
        &self.metrics
    }

    /// Block until the next tick and return its index, starting at 1.
    ///
    /// The first tick is released immediately.
    pub fn wait_for_tick(&mut self, clock: &impl Clock) -> u64 {
        let now = clock.now();
        let deadline = self.next_deadline.unwrap_or(now);

        let jitter = if now > deadline {
            let late = now.saturating_sub(deadline);
            self.metrics.missed_deadlines = self.metrics.missed_deadlines.saturating_add(1);
            warn!(
                tick = self.metrics.total_ticks.saturating_add(1),
                late = ?late,
                "control cycle missed its deadline"
            );
            self.next_deadline = Some(now.saturating_add(self.period));
            late
        } else {
            if deadline > now {
                clock.sleep(deadline.saturating_sub(now));
            }
            self.next_deadline = Some(deadline.saturating_add(self.period));
            Duration::ZERO
        };

        self.metrics.last_jitter = jitter;
        self.metrics.max_jitter = self.metrics.max_jitter.max(jitter);
        self.metrics.total_ticks = self.metrics.total_ticks.saturating_add(1);
        self.metrics.total_ticks
    }

    /// Forget the schedule; the next tick is released immediately.
    pub fn reset(&mut self) {
        self.next_deadline = None;
        self.metrics = CycleMetrics::default();
    }
}
