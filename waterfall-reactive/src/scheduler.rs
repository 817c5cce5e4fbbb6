use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflowState {
    Idle,
    /// Geometry changed, waiting for the debounce timer.
    PendingMeasure,
    /// A placement pass is running.
    Computing,
}

/// Why a reflow was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReflowTrigger {
    /// Container width changed
    Resize,
    /// Item list replaced
    ItemsChanged,
    /// Explicit refresh from the host
    Refresh,
    /// Gutter, widths or breakpoints changed
    Configured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDecision {
    /// Leading edge: the caller should run a pass now.
    RunNow,
    /// Inside the throttle window, ignored.
    Throttled,
    /// A pass is running; another one is armed for after it.
    Deferred,
    /// The grid was torn down, nothing will run.
    Destroyed,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SchedulerStats {
    pub events: u64,
    pub superseded: u64,
    pub passes: u64,
    pub throttled_refreshes: u64,
    pub cancelled: u64,
}

/// Decides when a grid reflows.
///
/// Resize and item changes are debounced on the trailing edge: every event
/// re-arms the timer, so a burst collapses into one pass that runs once the
/// burst has been quiet for the debounce window. Refresh requests are
/// throttled on the leading edge: the first one runs immediately and later
/// ones are dropped until the throttle window closes.
///
/// The scheduler never reads a clock itself; every call takes `now`, which
/// keeps it deterministic under a manual clock.
#[derive(Debug)]
pub struct ReflowScheduler {
    state: ReflowState,
    debounce: Duration,
    throttle: Duration,
    deadline: Option<Instant>,
    throttle_until: Option<Instant>,
    pending: Vec<ReflowTrigger>,
    rearm_after_pass: bool,
    stats: SchedulerStats,
}

impl ReflowScheduler {
    pub fn new(debounce: Duration, throttle: Duration) -> Self {
        Self {
            state: ReflowState::Idle,
            debounce,
            throttle,
            deadline: None,
            throttle_until: None,
            pending: Vec::new(),
            rearm_after_pass: false,
            stats: SchedulerStats::default(),
        }
    }

    /// Record a geometry-affecting event.
    pub fn notify(&mut self, trigger: ReflowTrigger, now: Instant) {
        self.stats.events += 1;
        if !self.pending.contains(&trigger) {
            self.pending.push(trigger);
        }

        match self.state {
            ReflowState::Idle => {
                self.state = ReflowState::PendingMeasure;
                self.deadline = Some(now + self.debounce);
                tracing::debug!(?trigger, "reflow armed");
            }
            ReflowState::PendingMeasure => {
                self.stats.superseded += 1;
                self.deadline = Some(now + self.debounce);
                tracing::trace!(?trigger, "reflow timer restarted");
            }
            ReflowState::Computing => {
                self.rearm_after_pass = true;
                tracing::trace!(?trigger, "event during pass, reflow re-armed");
            }
        }
    }

    /// Throttled manual refresh.
    pub fn request_refresh(&mut self, now: Instant) -> RefreshDecision {
        self.stats.events += 1;

        if let Some(until) = self.throttle_until {
            if now < until {
                self.stats.throttled_refreshes += 1;
                tracing::trace!("refresh throttled");
                return RefreshDecision::Throttled;
            }
        }
        self.throttle_until = Some(now + self.throttle);

        if self.state == ReflowState::Computing {
            self.rearm_after_pass = true;
            if !self.pending.contains(&ReflowTrigger::Refresh) {
                self.pending.push(ReflowTrigger::Refresh);
            }
            return RefreshDecision::Deferred;
        }

        if !self.pending.contains(&ReflowTrigger::Refresh) {
            self.pending.push(ReflowTrigger::Refresh);
        }
        RefreshDecision::RunNow
    }

    /// Whether the debounce timer has fired.
    pub fn is_due(&self, now: Instant) -> bool {
        self.state == ReflowState::PendingMeasure && self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Enter `Computing`. Any pending debounced pass is absorbed by this one.
    /// Returns the triggers collected since the last pass.
    pub fn begin_pass(&mut self) -> Vec<ReflowTrigger> {
        self.state = ReflowState::Computing;
        self.deadline = None;
        self.rearm_after_pass = false;
        std::mem::take(&mut self.pending)
    }

    /// Leave `Computing`.
    pub fn finish_pass(&mut self, now: Instant) {
        if self.state != ReflowState::Computing {
            return;
        }
        self.stats.passes += 1;

        if self.rearm_after_pass {
            self.rearm_after_pass = false;
            self.state = ReflowState::PendingMeasure;
            self.deadline = Some(now + self.debounce);
            tracing::debug!("reflow re-armed after pass");
        } else {
            self.state = ReflowState::Idle;
        }
    }

    /// Drop any armed timer. A running pass is not affected.
    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            self.stats.cancelled += 1;
        }
        self.pending.clear();
        self.rearm_after_pass = false;
        self.throttle_until = None;
        if self.state == ReflowState::PendingMeasure {
            self.state = ReflowState::Idle;
        }
    }

    /// Change the windows. Timers that are already armed keep their deadline.
    pub fn set_windows(&mut self, debounce: Duration, throttle: Duration) {
        self.debounce = debounce;
        self.throttle = throttle;
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn state(&self) -> ReflowState {
        self.state
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn throttle(&self) -> Duration {
        self.throttle
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }
}

impl Default for ReflowScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE, DEFAULT_THROTTLE)
    }
}
