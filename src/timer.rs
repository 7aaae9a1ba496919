use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Stopped,
    Running,
    Paused,
    /// A configured limit ran out. Only `reset` leaves this state.
    Expired,
}

/// Optional countdown limit for a session, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeLimit(Option<u64>);

impl TimeLimit {
    pub const UNLIMITED: TimeLimit = TimeLimit(None);

    pub fn seconds(secs: u64) -> Self {
        Self(Some(secs))
    }

    /// Negative values mean "no limit".
    pub fn from_secs(secs: i64) -> Self {
        u64::try_from(secs).map(Self::seconds).unwrap_or_default()
    }

    pub fn as_secs(&self) -> Option<u64> {
        self.0
    }

    pub fn is_unlimited(&self) -> bool {
        self.0.is_none()
    }
}

impl From<Option<u64>> for TimeLimit {
    fn from(v: Option<u64>) -> Self {
        Self(v)
    }
}

/// What a call to [`SessionTimer::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer is not running; nothing changed
    Ignored,
    Advanced,
    /// This tick used up the last second of the limit
    Expired,
}

/// One-second resolution session clock.
///
/// Counts elapsed time while running and, when a limit is set, counts the
/// remaining time down to zero. Ticks are supplied by the host; the timer
/// itself never reads a clock.
#[derive(Debug, Clone)]
pub struct SessionTimer {
    state: TimerState,
    limit: TimeLimit,
    elapsed_secs: u64,
    remaining_secs: Option<u64>,
}

impl SessionTimer {
    pub fn new(limit: TimeLimit) -> Self {
        Self {
            state: TimerState::Stopped,
            limit,
            elapsed_secs: 0,
            remaining_secs: limit.as_secs(),
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn limit(&self) -> TimeLimit {
        self.limit
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// `None` when the timer has no limit.
    pub fn remaining_secs(&self) -> Option<u64> {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn start(&mut self) -> bool {
        if self.state != TimerState::Stopped {
            return false;
        }
        // a zero limit has nothing to count down
        if self.remaining_secs == Some(0) {
            self.state = TimerState::Expired;
            return true;
        }
        self.state = TimerState::Running;
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        self.state = TimerState::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != TimerState::Paused {
            return false;
        }
        self.state = TimerState::Running;
        true
    }

    /// Freeze the clock without expiring it, e.g. when the text is finished.
    pub fn stop(&mut self) {
        if matches!(self.state, TimerState::Running | TimerState::Paused) {
            self.state = TimerState::Stopped;
        }
    }

    pub fn reset(&mut self) {
        self.state = TimerState::Stopped;
        self.elapsed_secs = 0;
        self.remaining_secs = self.limit.as_secs();
    }

    /// Replace the limit. Resets the clock.
    pub fn set_limit(&mut self, limit: TimeLimit) {
        self.limit = limit;
        self.reset();
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.state != TimerState::Running {
            return TickOutcome::Ignored;
        }

        self.elapsed_secs += 1;

        match self.remaining_secs.as_mut() {
            Some(remaining) => {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    self.state = TimerState::Expired;
                    debug!(elapsed = self.elapsed_secs, "session timer expired");
                    TickOutcome::Expired
                } else {
                    TickOutcome::Advanced
                }
            }
            None => TickOutcome::Advanced,
        }
    }
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new(TimeLimit::UNLIMITED)
    }
}

/// Format seconds as `MM:SS`.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
