use std::time::Duration;

/// Counting direction of a timer layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerDirection {
    /// Counts down from `initial_seconds` and holds at zero.
    Down,
    /// Counts up from zero (stopwatch).
    Up,
}

/// Timer state: `{stopped, running}` plus the time already banked by earlier runs.
///
/// The displayed value is always derived from this state and a clock reading; nothing ticks.
/// Time is measured on the host's monotonic clock as a `Duration` since an arbitrary epoch.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Timer {
    initial_seconds: u64,
    direction: TimerDirection,
    started_at: Option<Duration>,
    banked: Duration,
}

impl Timer {
    /// Countdown from `seconds`.
    pub fn countdown(seconds: u64) -> Self {
        Self::new(seconds, TimerDirection::Down)
    }

    /// Stopwatch counting up from zero.
    pub fn stopwatch() -> Self {
        Self::new(0, TimerDirection::Up)
    }

    /// A positive seconds value means countdown; zero means stopwatch.
    pub fn from_seconds(seconds: u64) -> Self {
        if seconds > 0 {
            Self::countdown(seconds)
        } else {
            Self::stopwatch()
        }
    }

    /// Explicit constructor.
    pub fn new(initial_seconds: u64, direction: TimerDirection) -> Self {
        Self {
            initial_seconds,
            direction,
            started_at: None,
            banked: Duration::ZERO,
        }
    }

    /// Configured starting value.
    pub fn initial_seconds(&self) -> u64 {
        self.initial_seconds
    }

    /// Counting direction.
    pub fn direction(&self) -> TimerDirection {
        self.direction
    }

    /// Whether the timer is running.
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Clock reading of the current run's start, if running.
    pub fn started_at(&self) -> Option<Duration> {
        self.started_at
    }

    /// Start or resume. Returns `false` if already running.
    pub fn start(&mut self, now: Duration) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(now);
        true
    }

    /// Stop, banking the exact elapsed time of the current run. Returns `false` if not running.
    pub fn stop(&mut self, now: Duration) -> bool {
        let Some(start) = self.started_at.take() else {
            return false;
        };
        self.banked = self.banked.saturating_add(now.saturating_sub(start));
        true
    }

    /// Back to the initial, stopped state.
    pub fn reset(&mut self) {
        self.started_at = None;
        self.banked = Duration::ZERO;
    }

    /// Total running time as of `now`. Clock readings earlier than the start count as zero.
    pub fn elapsed(&self, now: Duration) -> Duration {
        match self.started_at {
            Some(start) => self.banked.saturating_add(now.saturating_sub(start)),
            None => self.banked,
        }
    }

    /// Whole seconds to display at `now`.
    pub fn display_seconds(&self, now: Duration) -> u64 {
        let elapsed = self.elapsed(now).as_secs();
        match self.direction {
            TimerDirection::Down => self.initial_seconds.saturating_sub(elapsed),
            TimerDirection::Up => elapsed,
        }
    }

    /// `MM:SS` label at `now`.
    pub fn label(&self, now: Duration) -> String {
        format_mm_ss(self.display_seconds(now))
    }
}

/// Format whole seconds as zero-padded `MM:SS`. Minutes are not wrapped into hours.
pub fn format_mm_ss(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
#[path = "../../tests/unit/layer/timer.rs"]
mod tests;
