//! Pausable countdown timers.

use std::fmt;
use std::time::Duration;

use crate::clock::SharedClock;

/// Where a [`PausableTimer`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    /// Never started, reset, or already expired.
    Idle,
    /// Counting down since the given clock reading.
    Running { since: Duration },
    /// Stopped partway through, holding the remaining budget.
    Paused,
    /// Stopped after the deadline passed, with the expiry not yet polled.
    Due,
}

/// A countdown that can be paused and resumed without losing time.
///
/// Expiry is delivered by [`PausableTimer::poll`], which reports `true` exactly
/// once per start/resume cycle. While running, the timer only remembers the
/// clock reading its current run began at; dropping that reading is what cancels
/// the pending expiry.
#[derive(Clone)]
pub struct PausableTimer {
    clock: SharedClock,
    duration: Duration,
    remaining: Duration,
    state: TimerState,
}

impl PausableTimer {
    pub fn new(clock: SharedClock, duration: Duration) -> Self {
        Self {
            clock,
            duration,
            remaining: duration,
            state: TimerState::Idle,
        }
    }

    /// Starts counting down from the full configured duration.
    pub fn start(&mut self) {
        self.remaining = self.duration;
        self.state = TimerState::Running { since: self.clock.now() };
    }

    /// Stops the countdown, keeping whatever time was left.
    ///
    /// Pausing a timer that isn't running does nothing, so repeated pauses never
    /// subtract the same elapsed time twice. A timer whose deadline has already
    /// passed stops at zero but keeps its expiry pending for the next
    /// [`poll`](Self::poll).
    pub fn pause(&mut self) {
        let TimerState::Running { since } = self.state else {
            return;
        };

        let elapsed = self.clock.now().saturating_sub(since);
        if elapsed >= self.remaining {
            self.remaining = Duration::ZERO;
            self.state = TimerState::Due;
        } else {
            self.remaining -= elapsed;
            self.state = TimerState::Paused;
        }
    }

    /// Counts down whatever budget is left, starting now.
    ///
    /// No-op while running or once the budget is spent. A reset or fresh timer
    /// runs its full duration.
    pub fn resume(&mut self) {
        if matches!(self.state, TimerState::Running { .. }) || self.remaining.is_zero() {
            return;
        }
        self.state = TimerState::Running { since: self.clock.now() };
    }

    /// Cancels any pending expiry and restores the full duration.
    pub fn reset(&mut self) {
        self.state = TimerState::Idle;
        self.remaining = self.duration;
    }

    /// Reports whether the countdown ran out since the last poll.
    ///
    /// On expiry the timer stops with zero time remaining.
    pub fn poll(&mut self) -> bool {
        let since = match self.state {
            TimerState::Running { since } => since,
            TimerState::Due => {
                self.state = TimerState::Idle;
                return true;
            }
            TimerState::Idle | TimerState::Paused => return false,
        };

        if self.clock.now().saturating_sub(since) >= self.remaining {
            self.state = TimerState::Idle;
            self.remaining = Duration::ZERO;
            true
        } else {
            false
        }
    }

    /// Time left on the countdown. Never mutates the timer.
    pub fn remaining(&self) -> Duration {
        match self.state {
            TimerState::Running { since } => self.remaining.saturating_sub(self.clock.now().saturating_sub(since)),
            TimerState::Idle | TimerState::Paused | TimerState::Due => self.remaining,
        }
    }

    /// Remaining time as `MM:SS`.
    pub fn formatted(&self) -> String {
        format_countdown(self.remaining())
    }

    /// Whether the countdown is currently running and has not yet run out.
    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. }) && !self.remaining().is_zero()
    }

    /// Whether the countdown was paused partway through.
    pub fn is_paused(&self) -> bool {
        self.state == TimerState::Paused
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Changes the configured duration. Applies from the next start or reset.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }
}

impl fmt::Debug for PausableTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PausableTimer")
            .field("duration", &self.duration)
            .field("remaining", &self.remaining())
            .field("state", &self.state)
            .finish()
    }
}

/// Formats a duration as zero-padded `MM:SS`, rounding down to the second.
pub fn format_countdown(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}
