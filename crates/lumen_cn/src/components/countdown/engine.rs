//! Countdown timing engine
//!
//! A pure state machine: every operation takes the current wall-clock
//! instant as an argument and returns the notification to emit, so the
//! engine is fully testable without a runtime.
//!
//! ```text
//! Idle ──calculate──▶ Ready ──start──▶ Running ◀──resume── Paused
//!                       ▲                │  └────pause────────▲
//!                       │              tick→0 / complete
//!                       └──reset──── Completed
//! ```
//!
//! In absolute mode each tick recomputes `remaining` from the wall clock, so
//! missed or late ticks self-correct. In relative mode each tick subtracts
//! the whole seconds elapsed since the previous one; sub-second periods
//! accumulate until they add up to a second.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use super::config::CountdownConfig;

/// How `remaining` is derived
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Counting toward a fixed deadline
    AbsoluteTarget(DateTime<Utc>),
    /// Counting down a number of seconds
    RelativeDuration(u64),
}

impl Mode {
    /// Target instant wins over duration; no configuration means zero
    pub fn from_config(config: &CountdownConfig) -> Self {
        match config.target {
            Some(target) => Mode::AbsoluteTarget(target),
            None => Mode::RelativeDuration(config.duration),
        }
    }
}

/// Lifecycle of one countdown run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimerState {
    /// Never calculated
    #[default]
    Idle,
    /// Calculated, not running
    Ready,
    Running,
    Paused,
    /// Reached zero; only `reset` or `start` revive it
    Completed,
}

impl TimerState {
    pub fn name(&self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::Ready => "ready",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
            TimerState::Completed => "completed",
        }
    }
}

/// Notification produced by a transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    Started { remaining: u64 },
    Paused { remaining: u64 },
    Resumed { remaining: u64 },
    Reset { remaining: u64 },
    Completed { at: DateTime<Utc> },
}

impl TimerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TimerEvent::Started { .. } => "started",
            TimerEvent::Paused { .. } => "paused",
            TimerEvent::Resumed { .. } => "resumed",
            TimerEvent::Reset { .. } => "reset",
            TimerEvent::Completed { .. } => "completed",
        }
    }

    pub fn detail(&self) -> Value {
        match self {
            TimerEvent::Started { remaining }
            | TimerEvent::Paused { remaining }
            | TimerEvent::Resumed { remaining }
            | TimerEvent::Reset { remaining } => json!({ "remaining": remaining }),
            TimerEvent::Completed { at } => json!({
                "remaining": 0,
                "completedAt": at.to_rfc3339(),
            }),
        }
    }
}

/// Result of one tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing happened
    Inactive,
    /// Paused; time is frozen
    Suppressed,
    /// Time advanced and remains
    Advanced { remaining: u64 },
    /// Time ran out; the caller must complete the run
    Expired,
}

/// Countdown state for one widget instance
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimerEngine {
    mode: Mode,
    initial_remaining: u64,
    remaining: u64,
    /// Elapsed milliseconds not yet subtracted in relative mode
    carry_ms: u64,
    paused: bool,
    state: TimerState,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerEngine {
    pub fn new() -> Self {
        Self {
            mode: Mode::RelativeDuration(0),
            initial_remaining: 0,
            remaining: 0,
            carry_ms: 0,
            paused: false,
            state: TimerState::Idle,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn initial_remaining(&self) -> u64 {
        self.initial_remaining
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Derive the starting value from configuration and the clock
    ///
    /// Idempotent for unchanged configuration and clock. A running timer
    /// keeps running with the new value.
    pub fn calculate_initial(&mut self, config: &CountdownConfig, now: DateTime<Utc>) -> u64 {
        self.mode = Mode::from_config(config);
        self.initial_remaining = match self.mode {
            Mode::AbsoluteTarget(target) => seconds_until(target, now),
            Mode::RelativeDuration(duration) => duration,
        };
        self.remaining = self.initial_remaining;
        self.carry_ms = 0;
        if matches!(self.state, TimerState::Idle | TimerState::Completed) {
            self.state = TimerState::Ready;
        }
        self.initial_remaining
    }

    /// Begin (or restart) ticking
    ///
    /// An expired or never-calculated timer is recalculated first.
    pub fn start(&mut self, config: &CountdownConfig, now: DateTime<Utc>) -> TimerEvent {
        self.paused = false;
        self.carry_ms = 0;
        if self.remaining == 0 {
            self.calculate_initial(config, now);
        }
        self.state = TimerState::Running;
        TimerEvent::Started {
            remaining: self.remaining,
        }
    }

    /// Advance by one one-second tick
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        self.advance(now, Duration::from_secs(1))
    }

    /// Advance by a tick of length `elapsed`
    pub fn advance(&mut self, now: DateTime<Utc>, elapsed: Duration) -> TickOutcome {
        match self.state {
            TimerState::Running | TimerState::Paused => {}
            _ => return TickOutcome::Inactive,
        }
        if self.paused {
            return TickOutcome::Suppressed;
        }

        self.remaining = match self.mode {
            Mode::AbsoluteTarget(target) => seconds_until(target, now).min(self.remaining),
            Mode::RelativeDuration(_) => {
                let total_ms = self.carry_ms.saturating_add(elapsed.as_millis() as u64);
                self.carry_ms = total_ms % 1000;
                self.remaining.saturating_sub(total_ms / 1000)
            }
        };

        if self.remaining == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Advanced {
                remaining: self.remaining,
            }
        }
    }

    /// Freeze time; emits even when already paused
    pub fn pause(&mut self) -> TimerEvent {
        self.paused = true;
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
        }
        TimerEvent::Paused {
            remaining: self.remaining,
        }
    }

    /// Unfreeze time; emits even when not paused
    pub fn resume(&mut self) -> TimerEvent {
        self.paused = false;
        if self.state == TimerState::Paused {
            self.state = TimerState::Running;
        }
        TimerEvent::Resumed {
            remaining: self.remaining,
        }
    }

    /// Back to a fresh, non-running run
    pub fn reset(&mut self, config: &CountdownConfig, now: DateTime<Utc>) -> TimerEvent {
        self.paused = false;
        self.state = TimerState::Ready;
        self.calculate_initial(config, now);
        TimerEvent::Reset {
            remaining: self.remaining,
        }
    }

    /// End the run
    pub fn complete(&mut self, now: DateTime<Utc>) -> TimerEvent {
        self.paused = false;
        self.remaining = 0;
        self.state = TimerState::Completed;
        TimerEvent::Completed { at: now }
    }
}

/// Whole seconds from `now` until `target`, clamped at zero
pub fn seconds_until(target: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (target - now).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        (millis / 1000) as u64
    }
}
