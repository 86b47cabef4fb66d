//! Search control: the wall-clock budget and the cancellation signal.

use std::time::{Duration, Instant};

/// Returned up the recursion when the time budget runs out mid-iteration.
///
/// Search frames only propagate it with `?`; the iterative-deepening driver
/// is the one place that matches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("search aborted: time budget exhausted")]
pub struct Aborted;

/// Tracks the time budget of one top-level search call.
///
/// The clock starts when the control is created.
#[derive(Debug, Clone)]
pub struct SearchControl {
    start: Instant,
    budget: Option<Duration>,
}

impl SearchControl {
    /// Control with a budget; `None` never expires.
    pub fn new(budget: Option<Duration>) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    /// Control that never expires.
    pub fn unlimited() -> Self {
        Self::new(None)
    }

    /// Whether the elapsed time has passed the budget.
    pub fn expired(&self) -> bool {
        self.budget.is_some_and(|budget| self.elapsed() > budget)
    }

    /// Time since the clock started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// The configured budget.
    pub fn budget(&self) -> Option<Duration> {
        self.budget
    }
}
