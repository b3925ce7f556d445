//! Deferred follow-up work owned by the controller
//!
//! A `ScheduledTask` is a plain deadline. Whoever owns it decides when to
//! poll it, and dropping or cancelling it guarantees the work never runs, so
//! nothing can fire against a controller that has already been torn down.

use instant::Instant;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    due: Instant,
}

impl ScheduledTask {
    pub fn after(delay: Duration) -> Self {
        Self::at(Instant::now() + delay)
    }

    pub fn at(due: Instant) -> Self {
        Self { due }
    }

    pub fn due(&self) -> Instant {
        self.due
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.due
    }

    /// Time left until the task is due, zero once it is
    pub fn remaining(&self, now: Instant) -> Duration {
        self.due.saturating_duration_since(now)
    }
}
