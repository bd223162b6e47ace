//! One-shot scheduled tasks with supersede/cancel semantics.
//!
//! A `Deadline` holds at most one pending task. Arming it again replaces the
//! pending task, cancelling clears it. The owner polls it with the current
//! time; a task that was superseded or cancelled is gone and can never fire.
//! The session loop sleeps until the earliest `at()` across all deadlines.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Deadline<T> {
    slot: Option<(Instant, T)>,
}

impl<T> Default for Deadline<T> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<T> Deadline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `payload` at `at`, superseding any pending task.
    pub fn arm(&mut self, at: Instant, payload: T) {
        self.slot = Some((at, payload));
    }

    /// Schedule `payload` after `delay` from `now`.
    pub fn arm_after(&mut self, now: Instant, delay: Duration, payload: T) {
        self.arm(now + delay, payload);
    }

    /// Drop the pending task, if any. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.slot.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.slot.is_some()
    }

    /// When the pending task is due.
    pub fn at(&self) -> Option<Instant> {
        self.slot.as_ref().map(|(at, _)| *at)
    }

    /// Pop the task if it is due at `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.slot {
            Some((at, _)) if *at <= now => self.slot.take().map(|(_, payload)| payload),
            _ => None,
        }
    }
}

/// Earliest of a set of optional instants.
pub fn earliest(deadlines: impl IntoIterator<Item = Option<Instant>>) -> Option<Instant> {
    deadlines.into_iter().flatten().min()
}

/// Current time on the runtime clock. Follows paused time under tokio's
/// test-util, so deadlines and sleeps agree.
pub fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// Sleep until `at`, or forever when nothing is scheduled.
pub async fn sleep_until(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending::<()>().await,
    }
}
