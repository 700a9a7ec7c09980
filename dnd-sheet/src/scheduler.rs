//! Deadlines for engine animation ticks.
//!
//! Ticks are fire-and-forget: once scheduled they are never cancelled. The
//! engine ignores ticks that arrive after its session has moved on.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

/// Longest a single tick may be deferred.
pub const MAX_TICK_DELAY: Duration = Duration::from_secs(60);

#[derive(Debug, Default)]
pub struct TickScheduler {
    deadlines: BinaryHeap<Reverse<Instant>>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a tick `delay` after `now`, deferring at most [`MAX_TICK_DELAY`].
    pub fn schedule(&mut self, now: Instant, delay: Duration) {
        self.deadlines.push(Reverse(now + delay.min(MAX_TICK_DELAY)));
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.peek().map(|Reverse(at)| *at)
    }

    /// How long the event loop may block before the next tick is due,
    /// capped at `ceiling`.
    pub fn poll_timeout(&self, now: Instant, ceiling: Duration) -> Duration {
        match self.next_deadline() {
            Some(at) => at.saturating_duration_since(now).min(ceiling),
            None => ceiling,
        }
    }

    /// Remove every deadline at or before `now`, returning how many were due.
    pub fn take_due(&mut self, now: Instant) -> usize {
        let mut due = 0;
        while let Some(Reverse(at)) = self.deadlines.peek() {
            if *at > now {
                break;
            }
            self.deadlines.pop();
            due += 1;
        }
        due
    }

    pub fn pending(&self) -> usize {
        self.deadlines.len()
    }
}
