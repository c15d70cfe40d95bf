//! Wall-clock timers for the scheduler's cooperative loop.

use bg_ir::SchedulerState;
use std::time::Instant;

/// What happens when a timer fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timer {
    /// Run the look-ahead poll.
    Poll,
    /// Hand a beat snapshot to the beat callback.
    Deliver(SchedulerState),
}

/// One-shot timers sorted by deadline.
///
/// Timers with equal deadlines fire in the order they were pushed.
#[derive(Clone, Debug, Default)]
pub struct TimerQueue {
    entries: Vec<(Instant, Timer)>,
}

impl TimerQueue {
    /// Create a new empty timer queue.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Arm a timer.
    pub fn push(&mut self, deadline: Instant, timer: Timer) {
        let pos = self.entries.partition_point(|(d, _)| *d <= deadline);
        self.entries.insert(pos, (deadline, timer));
    }

    /// Deadline of the next timer to fire.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.first().map(|(d, _)| *d)
    }

    /// Pop the next timer if its deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<Timer> {
        match self.entries.first() {
            Some((d, _)) if *d <= now => Some(self.entries.remove(0).1),
            _ => None,
        }
    }

    /// Cancel everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns true if no timer is armed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of armed beat deliveries.
    pub fn pending_deliveries(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, t)| matches!(t, Timer::Deliver(_)))
            .count()
    }
}
