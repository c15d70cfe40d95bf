//! Pending hits waiting for their start frame.

use bg_ir::Hit;

/// Capacity reserved up front so pushes on the audio thread never allocate.
pub const HIT_QUEUE_CAPACITY: usize = 256;

/// A queue of hits sorted by start frame.
///
/// Hits with the same start frame keep their push order.
#[derive(Clone, Debug)]
pub struct HitQueue {
    entries: Vec<(u64, Hit)>,
}

impl HitQueue {
    /// Create an empty queue with its full capacity reserved.
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(HIT_QUEUE_CAPACITY),
        }
    }

    /// Insert a hit starting at `frame`. Returns false (and drops the hit)
    /// when the queue is full.
    pub fn push(&mut self, frame: u64, hit: Hit) -> bool {
        if self.entries.len() >= HIT_QUEUE_CAPACITY {
            return false;
        }
        let pos = self.entries.partition_point(|(f, _)| *f <= frame);
        self.entries.insert(pos, (frame, hit));
        true
    }

    /// Pop the earliest hit if it starts at or before `frame`.
    pub fn pop_due(&mut self, frame: u64) -> Option<(u64, Hit)> {
        match self.entries.first() {
            Some((f, _)) if *f <= frame => Some(self.entries.remove(0)),
            _ => None,
        }
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of pending hits.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for HitQueue {
    fn default() -> Self {
        Self::new()
    }
}
