//! Purpose: Single-threaded timer queue driven by a virtual clock.
//! Exports: `Timers`, `TimerId`.
//! Role: Runs every deferred storefront action (toast exit, post-submit clears).
//! Invariants: Timers fire in due order; equal due times fire in schedule order.
//! Invariants: Timers cannot be cancelled once scheduled.
//! Invariants: The clock only moves forward, and only through `pop_due`/`advance_to`.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<T> {
    due: Duration,
    id: TimerId,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.id == other.id
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so the max-heap yields the earliest timer first.
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.id.cmp(&self.id))
    }
}

#[derive(Debug)]
pub struct Timers<T> {
    now: Duration,
    next_id: u64,
    queue: BinaryHeap<Entry<T>>,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Timers<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            queue: BinaryHeap::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.queue.peek().map(|entry| entry.due)
    }

    pub fn schedule(&mut self, delay: Duration, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.queue.push(Entry {
            due: self.now + delay,
            id,
            task,
        });
        id
    }

    /// Pops the earliest timer due at or before `until`, moving the clock to its due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<T> {
        if self.queue.peek()?.due > until {
            return None;
        }
        let entry = self.queue.pop()?;
        self.now = self.now.max(entry.due);
        Some(entry.task)
    }

    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
