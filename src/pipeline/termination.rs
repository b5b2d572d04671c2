//! Producer completion bookkeeping.

use parking_lot::Mutex;

/// Counts finished producers against the number started.
///
/// `total` is fixed at construction. `finished` only grows, by exactly one
/// per producer, and never passes `total`.
#[derive(Debug)]
pub struct TerminationTracker {
    total: usize,
    finished: Mutex<usize>,
}

impl TerminationTracker {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            finished: Mutex::new(0),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn finished(&self) -> usize {
        *self.finished.lock()
    }

    /// Records one more finished producer and returns the new count.
    pub fn mark_finished(&self) -> usize {
        let mut finished = self.finished.lock();
        debug_assert!(*finished < self.total, "more producers finished than started");
        if *finished < self.total {
            *finished += 1;
        } else {
            tracing::error!(total = self.total, "producer finished twice");
        }
        *finished
    }

    /// True once every producer has finished.
    pub fn all_finished(&self) -> bool {
        *self.finished.lock() == self.total
    }
}
