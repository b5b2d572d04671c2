//! Fixed-capacity blocking queue between producers and consumers.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

/// Capacity used when nothing else is configured.
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

struct Inner<T> {
    items: VecDeque<T>,
    /// Largest length ever observed, for capacity checks.
    peak: usize,
}

/// A bounded multi-producer multi-consumer FIFO.
///
/// `push` blocks while the queue is full and `pop` blocks while it is
/// empty, so the length can never exceed the capacity fixed at
/// construction.
///
/// Consumers use [`pop_until_done`](Self::pop_until_done), which also
/// evaluates a termination predicate under the queue lock. Whatever lock
/// that predicate takes is therefore always acquired after this one.
pub struct BoundedQueue<T> {
    inner: Mutex<Inner<T>>,
    capacity: usize,
    not_empty: Condvar,
    not_full: Condvar,
}

impl<T> BoundedQueue<T> {
    /// Creates an empty queue holding at most `capacity` items.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be non-zero");
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                peak: 0,
            }),
            capacity,
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// Highest number of items the queue has held at once.
    pub fn peak_len(&self) -> usize {
        self.inner.lock().peak
    }

    /// Appends `item`, waiting for a free slot if the queue is full.
    pub fn push(&self, item: T) {
        let mut inner = self.inner.lock();
        while inner.items.len() >= self.capacity {
            self.not_full.wait(&mut inner);
        }

        debug_assert!(inner.items.len() < self.capacity);
        inner.items.push_back(item);
        inner.peak = inner.peak.max(inner.items.len());
        drop(inner);

        self.not_empty.notify_one();
    }

    /// Removes the oldest item, waiting for one if the queue is empty.
    pub fn pop(&self) -> T {
        let mut inner = self.inner.lock();
        loop {
            if let Some(item) = inner.items.pop_front() {
                drop(inner);
                self.not_full.notify_one();
                return item;
            }
            self.not_empty.wait(&mut inner);
        }
    }

    /// Removes the oldest item, or returns `None` once the queue is empty
    /// and `is_done` reports that nothing more will be pushed.
    ///
    /// While the queue is empty and `is_done` is false the caller sleeps.
    /// `is_done` is evaluated with the queue lock held, on every wake-up.
    /// Returning `None` wakes every other waiting popper so that they
    /// observe the same condition and leave as well.
    pub fn pop_until_done<F>(&self, is_done: F) -> Option<T>
    where
        F: Fn() -> bool,
    {
        let mut inner = self.inner.lock();
        loop {
            if let Some(item) = inner.items.pop_front() {
                drop(inner);
                self.not_full.notify_one();
                return Some(item);
            }

            if is_done() {
                drop(inner);
                self.not_empty.notify_all();
                return None;
            }

            self.not_empty.wait(&mut inner);
        }
    }

    /// Wakes every thread waiting in `pop` or `pop_until_done`.
    ///
    /// The lock is taken before notifying: a popper that has just seen an
    /// unfinished run is either still holding it or already waiting, so the
    /// signal cannot fall between its check and its wait.
    pub fn wake_all(&self) {
        drop(self.inner.lock());
        self.not_empty.notify_all();
    }
}

impl<T> std::fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.capacity)
            .field("len", &inner.items.len())
            .field("peak", &inner.peak)
            .finish()
    }
}
