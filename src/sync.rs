//! Thread-safe primitives for the simulation core
//!
//! Three small building blocks, each deliberately coarse:
//! - [`StagingQueue`]: MPMC FIFO used for cross-thread entity creation and
//!   for the control-input stream
//! - [`SharedVec`]: a mutex-guarded growable container with visitor-style
//!   iteration, holding the live entity sets
//! - [`SharedRng`]: one seeded generator shared by every thread
//!
//! The contract here is linearizability, not fine-grained concurrency: a
//! single lock per container is plenty at arcade-game entity counts.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Unbounded multi-producer/multi-consumer FIFO.
///
/// `push` never blocks a producer. Every item is delivered to exactly one
/// consumer. Cloning the queue clones both endpoints, so any thread may
/// produce or consume.
#[derive(Clone)]
pub struct StagingQueue<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> StagingQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Enqueue an item. Never blocks.
    pub fn push(&self, item: T) {
        // The queue owns a receiver for its whole lifetime, so the channel
        // can never be disconnected from the sending side.
        let _ = self.tx.send(item);
    }

    /// Block until an item is available, then dequeue it.
    pub fn wait_pop(&self) -> T {
        match self.rx.recv() {
            Ok(item) => item,
            // Unreachable while `self.tx` is alive, which it is for as long
            // as `self` is.
            Err(_) => unreachable!("staging queue disconnected"),
        }
    }

    /// Dequeue an item if one is immediately available.
    pub fn try_pop(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Block up to `timeout` for an item.
    pub fn wait_pop_timeout(&self, timeout: Duration) -> Option<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(item) => Some(item),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                unreachable!("staging queue disconnected")
            }
        }
    }

    /// Number of queued items at this instant.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<T> Default for StagingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutex-guarded growable container.
///
/// `for_each` and `erase_if` run under the container lock, so a visitor sees
/// every live element exactly once and no element is admitted or removed
/// mid-scan. Visitors must not touch the same container again (the lock is
/// not re-entrant); in practice entity visitors only reach *other*
/// containers, never their own.
pub struct SharedVec<T> {
    items: Mutex<Vec<T>>,
}

impl<T> SharedVec<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    pub fn push_back(&self, item: T) {
        self.items.lock().push(item);
    }

    /// Remove every element satisfying `pred`, compacting in place.
    pub fn erase_if<F: FnMut(&T) -> bool>(&self, mut pred: F) {
        self.items.lock().retain(|item| !pred(item));
    }

    /// Apply `visitor` to every live element, in insertion order.
    pub fn for_each<F: FnMut(&mut T)>(&self, mut visitor: F) {
        for item in self.items.lock().iter_mut() {
            visitor(item);
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl<T> Default for SharedVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Seeded PRNG shared by every thread.
///
/// One generator for the whole program keeps runs reproducible from a single
/// seed; the lock cost is irrelevant at the call rates involved (spawns and
/// splits, not per-pixel noise).
pub struct SharedRng {
    rng: Mutex<Pcg32>,
}

impl SharedRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(Pcg32::seed_from_u64(seed)),
        }
    }

    /// Uniform float in `[lo, hi)`
    pub fn range_f32(&self, lo: f32, hi: f32) -> f32 {
        self.rng.lock().random_range(lo..hi)
    }

    /// Uniform integer in `[lo, hi]`
    pub fn range_u64(&self, lo: u64, hi: u64) -> u64 {
        self.rng.lock().random_range(lo..=hi)
    }
}
