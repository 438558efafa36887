//! Shared best-result register
//!
//! One mutex guards everything workers share: the best digest and its
//! message, the cumulative iteration count, the active-worker count and the
//! progress probe. Hashing and enumeration never touch it; workers only lock
//! it for a strict improvement candidate, a batched count update, or on exit.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use lowest_core::{Digest, Message};

use crate::report::{Observer, Silent};

/// Consistent copy of the shared state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub best: Option<(Digest, Message)>,
    pub iterations: u64,
    pub active_workers: usize,
    /// Current message of the designated lane
    pub probe: Option<Message>,
}

#[derive(Debug)]
struct Shared {
    best: Option<(Digest, Message)>,
    ceiling: Digest,
    iterations: u64,
    active_workers: usize,
    probe: Option<Message>,
}

impl Shared {
    /// A candidate must be strictly below this to be recorded
    fn bound(&self) -> Digest {
        self.best.as_ref().map_or(self.ceiling, |(digest, _)| *digest)
    }
}

pub struct Tracker {
    shared: Mutex<Shared>,
    idle: Condvar,
    observer: Arc<dyn Observer>,
}

impl Tracker {
    /// Tracker that only accepts digests strictly below `ceiling`
    pub fn new(ceiling: Digest) -> Self {
        Self {
            shared: Mutex::new(Shared {
                best: None,
                ceiling,
                iterations: 0,
                active_workers: 0,
                probe: None,
            }),
            idle: Condvar::new(),
            observer: Arc::new(Silent),
        }
    }

    /// Tracker whose first candidate is always an improvement
    pub fn unbounded() -> Self {
        Self::new(Digest::MAX)
    }

    /// Notify `observer` of each improvement, inside the critical section
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    // Shared is plain data that no critical section leaves half-written,
    // so a panic elsewhere does not invalidate it
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `digest` and `message` if `digest` is strictly smaller than the
    /// current best. Compare and replace happen under one lock, so the best
    /// digest never increases and always travels with its own message.
    pub fn try_update(&self, digest: &Digest, message: &Message) -> bool {
        let mut shared = self.lock();
        if *digest >= shared.bound() {
            return false;
        }
        shared.best = Some((*digest, message.clone()));
        self.observer.improved(digest, message);
        true
    }

    /// Add a batch of evaluated candidates to the cumulative count
    pub fn accumulate(&self, delta: u64) {
        self.lock().iterations += delta;
    }

    pub fn snapshot(&self) -> Snapshot {
        let shared = self.lock();
        Snapshot {
            best: shared.best.clone(),
            iterations: shared.iterations,
            active_workers: shared.active_workers,
            probe: shared.probe.clone(),
        }
    }

    pub fn best(&self) -> Option<(Digest, Message)> {
        self.lock().best.clone()
    }

    pub fn iterations(&self) -> u64 {
        self.lock().iterations
    }

    /// Leading word of the current bound.
    ///
    /// Workers cache this and only offer candidates whose leading word is
    /// `<=` it. A digest with a larger leading word can never be smaller, so
    /// the filter never drops an improvement.
    pub fn best_head(&self) -> u64 {
        self.lock().bound().head()
    }

    /// Publish the designated lane's current position for progress output
    pub fn publish_probe(&self, message: &Message) {
        self.lock().probe = Some(message.clone());
    }

    pub fn worker_started(&self) {
        self.lock().active_workers += 1;
    }

    pub fn worker_finished(&self) {
        let mut shared = self.lock();
        shared.active_workers = shared.active_workers.saturating_sub(1);
        if shared.active_workers == 0 {
            self.idle.notify_all();
        }
    }

    /// Count a worker as active until the returned guard is dropped.
    ///
    /// The guard is released on normal exit, on unwind, and when a thread
    /// that was never spawned drops its closure.
    pub fn enter(self: &Arc<Self>) -> ActiveWorker {
        self.worker_started();
        ActiveWorker(Arc::clone(self))
    }

    pub fn active_workers(&self) -> usize {
        self.lock().active_workers
    }

    /// Block until no worker is active or `timeout` elapses.
    /// Returns `true` if all workers have finished.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let shared = self.lock();
        let (shared, _) = self
            .idle
            .wait_timeout_while(shared, timeout, |s| s.active_workers > 0)
            .unwrap_or_else(PoisonError::into_inner);
        shared.active_workers == 0
    }
}

/// Keeps one worker counted as active
pub struct ActiveWorker(Arc<Tracker>);

impl Drop for ActiveWorker {
    fn drop(&mut self) {
        self.0.worker_finished();
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::unbounded()
    }
}
