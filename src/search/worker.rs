//! Search worker
//!
//! A worker owns two lanes and drives them through the hasher in lock step.
//! It moves through `Initializing → Searching → (Exhausted | Stopped)` and
//! only touches the shared tracker for improvement candidates, batched
//! counts and its final flush.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;
use lowest_core::{Block, LaneHasher, Message, Odometer, LANES};
use serde::Serialize;

use super::partition::{Assignment, LaneRange};
use super::tracker::Tracker;

/// Stop requests a worker honours: the caller's handle, which outlives the
/// run, and a flag the pool raises for this run only (timeout, failed spawn)
#[derive(Debug, Clone)]
pub struct StopSignal {
    requested: Arc<AtomicBool>,
    halted: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new(requested: Arc<AtomicBool>) -> Self {
        Self {
            requested,
            halted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stop this run. Returns `true` for the first call.
    pub fn halt(&self) -> bool {
        !self.halted.swap(true, Ordering::Relaxed)
    }

    #[inline(always)]
    pub fn is_set(&self) -> bool {
        self.requested.load(Ordering::Relaxed) || self.halted.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Initializing,
    Searching,
    /// Both lanes ran out of messages
    Exhausted,
    /// The shared stop flag was raised
    Stopped,
}

/// What a worker did before it exited
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub index: usize,
    pub state: WorkerState,
    /// Candidates hashed and counted by this worker
    pub evaluated: u64,
}

struct Lane {
    message: Message,
    block: Block,
    stop: Option<Message>,
    live: bool,
}

impl Lane {
    fn new(range: Option<LaneRange>, odometer: &Odometer) -> Self {
        match range {
            Some(LaneRange { start, stop }) => Lane {
                block: Block::encode(&start),
                message: start,
                stop,
                live: true,
            },
            // Empty lanes still need a block to hash; their digests are ignored
            None => {
                let message = odometer.first();
                Lane {
                    block: Block::encode(&message),
                    message,
                    stop: None,
                    live: false,
                }
            }
        }
    }

    #[inline(always)]
    fn advance(&mut self, odometer: &Odometer) {
        let overflowed = odometer.advance(&mut self.message);
        if overflowed || self.stop.as_ref() == Some(&self.message) {
            self.live = false;
            return;
        }
        self.block.write_message(&self.message);
    }
}

pub struct Worker<H> {
    index: usize,
    odometer: Odometer,
    lanes: [Lane; LANES],
    hasher: H,
    tracker: Arc<Tracker>,
    stop: StopSignal,
    accumulate_every: u64,
    state: WorkerState,
}

impl<H: LaneHasher> Worker<H> {
    pub fn new(
        index: usize,
        odometer: Odometer,
        assignment: Assignment,
        hasher: H,
        tracker: Arc<Tracker>,
        stop: StopSignal,
        accumulate_every: u64,
    ) -> Self {
        let lanes = assignment.map(|range| Lane::new(range, &odometer));
        Self {
            index,
            odometer,
            lanes,
            hasher,
            tracker,
            stop,
            accumulate_every: accumulate_every.max(1),
            state: WorkerState::Initializing,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    fn live_lanes(&self) -> u64 {
        self.lanes.iter().filter(|lane| lane.live).count() as u64
    }

    /// Search until both lanes are exhausted or a stop is signalled
    pub fn run(mut self) -> WorkerReport {
        self.state = WorkerState::Searching;
        debug!("worker {} searching", self.index);

        let mut head = self.tracker.best_head();
        let mut iterations = 0u64;
        let mut pending = 0u64;
        let mut evaluated = 0u64;

        loop {
            let live = self.live_lanes();
            if live == 0 {
                self.state = WorkerState::Exhausted;
                break;
            }
            if self.stop.is_set() {
                self.state = WorkerState::Stopped;
                break;
            }

            let digests = self
                .hasher
                .digest_pair([&self.lanes[0].block, &self.lanes[1].block]);

            for (lane, digest) in self.lanes.iter().zip(digests.iter()) {
                if lane.live && digest.head() <= head {
                    self.tracker.try_update(digest, &lane.message);
                    head = self.tracker.best_head();
                }
            }

            pending += live;
            iterations += 1;
            if iterations == self.accumulate_every {
                self.tracker.accumulate(pending);
                evaluated += pending;
                pending = 0;
                iterations = 0;
                if self.index == 0 {
                    self.tracker.publish_probe(&self.lanes[0].message);
                }
                // Pick up improvements found by other workers
                head = self.tracker.best_head();
            }

            for lane in self.lanes.iter_mut().filter(|lane| lane.live) {
                lane.advance(&self.odometer);
            }
        }

        self.tracker.accumulate(pending);
        evaluated += pending;
        debug!(
            "worker {} {:?} after {} candidates",
            self.index, self.state, evaluated
        );

        WorkerReport {
            index: self.index,
            state: self.state,
            evaluated,
        }
    }
}
