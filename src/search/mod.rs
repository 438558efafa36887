//! Parallel exhaustive search

pub mod partition;
pub mod pool;
pub mod tracker;
pub mod worker;

pub use partition::{Assignment, LaneRange};
pub use pool::{Pool, SearchOutcome};
pub use tracker::{Snapshot, Tracker};
pub use worker::{StopSignal, Worker, WorkerReport, WorkerState};

/// Scores a message by the sum of its bytes
#[cfg(test)]
pub(crate) struct AsciiSum;

#[cfg(test)]
impl lowest_core::LaneHasher for AsciiSum {
    fn digest_pair(
        &mut self,
        blocks: [&lowest_core::Block; lowest_core::LANES],
    ) -> [lowest_core::Digest; lowest_core::LANES] {
        blocks.map(|block| {
            let mut words = [0u64; lowest_core::STATE_WORDS];
            words[0] = block.message_bytes().iter().map(|&b| b as u64).sum();
            lowest_core::Digest(words)
        })
    }
}
