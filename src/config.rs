//! Run configuration

use std::time::Duration;

use lowest_core::{Alphabet, Digest, Odometer, DEFAULT_MESSAGE_LEN, LANES};
use serde::Serialize;

use crate::error::SearchError;

/// Leading zero bits a digest needs before it is reported at all
pub const DEFAULT_CEILING_BITS: u32 = 24;

/// Dual-lane iterations between two updates of the shared counter
pub const DEFAULT_ACCUMULATE_EVERY: u64 = 3_000_000;

/// Interval between two progress lines
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(10);

/// How each lane picks its starting message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Seeding {
    /// Split the message space into disjoint contiguous ranges, one per lane
    #[default]
    Partitioned,
    /// Seed each lane from wall-clock time plus its lane number
    Clock,
    /// Seed each lane from OS entropy plus its lane number
    Random,
}

/// Configuration for one search run. All values are fixed at startup.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Number of worker threads (each hashes two lanes)
    pub threads: usize,
    /// Symbols messages are built from
    pub alphabet: Alphabet,
    /// Message length in symbols
    pub message_len: usize,
    /// Lane seeding strategy
    pub seeding: Seeding,
    /// Only digests with at least this many leading zero bits are recorded
    pub ceiling_bits: u32,
    /// Dual-lane iterations between shared counter updates
    pub accumulate_every: u64,
    /// Progress polling interval
    pub report_interval: Duration,
    /// Stop cooperatively after this long
    pub timeout: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threads: num_cpus::get(),
            alphabet: Alphabet::lowercase(),
            message_len: DEFAULT_MESSAGE_LEN,
            seeding: Seeding::default(),
            ceiling_bits: DEFAULT_CEILING_BITS,
            accumulate_every: DEFAULT_ACCUMULATE_EVERY,
            report_interval: DEFAULT_REPORT_INTERVAL,
            timeout: None,
        }
    }
}

impl SearchConfig {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    pub fn with_message_len(mut self, message_len: usize) -> Self {
        self.message_len = message_len;
        self
    }

    pub fn with_seeding(mut self, seeding: Seeding) -> Self {
        self.seeding = seeding;
        self
    }

    pub fn with_ceiling_bits(mut self, bits: u32) -> Self {
        self.ceiling_bits = bits;
        self
    }

    pub fn with_accumulate_every(mut self, iterations: u64) -> Self {
        self.accumulate_every = iterations;
        self
    }

    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_timeout_option(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total number of lanes across all workers
    pub fn lanes(&self) -> usize {
        self.threads * LANES
    }

    /// Starting bound for the tracker
    pub fn ceiling(&self) -> Digest {
        Digest::with_leading_zero_bits(self.ceiling_bits)
    }

    /// Check every field and build the message-space odometer
    pub fn validate(&self) -> Result<Odometer, SearchError> {
        if self.threads == 0 {
            return Err(SearchError::ZeroThreads);
        }
        if self.accumulate_every == 0 {
            return Err(SearchError::ZeroAccumulate);
        }
        if self.report_interval.is_zero() {
            return Err(SearchError::ZeroReportInterval);
        }
        Ok(Odometer::new(self.alphabet.clone(), self.message_len)?)
    }
}
