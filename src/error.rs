//! Errors raised while configuring or running a search

use std::io;

use lowest_core::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("thread count must be at least 1")]
    ZeroThreads,

    #[error("accumulate interval must be at least 1 iteration")]
    ZeroAccumulate,

    #[error("report interval must be non-zero")]
    ZeroReportInterval,

    #[error("failed to read entropy for seeding: {0}")]
    Entropy(String),

    #[error("failed to spawn worker {index}: {source}")]
    Spawn {
        index: usize,
        #[source]
        source: io::Error,
    },

    #[error("worker {0} panicked")]
    WorkerPanicked(usize),
}
