//! Lowest SHA-512 search
//!
//! Enumerates every fixed-length message over an alphabet and keeps the one
//! whose SHA-512 digest, read as a 512-bit big-endian integer, is smallest.
//!
//! # Overview
//!
//! Each worker thread drives two lanes through a dual-lane SHA-512
//! compression. Lanes walk disjoint ranges of the message space in odometer
//! order, and a shared [`Tracker`] keeps the best digest together with its
//! message.
//!
//! # Example
//!
//! ```rust
//! use lowest::{Pool, SearchConfig};
//!
//! let config = SearchConfig::default()
//!     .with_alphabet("ab".parse().unwrap())
//!     .with_message_len(2)
//!     .with_threads(1)
//!     .with_ceiling_bits(0);
//!
//! let outcome = Pool::new(config).run().unwrap();
//! assert!(outcome.exhausted);
//! assert_eq!(outcome.iterations, 4);
//! assert_eq!(outcome.best.unwrap().1.as_str(), "ba");
//! ```

// Re-export the core algorithm
pub use lowest_core as algorithm;

pub mod config;
pub mod error;
pub mod logger;
pub mod report;
pub mod search;

// Convenience re-exports
pub use algorithm::{Alphabet, Digest, Message, Odometer};
pub use config::{SearchConfig, Seeding};
pub use error::SearchError;
pub use report::{Console, Observer, Silent, Summary};
pub use search::{Pool, SearchOutcome, Snapshot, Tracker, WorkerState};
