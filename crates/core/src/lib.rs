//! # Lowest SHA-512 core
//!
//! Building blocks for an exhaustive search for the message with the
//! numerically smallest SHA-512 digest.
//!
//! ## Pieces
//!
//! - **Odometer**: walks every fixed-length message over an alphabet,
//!   rightmost symbol first, with carry
//! - **Block**: a message padded into one 128-byte SHA-512 block
//! - **Dual-lane hashing**: two blocks per call through an interleaved buffer,
//!   bit-identical to two single-lane compressions
//! - **Digest**: eight state words ordered as a big-endian 512-bit integer
//! - **Self-check**: known-answer vectors that must pass before a search starts
//!
//! ## Example
//!
//! ```rust
//! use lowest_core::{Alphabet, Block, LaneHasher, Odometer, Sha512Lanes};
//!
//! let odometer = Odometer::new(Alphabet::lowercase(), 3).unwrap();
//! let mut message = odometer.parse("abc").unwrap();
//! let first = Block::encode(&message);
//!
//! odometer.advance(&mut message);
//! assert_eq!(message.as_str(), "abd");
//! let second = Block::encode(&message);
//!
//! let [d0, _d1] = Sha512Lanes.digest_pair([&first, &second]);
//! assert!(d0.to_hex().starts_with("ddaf35a193617aba"));
//! ```

mod digest;
mod error;
mod lanes;
mod message;
mod params;
mod primitives;

pub mod selfcheck;

pub use digest::Digest;
pub use error::{ConfigError, SelfCheckError};
pub use lanes::{DualLaneBlock, DualLaneState, LaneHasher, Sha512Lanes, compress_dual};
pub use message::{Alphabet, Block, Message, Odometer};
pub use params::*;
pub use primitives::{compress, compress_interleaved};

#[cfg(test)]
mod tests;
