//! SHA-512 protocol constants and search defaults
//!
//! The search hashes single-block messages only, so everything here is
//! sized for one 128-byte SHA-512 block.

/// Number of 64-bit words in the SHA-512 chaining state
pub const STATE_WORDS: usize = 8;

/// SHA-512 block size in bytes
pub const BLOCK_SIZE: usize = 128;

/// Size of the trailing big-endian bit-length field
pub const LENGTH_FIELD_SIZE: usize = 16;

/// Padding terminator appended right after the message
pub const TERMINATOR: u8 = 0x80;

/// Longest message whose terminator and length field still fit one block
pub const MAX_MESSAGE_LEN: usize = BLOCK_SIZE - 1 - LENGTH_FIELD_SIZE;

/// Independent hash computations per dual-lane call
pub const LANES: usize = 2;

/// Default message length (26^28 candidates for the lowercase alphabet)
pub const DEFAULT_MESSAGE_LEN: usize = 28;

/// Default alphabet
pub const DEFAULT_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// SHA-512 chaining state
pub type HashState = [u64; STATE_WORDS];

/// SHA-512 initial hash value (FIPS 180-4, 5.3.5)
pub const INITIAL_STATE: HashState = [
    0x6A09E667F3BCC908,
    0xBB67AE8584CAA73B,
    0x3C6EF372FE94F82B,
    0xA54FF53A5F1D36F1,
    0x510E527FADE682D1,
    0x9B05688C2B3E6C1F,
    0x1F83D9ABFB41BD6B,
    0x5BE0CD19137E2179,
];
