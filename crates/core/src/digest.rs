//! SHA-512 digest as a 512-bit big-endian unsigned integer

use core::fmt;

use crate::params::{HashState, STATE_WORDS};

/// A finished SHA-512 digest, stored as the eight state words.
///
/// The derived ordering compares word 0 first, so `a < b` is exactly the
/// big-endian unsigned comparison of the two 64-byte digests.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest(pub [u64; STATE_WORDS]);

impl Digest {
    /// The largest possible digest (all bits set)
    pub const MAX: Digest = Digest([u64::MAX; STATE_WORDS]);

    /// Wrap the state words left by the final compression
    #[inline(always)]
    pub const fn from_state(state: HashState) -> Self {
        Digest(state)
    }

    /// All-ones value shifted right by `bits`.
    ///
    /// A digest is below this bound only if it has at least `bits` leading
    /// zero bits, which makes it usable as the search's starting ceiling.
    ///
    /// ```rust
    /// use lowest_core::Digest;
    ///
    /// let ceiling = Digest::with_leading_zero_bits(24);
    /// assert_eq!(ceiling.head(), 0x0000_00FF_FFFF_FFFF);
    /// assert_eq!(Digest::with_leading_zero_bits(0), Digest::MAX);
    /// ```
    pub fn with_leading_zero_bits(bits: u32) -> Self {
        let mut words = [u64::MAX; STATE_WORDS];
        let mut remaining = bits;
        for word in words.iter_mut() {
            if remaining >= 64 {
                *word = 0;
                remaining -= 64;
            } else {
                *word >>= remaining;
                break;
            }
        }
        Digest(words)
    }

    /// Most significant word, used as a cheap pre-filter in the hot loop
    #[inline(always)]
    pub const fn head(&self) -> u64 {
        self.0[0]
    }

    /// Number of leading zero bits
    pub fn leading_zero_bits(&self) -> u32 {
        let mut zeros = 0;
        for word in self.0 {
            if word == 0 {
                zeros += 64;
            } else {
                return zeros + word.leading_zeros();
            }
        }
        zeros
    }

    /// Big-endian byte form (the conventional SHA-512 output)
    pub fn to_bytes(&self) -> [u8; STATE_WORDS * 8] {
        let mut out = [0u8; STATE_WORDS * 8];
        for (chunk, word) in out.chunks_exact_mut(8).zip(self.0.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        out
    }

    /// Parse 128 hex characters
    pub fn from_hex(text: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; STATE_WORDS * 8];
        hex::decode_to_slice(text, &mut bytes)?;
        let mut words = [0u64; STATE_WORDS];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut be = [0u8; 8];
            be.copy_from_slice(chunk);
            *word = u64::from_be_bytes(be);
        }
        Ok(Digest(words))
    }

    /// Lowercase hex, 128 characters
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl Default for Digest {
    fn default() -> Self {
        Self::MAX
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}
