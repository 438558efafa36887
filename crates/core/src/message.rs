//! Candidate messages and their single-block encoding
//!
//! A message is a fixed-length string over a small alphabet. The search walks
//! the message space like an odometer: the rightmost symbol turns fastest and
//! carries into its left neighbour when it wraps.

use core::fmt;
use core::str::FromStr;

use crate::error::ConfigError;
use crate::params::{
    BLOCK_SIZE, DEFAULT_ALPHABET, LENGTH_FIELD_SIZE, MAX_MESSAGE_LEN, TERMINATOR,
};

/// Marks bytes that are not part of the alphabet in the rank table
const NOT_A_SYMBOL: u8 = u8::MAX;

/// Ordered set of printable ASCII symbols.
///
/// The first symbol is the minimum, the last the maximum; the odometer counts
/// in this order.
#[derive(Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<u8>,
    rank: [u8; 256],
}

impl Alphabet {
    /// Build an alphabet from its symbols in ascending order
    pub fn new(symbols: &[u8]) -> Result<Self, ConfigError> {
        if symbols.is_empty() {
            return Err(ConfigError::EmptyAlphabet);
        }

        let mut rank = [NOT_A_SYMBOL; 256];
        for (i, &symbol) in symbols.iter().enumerate() {
            if !(0x20..=0x7E).contains(&symbol) {
                return Err(ConfigError::Unprintable(symbol));
            }
            if rank[symbol as usize] != NOT_A_SYMBOL {
                return Err(ConfigError::DuplicateSymbol(symbol as char));
            }
            // At most 95 printable symbols, so ranks always fit below NOT_A_SYMBOL
            rank[symbol as usize] = i as u8;
        }

        Ok(Self {
            symbols: symbols.to_vec(),
            rank,
        })
    }

    /// `a` through `z`
    pub fn lowercase() -> Self {
        let mut rank = [NOT_A_SYMBOL; 256];
        for (i, &symbol) in DEFAULT_ALPHABET.iter().enumerate() {
            rank[symbol as usize] = i as u8;
        }
        Self {
            symbols: DEFAULT_ALPHABET.to_vec(),
            rank,
        }
    }

    /// Number of symbols (the radix of the odometer)
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    /// Smallest symbol
    pub fn min(&self) -> u8 {
        self.symbols[0]
    }

    /// Largest symbol
    pub fn max(&self) -> u8 {
        self.symbols[self.symbols.len() - 1]
    }

    /// Position of `symbol` in the alphabet
    #[inline(always)]
    pub fn rank(&self, symbol: u8) -> Option<usize> {
        match self.rank[symbol as usize] {
            NOT_A_SYMBOL => None,
            r => Some(r as usize),
        }
    }

    pub fn contains(&self, symbol: u8) -> bool {
        self.rank(symbol).is_some()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::lowercase()
    }
}

impl FromStr for Alphabet {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.as_bytes())
    }
}

impl fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Alphabet")
            .field(&String::from_utf8_lossy(&self.symbols))
            .finish()
    }
}

/// One candidate preimage. Only an [`Odometer`] creates these, so every byte
/// is a symbol of its alphabet and the message is valid ASCII.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Message(Vec<u8>);

impl Message {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.0).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Message({:?})", self.as_str())
    }
}

/// Enumerates the `k^L` messages of length `L` over an alphabet of `k` symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Odometer {
    alphabet: Alphabet,
    len: usize,
}

impl Odometer {
    pub fn new(alphabet: Alphabet, len: usize) -> Result<Self, ConfigError> {
        if len == 0 || len > MAX_MESSAGE_LEN {
            return Err(ConfigError::MessageLength(len));
        }
        Ok(Self { alphabet, len })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Message length `L`
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the message space, if it fits in a `u128`
    pub fn space_size(&self) -> Option<u128> {
        (self.alphabet.len() as u128).checked_pow(self.len as u32)
    }

    /// The all-minimum message, first in odometer order
    pub fn first(&self) -> Message {
        Message(vec![self.alphabet.min(); self.len])
    }

    /// Derive a starting message from a seed.
    ///
    /// The seed's base-`k` digits fill the leading half of the message, least
    /// significant digit first; the trailing half is the minimum symbol, so
    /// the odometer has the whole trailing range to walk before a carry
    /// reaches the seeded positions.
    pub fn start(&self, seed: u64) -> Message {
        let radix = self.alphabet.len() as u64;
        let seeded = self.len.div_ceil(2);
        let mut message = self.first();
        let mut rest = seed;
        for byte in message.0.iter_mut().take(seeded) {
            *byte = self.alphabet.symbols[(rest % radix) as usize];
            rest /= radix;
        }
        message
    }

    /// Message whose leading `prefix_len` symbols spell `index` in base `k`
    /// (most significant first) and whose remaining symbols are the minimum.
    ///
    /// Messages built this way are in odometer order: a larger `index` gives
    /// a later message.
    pub fn with_prefix(&self, index: u64, prefix_len: usize) -> Message {
        let radix = self.alphabet.len() as u64;
        let mut message = self.first();
        let mut rest = index;
        for byte in message.0[..prefix_len.min(self.len)].iter_mut().rev() {
            *byte = self.alphabet.symbols[(rest % radix) as usize];
            rest /= radix;
        }
        message
    }

    /// Step to the next message in odometer order.
    ///
    /// Returns `true` when the carry ran off the leftmost symbol: the space is
    /// exhausted and `message` has wrapped to [`Odometer::first`].
    #[inline(always)]
    pub fn advance(&self, message: &mut Message) -> bool {
        let symbols = &self.alphabet.symbols;
        for byte in message.0.iter_mut().rev() {
            let next = self.alphabet.rank[*byte as usize] as usize + 1;
            if next < symbols.len() {
                *byte = symbols[next];
                return false;
            }
            *byte = symbols[0];
        }
        true
    }

    /// Parse a message, checking its length and symbols
    pub fn parse(&self, text: &str) -> Result<Message, ConfigError> {
        if text.len() != self.len {
            return Err(ConfigError::MessageLength(text.len()));
        }
        if let Some(foreign) = text.bytes().find(|&b| !self.alphabet.contains(b)) {
            return Err(ConfigError::ForeignSymbol(foreign as char));
        }
        Ok(Message(text.as_bytes().to_vec()))
    }
}

/// One padded SHA-512 block: message, `0x80`, zeros, then the message length
/// in bits as a 128-bit big-endian integer.
#[derive(Clone, PartialEq, Eq)]
pub struct Block([u8; BLOCK_SIZE]);

impl Block {
    /// Encode a candidate message
    pub fn encode(message: &Message) -> Self {
        Self::pad(message.as_bytes())
    }

    /// Encode arbitrary bytes, up to [`MAX_MESSAGE_LEN`]
    pub fn padded(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() > MAX_MESSAGE_LEN {
            return Err(ConfigError::MessageLength(bytes.len()));
        }
        Ok(Self::pad(bytes))
    }

    fn pad(bytes: &[u8]) -> Self {
        let mut block = [0u8; BLOCK_SIZE];
        block[..bytes.len()].copy_from_slice(bytes);
        block[bytes.len()] = TERMINATOR;
        let bits = bytes.len() as u128 * 8;
        block[BLOCK_SIZE - LENGTH_FIELD_SIZE..].copy_from_slice(&bits.to_be_bytes());
        Self(block)
    }

    /// Overwrite the message bytes in place; the padding is left untouched.
    /// `message` must have the length this block was encoded with.
    #[inline(always)]
    pub fn write_message(&mut self, message: &Message) {
        debug_assert_eq!(message.len(), self.message_len());
        self.0[..message.len()].copy_from_slice(message.as_bytes());
    }

    /// Message length recovered from the length field
    pub fn message_len(&self) -> usize {
        let mut field = [0u8; LENGTH_FIELD_SIZE];
        field.copy_from_slice(&self.0[BLOCK_SIZE - LENGTH_FIELD_SIZE..]);
        let bytes = u128::from_be_bytes(field) / 8;
        bytes.min(MAX_MESSAGE_LEN as u128) as usize
    }

    /// The message this block encodes
    pub fn message_bytes(&self) -> &[u8] {
        &self.0[..self.message_len()]
    }

    pub fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.0
    }

    pub const fn from_bytes(bytes: [u8; BLOCK_SIZE]) -> Self {
        Self(bytes)
    }
}

impl Default for Block {
    fn default() -> Self {
        Self([0u8; BLOCK_SIZE])
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block({:?})",
            String::from_utf8_lossy(self.message_bytes())
        )
    }
}
