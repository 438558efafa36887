//! Error types for message-space configuration and the startup self-check

use thiserror::Error;

use crate::params::MAX_MESSAGE_LEN;

/// Invalid alphabet or message parameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("alphabet is empty")]
    EmptyAlphabet,

    #[error("alphabet symbol {0:#04x} is not printable ASCII")]
    Unprintable(u8),

    #[error("alphabet symbol '{0}' appears more than once")]
    DuplicateSymbol(char),

    #[error("message length {0} is outside 1..={max}", max = MAX_MESSAGE_LEN)]
    MessageLength(usize),

    #[error("'{0}' is not a symbol of the alphabet")]
    ForeignSymbol(char),
}

/// The compression primitive disagrees with a known answer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelfCheckError {
    #[error("SHA-512 mismatch for {label:?}: expected {expected}, got {actual}")]
    Digest {
        label: String,
        expected: String,
        actual: String,
    },

    #[error("dual-lane compression mismatch in lane {lane}: expected {expected}, got {actual}")]
    DualLane {
        lane: usize,
        expected: String,
        actual: String,
    },

    #[error("malformed known-answer vector: {0}")]
    Vector(String),
}
