//! Startup self-check against published SHA-512 digests
//!
//! A wrong compression primitive would silently poison a search that may run
//! for hours, so the binary refuses to start any worker unless [`run`]
//! passes.

use crate::digest::Digest;
use crate::error::SelfCheckError;
use crate::lanes::compress_dual;
use crate::message::Block;
use crate::params::{BLOCK_SIZE, INITIAL_STATE, LENGTH_FIELD_SIZE, TERMINATOR};
use crate::primitives::compress;

/// A message with its published SHA-512 digest
#[derive(Debug, Clone, Copy)]
pub struct KnownAnswer {
    pub label: &'static str,
    pub message: &'static [u8],
    pub digest: &'static str,
}

/// Published SHA-512 test vectors (NESSIE / FIPS 180-2 style set)
pub const KNOWN_ANSWERS: &[KnownAnswer] = &[
    KnownAnswer {
        label: "empty string",
        message: b"",
        digest: "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce\
                 47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e",
    },
    KnownAnswer {
        label: "a",
        message: b"a",
        digest: "1f40fc92da241694750979ee6cf582f2d5d7d28e18335de05abc54d0560e0f53\
                 02860c652bf08d560252aa5e74210546f369fbbbce8c12cfc7957b2652fe9a75",
    },
    KnownAnswer {
        label: "abc",
        message: b"abc",
        digest: "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
                 2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f",
    },
    KnownAnswer {
        label: "message digest",
        message: b"message digest",
        digest: "107dbf389d9e9f71a3a95f6c055b9251bc5268c2be16d6c13492ea45b0199f33\
                 09e16455ab1e96118e8a905d5597b72038ddb372a89826046de66687bb420e7c",
    },
    KnownAnswer {
        label: "lowercase alphabet",
        message: b"abcdefghijklmnopqrstuvwxyz",
        digest: "4dbff86cc2ca1bae1e16468a05cb9881c97f1753bce3619034898faa1aabe429\
                 955a1bf8ec483d7421fe3c1646613a59ed5441fb0f321389f77f48a879c7b1f1",
    },
    KnownAnswer {
        label: "8 x 1234567890",
        message: b"12345678901234567890123456789012345678901234567890123456789012345678901234567890",
        digest: "72ec1ef1124a45b047e8b7c75a932195135bb61de24ec0d1914042246e0aec3a\
                 2354e093d76f3048b456764346900cb130d2a4fd5dd16abb5e30bcb850dee843",
    },
];

/// Lane 0 of the dual-lane known answer
const DUAL_LANE0_MESSAGE: &[u8] = b"message digest";

/// SHA-512 of [`sliding_window_message`]
const DUAL_LANE1_DIGEST: &str = "0988db6ee79aa0b4b28b0b3d2d9d50a0c2782144ba51a040\
                                 5bdf82f04e895fb6a4848953a0028d33dd6fce20c3994d07\
                                 8f8382dfc48903521c7aa744ddebf6c6";

/// The 111-byte message `abcdefgh bcdefghi ... nopqrstu` minus its last byte:
/// the longest message that still fits a single padded block.
pub fn sliding_window_message() -> Vec<u8> {
    (0..14u8)
        .flat_map(|row| (0..8u8).map(move |col| b'a' + row + col))
        .take(111)
        .collect()
}

/// One-shot SHA-512 of an arbitrary message, built on [`compress`].
///
/// Only the self-check needs multi-block input; the search itself always
/// hashes a single pre-padded block.
pub fn sha512(message: &[u8]) -> Digest {
    let mut state = INITIAL_STATE;

    let mut chunks = message.chunks_exact(BLOCK_SIZE);
    for chunk in &mut chunks {
        let mut bytes = [0u8; BLOCK_SIZE];
        bytes.copy_from_slice(chunk);
        compress(&mut state, &Block::from_bytes(bytes));
    }

    // Terminator and length field spill into a second block when the
    // remainder leaves no room for them
    let rest = chunks.remainder();
    let mut tail = [0u8; 2 * BLOCK_SIZE];
    tail[..rest.len()].copy_from_slice(rest);
    tail[rest.len()] = TERMINATOR;
    let tail_len = if rest.len() + 1 + LENGTH_FIELD_SIZE <= BLOCK_SIZE {
        BLOCK_SIZE
    } else {
        2 * BLOCK_SIZE
    };
    let bits = message.len() as u128 * 8;
    tail[tail_len - LENGTH_FIELD_SIZE..tail_len].copy_from_slice(&bits.to_be_bytes());

    for chunk in tail[..tail_len].chunks_exact(BLOCK_SIZE) {
        let mut bytes = [0u8; BLOCK_SIZE];
        bytes.copy_from_slice(chunk);
        compress(&mut state, &Block::from_bytes(bytes));
    }

    Digest::from_state(state)
}

fn expected_digest(label: &str, text: &str) -> Result<Digest, SelfCheckError> {
    Digest::from_hex(text).map_err(|e| SelfCheckError::Vector(format!("{}: {}", label, e)))
}

/// Verify the single-lane and dual-lane primitives against known answers
pub fn run() -> Result<(), SelfCheckError> {
    for vector in KNOWN_ANSWERS {
        let expected = expected_digest(vector.label, vector.digest)?;
        let actual = sha512(vector.message);
        if actual != expected {
            return Err(SelfCheckError::Digest {
                label: vector.label.to_string(),
                expected: expected.to_hex(),
                actual: actual.to_hex(),
            });
        }
    }

    let lane1_message = sliding_window_message();
    let blocks = [
        Block::padded(DUAL_LANE0_MESSAGE).map_err(|e| SelfCheckError::Vector(e.to_string()))?,
        Block::padded(&lane1_message).map_err(|e| SelfCheckError::Vector(e.to_string()))?,
    ];
    let expected = [
        expected_digest("message digest", KNOWN_ANSWERS[3].digest)?,
        expected_digest("sliding window", DUAL_LANE1_DIGEST)?,
    ];

    let states = compress_dual([INITIAL_STATE; 2], [&blocks[0], &blocks[1]]);
    for (lane, (state, expected)) in states.iter().zip(expected.iter()).enumerate() {
        let actual = Digest::from_state(*state);
        if actual != *expected {
            return Err(SelfCheckError::DualLane {
                lane,
                expected: expected.to_hex(),
                actual: actual.to_hex(),
            });
        }
    }

    Ok(())
}
