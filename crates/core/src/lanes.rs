//! Dual-lane codec and hasher
//!
//! Two independent blocks (and two chaining states) travel through the
//! dual-lane primitive packed into one buffer. The packing convention lives
//! here and nowhere else:
//!
//! ```text
//! blocks: 8-byte groups alternate lanes   | l0 g0 | l1 g0 | l0 g1 | l1 g1 | ...
//! states: 64-bit words alternate lanes    | l0 w0 | l1 w0 | l0 w1 | l1 w1 | ...
//! ```

use crate::digest::Digest;
use crate::message::Block;
use crate::params::{BLOCK_SIZE, HashState, INITIAL_STATE, LANES, STATE_WORDS};
use crate::primitives::compress_interleaved;

// The byte interleave below is written for exactly two lanes
const _: () = assert!(LANES == 2);

/// Position of byte `index` of `lane` inside the interleaved block buffer
#[inline(always)]
const fn block_offset(index: usize, lane: usize) -> usize {
    ((index & !7) << 1) | (lane << 3) | (index & 7)
}

/// Two blocks interleaved every 8-byte group
#[derive(Clone, PartialEq, Eq)]
pub struct DualLaneBlock([u8; LANES * BLOCK_SIZE]);

impl DualLaneBlock {
    pub fn pack(blocks: [&Block; LANES]) -> Self {
        let mut buffer = [0u8; LANES * BLOCK_SIZE];
        for (lane, block) in blocks.iter().enumerate() {
            for (i, &byte) in block.as_bytes().iter().enumerate() {
                buffer[block_offset(i, lane)] = byte;
            }
        }
        Self(buffer)
    }

    pub fn unpack(&self) -> [Block; LANES] {
        core::array::from_fn(|lane| {
            let mut bytes = [0u8; BLOCK_SIZE];
            for (i, byte) in bytes.iter_mut().enumerate() {
                *byte = self.0[block_offset(i, lane)];
            }
            Block::from_bytes(bytes)
        })
    }

    /// Raw interleaved bytes
    pub fn as_bytes(&self) -> &[u8; LANES * BLOCK_SIZE] {
        &self.0
    }
}

impl core::fmt::Debug for DualLaneBlock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.unpack().iter()).finish()
    }
}

/// Two chaining states interleaved word by word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DualLaneState([u64; LANES * STATE_WORDS]);

impl DualLaneState {
    /// Both lanes at the SHA-512 initial value
    pub fn initial() -> Self {
        Self::pack(&[INITIAL_STATE; LANES])
    }

    pub fn pack(states: &[HashState; LANES]) -> Self {
        let mut words = [0u64; LANES * STATE_WORDS];
        for (lane, state) in states.iter().enumerate() {
            for (i, &word) in state.iter().enumerate() {
                words[i * LANES + lane] = word;
            }
        }
        Self(words)
    }

    pub fn unpack(&self) -> [HashState; LANES] {
        core::array::from_fn(|lane| core::array::from_fn(|i| self.0[i * LANES + lane]))
    }
}

/// Compress two independent blocks in one call.
///
/// Equivalent to running [`crate::compress`] on each `(state, block)` pair.
pub fn compress_dual(states: [HashState; LANES], blocks: [&Block; LANES]) -> [HashState; LANES] {
    let mut packed = DualLaneState::pack(&states);
    compress_interleaved(&mut packed, &DualLaneBlock::pack(blocks));
    packed.unpack()
}

/// Scores a pair of candidate blocks.
///
/// The search loop hashes through this trait so the scoring function can be
/// swapped (tests plug in cheap toy scorers).
pub trait LaneHasher {
    fn digest_pair(&mut self, blocks: [&Block; LANES]) -> [Digest; LANES];
}

/// SHA-512 of two single-block messages
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha512Lanes;

impl LaneHasher for Sha512Lanes {
    #[inline(always)]
    fn digest_pair(&mut self, blocks: [&Block; LANES]) -> [Digest; LANES] {
        compress_dual([INITIAL_STATE; LANES], blocks).map(Digest::from_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::compress;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    fn random_block(rng: &mut StdRng) -> Block {
        let mut bytes = [0u8; BLOCK_SIZE];
        rng.fill_bytes(&mut bytes);
        Block::from_bytes(bytes)
    }

    fn random_state(rng: &mut StdRng) -> HashState {
        core::array::from_fn(|_| rng.next_u64())
    }

    #[test]
    fn test_block_offsets_match_reference_layout() {
        assert_eq!(block_offset(0, 0), 0);
        assert_eq!(block_offset(7, 0), 7);
        assert_eq!(block_offset(0, 1), 8);
        assert_eq!(block_offset(8, 0), 16);
        assert_eq!(block_offset(9, 1), 25);
        assert_eq!(block_offset(127, 1), 255);
    }

    #[test]
    fn test_block_pack_unpack_inverse() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = random_block(&mut rng);
        let b = random_block(&mut rng);

        let packed = DualLaneBlock::pack([&a, &b]);
        assert_eq!(packed.unpack(), [a.clone(), b.clone()]);

        // Every byte of the buffer belongs to exactly one lane
        assert_eq!(&packed.as_bytes()[..8], &a.as_bytes()[..8]);
        assert_eq!(&packed.as_bytes()[8..16], &b.as_bytes()[..8]);
    }

    #[test]
    fn test_state_pack_unpack_inverse() {
        let mut rng = StdRng::seed_from_u64(2);
        let states = [random_state(&mut rng), random_state(&mut rng)];
        assert_eq!(DualLaneState::pack(&states).unpack(), states);
        assert_eq!(DualLaneState::initial().unpack(), [INITIAL_STATE; LANES]);
    }

    #[test]
    fn test_dual_matches_single_lane_on_random_corpus() {
        let mut rng = StdRng::seed_from_u64(0x5EED);

        for case in 0..256 {
            let blocks = [random_block(&mut rng), random_block(&mut rng)];
            let states = [random_state(&mut rng), random_state(&mut rng)];

            let dual = compress_dual(states, [&blocks[0], &blocks[1]]);

            let mut s0 = states[0];
            let mut s1 = states[1];
            compress(&mut s0, &blocks[0]);
            compress(&mut s1, &blocks[1]);

            assert_eq!(dual, [s0, s1], "dual-lane mismatch on case {}", case);
        }
    }

    #[test]
    fn test_lanes_do_not_interfere() {
        let mut rng = StdRng::seed_from_u64(3);
        let fixed = random_block(&mut rng);
        let other_a = random_block(&mut rng);
        let other_b = random_block(&mut rng);

        let [d0, _] = Sha512Lanes.digest_pair([&fixed, &other_a]);
        let [d1, _] = Sha512Lanes.digest_pair([&fixed, &other_b]);
        let [_, d2] = Sha512Lanes.digest_pair([&other_a, &fixed]);

        assert_eq!(d0, d1);
        assert_eq!(d0, d2);
    }
}
