//! SHA-512 compression entry points
//!
//! The block transformation itself comes from the `sha2` crate's raw
//! `compress512`; this module only adapts it to the fixed-size types used by
//! the search and to the interleaved dual-lane buffer layout.

use sha2::digest::consts::U128;
use sha2::digest::generic_array::GenericArray;

use crate::lanes::{DualLaneBlock, DualLaneState};
use crate::message::Block;
use crate::params::HashState;

/// Single-lane SHA-512 compression: `state = F(state, block)`
#[inline(always)]
pub fn compress(state: &mut HashState, block: &Block) {
    let block: &GenericArray<u8, U128> = GenericArray::from_slice(block.as_bytes());
    sha2::compress512(state, core::slice::from_ref(block));
}

/// Dual-lane SHA-512 compression over interleaved buffers.
///
/// Both lanes are independent: lane `c` of `states` is compressed with lane
/// `c` of `blocks`, and the result is written back into the same lane.
#[inline(always)]
pub fn compress_interleaved(states: &mut DualLaneState, blocks: &DualLaneBlock) {
    let mut lane_states = states.unpack();
    let lane_blocks = blocks.unpack();
    for (state, block) in lane_states.iter_mut().zip(lane_blocks.iter()) {
        compress(state, block);
    }
    *states = DualLaneState::pack(&lane_states);
}
