//! Cross-module tests: odometer, block encoding and hashing together

use crate::selfcheck::sha512;
use crate::{
    Alphabet, Block, Digest, INITIAL_STATE, LaneHasher, Odometer, Sha512Lanes, compress,
};

#[test]
fn test_block_hash_equals_one_shot_hash() {
    let odometer = Odometer::new(Alphabet::lowercase(), 28).unwrap();
    let mut message = odometer.start(1_700_000_000_123_456_789);

    for _ in 0..50 {
        let mut state = INITIAL_STATE;
        compress(&mut state, &Block::encode(&message));
        assert_eq!(
            Digest::from_state(state),
            sha512(message.as_bytes()),
            "single-block hash mismatch for {}",
            message
        );
        odometer.advance(&mut message);
    }
}

#[test]
fn test_dual_lane_over_enumerated_messages() {
    let odometer = Odometer::new("xyz".parse().unwrap(), 4).unwrap();
    let mut left = odometer.first();
    let mut right = odometer.parse("zzzz").unwrap();
    let mut hasher = Sha512Lanes;

    // Walk one lane forward from the start and the other from the end
    for _ in 0..40 {
        let [d0, d1] = hasher.digest_pair([&Block::encode(&left), &Block::encode(&right)]);
        assert_eq!(d0, sha512(left.as_bytes()));
        assert_eq!(d1, sha512(right.as_bytes()));

        odometer.advance(&mut left);
        odometer.advance(&mut right);
    }
}

#[test]
fn test_known_minimum_of_tiny_space() {
    // SHA-512 of aa, ab, ba, bb: "ba" has the smallest leading word (0x205eb16c...)
    let odometer = Odometer::new("ab".parse().unwrap(), 2).unwrap();
    let mut message = odometer.first();
    let mut best: Option<(Digest, String)> = None;

    loop {
        let digest = sha512(message.as_bytes());
        if best.as_ref().is_none_or(|(d, _)| digest < *d) {
            best = Some((digest, message.to_string()));
        }
        if odometer.advance(&mut message) {
            break;
        }
    }

    let (digest, text) = best.unwrap();
    assert_eq!(text, "ba");
    assert_eq!(digest.head(), 0x205eb16cf565bdb2);
}

#[test]
fn test_block_display_round_trip() {
    let odometer = Odometer::new(Alphabet::lowercase(), 9).unwrap();
    let message = odometer.start(987_654_321);
    let block = Block::encode(&message);

    let text = String::from_utf8(block.message_bytes().to_vec()).unwrap();
    assert_eq!(odometer.parse(&text).unwrap(), message);
}
