//! Lane seeding
//!
//! Turns a [`Seeding`] strategy into a starting position (and an optional
//! exclusive stop) for each of the `2 × threads` lanes.

use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;
use lowest_core::{Message, Odometer, LANES};

use crate::config::Seeding;
use crate::error::SearchError;

/// Contiguous run of messages in odometer order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneRange {
    pub start: Message,
    /// First message not in the range. `None` runs to overflow.
    pub stop: Option<Message>,
}

/// Ranges for both lanes of one worker. `None` is an empty lane.
pub type Assignment = [Option<LaneRange>; LANES];

/// Assign ranges to the lanes of `workers` workers
pub fn plan(
    odometer: &Odometer,
    seeding: Seeding,
    workers: usize,
) -> Result<Vec<Assignment>, SearchError> {
    let lanes = match seeding {
        Seeding::Partitioned => partitioned(odometer, workers * LANES),
        Seeding::Clock => seeded(odometer, clock_seed(), workers * LANES),
        Seeding::Random => seeded(odometer, random_seed()?, workers * LANES),
    };

    let mut lanes = lanes.into_iter();
    let assignments = (0..workers)
        .map(|_| [lanes.next().flatten(), lanes.next().flatten()])
        .collect();
    Ok(assignments)
}

/// Smallest prefix length whose `k^p` reaches `lanes`, capped at `L`
fn prefix_len(radix: u128, len: usize, lanes: u128) -> usize {
    let mut p = 0;
    let mut count = 1u128;
    while count < lanes && p < len {
        count *= radix;
        p += 1;
    }
    p
}

fn partitioned(odometer: &Odometer, lanes: usize) -> Vec<Option<LaneRange>> {
    let radix = odometer.alphabet().len() as u128;
    let total = lanes as u128;
    let p = prefix_len(radix, odometer.len(), total);
    let prefixes = radix.pow(p as u32);

    debug!(
        "partitioning {} lanes over {} prefixes of length {}",
        lanes, prefixes, p
    );

    (0..total)
        .map(|j| {
            let lo = j * prefixes / total;
            let hi = (j + 1) * prefixes / total;
            if lo == hi {
                debug!("lane {} has an empty range", j);
                return None;
            }
            let start = odometer.with_prefix(lo as u64, p);
            let stop = (j + 1 < total).then(|| odometer.with_prefix(hi as u64, p));
            debug!(
                "lane {}: {} .. {}",
                j,
                start,
                stop.as_ref().map_or("end".to_string(), Message::to_string)
            );
            Some(LaneRange { start, stop })
        })
        .collect()
}

fn seeded(odometer: &Odometer, base: u64, lanes: usize) -> Vec<Option<LaneRange>> {
    debug!("seeding {} lanes from base {}", lanes, base);
    (0..lanes as u64)
        .map(|lane| {
            Some(LaneRange {
                start: odometer.start(base.wrapping_add(lane)),
                stop: None,
            })
        })
        .collect()
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

fn random_seed() -> Result<u64, SearchError> {
    let mut bytes = [0u8; 8];
    getrandom::getrandom(&mut bytes).map_err(|e| SearchError::Entropy(e.to_string()))?;
    Ok(u64::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lowest_core::Alphabet;
    use std::collections::HashSet;

    fn odometer(symbols: &str, len: usize) -> Odometer {
        Odometer::new(symbols.parse::<Alphabet>().unwrap(), len).unwrap()
    }

    /// Every message a lane would visit
    fn walk(odometer: &Odometer, range: &LaneRange) -> Vec<Message> {
        let mut visited = Vec::new();
        let mut message = range.start.clone();
        loop {
            visited.push(message.clone());
            let overflowed = odometer.advance(&mut message);
            if overflowed || range.stop.as_ref() == Some(&message) {
                return visited;
            }
        }
    }

    #[test]
    fn test_partitions_cover_space_once() {
        let odo = odometer("abcd", 3);

        for workers in [1, 2, 3, 5, 7, 16, 32, 40] {
            let plan = plan(&odo, Seeding::Partitioned, workers).unwrap();
            assert_eq!(plan.len(), workers);

            let mut seen = HashSet::new();
            let mut count = 0;
            for range in plan.iter().flatten().flatten() {
                for message in walk(&odo, range) {
                    count += 1;
                    assert!(seen.insert(message.clone()), "{message} visited twice with {workers} workers");
                }
            }
            assert_eq!(count, 64, "{workers} workers");
        }
    }

    #[test]
    fn test_single_worker_splits_on_first_symbol() {
        let odo = odometer("ab", 2);
        let plan = plan(&odo, Seeding::Partitioned, 1).unwrap();
        let [lane0, lane1] = &plan[0];

        let lane0 = lane0.as_ref().unwrap();
        assert_eq!(lane0.start.as_str(), "aa");
        assert_eq!(lane0.stop.as_ref().unwrap().as_str(), "ba");

        let lane1 = lane1.as_ref().unwrap();
        assert_eq!(lane1.start.as_str(), "ba");
        assert!(lane1.stop.is_none(), "last lane runs to overflow");
    }

    #[test]
    fn test_surplus_lanes_are_empty() {
        let odo = odometer("ab", 1);
        let plan = plan(&odo, Seeding::Partitioned, 4).unwrap();

        let live: Vec<_> = plan.iter().flatten().flatten().collect();
        assert_eq!(live.len(), 2);
        assert_eq!(plan.iter().flatten().filter(|lane| lane.is_none()).count(), 6);
    }

    #[test]
    fn test_prefix_len() {
        assert_eq!(prefix_len(26, 28, 2), 1);
        assert_eq!(prefix_len(26, 28, 26), 1);
        assert_eq!(prefix_len(26, 28, 27), 2);
        assert_eq!(prefix_len(2, 3, 100), 3);
        assert_eq!(prefix_len(2, 3, 1), 0);
    }

    #[test]
    fn test_seeded_lanes_are_consecutive() {
        let odo = odometer("abcdefghijklmnopqrstuvwxyz", 6);
        let lanes = seeded(&odo, 28, 4);

        let starts: Vec<_> = lanes
            .iter()
            .map(|lane| lane.as_ref().unwrap().start.to_string())
            .collect();
        assert_eq!(starts, ["cbaaaa", "dbaaaa", "ebaaaa", "fbaaaa"]);
        assert!(lanes.iter().flatten().all(|lane| lane.stop.is_none()));
    }

    #[test]
    fn test_clock_and_random_plans_fill_every_lane() {
        let odo = odometer("xyz", 4);
        for seeding in [Seeding::Clock, Seeding::Random] {
            let plan = plan(&odo, seeding, 3).unwrap();
            assert_eq!(plan.iter().flatten().flatten().count(), 6, "{seeding:?}");
        }
    }
}
