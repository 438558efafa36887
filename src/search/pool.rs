//! Worker pool
//!
//! Builds one [`Worker`] per thread, runs them on named OS threads and polls
//! the tracker for progress until every worker has exited.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{error, info, warn};
use lowest_core::{Digest, LaneHasher, Message, Sha512Lanes};

use super::partition;
use super::tracker::Tracker;
use super::worker::{StopSignal, Worker, WorkerReport, WorkerState};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::report::{Observer, Silent};

/// Longest single wait on the tracker before the loop re-checks the clock
const MAX_WAIT: Duration = Duration::from_secs(60);

/// Result of a finished or stopped run
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best: Option<(Digest, Message)>,
    /// Candidates hashed across all workers
    pub iterations: u64,
    /// Every lane ran out of messages
    pub exhausted: bool,
    pub workers: Vec<WorkerReport>,
    pub elapsed: Duration,
}

pub struct Pool {
    config: SearchConfig,
    observer: Arc<dyn Observer>,
    stop: Arc<AtomicBool>,
}

impl Pool {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            observer: Arc::new(Silent),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Flag that stops every worker cooperatively once set
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Search with SHA-512
    pub fn run(&self) -> Result<SearchOutcome, SearchError> {
        self.run_with(|_| Sha512Lanes)
    }

    /// Search with the hasher `make_hasher` builds for each worker index
    pub fn run_with<H, F>(&self, mut make_hasher: F) -> Result<SearchOutcome, SearchError>
    where
        H: LaneHasher + Send + 'static,
        F: FnMut(usize) -> H,
    {
        let config = &self.config;
        let odometer = config.validate()?;
        let assignments = partition::plan(&odometer, config.seeding, config.threads)?;

        if odometer
            .space_size()
            .is_some_and(|size| size < config.lanes() as u128)
        {
            warn!(
                "{} lanes for {} messages, surplus lanes will idle",
                config.lanes(),
                odometer.space_size().unwrap_or_default()
            );
        }

        // A timeout or failed spawn halts this run only, never later ones
        let signal = StopSignal::new(Arc::clone(&self.stop));
        let tracker = Arc::new(
            Tracker::new(config.ceiling()).with_observer(Arc::clone(&self.observer)),
        );

        // Every worker exists before the first thread starts
        let workers: Vec<Worker<H>> = assignments
            .into_iter()
            .enumerate()
            .map(|(index, assignment)| {
                Worker::new(
                    index,
                    odometer.clone(),
                    assignment,
                    make_hasher(index),
                    Arc::clone(&tracker),
                    signal.clone(),
                    config.accumulate_every,
                )
            })
            .collect();

        info!(
            "searching {} symbols of {:?} with {} threads ({:?} seeding)",
            odometer.len(),
            odometer.alphabet(),
            config.threads,
            config.seeding
        );

        let started = Instant::now();
        let mut handles = Vec::with_capacity(workers.len());
        for worker in workers {
            let index = worker.index();
            let active = tracker.enter();
            let spawned = thread::Builder::new()
                .name(format!("lowest-worker-{index}"))
                .spawn(move || {
                    let _active = active;
                    worker.run()
                });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    error!("failed to spawn worker {}: {}", index, source);
                    signal.halt();
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(SearchError::Spawn { index, source });
                }
            }
        }

        self.poll(&tracker, &signal, started);

        let mut reports = Vec::with_capacity(handles.len());
        let mut panicked = None;
        for (index, handle) in handles.into_iter().enumerate() {
            match handle.join() {
                Ok(report) => reports.push(report),
                Err(_) => {
                    error!("worker {} panicked", index);
                    panicked.get_or_insert(index);
                }
            }
        }
        if let Some(index) = panicked {
            return Err(SearchError::WorkerPanicked(index));
        }

        let snapshot = tracker.snapshot();
        let outcome = SearchOutcome {
            best: snapshot.best,
            iterations: snapshot.iterations,
            exhausted: reports.iter().all(|r| r.state == WorkerState::Exhausted),
            workers: reports,
            elapsed: started.elapsed(),
        };
        info!(
            "{} after {} candidates in {:.1?}",
            if outcome.exhausted { "exhausted" } else { "stopped" },
            outcome.iterations,
            outcome.elapsed
        );
        self.observer.finished(&outcome);
        Ok(outcome)
    }

    /// Report progress every interval and enforce the timeout until no
    /// worker is active
    fn poll(&self, tracker: &Tracker, signal: &StopSignal, started: Instant) {
        let interval = self.config.report_interval;
        // Durations too large to land on the clock mean "never"
        let deadline = self
            .config
            .timeout
            .and_then(|timeout| started.checked_add(timeout));
        let mut next_report = started.checked_add(interval);

        loop {
            let mut wake = next_report;
            if let Some(deadline) = deadline.filter(|_| !signal.is_set()) {
                wake = Some(wake.map_or(deadline, |wake| wake.min(deadline)));
            }
            let wait = wake
                .map_or(MAX_WAIT, |wake| wake.saturating_duration_since(Instant::now()))
                .min(MAX_WAIT);
            if tracker.wait_idle(wait) {
                return;
            }

            let now = Instant::now();
            if deadline.is_some_and(|deadline| now >= deadline) && signal.halt() {
                warn!("timeout reached, stopping workers");
            }
            if next_report.is_some_and(|next| now >= next) {
                self.observer.progress(&tracker.snapshot());
                next_report = now.checked_add(interval);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Seeding;
    use crate::search::{AsciiSum, Snapshot};
    use lowest_core::{selfcheck, Alphabet, Block, Odometer, LANES};
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;

    fn toy_config(symbols: &str, len: usize, threads: usize) -> SearchConfig {
        SearchConfig::default()
            .with_alphabet(symbols.parse::<Alphabet>().unwrap())
            .with_message_len(len)
            .with_threads(threads)
            .with_ceiling_bits(0)
    }

    fn brute_force(symbols: &str, len: usize) -> (Digest, Message) {
        let odometer = Odometer::new(symbols.parse().unwrap(), len).unwrap();
        let mut message = odometer.first();
        let mut best = (Digest::MAX, message.clone());
        loop {
            let digest = selfcheck::sha512(message.as_bytes());
            if digest < best.0 {
                best = (digest, message.clone());
            }
            if odometer.advance(&mut message) {
                return best;
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        improvements: Mutex<Vec<Digest>>,
        progress: Mutex<Vec<Snapshot>>,
        finished: Mutex<Option<u64>>,
    }

    impl Observer for Recorder {
        fn improved(&self, digest: &Digest, _message: &Message) {
            self.improvements.lock().unwrap().push(*digest);
        }

        fn progress(&self, snapshot: &Snapshot) {
            self.progress.lock().unwrap().push(snapshot.clone());
        }

        fn finished(&self, outcome: &SearchOutcome) {
            *self.finished.lock().unwrap() = Some(outcome.iterations);
        }
    }

    #[test]
    fn test_toy_end_to_end() {
        let outcome = Pool::new(toy_config("ab", 2, 1))
            .run_with(|_| AsciiSum)
            .unwrap();

        let (_, message) = outcome.best.unwrap();
        assert_eq!(message.as_str(), "aa");
        assert_eq!(outcome.iterations, 4);
        assert!(outcome.exhausted);
        assert_eq!(outcome.workers.len(), 1);
    }

    #[test]
    fn test_sha512_end_to_end() {
        let outcome = Pool::new(toy_config("ab", 2, 1)).run().unwrap();

        let (digest, message) = outcome.best.unwrap();
        assert_eq!(message.as_str(), "ba");
        assert_eq!(digest.head(), 0x205eb16cf565bdb2);
        assert_eq!(digest, selfcheck::sha512(b"ba"));
    }

    #[test]
    fn test_matches_brute_force_across_threads() {
        let expected = brute_force("abc", 4);

        for threads in [1, 2, 3, 8, 50] {
            let outcome = Pool::new(toy_config("abc", 4, threads).with_accumulate_every(7))
                .run()
                .unwrap();
            assert_eq!(outcome.best.as_ref(), Some(&expected), "{threads} threads");
            assert_eq!(outcome.iterations, 81, "{threads} threads");
            assert!(outcome.exhausted);
        }
    }

    #[test]
    fn test_clock_seeding_covers_from_each_start() {
        // One lane starts at "aa" and walks all four messages, the other
        // starts at "ba" and walks two
        let outcome = Pool::new(toy_config("ab", 2, 1).with_seeding(Seeding::Clock))
            .run_with(|_| AsciiSum)
            .unwrap();

        assert_eq!(outcome.best.unwrap().1.as_str(), "aa");
        assert_eq!(outcome.iterations, 6);
    }

    #[test]
    fn test_ceiling_hides_trivial_digests() {
        let outcome = Pool::new(toy_config("ab", 2, 1).with_ceiling_bits(64))
            .run()
            .unwrap();

        assert!(outcome.best.is_none());
        assert_eq!(outcome.iterations, 4);
    }

    #[test]
    fn test_observer_sees_monotone_improvements() {
        let recorder = Arc::new(Recorder::default());
        let outcome = Pool::new(toy_config("abcd", 4, 4))
            .with_observer(recorder.clone())
            .run()
            .unwrap();

        let improvements = recorder.improvements.lock().unwrap();
        assert!(improvements.windows(2).all(|pair| pair[1] < pair[0]));
        assert_eq!(improvements.last(), outcome.best.as_ref().map(|(d, _)| d));
        assert_eq!(*recorder.finished.lock().unwrap(), Some(256));
    }

    #[test]
    fn test_stop_before_start() {
        let pool = Pool::new(toy_config("ab", 2, 2));
        pool.stop_handle().store(true, Ordering::Relaxed);

        let outcome = pool.run_with(|_| AsciiSum).unwrap();

        assert!(!outcome.exhausted);
        assert_eq!(outcome.iterations, 0);
        assert!(outcome.best.is_none());
        assert!(outcome
            .workers
            .iter()
            .all(|w| w.state == WorkerState::Stopped));
    }

    #[test]
    fn test_timeout_stops_large_search() {
        let recorder = Arc::new(Recorder::default());
        let config = SearchConfig::default()
            .with_threads(2)
            .with_accumulate_every(1_000)
            .with_report_interval(Duration::from_millis(10))
            .with_timeout(Duration::from_millis(100));

        let outcome = Pool::new(config)
            .with_observer(recorder.clone())
            .run()
            .unwrap();

        assert!(!outcome.exhausted);
        assert!(outcome.iterations > 0);
        assert!(outcome.workers.iter().all(|w| w.state == WorkerState::Stopped));
        assert_eq!(
            outcome.iterations,
            outcome.workers.iter().map(|w| w.evaluated).sum::<u64>()
        );
        assert!(!recorder.progress.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unrepresentable_durations_mean_never() {
        let config = toy_config("ab", 2, 1)
            .with_timeout(Duration::from_secs(u64::MAX))
            .with_report_interval(Duration::from_secs(u64::MAX));

        let outcome = Pool::new(config).run_with(|_| AsciiSum).unwrap();

        assert!(outcome.exhausted);
        assert_eq!(outcome.iterations, 4);
    }

    #[test]
    fn test_timed_out_pool_can_run_again() {
        let config = SearchConfig::default()
            .with_threads(1)
            .with_accumulate_every(100)
            .with_report_interval(Duration::from_millis(10))
            .with_timeout(Duration::from_millis(50));
        let pool = Pool::new(config);

        let first = pool.run().unwrap();
        let second = pool.run().unwrap();

        assert!(first.iterations > 0);
        assert!(second.iterations > 0, "second run must not inherit the timeout stop");
        assert!(!pool.stop_handle().load(Ordering::Relaxed));
        assert!(second
            .workers
            .iter()
            .all(|w| w.state == WorkerState::Stopped));
    }

    struct Failing;

    impl LaneHasher for Failing {
        fn digest_pair(&mut self, _blocks: [&Block; LANES]) -> [Digest; LANES] {
            panic!("hasher failure");
        }
    }

    enum Either {
        Toy(AsciiSum),
        Failing(Failing),
    }

    impl LaneHasher for Either {
        fn digest_pair(&mut self, blocks: [&Block; LANES]) -> [Digest; LANES] {
            match self {
                Either::Toy(h) => h.digest_pair(blocks),
                Either::Failing(h) => h.digest_pair(blocks),
            }
        }
    }

    #[test]
    fn test_worker_panic_is_reported() {
        let result = Pool::new(toy_config("abc", 3, 2)).run_with(|index| {
            if index == 1 {
                Either::Failing(Failing)
            } else {
                Either::Toy(AsciiSum)
            }
        });

        assert!(matches!(result, Err(SearchError::WorkerPanicked(1))));
    }

    #[test]
    fn test_invalid_config_fails_before_spawning() {
        let result = Pool::new(toy_config("ab", 2, 0)).run();
        assert!(matches!(result, Err(SearchError::ZeroThreads)));
    }
}
