//! Run reporting
//!
//! The tracker calls [`Observer::improved`] inside its critical section, so
//! improvement lines come out in strictly decreasing digest order.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use lowest_core::{Digest, Message};
use serde::Serialize;

use crate::search::{SearchOutcome, Snapshot, WorkerReport};

/// Receives search events. Every method defaults to doing nothing.
pub trait Observer: Send + Sync {
    /// A strictly better digest was recorded
    fn improved(&self, _digest: &Digest, _message: &Message) {}

    /// Periodic snapshot from the pool
    fn progress(&self, _snapshot: &Snapshot) {}

    /// The pool joined every worker
    fn finished(&self, _outcome: &SearchOutcome) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Observer for Silent {}

/// Full digest and message, as written to stdout
pub fn improvement_line(digest: &Digest, message: &Message) -> String {
    format!("{} {}", digest.to_hex(), message)
}

/// First 32 hex digits and the message, as written to stderr
pub fn short_line(digest: &Digest, message: &Message) -> String {
    let hex = digest.to_hex();
    format!("{}... {}", &hex[..32], message)
}

pub fn progress_line(snapshot: &Snapshot) -> String {
    let billions = snapshot.iterations as f64 / 1e9;
    match &snapshot.probe {
        Some(probe) => format!("Hash trials: {billions:.3} billion ({probe})"),
        None => format!("Hash trials: {billions:.3} billion"),
    }
}

/// Terminal output: improvements on stdout and stderr, progress overwritten
/// in place on stderr
#[derive(Debug)]
pub struct Console {
    // Last stderr write was a progress line without a newline
    status_pending: Mutex<bool>,
    stdout: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self {
            status_pending: Mutex::new(false),
            stdout: true,
        }
    }
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep stdout free of improvement lines, e.g. when it carries a JSON
    /// summary. Improvements still reach stderr.
    pub fn without_stdout(mut self) -> Self {
        self.stdout = false;
        self
    }

    pub fn writes_stdout(&self) -> bool {
        self.stdout
    }

    /// End a pending progress line so the next write starts on a fresh one
    fn clear_status(&self, stderr: &mut impl Write) {
        let mut pending = self
            .status_pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *pending {
            let _ = writeln!(stderr);
            *pending = false;
        }
    }
}

impl Observer for Console {
    fn improved(&self, digest: &Digest, message: &Message) {
        if self.stdout {
            let mut stdout = io::stdout().lock();
            let _ = writeln!(stdout, "{}", improvement_line(digest, message));
            let _ = stdout.flush();
        }

        let mut stderr = io::stderr().lock();
        self.clear_status(&mut stderr);
        let _ = writeln!(stderr, "{}", short_line(digest, message));
    }

    fn progress(&self, snapshot: &Snapshot) {
        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "\r{}", progress_line(snapshot));
        let _ = stderr.flush();
        *self
            .status_pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = true;
    }

    fn finished(&self, outcome: &SearchOutcome) {
        let mut stderr = io::stderr().lock();
        self.clear_status(&mut stderr);
        let _ = if outcome.exhausted {
            writeln!(stderr, "Search space exhausted")
        } else {
            writeln!(stderr, "Search stopped")
        };
    }
}

/// Machine-readable summary of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub best_digest: Option<String>,
    pub best_message: Option<String>,
    pub iterations: u64,
    pub exhausted: bool,
    pub elapsed_secs: f64,
    pub threads: usize,
    pub workers: Vec<WorkerReport>,
}

impl From<&SearchOutcome> for Summary {
    fn from(outcome: &SearchOutcome) -> Self {
        Self {
            best_digest: outcome.best.as_ref().map(|(digest, _)| digest.to_hex()),
            best_message: outcome.best.as_ref().map(|(_, message)| message.to_string()),
            iterations: outcome.iterations,
            exhausted: outcome.exhausted,
            elapsed_secs: outcome.elapsed.as_secs_f64(),
            threads: outcome.workers.len(),
            workers: outcome.workers.clone(),
        }
    }
}
