//! Minimal stderr backend for the `log` facade

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut err = std::io::stderr().lock();
        // Start on a fresh line in case a progress line is being overwritten
        let _ = writeln!(
            err,
            "\r[{:<5} {}] {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        std::io::stderr().flush().ok();
    }
}

/// Install the logger; only the first call takes effect
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// Map `-v` / `-q` flags to a level: quiet = errors only, default = warnings,
/// each `-v` one step more verbose
pub fn level_from_flags(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_flags() {
        assert_eq!(level_from_flags(0, false), LevelFilter::Warn);
        assert_eq!(level_from_flags(1, false), LevelFilter::Info);
        assert_eq!(level_from_flags(2, false), LevelFilter::Debug);
        assert_eq!(level_from_flags(9, false), LevelFilter::Trace);
        assert_eq!(level_from_flags(3, true), LevelFilter::Error);
    }
}
