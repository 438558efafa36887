//! Lowest SHA-512 search CLI
//!
//! # Commands
//!
//! - `search` - Search the message space for the lowest digest
//! - `benchmark` - Measure dual-lane compression throughput
//! - `selfcheck` - Verify the SHA-512 primitives against known answers

use clap::{Parser, Subcommand};
use log::warn;
use std::hint::black_box;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lowest::algorithm::{compress_dual, selfcheck, Block, INITIAL_STATE, LANES};
use lowest::config::{DEFAULT_ACCUMULATE_EVERY, DEFAULT_CEILING_BITS};
use lowest::{logger, Alphabet, Console, Pool, SearchConfig, Seeding, Summary};

#[derive(Parser)]
#[command(name = "lowest")]
#[command(author = "Cyberia")]
#[command(version = "0.1.0")]
#[command(about = "Exhaustive search for the message with the lowest SHA-512 digest")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More log output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for the lowest digest
    Search {
        /// Number of threads to use (default: number of CPU cores)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Message symbols, in enumeration order (default: a-z)
        #[arg(short, long)]
        alphabet: Option<String>,

        /// Message length in symbols
        #[arg(short, long, default_value = "28")]
        length: usize,

        /// How lanes pick their starting messages
        #[arg(long, value_enum, default_value_t = Seeding::Partitioned)]
        seeding: Seeding,

        /// Ignore digests with fewer leading zero bits
        #[arg(long, default_value_t = DEFAULT_CEILING_BITS)]
        ceiling_bits: u32,

        /// Seconds between progress lines
        #[arg(long, default_value = "10")]
        report_interval: u64,

        /// Iterations between shared counter updates
        #[arg(long, default_value_t = DEFAULT_ACCUMULATE_EVERY)]
        accumulate_every: u64,

        /// Stop after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Print a JSON summary when the search ends
        #[arg(long)]
        json: bool,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of dual-lane compressions to run
        #[arg(short, long, default_value = "1000000")]
        count: u32,
    },

    /// Verify the hash primitives against known answers
    Selfcheck,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init(logger::level_from_flags(cli.verbose, cli.quiet)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Search {
            threads,
            alphabet,
            length,
            seeding,
            ceiling_bits,
            report_interval,
            accumulate_every,
            timeout,
            json,
        } => {
            let mut config = SearchConfig::default()
                .with_message_len(length)
                .with_seeding(seeding)
                .with_ceiling_bits(ceiling_bits)
                .with_report_interval(Duration::from_secs(report_interval))
                .with_accumulate_every(accumulate_every)
                .with_timeout_option(timeout.map(Duration::from_secs));
            if let Some(threads) = threads {
                config = config.with_threads(threads);
            }
            match alphabet.map(|a| a.parse::<Alphabet>()).transpose() {
                Ok(Some(alphabet)) => cmd_search(config.with_alphabet(alphabet), json),
                Ok(None) => cmd_search(config, json),
                Err(e) => Err(e.into()),
            }
        }
        Commands::Benchmark { count } => cmd_benchmark(count),
        Commands::Selfcheck => cmd_selfcheck(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_search(config: SearchConfig, json: bool) -> anyhow::Result<()> {
    // A wrong primitive would make every result meaningless
    selfcheck::run()?;

    let odometer = config.validate()?;
    eprintln!(
        "Searching {} symbol messages over {:?} with {} threads",
        odometer.len(),
        odometer.alphabet(),
        config.threads
    );

    let threads = config.threads;
    let pool = Pool::new(config).with_observer(Arc::new(console(json)));

    install_interrupt_handler(pool.stop_handle());

    let outcome = pool.run()?;

    if outcome.best.is_none() {
        eprintln!(
            "No digest with at least {} leading zero bits found",
            pool.config().ceiling_bits
        );
    }

    if json {
        let summary = Summary::from(&outcome);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("\nResults:");
        println!("  Threads: {}", threads);
        println!("  Hash trials: {}", outcome.iterations);
        println!("  Time elapsed: {:.2}s", outcome.elapsed.as_secs_f64());
        if let Some((digest, message)) = &outcome.best {
            println!("  Best message: {}", message);
            println!("  Best digest: {}", digest);
            println!("  Leading zero bits: {}", digest.leading_zero_bits());
        }
    }

    Ok(())
}

/// Improvement lines stay off stdout when it carries the JSON summary
fn console(json: bool) -> Console {
    if json {
        Console::new().without_stdout()
    } else {
        Console::new()
    }
}

/// Raise `stop` on Ctrl+C. Returns `false` if no handler could be installed.
fn install_interrupt_handler(stop: Arc<AtomicBool>) -> bool {
    let installed = ctrlc::set_handler(move || {
        warn!("interrupt received, stopping workers");
        stop.store(true, Ordering::Relaxed);
    });
    if let Err(e) = &installed {
        warn!(
            "could not install Ctrl+C handler ({}), an interrupt will end the search without a summary",
            e
        );
    }
    installed.is_ok()
}

fn cmd_benchmark(count: u32) -> anyhow::Result<()> {
    println!("Running benchmark with {} dual-lane compressions...", count);

    let odometer = SearchConfig::default().validate()?;
    let mut messages = [odometer.first(), odometer.start(1)];
    let mut blocks = [Block::encode(&messages[0]), Block::encode(&messages[1])];

    let start = Instant::now();

    for _ in 0..count {
        black_box(compress_dual([INITIAL_STATE; LANES], [&blocks[0], &blocks[1]]));
        for (message, block) in messages.iter_mut().zip(blocks.iter_mut()) {
            odometer.advance(message);
            block.write_message(message);
        }
    }

    let elapsed = start.elapsed();
    let hashes = count as f64 * LANES as f64;
    let hashrate = hashes / elapsed.as_secs_f64();

    println!("\nResults:");
    println!("  Total hashes: {}", hashes);
    println!("  Time elapsed: {:.2}s", elapsed.as_secs_f64());
    println!("  Hashrate: {:.2} MH/s per thread", hashrate / 1e6);
    println!(
        "  Estimated: {:.2} MH/s on {} threads",
        hashrate * num_cpus::get() as f64 / 1e6,
        num_cpus::get()
    );

    Ok(())
}

fn cmd_selfcheck() -> anyhow::Result<()> {
    selfcheck::run()?;
    println!(
        "All {} known answers and the dual-lane check passed",
        selfcheck::KNOWN_ANSWERS.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_mode_keeps_stdout_clean() {
        assert!(!console(true).writes_stdout());
        assert!(console(false).writes_stdout());
    }

    #[test]
    fn test_second_interrupt_handler_is_reported() {
        let stop = Arc::new(AtomicBool::new(false));
        // Only one handler per process; whichever call comes second fails
        let first = install_interrupt_handler(Arc::clone(&stop));
        let second = install_interrupt_handler(Arc::clone(&stop));

        assert!(first);
        assert!(!second);
        assert!(!stop.load(Ordering::Relaxed));
    }
}
