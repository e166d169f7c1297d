//! Quantis library crate
//!
//! This crate wraps the `easyquantis` command-line tool that drives Quantis
//! hardware random number generators. It is organized into small modules:
//! `request` (typed requests and their argument mapping), `runner` (spawning
//! or simulating the tool), `output` (checking the files the tool writes),
//! `generator` (the facade tying them together), `bench` (timing helpers),
//! plus `config`, `error` and `logging`. The binary `src/main.rs` calls
//! `quantis_lib::run()` to execute the CLI.
//!
//! Public API
//!
//! - `run()`: CLI entrypoint used by the binary.
//! - `generator::QuantisGenerator`: library facade.
//!
//! See each module for detailed documentation on functions and behavior.

pub mod bench;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod output;
pub mod request;
pub mod runner;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::bench::{BenchOptions, DEFAULT_RUNS, render_plot, run_benchmarks, write_csv};
use crate::config::{DEFAULT_PROGRAM, QuantisConfig};
use crate::error::QuantisError;
use crate::generator::QuantisGenerator;

/// Top-level CLI types and runner. Keep `main.rs` thin.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Command-line wrapper for the easyquantis hardware RNG tool",
    long_about = None
)]
struct Cli {
    /// Path to the easyquantis executable
    #[arg(long = "easyquantis", global = true, default_value = DEFAULT_PROGRAM)]
    easyquantis: String,

    /// USB device index
    #[arg(short = 'u', long = "device", global = true, default_value_t = 0u32)]
    device: u32,

    /// Run in test mode without device
    #[arg(long = "test", global = true, action = ArgAction::SetTrue)]
    test: bool,

    /// More log output on stderr (-v, -vv)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check if easyquantis is accessible and device is ready
    Check,
    /// Generate binary random data
    Bin {
        /// Number of bytes to generate (must be positive)
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        count: u64,
        /// File path where binary data will be saved
        output_path: PathBuf,
    },
    /// Generate integer random data
    Integer {
        /// Number of integers to generate (must be positive)
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        count: u64,
        /// File path where integer data will be saved
        output_path: PathBuf,
        /// Minimum value
        #[arg(long = "min", allow_hyphen_values = true)]
        min: Option<i64>,
        /// Maximum value
        #[arg(long = "max", allow_hyphen_values = true)]
        max: Option<i64>,
        /// Value separator
        #[arg(short = 's', long = "separator")]
        separator: Option<String>,
    },
    /// Generate float random data
    Floats {
        /// Number of floats to generate (must be positive)
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        count: u64,
        /// File path where float data will be saved
        output_path: PathBuf,
        /// Minimum value
        #[arg(long = "min", allow_hyphen_values = true)]
        min: Option<f64>,
        /// Maximum value
        #[arg(long = "max", allow_hyphen_values = true)]
        max: Option<f64>,
        /// Value separator
        #[arg(short = 's', long = "separator")]
        separator: Option<String>,
    },
    /// Run benchmarking tests
    Bench {
        /// Runs per case
        #[arg(long = "runs", default_value_t = DEFAULT_RUNS as u32, value_parser = clap::value_parser!(u32).range(1..))]
        runs: u32,
        /// Comma-separated request sizes (default: 1024,4096,16384,65536,262144)
        #[arg(long = "sizes", value_delimiter = ',')]
        sizes: Vec<u64>,
        /// Write results as CSV to this file
        #[arg(long = "output")]
        output: Option<PathBuf>,
        /// Print a throughput vs size chart
        #[arg(long = "plot", action = ArgAction::SetTrue)]
        plot: bool,
    },
}

/// Run the Quantis CLI.
///
/// This function is the high-level entrypoint used by the `quantis` binary. It
/// parses CLI arguments, sets up logging and dispatches to the generator.
/// Results go to stdout; errors are printed to stderr with an optional hint
/// and the process exits with the error's code (see
/// [`QuantisError::exit_code`]).
///
/// Behavior summary:
/// - `check`: probe the device and report whether it is ready.
/// - `bin` / `integer` / `floats`: generate into a file.
/// - `bench`: time generation calls and optionally save/plot the results.
///
/// Example:
///
/// ```no_run
/// quantis_lib::run(); // called from src/main.rs
/// ```
pub fn run() {
    let cli = Cli::parse();
    if let Err(e) = logging::init_tracing(cli.verbose) {
        eprintln!("warning: failed to initialize logging: {}", e);
    }

    let config = QuantisConfig::new(cli.easyquantis, cli.device).with_test_mode(cli.test);
    let generator = QuantisGenerator::new(config);

    match execute(cli.command, &generator) {
        Ok(lines) => {
            for line in &lines {
                println!("{}", line);
            }
        }
        Err(e) => {
            for line in render_error(&e) {
                eprintln!("{}", line);
            }
            std::process::exit(e.exit_code());
        }
    }
}

/// Dispatch one subcommand and return the lines to print on success.
fn execute(command: Commands, generator: &QuantisGenerator) -> Result<Vec<String>, QuantisError> {
    let mode = if generator.config().test_mode {
        " (test mode)"
    } else {
        ""
    };

    match command {
        Commands::Check => {
            let status = generator.status();
            if !status.ready {
                return Err(QuantisError::DeviceNotReady(status.message.unwrap_or_else(
                    || "easyquantis is not accessible or device not ready".into(),
                )));
            }
            Ok(vec![format!(
                "✓ easyquantis is ready and device is accessible{}",
                mode
            )])
        }
        Commands::Bin { count, output_path } => {
            let result = generator.generate_binary(count, &output_path)?;
            Ok(vec![format!(
                "✓ Generated {} bytes to {}{}",
                result.count,
                output_path.display(),
                mode
            )])
        }
        Commands::Integer {
            count,
            output_path,
            min,
            max,
            separator,
        } => {
            let result =
                generator.generate_integers(count, &output_path, min, max, separator.as_deref())?;
            Ok(vec![format!(
                "✓ Generated {} integers to {}{}{}",
                result.count,
                output_path.display(),
                range_info(min, max),
                mode
            )])
        }
        Commands::Floats {
            count,
            output_path,
            min,
            max,
            separator,
        } => {
            let result =
                generator.generate_floats(count, &output_path, min, max, separator.as_deref())?;
            Ok(vec![format!(
                "✓ Generated {} floats to {}{}{}",
                result.count,
                output_path.display(),
                range_info(min, max),
                mode
            )])
        }
        Commands::Bench {
            runs,
            sizes,
            output,
            plot,
        } => {
            let mut options = BenchOptions {
                runs: runs as usize,
                ..BenchOptions::default()
            };
            if !sizes.is_empty() {
                options.sizes = sizes;
            }

            let mut lines = vec![format!("Starting quantis benchmarks{}...", mode)];
            let records = run_benchmarks(generator, &options)?;
            if records.is_empty() {
                lines.push("No successful benchmark runs completed.".into());
                return Ok(lines);
            }

            for r in &records {
                lines.push(format!(
                    "{:<8} {:>8} {:<8} avg {:.4}s  {:.2} MB/s",
                    r.kind,
                    r.count,
                    r.config.name(),
                    r.average.as_secs_f64(),
                    r.throughput_mb_s
                ));
            }
            if let Some(path) = output {
                write_csv(&records, &path)?;
                lines.push(format!("Results saved to {}", path.display()));
            }
            if plot {
                lines.extend(render_plot(&records).lines().map(str::to_string));
            }
            lines.push(format!("Total tests completed: {}", records.len()));
            Ok(lines)
        }
    }
}

fn range_info<T: std::fmt::Display>(min: Option<T>, max: Option<T>) -> String {
    match (min, max) {
        (Some(lo), Some(hi)) => format!(" (range: {}-{})", lo, hi),
        _ => String::new(),
    }
}

/// Lines printed on stderr for a failed command.
fn render_error(err: &QuantisError) -> Vec<String> {
    let first = match err {
        QuantisError::DeviceNotReady(_) => format!("✗ {}", err),
        _ => format!("{}: {}", err.kind(), err),
    };
    let mut lines = vec![first];
    if let Some(hint) = err.hint() {
        lines.push(format!("Hint: {}", hint));
    }
    lines
}
