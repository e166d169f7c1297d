//! Wall-clock benchmarking of generation calls.
//!
//! Each case (data type × size × configuration) is run a few times into a
//! fresh temporary file; the average time and an approximate throughput are
//! kept. Results can be exported as CSV or drawn as a text chart.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::error::QuantisError;
use crate::generator::QuantisGenerator;
use crate::request::{GenerationKind, GenerationRequest};

pub const DEFAULT_SIZES: [u64; 5] = [1024, 4096, 16384, 65536, 262144];
pub const DEFAULT_RUNS: usize = 3;

const CSV_HEADER: &str = "Data Type,Count,Configuration,Time (s),Throughput (MB/s)";

/// Request shape used for a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchConfig {
    /// No bounds, no separator.
    Default,
    /// Bounds plus a separator; integers and floats only.
    Complex,
}

impl BenchConfig {
    pub fn name(self) -> &'static str {
        match self {
            BenchConfig::Default => "default",
            BenchConfig::Complex => "complex",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BenchOptions {
    pub sizes: Vec<u64>,
    pub runs: usize,
}

impl Default for BenchOptions {
    fn default() -> Self {
        Self {
            sizes: DEFAULT_SIZES.to_vec(),
            runs: DEFAULT_RUNS,
        }
    }
}

/// Averaged measurement for one case.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchRecord {
    pub kind: GenerationKind,
    pub count: u64,
    pub config: BenchConfig,
    pub runs: usize,
    pub average: Duration,
    pub throughput_mb_s: f64,
}

/// Build the request a case runs with.
pub fn bench_request(
    kind: GenerationKind,
    count: u64,
    config: BenchConfig,
    output: &Path,
) -> GenerationRequest {
    match (kind, config) {
        (GenerationKind::Binary, _) => GenerationRequest::binary(count, output),
        (GenerationKind::Integer, BenchConfig::Default) => {
            GenerationRequest::integers(count, output, None, None, None)
        }
        (GenerationKind::Integer, BenchConfig::Complex) => {
            GenerationRequest::integers(count, output, Some(1), Some(100), Some(",".into()))
        }
        (GenerationKind::Float, BenchConfig::Default) => {
            GenerationRequest::floats(count, output, None, None, None)
        }
        (GenerationKind::Float, BenchConfig::Complex) => {
            GenerationRequest::floats(count, output, Some(0.0), Some(1.0), Some(" ".into()))
        }
    }
}

/// Time one generation into a temporary file that is removed afterwards.
pub fn time_generation(
    generator: &QuantisGenerator,
    kind: GenerationKind,
    count: u64,
    config: BenchConfig,
) -> Result<Duration, QuantisError> {
    let dir = tempfile::tempdir().map_err(|e| QuantisError::io(std::env::temp_dir(), e))?;
    let request = bench_request(kind, count, config, &dir.path().join("bench.out"));

    let start = Instant::now();
    generator.generate(&request)?;
    Ok(start.elapsed())
}

/// Approximate throughput in MB/s; text formats count 4 or 8 bytes per value.
pub fn throughput(kind: GenerationKind, count: u64, elapsed: Duration) -> f64 {
    let bytes_per_item = match kind {
        GenerationKind::Binary => 1.0,
        GenerationKind::Integer => 4.0,
        GenerationKind::Float => 8.0,
    };
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    let mb = count as f64 * bytes_per_item / (1024.0 * 1024.0);
    mb / secs
}

/// Run every case in `options`.
///
/// # Errors
/// [`QuantisError::DeviceNotReady`] if the device fails its probe; failures
/// of individual runs are logged and skipped.
pub fn run_benchmarks(
    generator: &QuantisGenerator,
    options: &BenchOptions,
) -> Result<Vec<BenchRecord>, QuantisError> {
    generator.ensure_ready()?;

    let kinds = [
        GenerationKind::Binary,
        GenerationKind::Integer,
        GenerationKind::Float,
    ];
    let mut records = Vec::new();

    for &size in &options.sizes {
        for kind in kinds {
            for config in [BenchConfig::Default, BenchConfig::Complex] {
                if kind == GenerationKind::Binary && config == BenchConfig::Complex {
                    continue;
                }
                info!(kind = %kind, size, config = config.name(), "benchmarking");

                let mut times = Vec::with_capacity(options.runs);
                for run in 1..=options.runs {
                    match time_generation(generator, kind, size, config) {
                        Ok(t) => times.push(t),
                        Err(e) => warn!(run, error = %e, "benchmark run failed"),
                    }
                }
                if times.is_empty() {
                    continue;
                }

                let average = times.iter().sum::<Duration>() / times.len() as u32;
                records.push(BenchRecord {
                    kind,
                    count: size,
                    config,
                    runs: times.len(),
                    average,
                    throughput_mb_s: throughput(kind, size, average),
                });
            }
        }
    }
    Ok(records)
}

pub fn to_csv(records: &[BenchRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for r in records {
        let _ = writeln!(
            out,
            "{},{},{},{:.6},{:.4}",
            r.kind,
            r.count,
            r.config.name(),
            r.average.as_secs_f64(),
            r.throughput_mb_s
        );
    }
    out
}

pub fn write_csv(records: &[BenchRecord], path: &Path) -> Result<(), QuantisError> {
    fs::write(path, to_csv(records)).map_err(|e| QuantisError::io(path, e))
}

/// Horizontal bar chart of throughput vs. size for the default configuration.
pub fn render_plot(records: &[BenchRecord]) -> String {
    const WIDTH: f64 = 40.0;

    let defaults: Vec<&BenchRecord> = records
        .iter()
        .filter(|r| r.config == BenchConfig::Default)
        .collect();
    let peak = defaults
        .iter()
        .map(|r| r.throughput_mb_s)
        .fold(0.0f64, f64::max);

    let mut out = String::from("Throughput vs size (MB/s)\n");
    for kind in [
        GenerationKind::Binary,
        GenerationKind::Integer,
        GenerationKind::Float,
    ] {
        let rows: Vec<_> = defaults.iter().filter(|r| r.kind == kind).collect();
        if rows.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{}", kind);
        for r in rows {
            let len = if peak > 0.0 {
                ((r.throughput_mb_s / peak) * WIDTH).round() as usize
            } else {
                0
            };
            let _ = writeln!(
                out,
                "  {:>8} | {:<40} {:.2}",
                r.count,
                "#".repeat(len),
                r.throughput_mb_s
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuantisConfig;

    fn record(kind: GenerationKind, count: u64, config: BenchConfig, mbs: f64) -> BenchRecord {
        BenchRecord {
            kind,
            count,
            config,
            runs: 3,
            average: Duration::from_millis(10),
            throughput_mb_s: mbs,
        }
    }

    #[test]
    fn test_throughput() {
        let t = throughput(GenerationKind::Binary, 1024 * 1024, Duration::from_secs(2));
        assert!((t - 0.5).abs() < 1e-9);
        let t = throughput(GenerationKind::Float, 1024 * 1024, Duration::from_secs(8));
        assert!((t - 1.0).abs() < 1e-9);
        assert_eq!(throughput(GenerationKind::Integer, 10, Duration::ZERO), 0.0);
        let t = throughput(GenerationKind::Float, u64::MAX, Duration::from_secs(1));
        assert!(t.is_finite() && t > 0.0);
    }

    #[test]
    fn test_complex_requests() {
        let p = Path::new("/tmp/b.out");
        let req = bench_request(GenerationKind::Integer, 10, BenchConfig::Complex, p);
        assert_eq!(
            req.args(),
            ["-i", "/tmp/b.out", "-n", "10", "--min", "1", "--max", "100", "-s", ","]
        );
        let req = bench_request(GenerationKind::Binary, 10, BenchConfig::Complex, p);
        assert_eq!(req.args(), ["-b", "/tmp/b.out", "-n", "10"]);
    }

    #[test]
    fn test_run_in_test_mode() {
        let generator = QuantisGenerator::new(QuantisConfig::default().with_test_mode(true));
        let options = BenchOptions {
            sizes: vec![64, 128],
            runs: 2,
        };
        let records = run_benchmarks(&generator, &options).unwrap();
        // binary(default) + integer(2) + float(2) per size
        assert_eq!(records.len(), 10);
        assert!(records.iter().all(|r| r.runs == 2));
        assert!(!records
            .iter()
            .any(|r| r.kind == GenerationKind::Binary && r.config == BenchConfig::Complex));
    }

    #[test]
    fn test_csv_and_plot() {
        let records = vec![
            record(GenerationKind::Binary, 1024, BenchConfig::Default, 2.0),
            record(GenerationKind::Binary, 4096, BenchConfig::Default, 4.0),
            record(GenerationKind::Integer, 1024, BenchConfig::Complex, 1.0),
        ];
        let csv = to_csv(&records);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(lines.next(), Some("binary,1024,default,0.010000,2.0000"));
        assert_eq!(csv.lines().count(), 4);

        let plot = render_plot(&records);
        assert!(plot.contains(&"#".repeat(40)));
        assert!(plot.contains(&format!("| {:<40} 2.00", "#".repeat(20))));
        assert!(!plot.contains("integer"));
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        write_csv(&[], &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), format!("{}\n", CSV_HEADER));
    }
}
