//! Process runners: the seam between the generator and the `easyquantis`
//! executable.
//!
//! [`SystemRunner`] spawns the real tool and blocks until it exits.
//! [`SimulatedRunner`] reads the same argument vector and writes plausible
//! output itself, which lets the CLI and the benchmarks run without a device.

use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;

use rand::distributions::Uniform;
use rand::{Rng, thread_rng};
use tracing::debug;

use crate::error::QuantisError;
use crate::request::is_null_device;

/// Exit status and captured streams of one tool run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success() -> Self {
        Self {
            code: Some(0),
            ..Self::default()
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// stdout and stderr joined, for diagnostics.
    pub fn combined(&self) -> String {
        match (self.stdout.trim(), self.stderr.trim()) {
            ("", err) => err.to_string(),
            (out, "") => out.to_string(),
            (out, err) => format!("{}\n{}", out, err),
        }
    }
}

/// Runs one external command to completion.
pub trait CommandRunner {
    /// Run `program` with `args` and wait for it to exit.
    ///
    /// A non-zero exit is not an error at this level; it is reported through
    /// [`ToolOutput::code`].
    ///
    /// # Errors
    /// [`QuantisError::NotFound`] when the executable cannot be resolved and
    /// [`QuantisError::Io`] for any other spawn failure.
    fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput, QuantisError>;
}

/// Spawns the real executable.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput, QuantisError> {
        debug!(program, ?args, "spawning");
        let output = Command::new(program).args(args).output().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                QuantisError::NotFound {
                    program: program.to_string(),
                }
            } else {
                QuantisError::io(program, e)
            }
        })?;

        let out = ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(code = ?out.code, "process exited");
        Ok(out)
    }
}

/// Stands in for the tool in test mode.
///
/// Understands the same flags the generator emits (`-b/-i/-f <path>`, `-n`,
/// `--min`, `--max`, `-s`) and writes `count` random values to the named file.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedRunner;

#[derive(Debug, Default)]
struct SimulatedArgs<'a> {
    flag: Option<&'a str>,
    path: Option<&'a str>,
    count: u64,
    min: Option<&'a str>,
    max: Option<&'a str>,
    separator: Option<&'a str>,
}

impl<'a> SimulatedArgs<'a> {
    fn parse(args: &'a [String]) -> Result<Self, String> {
        let mut parsed = SimulatedArgs::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let mut value = || {
                iter.next()
                    .map(String::as_str)
                    .ok_or_else(|| format!("missing value for {}", arg))
            };
            match arg.as_str() {
                "-b" | "-i" | "-f" => {
                    parsed.flag = Some(arg.as_str());
                    parsed.path = Some(value()?);
                }
                "-n" => {
                    let v = value()?;
                    parsed.count = v.parse().map_err(|_| format!("invalid count: {}", v))?;
                }
                "--min" => parsed.min = Some(value()?),
                "--max" => parsed.max = Some(value()?),
                "-s" => parsed.separator = Some(value()?),
                "-u" => {
                    value()?;
                }
                other => return Err(format!("unknown option: {}", other)),
            }
        }
        Ok(parsed)
    }
}

impl CommandRunner for SimulatedRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput, QuantisError> {
        debug!(program, ?args, "simulating");
        let parsed = match SimulatedArgs::parse(args) {
            Ok(p) => p,
            Err(msg) => return Ok(ToolOutput::failure(1, msg)),
        };
        let (Some(flag), Some(path)) = (parsed.flag, parsed.path) else {
            return Ok(ToolOutput::failure(1, "no output selected"));
        };
        if is_null_device(Path::new(path)) {
            return Ok(ToolOutput::success());
        }

        let sep = parsed.separator.unwrap_or("\n");
        let mut rng = thread_rng();
        let contents: Vec<u8> = match flag {
            "-b" => {
                let mut buf = vec![0u8; parsed.count as usize];
                rng.fill(&mut buf[..]);
                buf
            }
            "-i" => {
                let lo = parse_bound(parsed.min, 0i64)?;
                let hi = parse_bound(parsed.max, i64::from(u32::MAX))?;
                let dist = Uniform::new_inclusive(lo, hi.max(lo));
                (0..parsed.count)
                    .map(|_| rng.sample(dist).to_string())
                    .collect::<Vec<_>>()
                    .join(sep)
                    .into_bytes()
            }
            _ => {
                let lo = parse_bound(parsed.min, 0.0f64)?;
                let hi = parse_bound(parsed.max, 1.0f64)?;
                if !(hi - lo).is_finite() {
                    return Ok(ToolOutput::failure(1, "range overflow"));
                }
                let dist = Uniform::new_inclusive(lo, hi.max(lo));
                (0..parsed.count)
                    .map(|_| rng.sample(dist).to_string())
                    .collect::<Vec<_>>()
                    .join(sep)
                    .into_bytes()
            }
        };

        fs::write(path, contents).map_err(|e| QuantisError::io(path, e))?;
        Ok(ToolOutput {
            code: Some(0),
            stdout: format!("{} values written to {}", parsed.count, path),
            stderr: String::new(),
        })
    }
}

fn parse_bound<T: std::str::FromStr>(raw: Option<&str>, default: T) -> Result<T, QuantisError> {
    match raw {
        None => Ok(default),
        Some(s) => s
            .parse()
            .map_err(|_| QuantisError::Validation(format!("invalid bound: {}", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_program_is_not_found() {
        let err = SystemRunner
            .run("definitely-not-an-easyquantis-binary", &args(&["-u", "0"]))
            .unwrap_err();
        assert!(matches!(err, QuantisError::NotFound { .. }));
    }

    #[test]
    fn test_simulated_binary_writes_count_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("random.bin");
        let out = SimulatedRunner
            .run(
                "easyquantis",
                &args(&["-u", "0", "-b", path.to_str().unwrap(), "-n", "1024"]),
            )
            .unwrap();
        assert!(out.is_success());
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 1024);
    }

    #[test]
    fn test_simulated_integers_respect_bounds_and_separator() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ints.txt");
        SimulatedRunner
            .run(
                "easyquantis",
                &args(&[
                    "-i",
                    path.to_str().unwrap(),
                    "-n",
                    "50",
                    "--min",
                    "1",
                    "--max",
                    "6",
                    "-s",
                    ",",
                ]),
            )
            .unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let values: Vec<i64> = text.split(',').map(|v| v.parse().unwrap()).collect();
        assert_eq!(values.len(), 50);
        assert!(values.iter().all(|v| (1..=6).contains(v)));
    }

    #[test]
    fn test_simulated_extreme_float_bounds_fail_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let out = SimulatedRunner
            .run(
                "easyquantis",
                &args(&[
                    "-f",
                    path.to_str().unwrap(),
                    "-n",
                    "5",
                    "--min",
                    "-1e308",
                    "--max",
                    "1e308",
                ]),
            )
            .unwrap();
        assert_eq!(out.code, Some(1));
        assert_eq!(out.stderr, "range overflow");
        assert!(!path.exists());
    }

    #[test]
    fn test_simulated_unknown_option_fails() {
        let out = SimulatedRunner
            .run("easyquantis", &args(&["--bogus"]))
            .unwrap();
        assert_eq!(out.code, Some(1));
        assert!(out.stderr.contains("unknown option"));
    }

    #[test]
    fn test_simulated_null_device_writes_nothing() {
        let out = SimulatedRunner
            .run("easyquantis", &args(&["-b", "/dev/null", "-n", "1"]))
            .unwrap();
        assert!(out.is_success());
    }

    #[test]
    fn test_combined_output() {
        let out = ToolOutput {
            code: Some(0),
            stdout: "done\n".into(),
            stderr: "warning\n".into(),
        };
        assert_eq!(out.combined(), "done\nwarning");
        assert_eq!(ToolOutput::failure(2, "bad").combined(), "bad");
    }
}
