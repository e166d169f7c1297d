//! The generator facade.
//!
//! [`QuantisGenerator`] turns typed calls into one `easyquantis` invocation
//! each, waits for it, and checks what it wrote. Nothing is cached between
//! calls: every method is a single synchronous round-trip to the tool.
//!
//! ```no_run
//! use quantis_lib::config::QuantisConfig;
//! use quantis_lib::generator::QuantisGenerator;
//!
//! let generator = QuantisGenerator::new(QuantisConfig::default());
//! if generator.is_ready() {
//!     let result = generator.generate_integers(5, "dice.txt", Some(1), Some(6), Some(","))?;
//!     println!("{} values in {}", result.count, result.output.display());
//! }
//! # Ok::<(), quantis_lib::error::QuantisError>(())
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::QuantisConfig;
use crate::error::QuantisError;
use crate::output::{self, OutputSummary};
use crate::request::{GenerationRequest, NULL_DEVICE, is_null_device};
use crate::runner::{CommandRunner, SimulatedRunner, SystemRunner};

/// Outcome of a successful generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub success: bool,
    pub output: PathBuf,
    /// Bytes for binary output, values for integer/float output.
    pub count: u64,
    /// Size of the output file.
    pub bytes_written: u64,
    /// Whatever the tool printed, for diagnostics.
    pub tool_output: String,
}

/// Result of a readiness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceStatus {
    pub ready: bool,
    pub message: Option<String>,
}

/// Wraps the `easyquantis` executable.
pub struct QuantisGenerator {
    config: QuantisConfig,
    runner: Box<dyn CommandRunner>,
}

impl std::fmt::Debug for QuantisGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuantisGenerator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl QuantisGenerator {
    /// Build a generator; test mode selects the simulated runner.
    pub fn new(config: QuantisConfig) -> Self {
        let runner: Box<dyn CommandRunner> = if config.test_mode {
            Box::new(SimulatedRunner)
        } else {
            Box::new(SystemRunner)
        };
        Self { config, runner }
    }

    /// Build a generator around a custom runner.
    pub fn with_runner(config: QuantisConfig, runner: impl CommandRunner + 'static) -> Self {
        Self {
            config,
            runner: Box::new(runner),
        }
    }

    pub fn config(&self) -> &QuantisConfig {
        &self.config
    }

    /// Full argument vector for `request`, device selector included.
    pub fn command_line(&self, request: &GenerationRequest) -> Vec<String> {
        let mut args = vec!["-u".to_string(), self.config.device_index.to_string()];
        args.extend(request.args());
        args
    }

    /// Probe the device by asking for one byte to the null device.
    pub fn status(&self) -> DeviceStatus {
        if self.config.test_mode {
            return DeviceStatus {
                ready: true,
                message: Some("test mode".into()),
            };
        }

        match self.invoke(&GenerationRequest::binary(1, NULL_DEVICE)) {
            Ok(_) => DeviceStatus {
                ready: true,
                message: None,
            },
            Err(e) => {
                debug!(error = %e, "readiness probe failed");
                let message = match e {
                    QuantisError::Execution { stderr, .. } if !stderr.trim().is_empty() => {
                        stderr.trim().to_string()
                    }
                    other => other.to_string(),
                };
                DeviceStatus {
                    ready: false,
                    message: Some(message),
                }
            }
        }
    }

    /// True iff the tool can be run and reports the device as available.
    pub fn is_ready(&self) -> bool {
        self.status().ready
    }

    /// Like [`is_ready`](Self::is_ready) but as an error.
    ///
    /// # Errors
    /// [`QuantisError::DeviceNotReady`] with the probe's diagnostic.
    pub fn ensure_ready(&self) -> Result<(), QuantisError> {
        let status = self.status();
        if status.ready {
            Ok(())
        } else {
            Err(QuantisError::DeviceNotReady(
                status.message.unwrap_or_else(|| "device did not respond".into()),
            ))
        }
    }

    /// Write `count` random bytes to `output_path`.
    pub fn generate_binary(
        &self,
        count: u64,
        output_path: impl AsRef<Path>,
    ) -> Result<GenerationResult, QuantisError> {
        self.generate(&GenerationRequest::binary(count, output_path.as_ref()))
    }

    /// Write `count` integers in `[min_val, max_val]` to `output_path`.
    pub fn generate_integers(
        &self,
        count: u64,
        output_path: impl AsRef<Path>,
        min_val: Option<i64>,
        max_val: Option<i64>,
        separator: Option<&str>,
    ) -> Result<GenerationResult, QuantisError> {
        self.generate(&GenerationRequest::integers(
            count,
            output_path.as_ref(),
            min_val,
            max_val,
            separator.map(str::to_string),
        ))
    }

    /// Write `count` floats in `[min_val, max_val]` to `output_path`.
    pub fn generate_floats(
        &self,
        count: u64,
        output_path: impl AsRef<Path>,
        min_val: Option<f64>,
        max_val: Option<f64>,
        separator: Option<&str>,
    ) -> Result<GenerationResult, QuantisError> {
        self.generate(&GenerationRequest::floats(
            count,
            output_path.as_ref(),
            min_val,
            max_val,
            separator.map(str::to_string),
        ))
    }

    /// Validate, invoke, then inspect the output file.
    ///
    /// # Errors
    /// - [`QuantisError::Validation`] before anything is spawned.
    /// - [`QuantisError::NotFound`] / [`QuantisError::Execution`] from the tool.
    /// - [`QuantisError::UnexpectedOutput`] when the file does not match.
    pub fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, QuantisError> {
        request.validate()?;
        let tool_output = self.invoke(request)?;

        let summary = if is_null_device(&request.output) {
            OutputSummary {
                count: request.count,
                bytes: 0,
            }
        } else {
            output::inspect(request)?
        };

        info!(
            kind = %request.generation_kind(),
            count = summary.count,
            path = %request.output.display(),
            "generated"
        );
        Ok(GenerationResult {
            success: true,
            output: request.output.clone(),
            count: summary.count,
            bytes_written: summary.bytes,
            tool_output,
        })
    }

    /// Run the tool for `request` and map a non-zero exit to an error.
    fn invoke(&self, request: &GenerationRequest) -> Result<String, QuantisError> {
        let args = self.command_line(request);
        let out = self.runner.run(&self.config.program, &args)?;
        if !out.is_success() {
            return Err(QuantisError::Execution {
                command: format!("{} {}", self.config.program, args.join(" ")),
                code: out.code,
                stderr: out.stderr,
            });
        }
        Ok(out.combined())
    }
}
