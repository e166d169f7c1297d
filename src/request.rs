//! Typed generation requests and their mapping onto `easyquantis` arguments.
//!
//! A [`GenerationRequest`] is validated before anything is spawned, and
//! [`GenerationRequest::args`] renders it into the tool's argument order:
//!
//! ```text
//! -b <path> -n <count>
//! -i <path> -n <count> [--min <min>] [--max <max>] [-s <sep>]
//! -f <path> -n <count> [--min <min>] [--max <max>] [-s <sep>]
//! ```
//!
//! The device selector (`-u <index>`) is prepended by the generator since it
//! comes from the configuration, not the request.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::QuantisError;

/// Null device used for the readiness probe on this platform.
#[cfg(windows)]
pub const NULL_DEVICE: &str = "nul";
#[cfg(not(windows))]
pub const NULL_DEVICE: &str = "/dev/null";

/// True for the null devices; these are exempt from path checks and output
/// inspection.
pub fn is_null_device(path: &Path) -> bool {
    matches!(path.to_str(), Some("/dev/null") | Some("nul"))
}

/// The three kinds of output the tool can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    Binary,
    Integer,
    Float,
}

impl GenerationKind {
    /// Tool flag that selects this kind and names its output file.
    pub fn flag(self) -> &'static str {
        match self {
            GenerationKind::Binary => "-b",
            GenerationKind::Integer => "-i",
            GenerationKind::Float => "-f",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GenerationKind::Binary => "binary",
            GenerationKind::Integer => "integer",
            GenerationKind::Float => "float",
        }
    }
}

impl fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind-specific options of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestKind {
    Binary,
    Integers {
        min: Option<i64>,
        max: Option<i64>,
        separator: Option<String>,
    },
    Floats {
        min: Option<f64>,
        max: Option<f64>,
        separator: Option<String>,
    },
}

/// One call's worth of work for the tool.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub count: u64,
    pub output: PathBuf,
    pub kind: RequestKind,
}

impl GenerationRequest {
    pub fn binary(count: u64, output: impl Into<PathBuf>) -> Self {
        Self {
            count,
            output: output.into(),
            kind: RequestKind::Binary,
        }
    }

    pub fn integers(
        count: u64,
        output: impl Into<PathBuf>,
        min: Option<i64>,
        max: Option<i64>,
        separator: Option<String>,
    ) -> Self {
        Self {
            count,
            output: output.into(),
            kind: RequestKind::Integers {
                min,
                max,
                separator,
            },
        }
    }

    pub fn floats(
        count: u64,
        output: impl Into<PathBuf>,
        min: Option<f64>,
        max: Option<f64>,
        separator: Option<String>,
    ) -> Self {
        Self {
            count,
            output: output.into(),
            kind: RequestKind::Floats {
                min,
                max,
                separator,
            },
        }
    }

    pub fn generation_kind(&self) -> GenerationKind {
        match self.kind {
            RequestKind::Binary => GenerationKind::Binary,
            RequestKind::Integers { .. } => GenerationKind::Integer,
            RequestKind::Floats { .. } => GenerationKind::Float,
        }
    }

    pub fn separator(&self) -> Option<&str> {
        match &self.kind {
            RequestKind::Binary => None,
            RequestKind::Integers { separator, .. } | RequestKind::Floats { separator, .. } => {
                separator.as_deref()
            }
        }
    }

    /// Check the count, the bounds and the output path.
    ///
    /// # Errors
    /// Returns [`QuantisError::Validation`] describing the first problem found,
    /// or [`QuantisError::Io`] when the output directory is not writable.
    pub fn validate(&self) -> Result<(), QuantisError> {
        if self.count == 0 {
            return Err(QuantisError::Validation("Count must be positive".into()));
        }

        match self.kind {
            RequestKind::Binary => {}
            RequestKind::Integers { min, max, .. } => {
                if let (Some(lo), Some(hi)) = (min, max)
                    && lo > hi
                {
                    return Err(bounds_error(lo, hi));
                }
            }
            RequestKind::Floats { min, max, .. } => {
                for v in [min, max].into_iter().flatten() {
                    if !v.is_finite() {
                        return Err(QuantisError::Validation(format!(
                            "Bounds must be finite numbers, got {}",
                            v
                        )));
                    }
                }
                if let (Some(lo), Some(hi)) = (min, max)
                    && lo > hi
                {
                    return Err(bounds_error(lo, hi));
                }
            }
        }

        validate_output_path(&self.output)
    }

    /// Render the request into tool arguments, in the tool's fixed order.
    pub fn args(&self) -> Vec<String> {
        let kind = self.generation_kind();
        let mut args = vec![
            kind.flag().to_string(),
            self.output.to_string_lossy().into_owned(),
            "-n".to_string(),
            self.count.to_string(),
        ];

        let (min, max) = match self.kind {
            RequestKind::Binary => (None, None),
            RequestKind::Integers { min, max, .. } => {
                (min.map(|v| v.to_string()), max.map(|v| v.to_string()))
            }
            RequestKind::Floats { min, max, .. } => (min.map(format_float), max.map(format_float)),
        };
        if let Some(min) = min {
            args.push("--min".into());
            args.push(min);
        }
        if let Some(max) = max {
            args.push("--max".into());
            args.push(max);
        }
        if let Some(sep) = self.separator() {
            args.push("-s".into());
            args.push(sep.to_string());
        }
        args
    }
}

fn bounds_error(min: impl fmt::Display, max: impl fmt::Display) -> QuantisError {
    QuantisError::Validation(format!(
        "Minimum value must not be greater than maximum value (min {}, max {})",
        min, max
    ))
}

/// Format a float so integral values keep a fractional digit (`1.0`, not `1`).
pub fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

/// Reject paths the tool could not write to.
fn validate_output_path(path: &Path) -> Result<(), QuantisError> {
    if is_null_device(path) {
        return Ok(());
    }

    if path.is_dir() {
        return Err(QuantisError::Validation(format!(
            "Output path is a directory: {}. Please specify a filename.",
            path.display()
        )));
    }

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let meta = fs::metadata(parent).map_err(|_| {
        QuantisError::Validation(format!("Directory does not exist: {}", parent.display()))
    })?;
    if !meta.is_dir() {
        return Err(QuantisError::Validation(format!(
            "Parent path is not a directory: {}",
            parent.display()
        )));
    }
    // The scratch file is removed on drop.
    tempfile::NamedTempFile::new_in(parent).map_err(|e| QuantisError::io(parent, e))?;
    Ok(())
}
