//! Inspection of the files the tool writes.
//!
//! The rule is an exact match: a binary file must hold exactly `count` bytes,
//! and a text file exactly `count` values of the requested type, each inside
//! the requested bounds. Anything else is reported as
//! [`QuantisError::UnexpectedOutput`].

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use crate::error::QuantisError;
use crate::request::{GenerationRequest, RequestKind};

/// What was found in an output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSummary {
    /// Bytes for binary output, values for text output.
    pub count: u64,
    /// Size of the file on disk.
    pub bytes: u64,
}

/// Read back `request.output` and check it against the request.
///
/// # Errors
/// [`QuantisError::UnexpectedOutput`] for a missing file or any mismatch,
/// [`QuantisError::Io`] when the file exists but cannot be read.
pub fn inspect(request: &GenerationRequest) -> Result<OutputSummary, QuantisError> {
    let path = request.output.as_path();
    let unexpected = |reason: String| QuantisError::UnexpectedOutput {
        path: path.to_path_buf(),
        reason,
    };

    let bytes = match fs::metadata(path) {
        Ok(m) => m.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(unexpected("output file was not created".into()));
        }
        Err(e) => return Err(QuantisError::io(path, e)),
    };

    let count = match &request.kind {
        RequestKind::Binary => bytes,
        RequestKind::Integers { min, max, separator } => {
            let text = read_text(path)?;
            check_values::<i64>(&text, separator.as_deref(), *min, *max).map_err(unexpected)?
        }
        RequestKind::Floats { min, max, separator } => {
            let text = read_text(path)?;
            check_values::<f64>(&text, separator.as_deref(), *min, *max).map_err(unexpected)?
        }
    };

    if count != request.count {
        let unit = match request.kind {
            RequestKind::Binary => "bytes",
            _ => "values",
        };
        return Err(unexpected(format!(
            "expected {} {}, found {}",
            request.count, unit, count
        )));
    }

    Ok(OutputSummary { count, bytes })
}

fn read_text(path: &Path) -> Result<String, QuantisError> {
    fs::read_to_string(path).map_err(|e| QuantisError::io(path, e))
}

/// A number the tool can emit.
pub trait SampleValue: FromStr + PartialOrd + Copy + fmt::Display {
    /// False for values no real sample can take (NaN, infinities).
    fn is_sample(&self) -> bool;
}

impl SampleValue for i64 {
    fn is_sample(&self) -> bool {
        true
    }
}

impl SampleValue for f64 {
    fn is_sample(&self) -> bool {
        self.is_finite()
    }
}

/// Split `text` into values and check each one; returns how many there were.
///
/// With no separator the tool writes one value per line, so any whitespace
/// splits. Empty tokens (trailing separator or newline) are skipped.
pub fn check_values<T>(
    text: &str,
    separator: Option<&str>,
    min: Option<T>,
    max: Option<T>,
) -> Result<u64, String>
where
    T: SampleValue,
{
    let tokens: Box<dyn Iterator<Item = &str>> = match separator {
        Some(sep) if !sep.trim().is_empty() => {
            Box::new(text.split(sep).map(str::trim))
        }
        _ => Box::new(text.split_whitespace()),
    };

    let mut count = 0u64;
    for (i, token) in tokens.filter(|t| !t.is_empty()).enumerate() {
        let value: T = token
            .parse()
            .ok()
            .filter(T::is_sample)
            .ok_or_else(|| format!("value #{} is not a number: {:?}", i + 1, token))?;
        if let Some(lo) = min
            && value < lo
        {
            return Err(format!("value #{} ({}) is below minimum {}", i + 1, value, lo));
        }
        if let Some(hi) = max
            && value > hi
        {
            return Err(format!("value #{} ({}) is above maximum {}", i + 1, value, hi));
        }
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_exact_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("random.bin");
        fs::write(&path, vec![7u8; 1024]).unwrap();
        let summary = inspect(&GenerationRequest::binary(1024, &path)).unwrap();
        assert_eq!(summary, OutputSummary { count: 1024, bytes: 1024 });
    }

    #[test]
    fn test_binary_short_write_is_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("random.bin");
        fs::write(&path, vec![7u8; 512]).unwrap();
        let err = inspect(&GenerationRequest::binary(1024, &path)).unwrap_err();
        match err {
            QuantisError::UnexpectedOutput { reason, .. } => {
                assert_eq!(reason, "expected 1024 bytes, found 512")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let req = GenerationRequest::binary(8, dir.path().join("absent.bin"));
        assert!(matches!(inspect(&req), Err(QuantisError::UnexpectedOutput { .. })));
    }

    #[test]
    fn test_integers_with_separator() {
        assert_eq!(check_values::<i64>("1,2,3,4,5", Some(","), Some(1), Some(6)), Ok(5));
        assert_eq!(check_values::<i64>("1,2,3,\n", Some(","), None, None), Ok(3));
    }

    #[test]
    fn test_newline_default_and_whitespace_separator() {
        assert_eq!(check_values::<i64>("4\n8\n15\n", None, None, None), Ok(3));
        assert_eq!(check_values::<f64>("0.5 0.25 0.125", Some(" "), None, None), Ok(3));
    }

    #[test]
    fn test_out_of_bounds_value() {
        let err = check_values::<i64>("1,9,3", Some(","), Some(1), Some(6)).unwrap_err();
        assert!(err.contains("above maximum 6"));
        let err = check_values::<f64>("0.5\n-0.1", None, Some(0.0), Some(1.0)).unwrap_err();
        assert!(err.contains("below minimum"));
    }

    #[test]
    fn test_non_finite_floats_rejected() {
        let err = check_values::<f64>("NaN", None, Some(0.0), Some(1.0)).unwrap_err();
        assert!(err.contains("value #1"));
        assert!(check_values::<f64>("0.5,inf", Some(","), None, None).is_err());
        assert!(check_values::<f64>("-infinity", None, None, None).is_err());
    }

    #[test]
    fn test_non_numeric_value() {
        let err = check_values::<i64>("1;2;x", Some(";"), None, None).unwrap_err();
        assert!(err.contains("value #3"));
    }
}
