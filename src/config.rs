//! Generator configuration: which executable to run and on which device.

/// Settings for a [`QuantisGenerator`](crate::generator::QuantisGenerator).
///
/// There is no global state: every generator owns its own copy, and the CLI
/// builds one from its global flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantisConfig {
    /// Executable to run, resolved through PATH when not absolute.
    pub program: String,
    /// USB device index passed as `-u <index>`.
    pub device_index: u32,
    /// Simulate the tool instead of spawning it.
    pub test_mode: bool,
}

pub const DEFAULT_PROGRAM: &str = "easyquantis";

impl Default for QuantisConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            device_index: 0,
            test_mode: false,
        }
    }
}

impl QuantisConfig {
    pub fn new(program: impl Into<String>, device_index: u32) -> Self {
        Self {
            program: program.into(),
            device_index,
            test_mode: false,
        }
    }

    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = QuantisConfig::default();
        assert_eq!(cfg.program, "easyquantis");
        assert_eq!(cfg.device_index, 0);
        assert!(!cfg.test_mode);
    }

    #[test]
    fn test_custom_config() {
        let cfg = QuantisConfig::new("/usr/bin/easyquantis", 1).with_test_mode(true);
        assert_eq!(cfg.program, "/usr/bin/easyquantis");
        assert_eq!(cfg.device_index, 1);
        assert!(cfg.test_mode);
    }
}
