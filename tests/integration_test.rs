use std::fs;
use std::path::Path;

use quantis_lib::config::QuantisConfig;
use quantis_lib::error::QuantisError;
use quantis_lib::generator::QuantisGenerator;
use quantis_lib::runner::{CommandRunner, ToolOutput};

/// Pretends to be easyquantis by writing fixed contents to the `-b/-i/-f` path.
struct Canned(&'static [u8]);

impl CommandRunner for Canned {
    fn run(&self, _program: &str, args: &[String]) -> Result<ToolOutput, QuantisError> {
        let pos = args
            .iter()
            .position(|a| a == "-b" || a == "-i" || a == "-f")
            .expect("output flag");
        fs::write(Path::new(&args[pos + 1]), self.0).expect("write canned output");
        Ok(ToolOutput::success())
    }
}

#[test]
fn integration_dice_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("dice.txt");
    let generator = QuantisGenerator::with_runner(QuantisConfig::default(), Canned(b"1,2,3,4,5"));

    let result = generator
        .generate_integers(5, &path, Some(1), Some(6), Some(","))
        .expect("generate");
    assert!(result.success);
    assert_eq!(result.count, 5);
    assert_eq!(result.output, path);
}

#[test]
fn integration_fewer_values_than_requested() {
    let dir = tempfile::tempdir().expect("tempdir");
    let generator = QuantisGenerator::with_runner(QuantisConfig::default(), Canned(b"0.1\n0.2\n"));

    let err = generator
        .generate_floats(3, dir.path().join("f.txt"), None, None, None)
        .expect_err("short output");
    assert!(matches!(err, QuantisError::UnexpectedOutput { .. }));
    assert!(err.to_string().contains("expected 3 values, found 2"));
}

#[test]
fn integration_test_mode_end_to_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    let generator = QuantisGenerator::new(QuantisConfig::default().with_test_mode(true));
    assert!(generator.is_ready());

    let path = dir.path().join("random.bin");
    let result = generator.generate_binary(1024, &path).expect("generate");
    assert_eq!(result.bytes_written, 1024);
    assert_eq!(fs::metadata(&path).expect("metadata").len(), 1024);

    let path = dir.path().join("ints.txt");
    generator
        .generate_integers(100, &path, Some(-10), Some(10), None)
        .expect("generate");
    let text = fs::read_to_string(&path).expect("read");
    assert_eq!(text.lines().count(), 100);
}

#[test]
fn integration_missing_executable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let generator = QuantisGenerator::new(QuantisConfig::new("no-such-easyquantis-binary", 0));
    assert!(!generator.is_ready());
    assert!(matches!(
        generator.ensure_ready(),
        Err(QuantisError::DeviceNotReady(_))
    ));
    let err = generator
        .generate_binary(8, dir.path().join("x.bin"))
        .expect_err("missing executable");
    assert_eq!(err.exit_code(), 4);
}
