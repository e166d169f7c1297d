//! Tracing setup for the CLI.
//!
//! Log lines go to stderr so they never mix with generated output or the
//! `✓` status lines on stdout. `RUST_LOG` wins when set; otherwise the level
//! comes from the `-v` count.

use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directive for a given `-v` count.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "quantis_lib=warn",
        1 => "quantis_lib=info",
        2 => "quantis_lib=debug",
        _ => "quantis_lib=trace",
    }
}

/// Install the global subscriber. Call once per process.
///
/// # Errors
/// Fails if a global subscriber is already set.
pub fn init_tracing(verbosity: u8) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init()?;

    debug!("logging initialized");
    Ok(())
}
