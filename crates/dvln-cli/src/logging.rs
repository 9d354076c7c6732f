//! Diagnostic tracing for dvln internals
//!
//! User-facing output goes through [`dvln_core::Output`]. This subscriber
//! only carries the `tracing` events emitted by dvln itself and is sized to
//! the screen threshold the output controller settled on.

use dvln_core::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Tracing directive matching a screen threshold
pub fn directive(threshold: Level) -> &'static str {
    match threshold {
        Level::Trace => "trace",
        Level::Debug => "debug",
        Level::Verbose => "info",
        _ => "warn",
    }
}

/// Install the subscriber, writing to stderr
///
/// `RUST_LOG` wins over the threshold when set. File and line metadata is
/// only included when screen output is extended.
pub fn init(threshold: Level, extended: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let level = directive(threshold);
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(extended)
        .with_level(true)
        .with_file(extended)
        .with_line_number(extended)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("dvln_core={level},dvln_cli={level}")))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
