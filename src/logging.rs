//! Logging configuration for the application.
//!
//! Standard output carries the report, so logs go to stderr.
//! Log level can be controlled via the `RUST_LOG` environment variable.

use std::io::{self, IsTerminal};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system.
///
/// The log level defaults to `info` but can be overridden with `RUST_LOG`.
///
/// Returns `Err` if a global subscriber was already installed. The tool
/// works the same without logging.
pub fn init() -> Result<(), tracing_subscriber::util::TryInitError> {
    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()
}
