//! Tracing subscriber setup.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `log_level` is an `EnvFilter` directive (e.g. `info` or `applink=debug`), normally
/// taken from `RUST_LOG`. `log_format` selects human-readable `text` or one JSON object
/// per line (`json`).
///
/// # Errors
///
/// Returns an error if the filter cannot be parsed or a subscriber is already set.
pub fn init(log_level: &str, log_format: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level)
        .map_err(|e| anyhow!("Invalid log filter '{log_level}': {e}"))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let result = match log_format {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    };

    result.map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))
}
