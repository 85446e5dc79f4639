//! Tracing setup for the binary.
//!
//! Events go to stderr so they never interleave with command output on
//! stdout. The filter comes from `FITPAL_LOG`, then `RUST_LOG`, then the
//! `log` config key.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter `{filter}`: {source}")]
    Filter {
        filter: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing_subscriber::util::TryInitError),
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init(config_filter: &str) -> Result<(), LoggingError> {
    let filter = resolve_filter(config_filter);
    let env_filter = EnvFilter::try_new(&filter).map_err(|source| LoggingError::Filter {
        filter: filter.clone(),
        source,
    })?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()?;

    tracing::debug!(%filter, "logging initialized");
    Ok(())
}

fn resolve_filter(config_filter: &str) -> String {
    ["FITPAL_LOG", "RUST_LOG"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| config_filter.to_string())
}
