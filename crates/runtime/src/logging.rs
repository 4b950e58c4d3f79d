//! Log subscriber installation.

use tracing_subscriber::EnvFilter;

use crate::error::{Result, RuntimeError};

/// Parses a `tracing` filter directive such as `"info,orders::queue=debug"`.
pub fn filter(directive: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directive).map_err(|error| RuntimeError::LogFilter {
        filter: directive.to_string(),
        reason: error.to_string(),
    })
}

/// Installs a global fmt subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over `directive` when set. Fails if a global
/// subscriber is already installed.
pub fn init(directive: &str) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(from_env) => from_env,
        Err(_) => filter(directive)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| RuntimeError::LogInit(error.to_string()))
}
