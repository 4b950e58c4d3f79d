use std::path::Path;

use serde::{Deserialize, Serialize};

use order_handlers::HandlersConfig;
use orders_core::DispatchConfig;

use crate::error::{Result, RuntimeError};

/// Settings of one simulation instance.
///
/// Every field has a default, so a RON file only needs the values it changes:
///
/// ```ron
/// (
///     tick_size: 10,
///     dispatch: (max_begin_failures: Some(3)),
/// )
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Simulation time that elapses per step.
    pub tick_size: u64,
    /// `tracing` filter directive used by [`crate::logging::init`].
    pub log_filter: String,
    pub dispatch: DispatchConfig,
    pub handlers: HandlersConfig,
}

impl RuntimeConfig {
    pub const DEFAULT_TICK_SIZE: u64 = 1;
    pub const DEFAULT_LOG_FILTER: &'static str = "info";

    pub fn from_ron_str(content: &str) -> Result<Self> {
        ron::from_str(content).map_err(RuntimeError::ConfigParse)
    }

    /// Load runtime settings from a RON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| RuntimeError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&content)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_size: Self::DEFAULT_TICK_SIZE,
            log_filter: Self::DEFAULT_LOG_FILTER.to_string(),
            dispatch: DispatchConfig::default(),
            handlers: HandlersConfig::default(),
        }
    }
}
