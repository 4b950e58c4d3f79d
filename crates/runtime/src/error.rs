//! Errors surfaced by the simulation harness.
//!
//! Order rejections from the core are wrapped unchanged so callers can still
//! inspect their severity.
use std::path::PathBuf;

use thiserror::Error;

use orders_core::{EntityId, ErrorSeverity, OrderError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to read config file {}", .path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse runtime config RON")]
    ConfigParse(#[source] ron::error::SpannedError),

    #[error("invalid log filter `{filter}`: {reason}")]
    LogFilter { filter: String, reason: String },

    #[error("failed to install log subscriber: {0}")]
    LogInit(String),

    #[error("entity {entity} does not exist")]
    UnknownEntity { entity: EntityId },

    #[error("entity store ran out of indices")]
    StoreExhausted,

    #[error(transparent)]
    Order(#[from] OrderError),
}

impl RuntimeError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Order(error) => error.severity(),
            Self::UnknownEntity { .. } => ErrorSeverity::Validation,
            Self::StoreExhausted => ErrorSeverity::Fatal,
            Self::ConfigIo { .. }
            | Self::ConfigParse(_)
            | Self::LogFilter { .. }
            | Self::LogInit(_) => ErrorSeverity::Internal,
        }
    }
}
