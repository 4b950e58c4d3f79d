//! Error infrastructure for orders-core.
//!
//! Only boundary validation surfaces as an error. Track contention, a handler
//! refusing to begin, and stale targets are expected outcomes and never reach
//! the caller as `Err`. Broken invariants (double registration, an activation
//! without an owner) panic.

use crate::request::{HandlerId, RequestId};
use crate::types::EntityId;

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition; the same call may succeed later.
    Recoverable,

    /// Invalid input, should not retry without changes.
    Validation,

    /// Unexpected state inconsistency that should be investigated.
    Internal,

    /// Simulation state can no longer be trusted.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Errors returned when an order is rejected at the queue boundary.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("entity {entity} does not exist")]
    EntityNotFound { entity: EntityId },

    #[error("handler {handler} is not registered")]
    UnknownHandler { handler: HandlerId },

    #[error("request id {id} cannot be assigned to a queued order")]
    InvalidRequestId { id: RequestId },

    #[error("group order has no members")]
    EmptyGroup,
}

impl OrderError {
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::EntityNotFound { .. }
            | Self::UnknownHandler { .. }
            | Self::InvalidRequestId { .. }
            | Self::EmptyGroup => ErrorSeverity::Validation,
        }
    }
}

pub type Result<T> = std::result::Result<T, OrderError>;
