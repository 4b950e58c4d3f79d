//! Request value types.
//!
//! - [`RequestId`] / [`HandlerId`]: packed identifiers
//! - [`ActionRequest`]: what the caller asked for
//! - [`OrderInstance`]: a request waiting in a queue
//! - [`ActionActivation`]: a request being executed by a handler
//! - [`CompletionInstance`]: the end of an activation
mod id;
mod order;

pub use id::{HandlerId, RequestId};
pub use order::{
    ActionActivation, ActionRequest, ActionType, CompletionInstance, CompletionStatus,
    OrderInstance,
};
