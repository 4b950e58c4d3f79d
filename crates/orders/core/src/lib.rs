//! Deterministic order dispatch shared by every simulation instance.
//!
//! `orders-core` turns player and AI requests into running actions. Requests
//! wait in per-entity FIFO queues until a registered [`OrderHandler`] accepts
//! them and every behavior track they need is free. All state lives in an
//! [`OrderSystem`] owned by the simulation, so independent instances (live
//! game, replay verifier, tests) never interfere and produce identical
//! results from identical inputs.
pub mod config;
pub mod dispatch;
pub mod env;
pub mod error;
pub mod handler;
pub mod queue;
pub mod request;
pub mod system;
pub mod track;
pub mod types;

pub use config::DispatchConfig;
pub use dispatch::{ActiveOrders, CompletionListeners, Group, HandlerRegistry, ListenerId, OrderDispatch};
pub use env::{EntityOracle, Env, OrderEnv, TimeOracle};
pub use error::{ErrorSeverity, OrderError, Result};
pub use handler::{OrderContext, OrderHandler};
pub use queue::{OrderQueue, QueueRange, TickReport};
pub use request::{
    ActionActivation, ActionRequest, ActionType, CompletionInstance, CompletionStatus, HandlerId,
    OrderInstance, RequestId,
};
pub use system::OrderSystem;
pub use track::{Flagging, Priority, Track, TrackId, TrackStates};
pub use types::{EntityId, Position, Tick};
