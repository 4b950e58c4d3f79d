//! Headless simulation harness for the order system.
//!
//! `runtime` supplies what `orders-core` only sees through oracles: an entity
//! store, a fixed-step clock and grid navigation. [`Simulation`] wires them to
//! an [`OrderSystem`](orders_core::OrderSystem) with the built-in handlers and
//! advances everything in a fixed, replayable order.
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod navigation;
pub mod simulation;
pub mod store;

pub use clock::SimClock;
pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use navigation::GridNavigation;
pub use simulation::Simulation;
pub use store::{EntityStore, Subscription};
