//! Built-in order handlers.
//!
//! Each handler owns one behavior lane:
//! - [`MoveHandler`]: path following through a [`Navigation`] service
//! - [`InteractHandler`]: attack, gather and build against a target
//! - [`TrainHandler`]: timed production
//! - [`AccrualHandler`]: per-step income into a shared [`Ledger`]
mod accrual;
mod config;
mod formation;
mod interact;
mod movement;
mod timed;
mod train;

#[cfg(test)]
mod testing;

pub use accrual::{AccrualHandler, Ledger};
pub use config::HandlersConfig;
pub use formation::spiral_offset;
pub use interact::InteractHandler;
pub use movement::{MoveHandler, Navigation, NavigationOutcome};
pub use timed::{TimedJob, TimedWork};
pub use train::TrainHandler;
