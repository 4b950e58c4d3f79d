//! Traits describing the world the dispatch runs in.
//!
//! The entity store and the simulation clock live outside this crate. Oracles
//! expose the little the dispatch and its handlers need from them, and [`Env`]
//! bundles them so every call receives a consistent view of the world.

use crate::types::{EntityId, Position, Tick};

/// Read access to the external entity store.
pub trait EntityOracle {
    /// Whether `entity` is alive and can still be referenced.
    fn contains(&self, entity: EntityId) -> bool;

    /// Current tile of `entity`, if it has one.
    fn position(&self, entity: EntityId) -> Option<Position>;
}

/// Read access to the simulation clock.
pub trait TimeOracle {
    /// Current simulation time.
    fn now(&self) -> Tick;

    /// Simulation time that elapses per fixed step.
    fn tick_size(&self) -> u64;
}

/// Aggregates the oracles passed into every dispatch operation.
pub struct Env<'a, E, T>
where
    E: EntityOracle + ?Sized,
    T: TimeOracle + ?Sized,
{
    entities: &'a E,
    time: &'a T,
}

impl<E, T> Clone for Env<'_, E, T>
where
    E: EntityOracle + ?Sized,
    T: TimeOracle + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, T> Copy for Env<'_, E, T>
where
    E: EntityOracle + ?Sized,
    T: TimeOracle + ?Sized,
{
}

pub type OrderEnv<'a> = Env<'a, dyn EntityOracle + 'a, dyn TimeOracle + 'a>;

impl<'a, E, T> Env<'a, E, T>
where
    E: EntityOracle + ?Sized,
    T: TimeOracle + ?Sized,
{
    pub fn new(entities: &'a E, time: &'a T) -> Self {
        Self { entities, time }
    }

    pub fn entities(&self) -> &'a E {
        self.entities
    }

    pub fn time(&self) -> &'a T {
        self.time
    }

    pub fn now(&self) -> Tick {
        self.time.now()
    }
}

impl<'a, E, T> Env<'a, E, T>
where
    E: EntityOracle + 'a,
    T: TimeOracle + 'a,
{
    /// Converts this environment into the trait-object based [`OrderEnv`].
    pub fn as_order_env(&self) -> OrderEnv<'a> {
        let entities: &'a dyn EntityOracle = self.entities;
        let time: &'a dyn TimeOracle = self.time;
        Env::new(entities, time)
    }
}
