//! Minimal oracles for handler unit tests.

use std::collections::BTreeMap;

use orders_core::{EntityId, EntityOracle, Position, Tick, TimeOracle};

#[derive(Default)]
pub struct World {
    pub positions: BTreeMap<EntityId, Position>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, index: u32, position: Position) -> Self {
        self.positions.insert(EntityId(index), position);
        self
    }
}

impl EntityOracle for World {
    fn contains(&self, entity: EntityId) -> bool {
        self.positions.contains_key(&entity)
    }

    fn position(&self, entity: EntityId) -> Option<Position> {
        self.positions.get(&entity).copied()
    }
}

/// Clock frozen at a given tick.
#[derive(Clone, Copy, Default)]
pub struct Clock;

impl TimeOracle for Clock {
    fn now(&self) -> Tick {
        Tick::ZERO
    }

    fn tick_size(&self) -> u64 {
        1
    }
}

pub struct At(pub Tick);

impl TimeOracle for At {
    fn now(&self) -> Tick {
        self.0
    }

    fn tick_size(&self) -> u64 {
        1
    }
}
