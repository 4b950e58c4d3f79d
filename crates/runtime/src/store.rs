//! In-memory entity registry.

use std::collections::BTreeMap;

use tracing::debug;

use orders_core::{EntityId, EntityOracle, Position};

use crate::error::{Result, RuntimeError};

/// Handle to a destroy-notification inbox.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subscription(u32);

/// Entities of one simulation and their positions.
///
/// Indices are handed out sequentially and never reused, so iteration order
/// and entity ranking are identical across replays. Destruction is queued
/// into every subscriber's inbox until that subscriber drains it.
#[derive(Debug)]
pub struct EntityStore {
    positions: BTreeMap<EntityId, Position>,
    next_index: u32,
    inboxes: BTreeMap<Subscription, Vec<EntityId>>,
    next_subscription: u32,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            positions: BTreeMap::new(),
            next_index: 1,
            inboxes: BTreeMap::new(),
            next_subscription: 0,
        }
    }

    pub fn spawn(&mut self, position: Position) -> Result<EntityId> {
        let entity = EntityId(self.next_index);
        self.next_index = self
            .next_index
            .checked_add(1)
            .ok_or(RuntimeError::StoreExhausted)?;
        self.positions.insert(entity, position);
        debug!(target: "runtime::store", entity = %entity, position = %position, "entity spawned");
        Ok(entity)
    }

    pub fn destroy(&mut self, entity: EntityId) -> Result<()> {
        if self.positions.remove(&entity).is_none() {
            return Err(RuntimeError::UnknownEntity { entity });
        }
        for inbox in self.inboxes.values_mut() {
            inbox.push(entity);
        }
        debug!(target: "runtime::store", entity = %entity, "entity destroyed");
        Ok(())
    }

    pub fn set_position(&mut self, entity: EntityId, position: Position) -> Result<()> {
        let slot = self
            .positions
            .get_mut(&entity)
            .ok_or(RuntimeError::UnknownEntity { entity })?;
        *slot = position;
        Ok(())
    }

    pub fn get(&self, entity: EntityId) -> Option<Position> {
        self.positions.get(&entity).copied()
    }

    /// Live entities in index order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, Position)> + '_ {
        self.positions.iter().map(|(entity, position)| (*entity, *position))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Starts collecting destroyed entities for a new listener.
    pub fn subscribe(&mut self) -> Subscription {
        let subscription = Subscription(self.next_subscription);
        self.next_subscription = self.next_subscription.wrapping_add(1);
        self.inboxes.insert(subscription, Vec::new());
        subscription
    }

    /// Returns false if `subscription` was not active.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.inboxes.remove(&subscription).is_some()
    }

    /// Entities destroyed since the last drain, in destruction order.
    pub fn drain_destroyed(&mut self, subscription: Subscription) -> Vec<EntityId> {
        self.inboxes
            .get_mut(&subscription)
            .map(std::mem::take)
            .unwrap_or_default()
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityOracle for EntityStore {
    fn contains(&self, entity: EntityId) -> bool {
        self.positions.contains_key(&entity)
    }

    fn position(&self, entity: EntityId) -> Option<Position> {
        self.get(entity)
    }
}
