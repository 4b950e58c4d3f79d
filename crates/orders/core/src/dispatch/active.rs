use std::collections::BTreeMap;

use crate::request::{ActionActivation, RequestId};
use crate::types::EntityId;

/// Multimap of running activations keyed by entity.
///
/// Entities iterate in ascending index order and each entity's activations in
/// the order they started, so every walk over this map is replay-stable.
#[derive(Clone, Debug, Default)]
pub struct ActiveOrders {
    by_entity: BTreeMap<EntityId, Vec<ActionActivation>>,
}

impl ActiveOrders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: EntityId, activation: ActionActivation) {
        self.by_entity.entry(entity).or_default().push(activation);
    }

    pub fn for_entity(&self, entity: EntityId) -> impl Iterator<Item = &ActionActivation> {
        self.by_entity.get(&entity).into_iter().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &ActionActivation)> {
        self.by_entity
            .iter()
            .flat_map(|(entity, list)| list.iter().map(move |activation| (*entity, activation)))
    }

    pub fn contains(&self, entity: EntityId, id: RequestId) -> bool {
        self.for_entity(entity).any(|activation| activation.id == id)
    }

    pub fn has_any(&self, entity: EntityId) -> bool {
        self.by_entity.contains_key(&entity)
    }

    /// Total number of activations over all entities.
    pub fn len(&self) -> usize {
        self.by_entity.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_entity.is_empty()
    }

    /// Removes the activation whose id is exactly `id`.
    pub fn remove(&mut self, entity: EntityId, id: RequestId) -> Option<ActionActivation> {
        let list = self.by_entity.get_mut(&entity)?;
        let position = list.iter().position(|activation| activation.id == id)?;
        let removed = list.remove(position);
        if list.is_empty() {
            self.by_entity.remove(&entity);
        }
        Some(removed)
    }

    /// Removes every activation of `entity` addressed by the cancellation
    /// filter `filter`, preserving start order in the result.
    pub fn remove_covered(&mut self, entity: EntityId, filter: RequestId) -> Vec<ActionActivation> {
        let Some(list) = self.by_entity.get_mut(&entity) else {
            return Vec::new();
        };
        let (removed, kept): (Vec<_>, Vec<_>) = list
            .drain(..)
            .partition(|activation| filter.covers(activation.id));
        if kept.is_empty() {
            self.by_entity.remove(&entity);
        } else {
            *list = kept;
        }
        removed
    }

    pub fn remove_entity(&mut self, entity: EntityId) -> Vec<ActionActivation> {
        self.by_entity.remove(&entity).unwrap_or_default()
    }

    /// Removes every activation whose request targets `target`.
    pub fn remove_targeting(&mut self, target: EntityId) -> Vec<(EntityId, ActionActivation)> {
        let mut removed = Vec::new();
        self.by_entity.retain(|entity, list| {
            list.retain(|activation| {
                if activation.targets(target) {
                    removed.push((*entity, *activation));
                    false
                } else {
                    true
                }
            });
            !list.is_empty()
        });
        removed
    }
}
