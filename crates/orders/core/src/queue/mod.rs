//! Pending-order queues.
//!
//! Every entity's FIFO lives in one packed arena. An entity only owns a
//! [`QueueRange`] into it, stored in a sparse map that loses the entry as soon
//! as the queue drains. Free slots hold an invalid placeholder until the arena
//! is compacted.
mod activation;
mod range;

pub use activation::TickReport;
pub use range::QueueRange;

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::DispatchConfig;
use crate::request::{OrderInstance, RequestId};
use crate::types::EntityId;

/// Per-entity FIFO queues of orders that have not started yet.
#[derive(Clone, Debug)]
pub struct OrderQueue {
    slots: Vec<OrderInstance>,
    ranges: BTreeMap<EntityId, QueueRange>,
    free: usize,
    compaction_min_free: usize,
}

impl OrderQueue {
    pub fn new(config: &DispatchConfig) -> Self {
        Self {
            slots: Vec::new(),
            ranges: BTreeMap::new(),
            free: 0,
            compaction_min_free: config.compaction_min_free,
        }
    }

    /// Pending orders of `entity`, oldest first.
    pub fn pending_orders_for(&self, entity: EntityId) -> &[OrderInstance] {
        self.ranges
            .get(&entity)
            .and_then(|range| self.slots.get(range.slots()))
            .unwrap_or(&[])
    }

    pub fn front(&self, entity: EntityId) -> Option<&OrderInstance> {
        self.pending_orders_for(entity).first()
    }

    pub(crate) fn front_mut(&mut self, entity: EntityId) -> Option<&mut OrderInstance> {
        let range = self.ranges.get(&entity)?;
        if range.is_empty() {
            return None;
        }
        self.slots.get_mut(range.start())
    }

    pub fn range(&self, entity: EntityId) -> Option<QueueRange> {
        self.ranges.get(&entity).copied()
    }

    pub fn has_pending(&self, entity: EntityId) -> bool {
        self.ranges.contains_key(&entity)
    }

    /// Entities with at least one pending order, in ascending index order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.ranges.keys().copied()
    }

    /// Every pending order, grouped by entity in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &OrderInstance)> {
        self.ranges.iter().flat_map(|(entity, range)| {
            self.slots
                .get(range.slots())
                .unwrap_or(&[])
                .iter()
                .map(move |order| (*entity, order))
        })
    }

    /// Number of pending orders over all entities.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Slots currently allocated in the arena, live or free.
    pub fn arena_len(&self) -> usize {
        self.slots.len()
    }

    pub fn free_slots(&self) -> usize {
        self.free
    }

    /// Appends `order` to the back of `entity`'s queue.
    ///
    /// The range grows in place when the slot after it is the arena tail or
    /// free; otherwise it moves to the tail first.
    pub fn push(&mut self, entity: EntityId, order: OrderInstance) {
        debug_assert!(order.is_valid(), "queued orders need a valid request id");

        let range = match self.ranges.get(&entity).copied() {
            None => {
                let start = self.slots.len();
                self.slots.push(order);
                QueueRange::new(start, 1)
            }
            Some(mut range) => {
                let end = range.end();
                if end == self.slots.len() {
                    self.slots.push(order);
                } else if let Some(slot) = self.slots.get_mut(end).filter(|slot| !slot.is_valid()) {
                    *slot = order;
                    self.free -= 1;
                } else {
                    self.relocate_to_tail(&mut range);
                    self.slots.push(order);
                }
                range.grow();
                range
            }
        };
        self.ranges.insert(entity, range);
        self.maybe_compact();
    }

    /// Removes the order at `offset` in `entity`'s queue, shifting the orders
    /// behind it forward.
    pub fn remove_at(&mut self, entity: EntityId, offset: usize) -> Option<OrderInstance> {
        let mut range = self.ranges.get(&entity).copied()?;
        let window = self.slots.get_mut(range.slots())?;
        let removed = *window.get(offset)?;

        window[offset..].rotate_left(1);
        if let Some(last) = window.last_mut() {
            *last = OrderInstance::EMPTY;
        }
        range.shrink();
        self.free += 1;

        self.store_range(entity, range);
        Some(removed)
    }

    /// Removes every order of `entity` for which `keep` returns false,
    /// preserving the relative order of the rest.
    pub fn retain_for(
        &mut self,
        entity: EntityId,
        mut keep: impl FnMut(&OrderInstance) -> bool,
    ) -> Vec<OrderInstance> {
        let Some(range) = self.ranges.get(&entity).copied() else {
            return Vec::new();
        };
        let Some(window) = self.slots.get_mut(range.slots()) else {
            return Vec::new();
        };

        let mut removed = Vec::new();
        let mut write = 0;
        for read in 0..window.len() {
            let order = window[read];
            if keep(&order) {
                window[write] = order;
                write += 1;
            } else {
                removed.push(order);
            }
        }
        for slot in &mut window[write..] {
            *slot = OrderInstance::EMPTY;
        }

        self.free += removed.len();
        self.store_range(entity, QueueRange::new(range.start(), write));
        removed
    }

    /// Removes pending orders of `entity` covered by `filter`
    /// ([`RequestId::ALL`] removes all of them).
    pub fn cancel(&mut self, entity: EntityId, filter: RequestId) -> usize {
        let removed = self.retain_for(entity, |order| !filter.covers(order.id));
        for order in &removed {
            debug!(
                target: "orders::queue",
                entity = %entity,
                request = %order.id,
                "pending order canceled"
            );
        }
        removed.len()
    }

    pub fn cancel_all(&mut self, entity: EntityId) -> usize {
        self.cancel(entity, RequestId::ALL)
    }

    /// Drops the whole queue of `entity`.
    pub fn remove_entity(&mut self, entity: EntityId) -> usize {
        self.retain_for(entity, |_| false).len()
    }

    /// Drops every pending order, of any entity, that targets `target`.
    pub fn remove_targeting(&mut self, target: EntityId) -> Vec<(EntityId, OrderInstance)> {
        let entities: Vec<EntityId> = self.entities().collect();
        let mut removed = Vec::new();
        for entity in entities {
            removed.extend(
                self.retain_for(entity, |order| order.request.target_entity != Some(target))
                    .into_iter()
                    .map(|order| (entity, order)),
            );
        }
        removed
    }

    /// Repacks live slots in entity order and releases every free slot.
    pub fn compact(&mut self) {
        let mut packed = Vec::with_capacity(self.len());
        for range in self.ranges.values_mut() {
            let start = packed.len();
            packed.extend_from_slice(self.slots.get(range.slots()).unwrap_or(&[]));
            range.relocate(start);
        }
        self.slots = packed;
        self.free = 0;
    }

    fn relocate_to_tail(&mut self, range: &mut QueueRange) {
        let start = self.slots.len();
        self.slots.extend_from_within(range.slots());
        for slot in &mut self.slots[range.slots()] {
            *slot = OrderInstance::EMPTY;
        }
        self.free += range.len();
        range.relocate(start);
    }

    fn store_range(&mut self, entity: EntityId, range: QueueRange) {
        if range.is_empty() {
            self.ranges.remove(&entity);
        } else {
            self.ranges.insert(entity, range);
        }
        self.trim_tail();
        self.maybe_compact();
    }

    /// Releases free slots sitting at the end of the arena.
    fn trim_tail(&mut self) {
        while self.slots.last().is_some_and(|slot| !slot.is_valid()) {
            self.slots.pop();
            self.free -= 1;
        }
    }

    fn maybe_compact(&mut self) {
        if self.free > 0 && self.free >= self.compaction_min_free && self.free > self.len() {
            self.compact();
        }
    }
}

impl Default for OrderQueue {
    fn default() -> Self {
        Self::new(&DispatchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{ActionRequest, ActionType, HandlerId};
    use crate::types::{Position, Tick};

    fn order(pattern: u32) -> OrderInstance {
        OrderInstance::new(
            ActionRequest::new(ActionType::MOVE, Tick::ZERO),
            RequestId::new(HandlerId::UNASSIGNED, pattern),
        )
    }

    fn patterns(queue: &OrderQueue, entity: EntityId) -> Vec<u32> {
        queue
            .pending_orders_for(entity)
            .iter()
            .map(|order| order.id.pattern())
            .collect()
    }

    fn no_compaction() -> DispatchConfig {
        DispatchConfig::default().with_compaction_min_free(usize::MAX)
    }

    #[test]
    fn keeps_fifo_order_per_entity() {
        let mut queue = OrderQueue::new(&no_compaction());
        queue.push(EntityId(1), order(1));
        queue.push(EntityId(1), order(2));
        queue.push(EntityId(1), order(3));

        assert_eq!(patterns(&queue, EntityId(1)), vec![1, 2, 3]);
        assert_eq!(queue.front(EntityId(1)).map(|o| o.id.pattern()), Some(1));
    }

    #[test]
    fn interleaved_pushes_relocate_ranges() {
        let mut queue = OrderQueue::new(&no_compaction());
        queue.push(EntityId(1), order(1));
        queue.push(EntityId(2), order(2));
        queue.push(EntityId(1), order(3));

        assert_eq!(patterns(&queue, EntityId(1)), vec![1, 3]);
        assert_eq!(patterns(&queue, EntityId(2)), vec![2]);
        assert_eq!(queue.range(EntityId(1)).map(|r| r.start()), Some(2));
        assert_eq!(queue.free_slots(), 1);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn growth_reuses_free_slot_after_range() {
        let mut queue = OrderQueue::new(&no_compaction());
        queue.push(EntityId(1), order(1));
        queue.push(EntityId(2), order(2));
        queue.push(EntityId(3), order(3));
        queue.cancel_all(EntityId(2));

        queue.push(EntityId(1), order(4));
        assert_eq!(queue.range(EntityId(1)), Some(QueueRange::new(0, 2)));
        assert_eq!(queue.free_slots(), 0);
        assert_eq!(patterns(&queue, EntityId(1)), vec![1, 4]);
    }

    #[test]
    fn removing_front_shifts_remaining_orders() {
        let mut queue = OrderQueue::new(&no_compaction());
        for pattern in 1..=3 {
            queue.push(EntityId(1), order(pattern));
        }
        queue.push(EntityId(2), order(9));

        let removed = queue.remove_at(EntityId(1), 0);
        assert_eq!(removed.map(|o| o.id.pattern()), Some(1));
        assert_eq!(patterns(&queue, EntityId(1)), vec![2, 3]);
        assert_eq!(queue.range(EntityId(1)), Some(QueueRange::new(0, 2)));
    }

    #[test]
    fn draining_removes_the_range() {
        let mut queue = OrderQueue::new(&no_compaction());
        queue.push(EntityId(1), order(1));
        queue.remove_at(EntityId(1), 0);

        assert!(!queue.has_pending(EntityId(1)));
        assert!(queue.is_empty());
        assert_eq!(queue.arena_len(), 0);
    }

    #[test]
    fn cancel_matches_pattern_regardless_of_handler_byte() {
        let mut queue = OrderQueue::new(&no_compaction());
        queue.push(EntityId(1), order(1));
        queue.push(EntityId(1), order(2));
        queue.push(EntityId(1), order(3));

        let filter = RequestId::new(HandlerId(4), 2);
        assert_eq!(queue.cancel(EntityId(1), filter), 1);
        assert_eq!(patterns(&queue, EntityId(1)), vec![1, 3]);
        assert_eq!(queue.cancel(EntityId(1), RequestId::ALL), 2);
        assert!(!queue.has_pending(EntityId(1)));
    }

    #[test]
    fn remove_targeting_spans_entities() {
        let mut queue = OrderQueue::new(&no_compaction());
        let mut chase = order(1);
        chase.request = chase.request.with_target_entity(EntityId(9));
        let mut walk = order(2);
        walk.request = walk.request.with_target_location(Position::new(1, 1));
        queue.push(EntityId(1), chase);
        queue.push(EntityId(1), walk);
        queue.push(EntityId(2), chase);

        let removed = queue.remove_targeting(EntityId(9));
        assert_eq!(removed.len(), 2);
        assert_eq!(patterns(&queue, EntityId(1)), vec![2]);
        assert!(!queue.has_pending(EntityId(2)));
    }

    #[test]
    fn compaction_waits_until_free_slots_outnumber_live_ones() {
        let config = DispatchConfig::default().with_compaction_min_free(2);
        let mut queue = OrderQueue::new(&config);
        queue.push(EntityId(3), order(1));
        queue.push(EntityId(1), order(2));
        queue.push(EntityId(3), order(3));
        queue.push(EntityId(1), order(4));

        // Both ranges moved to the tail once: two free slots, four live ones.
        assert_eq!(queue.free_slots(), 2);
        assert_eq!(queue.len(), 4);
        assert_eq!(queue.arena_len(), 6);

        // Three free against three live still keeps the holes.
        assert_eq!(queue.cancel(EntityId(3), RequestId::new(HandlerId::UNASSIGNED, 1)), 1);
        assert_eq!(queue.free_slots(), 3);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.arena_len(), 6);

        assert_eq!(queue.cancel(EntityId(1), RequestId::new(HandlerId::UNASSIGNED, 2)), 1);
        assert_eq!(queue.free_slots(), 0);
        assert_eq!(queue.arena_len(), queue.len());
        assert_eq!(patterns(&queue, EntityId(1)), vec![4]);
        assert_eq!(patterns(&queue, EntityId(3)), vec![3]);
        assert_eq!(queue.range(EntityId(1)), Some(QueueRange::new(0, 1)));
        assert_eq!(queue.range(EntityId(3)), Some(QueueRange::new(1, 1)));
    }

    #[test]
    fn iter_walks_entities_in_index_order() {
        let mut queue = OrderQueue::new(&no_compaction());
        queue.push(EntityId(5), order(1));
        queue.push(EntityId(2), order(2));
        queue.push(EntityId(5), order(3));

        let seen: Vec<_> = queue.iter().map(|(e, o)| (e.0, o.id.pattern())).collect();
        assert_eq!(seen, vec![(2, 2), (5, 1), (5, 3)]);
    }
}
