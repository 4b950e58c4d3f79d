use super::ActiveOrders;
use crate::queue::OrderQueue;
use crate::request::RequestId;
use crate::types::EntityId;

/// Position of one entity inside a multi-entity command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Group {
    /// Matching orders owned by entities with a lower index than the queried one.
    pub index: usize,
    /// Number of live orders, queued or active, sharing the pattern.
    pub count: usize,
}

/// Ranks `entity` among every live order whose id shares the pattern of `id`.
///
/// Both the active set and the pending queues are scanned, so members that
/// have not started yet still hold their place. No shared bookkeeping is
/// involved: each member derives the same answer from the same state.
pub fn group(active: &ActiveOrders, queue: &OrderQueue, entity: EntityId, id: RequestId) -> Group {
    if !id.is_valid() || id.is_all() {
        return Group::default();
    }

    let members = active
        .iter()
        .map(|(owner, activation)| (owner, activation.id))
        .chain(queue.iter().map(|(owner, order)| (owner, order.id)))
        .filter(|(_, member)| member.matches_pattern(id));

    let mut result = Group::default();
    for (owner, _) in members {
        result.count += 1;
        if owner.index() < entity.index() {
            result.index += 1;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DispatchConfig;
    use crate::request::{ActionActivation, ActionRequest, ActionType, HandlerId, OrderInstance};
    use crate::types::Tick;

    fn request() -> ActionRequest {
        ActionRequest::new(ActionType::MOVE, Tick::ZERO)
    }

    #[test]
    fn counts_active_and_pending_members() {
        let shared = RequestId::new(HandlerId::UNASSIGNED, 11);
        let mut active = ActiveOrders::new();
        let mut queue = OrderQueue::new(&DispatchConfig::default());

        active.insert(EntityId(4), ActionActivation::new(request(), shared.with_action_id(HandlerId(1))));
        queue.push(EntityId(2), OrderInstance::new(request(), shared));
        queue.push(EntityId(7), OrderInstance::new(request(), shared));
        queue.push(EntityId(3), OrderInstance::new(request(), RequestId::new(HandlerId(0), 12)));

        assert_eq!(group(&active, &queue, EntityId(2), shared), Group { index: 0, count: 3 });
        assert_eq!(group(&active, &queue, EntityId(4), shared), Group { index: 1, count: 3 });
        assert_eq!(group(&active, &queue, EntityId(7), shared), Group { index: 2, count: 3 });
    }

    #[test]
    fn wildcard_and_invalid_ids_form_no_group() {
        let active = ActiveOrders::new();
        let queue = OrderQueue::new(&DispatchConfig::default());
        assert_eq!(group(&active, &queue, EntityId(1), RequestId::ALL).count, 0);
        assert_eq!(group(&active, &queue, EntityId(1), RequestId::INVALID).count, 0);
    }
}
