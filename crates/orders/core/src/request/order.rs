use bitflags::bitflags;

use super::{HandlerId, RequestId};
use crate::types::{EntityId, Position, Tick};

bitflags! {
    /// Categories of gameplay action a request asks for.
    ///
    /// Handlers inspect these bits when scoring a request; a request may carry
    /// several bits (e.g. `MOVE | ATTACK` for an attack-move).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ActionType: u32 {
        const MOVE   = 1 << 0;
        const ATTACK = 1 << 1;
        const GATHER = 1 << 2;
        const BUILD  = 1 << 3;
        const TRAIN  = 1 << 4;
        const ACCRUE = 1 << 5;

        const INTERACT = Self::ATTACK.bits() | Self::GATHER.bits() | Self::BUILD.bits();
    }
}

/// Immutable description of a requested action.
///
/// Equality follows the targeting: two requests are the same request when
/// they aim at the same entity and the same location, regardless of kind,
/// forced handler or issue time.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionRequest {
    pub kind: ActionType,
    /// Handler that must service this request. `None` lets dispatch score it.
    pub forced_handler: Option<HandlerId>,
    pub target_entity: Option<EntityId>,
    pub target_location: Option<Position>,
    pub issued_at: Tick,
}

impl ActionRequest {
    pub const EMPTY: Self = Self {
        kind: ActionType::empty(),
        forced_handler: None,
        target_entity: None,
        target_location: None,
        issued_at: Tick::ZERO,
    };

    pub const fn new(kind: ActionType, issued_at: Tick) -> Self {
        Self {
            kind,
            forced_handler: None,
            target_entity: None,
            target_location: None,
            issued_at,
        }
    }

    #[must_use]
    pub const fn with_target_entity(mut self, target: EntityId) -> Self {
        self.target_entity = Some(target);
        self
    }

    #[must_use]
    pub const fn with_target_location(mut self, location: Position) -> Self {
        self.target_location = Some(location);
        self
    }

    #[must_use]
    pub const fn with_forced_handler(mut self, handler: HandlerId) -> Self {
        self.forced_handler = Some(handler);
        self
    }

    /// Returns a copy with the target entity dropped, leaving any location.
    #[must_use]
    pub const fn without_target_entity(mut self) -> Self {
        self.target_entity = None;
        self
    }

    pub fn same_target(&self, other: &Self) -> bool {
        self.target_entity == other.target_entity && self.target_location == other.target_location
    }
}

impl PartialEq for ActionRequest {
    fn eq(&self, other: &Self) -> bool {
        self.same_target(other)
    }
}

impl Eq for ActionRequest {}

/// A request waiting in an entity's queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderInstance {
    pub request: ActionRequest,
    pub id: RequestId,
    pub(crate) begin_failures: u16,
}

impl OrderInstance {
    /// Placeholder stored in free arena slots.
    pub(crate) const EMPTY: Self = Self {
        request: ActionRequest::EMPTY,
        id: RequestId::INVALID,
        begin_failures: 0,
    };

    pub const fn new(request: ActionRequest, id: RequestId) -> Self {
        Self {
            request,
            id,
            begin_failures: 0,
        }
    }

    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.id.is_valid()
    }

    /// Consecutive `begin` refusals since this order reached the queue head.
    pub const fn begin_failures(&self) -> u16 {
        self.begin_failures
    }
}

/// An order accepted by dispatch and currently executed by its handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionActivation {
    pub request: ActionRequest,
    pub id: RequestId,
}

impl ActionActivation {
    /// # Panics
    ///
    /// Panics if `id` is not bound to a handler. An activation without an
    /// owner cannot be cancelled or completed and indicates a dispatch bug.
    pub fn new(request: ActionRequest, id: RequestId) -> Self {
        assert!(
            id.action_id().is_assigned(),
            "activation {id} has no owning handler"
        );
        Self { request, id }
    }

    /// Handler executing this activation.
    #[inline]
    pub const fn handler(&self) -> HandlerId {
        self.id.action_id()
    }

    pub fn targets(&self, entity: EntityId) -> bool {
        self.request.target_entity == Some(entity)
    }
}

/// How an activation (or an order that never ran) came to an end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum CompletionStatus {
    Completed,
    Failed,
    Canceled,
}

/// Signal that the work behind `id` on `entity` is over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompletionInstance {
    pub entity: EntityId,
    pub id: RequestId,
    pub status: CompletionStatus,
}

impl CompletionInstance {
    pub const fn new(entity: EntityId, id: RequestId, status: CompletionStatus) -> Self {
        Self { entity, id, status }
    }

    pub const fn completed(entity: EntityId, id: RequestId) -> Self {
        Self::new(entity, id, CompletionStatus::Completed)
    }

    pub const fn failed(entity: EntityId, id: RequestId) -> Self {
        Self::new(entity, id, CompletionStatus::Failed)
    }

    pub const fn canceled(entity: EntityId, id: RequestId) -> Self {
        Self::new(entity, id, CompletionStatus::Canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_compare_by_target() {
        let a = ActionRequest::new(ActionType::MOVE, Tick(1)).with_target_location(Position::new(3, 4));
        let b = ActionRequest::new(ActionType::ATTACK, Tick(9)).with_target_location(Position::new(3, 4));
        let c = a.with_target_entity(EntityId(2));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(c.without_target_entity(), a);
    }

    #[test]
    fn empty_order_is_invalid() {
        assert!(!OrderInstance::EMPTY.is_valid());
        let order = OrderInstance::new(ActionRequest::EMPTY, RequestId::new(HandlerId(0), 1));
        assert!(order.is_valid());
    }

    #[test]
    #[should_panic(expected = "no owning handler")]
    fn activation_requires_owner() {
        let _ = ActionActivation::new(ActionRequest::EMPTY, RequestId::new(HandlerId(0), 1));
    }

    #[test]
    fn interact_covers_work_kinds() {
        assert!(ActionType::INTERACT.contains(ActionType::GATHER));
        assert!(!ActionType::INTERACT.intersects(ActionType::MOVE | ActionType::TRAIN));
    }
}
