//! The contract every pluggable behavior (movement, training, gathering…)
//! implements to take part in dispatch.

use crate::dispatch::{ActiveOrders, Group, group};
use crate::env::OrderEnv;
use crate::queue::OrderQueue;
use crate::request::{ActionActivation, ActionRequest, CompletionInstance, OrderInstance, RequestId};
use crate::track::TrackStates;
use crate::types::{EntityId, Tick};

/// A pluggable order handler.
///
/// Handlers are registered once with the dispatch and addressed afterwards by
/// the [`HandlerId`](crate::HandlerId) they were given. All calls happen on the
/// simulation thread during a tick; none may block.
pub trait OrderHandler {
    /// Unique name, used for registry lookups and diagnostics.
    fn name(&self) -> &'static str;

    /// How well this handler can service `order`. Values `<= 0.0` mean "not at
    /// all". Only consulted when the request does not force a handler.
    fn score(&self, ctx: &OrderContext<'_>, entity: EntityId, order: &OrderInstance) -> f32;

    /// Declares the tracks `request` occupies while this handler runs it.
    ///
    /// Called both for the candidate and for every active order of the entity
    /// each time a candidate is evaluated, so it must be pure.
    fn track_requirements(&self, entity: EntityId, request: &ActionRequest, tracks: &mut TrackStates);

    /// Starts executing `activation`.
    ///
    /// Returning `false` leaves the order queued; dispatch tries again on the
    /// next tick.
    fn begin(
        &mut self,
        ctx: &OrderContext<'_>,
        entity: EntityId,
        activation: &ActionActivation,
    ) -> bool;

    /// Stops the work behind `id`. Must tolerate ids this handler never began.
    fn cancel(&mut self, ctx: &OrderContext<'_>, entity: EntityId, id: RequestId);

    /// Per-tick hook. Push a [`CompletionInstance`] for every activation that
    /// finished since the last call.
    fn update(&mut self, _ctx: &OrderContext<'_>, _completions: &mut Vec<CompletionInstance>) {}
}

/// Read-only view of the dispatch state handed to handlers.
#[derive(Clone, Copy)]
pub struct OrderContext<'a> {
    env: OrderEnv<'a>,
    active: &'a ActiveOrders,
    queue: &'a OrderQueue,
}

impl<'a> OrderContext<'a> {
    pub fn new(env: OrderEnv<'a>, active: &'a ActiveOrders, queue: &'a OrderQueue) -> Self {
        Self { env, active, queue }
    }

    pub fn env(&self) -> OrderEnv<'a> {
        self.env
    }

    pub fn now(&self) -> Tick {
        self.env.now()
    }

    /// Rank of `entity` among all live orders sharing the pattern of `id`.
    pub fn group(&self, entity: EntityId, id: RequestId) -> Group {
        group(self.active, self.queue, entity, id)
    }

    pub fn active_orders_for(&self, entity: EntityId) -> impl Iterator<Item = &'a ActionActivation> {
        self.active.for_entity(entity)
    }

    pub fn pending_orders_for(&self, entity: EntityId) -> &'a [OrderInstance] {
        self.queue.pending_orders_for(entity)
    }
}
