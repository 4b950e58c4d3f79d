//! Per-tick promotion of queue heads into active orders.

use tracing::{debug, warn};

use super::OrderQueue;
use crate::config::DispatchConfig;
use crate::dispatch::OrderDispatch;
use crate::env::OrderEnv;
use crate::handler::OrderContext;
use crate::request::{ActionActivation, CompletionInstance, HandlerId};
use crate::types::EntityId;

/// What happened to queue heads during one activation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Activations that reported completion this tick.
    pub completed: usize,
    /// Orders promoted from a queue head into the active set.
    pub activated: usize,
    /// Heads that stayed queued because a track was held.
    pub blocked: usize,
    /// Heads whose handler refused to begin.
    pub refused: usize,
    /// Orders removed without running (no handler, or too many refusals).
    pub dropped: usize,
}

impl std::ops::AddAssign for TickReport {
    fn add_assign(&mut self, rhs: Self) {
        self.completed += rhs.completed;
        self.activated += rhs.activated;
        self.blocked += rhs.blocked;
        self.refused += rhs.refused;
        self.dropped += rhs.dropped;
    }
}

impl OrderQueue {
    /// Tries to start the head order of every entity with a pending queue.
    ///
    /// Entities are visited in ascending index order and only their head is
    /// considered: an order never starts ahead of one queued before it on the
    /// same entity.
    pub fn activate_ready(
        &mut self,
        dispatch: &mut OrderDispatch,
        env: OrderEnv<'_>,
        config: &DispatchConfig,
    ) -> TickReport {
        let mut report = TickReport::default();
        let entities: Vec<EntityId> = self.entities().collect();
        for entity in entities {
            self.activate_head(dispatch, env, config, entity, &mut report);
        }
        report
    }

    fn activate_head(
        &mut self,
        dispatch: &mut OrderDispatch,
        env: OrderEnv<'_>,
        config: &DispatchConfig,
        entity: EntityId,
        report: &mut TickReport,
    ) {
        if !env.entities().contains(entity) {
            let dropped = self.remove_entity(entity);
            warn!(
                target: "orders::queue",
                entity = %entity,
                dropped,
                "queue owner no longer exists, dropping its orders"
            );
            report.dropped += dropped;
            return;
        }

        let Some(head) = self.front_mut(entity) else {
            return;
        };
        if let Some(target) = head.request.target_entity {
            if !env.entities().contains(target) {
                warn!(
                    target: "orders::queue",
                    entity = %entity,
                    request = %head.id,
                    target = %target,
                    "order target no longer exists, clearing it"
                );
                head.request = head.request.without_target_entity();
            }
        }
        let head = *head;

        let selected = {
            let ctx = OrderContext::new(env, &dispatch.active, self);
            dispatch.select_handler(&ctx, entity, &head)
        };
        let Some(handler) = selected else {
            warn!(
                target: "orders::queue",
                entity = %entity,
                request = %head.id,
                kind = ?head.request.kind,
                "no handler can service order, dropping it"
            );
            self.remove_at(entity, 0);
            dispatch.notify(HandlerId::UNASSIGNED, &CompletionInstance::failed(entity, head.id));
            report.dropped += 1;
            return;
        };

        if !dispatch.try_activate(entity, handler, &head.request) {
            debug!(
                target: "orders::queue",
                entity = %entity,
                request = %head.id,
                handler = %handler,
                "order blocked on a held track"
            );
            report.blocked += 1;
            return;
        }

        let activation = ActionActivation::new(head.request, head.id.with_action_id(handler));
        if dispatch.begin(env, self, entity, &activation) {
            self.remove_at(entity, 0);
            dispatch.record_activation(entity, activation);
            report.activated += 1;
            return;
        }

        report.refused += 1;
        let Some(front) = self.front_mut(entity) else {
            return;
        };
        front.begin_failures = front.begin_failures.saturating_add(1);
        let failures = front.begin_failures;
        debug!(
            target: "orders::queue",
            entity = %entity,
            request = %head.id,
            handler = %handler,
            failures,
            "handler refused to begin order"
        );

        if config.max_begin_failures.is_some_and(|limit| failures >= limit) {
            warn!(
                target: "orders::queue",
                entity = %entity,
                request = %head.id,
                failures,
                "order expired after repeated begin refusals"
            );
            self.remove_at(entity, 0);
            dispatch.notify(handler, &CompletionInstance::failed(entity, head.id));
            report.dropped += 1;
        }
    }
}
