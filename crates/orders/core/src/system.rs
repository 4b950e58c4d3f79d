//! The public entry point bundling dispatch, queues and configuration.

use tracing::{debug, warn};

use crate::config::DispatchConfig;
use crate::dispatch::{Group, ListenerId, OrderDispatch};
use crate::env::OrderEnv;
use crate::error::{OrderError, Result};
use crate::handler::OrderHandler;
use crate::queue::{OrderQueue, TickReport};
use crate::request::{
    ActionActivation, ActionRequest, CompletionInstance, HandlerId, OrderInstance, RequestId,
};
use crate::types::EntityId;

/// Order system of one simulation instance.
///
/// Two systems never share state: each owns its request-id counter, handler
/// registry, active set and queues. Feeding two systems the same calls in the
/// same order yields the same ids and the same completions.
pub struct OrderSystem {
    dispatch: OrderDispatch,
    queue: OrderQueue,
    config: DispatchConfig,
}

impl OrderSystem {
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            dispatch: OrderDispatch::new(),
            queue: OrderQueue::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn dispatch(&self) -> &OrderDispatch {
        &self.dispatch
    }

    pub fn queue(&self) -> &OrderQueue {
        &self.queue
    }

    /// # Panics
    ///
    /// Panics if a handler with the same name is already registered.
    pub fn register_handler<H>(&mut self, handler: H) -> HandlerId
    where
        H: OrderHandler + 'static,
    {
        self.dispatch.register_handler(Box::new(handler))
    }

    pub fn handler_id(&self, name: &str) -> Option<HandlerId> {
        self.dispatch.handler_id(name)
    }

    /// Subscribes `listener` to every completion, cancellation and failure.
    pub fn register_completion_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(HandlerId, &CompletionInstance) + 'static,
    {
        self.dispatch.subscribe(Box::new(listener))
    }

    pub fn unregister_completion_listener(&mut self, id: ListenerId) -> bool {
        self.dispatch.unsubscribe(id)
    }

    pub fn allocate_request_id(&mut self, handler: HandlerId) -> RequestId {
        self.dispatch.allocate_request_id(handler)
    }

    /// Queues `request` behind every pending order of `entity`.
    ///
    /// The returned id carries the forced handler, if any, in its action byte
    /// and is unassigned otherwise.
    pub fn enqueue(
        &mut self,
        env: OrderEnv<'_>,
        entity: EntityId,
        request: ActionRequest,
    ) -> Result<RequestId> {
        let request = self.validate(env, entity, request)?;
        let id = self.allocate_for(&request);
        self.push(entity, request, id);
        Ok(id)
    }

    /// Queues `request` under a caller-chosen id, typically one shared with
    /// other entities to form a group. Ids with pattern `0` are rejected.
    pub fn enqueue_with_id(
        &mut self,
        env: OrderEnv<'_>,
        entity: EntityId,
        request: ActionRequest,
        id: RequestId,
    ) -> Result<RequestId> {
        if id.pattern() == 0 || id.is_all() {
            return Err(OrderError::InvalidRequestId { id });
        }
        let request = self.validate(env, entity, request)?;
        self.push(entity, request, id);
        Ok(id)
    }

    /// Queues the same request on every entity under one shared pattern.
    ///
    /// Nothing is queued unless every member passes validation.
    pub fn enqueue_group(
        &mut self,
        env: OrderEnv<'_>,
        entities: &[EntityId],
        request: ActionRequest,
    ) -> Result<RequestId> {
        if entities.is_empty() {
            return Err(OrderError::EmptyGroup);
        }
        let requests = entities
            .iter()
            .map(|&entity| self.validate(env, entity, request))
            .collect::<Result<Vec<_>>>()?;

        let id = self.allocate_for(&request);
        for (&entity, request) in entities.iter().zip(requests) {
            self.push(entity, request, id);
        }
        Ok(id)
    }

    /// Cancels pending and active orders of `entity` covered by `id`.
    ///
    /// Pending orders vanish silently. Active ones are canceled through their
    /// handler and reported to listeners as `Canceled`.
    pub fn cancel(&mut self, env: OrderEnv<'_>, entity: EntityId, id: RequestId) -> usize {
        let pending = self.queue.cancel(entity, id);
        let active = self.dispatch.cancel(env, &self.queue, entity, id);
        pending + active
    }

    pub fn cancel_all(&mut self, env: OrderEnv<'_>, entity: EntityId) -> usize {
        self.cancel(env, entity, RequestId::ALL)
    }

    /// Reports that `handler` finished an activation outside of its `update`.
    pub fn complete(&mut self, handler: HandlerId, completion: CompletionInstance) -> bool {
        self.dispatch.complete(handler, completion)
    }

    /// Advances the order system by one step.
    ///
    /// Handler updates run first so that tracks released by finished work are
    /// free for the queue heads considered right after.
    pub fn tick(&mut self, env: OrderEnv<'_>) -> TickReport {
        let completed = self.dispatch.update_handlers(env, &self.queue);
        let mut report = self
            .queue
            .activate_ready(&mut self.dispatch, env, &self.config);
        report.completed = completed;
        report
    }

    /// Forgets everything owned by or aimed at a destroyed entity.
    ///
    /// Returns the number of orders removed, pending and active combined.
    pub fn on_entity_destroyed(&mut self, env: OrderEnv<'_>, entity: EntityId) -> usize {
        let mut pending = self.queue.remove_entity(entity);
        pending += self.queue.remove_targeting(entity).len();
        let active = self.dispatch.on_entity_destroyed(env, &self.queue, entity);
        debug!(
            target: "orders::dispatch",
            entity = %entity,
            pending,
            active,
            "entity destroyed"
        );
        pending + active
    }

    pub fn group(&self, entity: EntityId, id: RequestId) -> Group {
        self.dispatch.group(&self.queue, entity, id)
    }

    pub fn active_orders_for(&self, entity: EntityId) -> impl Iterator<Item = &ActionActivation> {
        self.dispatch.active().for_entity(entity)
    }

    pub fn pending_orders_for(&self, entity: EntityId) -> &[OrderInstance] {
        self.queue.pending_orders_for(entity)
    }

    fn validate(
        &self,
        env: OrderEnv<'_>,
        entity: EntityId,
        request: ActionRequest,
    ) -> Result<ActionRequest> {
        if !env.entities().contains(entity) {
            return Err(OrderError::EntityNotFound { entity });
        }
        if let Some(handler) = request.forced_handler {
            if !self.dispatch.registry().contains(handler) {
                return Err(OrderError::UnknownHandler { handler });
            }
        }
        match request.target_entity {
            Some(target) if !env.entities().contains(target) => {
                warn!(
                    target: "orders::queue",
                    entity = %entity,
                    target = %target,
                    "order target does not exist, clearing it"
                );
                Ok(request.without_target_entity())
            }
            _ => Ok(request),
        }
    }

    fn allocate_for(&mut self, request: &ActionRequest) -> RequestId {
        let handler = request.forced_handler.unwrap_or(HandlerId::UNASSIGNED);
        self.dispatch.allocate_request_id(handler)
    }

    fn push(&mut self, entity: EntityId, request: ActionRequest, id: RequestId) {
        debug!(
            target: "orders::queue",
            entity = %entity,
            request = %id,
            kind = ?request.kind,
            "order queued"
        );
        self.queue.push(entity, OrderInstance::new(request, id));
    }
}

impl Default for OrderSystem {
    fn default() -> Self {
        Self::new(DispatchConfig::default())
    }
}
