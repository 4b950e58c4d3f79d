//! Order dispatch: handler registry, active-set bookkeeping and track
//! arbitration.
//!
//! # Architecture
//!
//! ```text
//! OrderDispatch
//! ├── registry: HandlerRegistry       (HandlerId → Box<dyn OrderHandler>)
//! ├── active: ActiveOrders            (EntityId → [ActionActivation])
//! ├── listeners: CompletionListeners  (completion callbacks)
//! └── next_pattern: u32               (request-id counter for this simulation)
//! ```
//!
//! The dispatch never stores track locks. [`OrderDispatch::track_states`]
//! rebuilds them from the active set every time a candidate is evaluated.
mod active;
mod group;
mod registry;

pub use active::ActiveOrders;
pub use group::{Group, group};
pub use registry::{CompletionListeners, HandlerRegistry, ListenerId};

use tracing::debug;

use crate::env::OrderEnv;
use crate::handler::{OrderContext, OrderHandler};
use crate::queue::OrderQueue;
use crate::request::{
    ActionActivation, ActionRequest, CompletionInstance, HandlerId, OrderInstance, RequestId,
};
use crate::track::TrackStates;
use crate::types::EntityId;

/// Arbitrates which handler runs which order and tracks what is running.
#[derive(Default)]
pub struct OrderDispatch {
    pub(crate) registry: HandlerRegistry,
    pub(crate) active: ActiveOrders,
    pub(crate) listeners: CompletionListeners,
    next_pattern: u32,
}

impl OrderDispatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler and returns the id it is addressed by.
    ///
    /// # Panics
    ///
    /// See [`HandlerRegistry::register`].
    pub fn register_handler(&mut self, handler: Box<dyn OrderHandler>) -> HandlerId {
        self.registry.register(handler)
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn active(&self) -> &ActiveOrders {
        &self.active
    }

    pub fn handler_id(&self, name: &str) -> Option<HandlerId> {
        self.registry.find(name)
    }

    pub fn handler_name(&self, id: HandlerId) -> Option<&'static str> {
        self.registry.get(id).map(|handler| handler.name())
    }

    pub fn subscribe(
        &mut self,
        listener: Box<dyn FnMut(HandlerId, &CompletionInstance)>,
    ) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Mints a fresh pattern bound to `handler`.
    ///
    /// The counter wraps from `0xFF_FFFF` back to `1`; pattern `0` is never
    /// produced, so the result is always a valid id.
    pub fn allocate_request_id(&mut self, handler: HandlerId) -> RequestId {
        self.next_pattern = if self.next_pattern >= RequestId::PATTERN_MASK {
            1
        } else {
            self.next_pattern + 1
        };
        RequestId::new(handler, self.next_pattern)
    }

    /// Chooses the handler that will service `order`.
    ///
    /// A forced handler is returned as-is when registered. Otherwise the
    /// strictly highest positive score wins and ties keep the handler that was
    /// registered first.
    pub fn select_handler(
        &self,
        ctx: &OrderContext<'_>,
        entity: EntityId,
        order: &OrderInstance,
    ) -> Option<HandlerId> {
        if let Some(forced) = order.request.forced_handler {
            return self.registry.contains(forced).then_some(forced);
        }

        let mut best: Option<(HandlerId, f32)> = None;
        for (id, handler) in self.registry.iter() {
            let score = handler.score(ctx, entity, order);
            if score > 0.0 && best.is_none_or(|(_, top)| score > top) {
                best = Some((id, score));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Builds the track picture for `request` run by `handler` on `entity`.
    ///
    /// Every active order of the entity declares first (reserving its tracks
    /// at its own priority), then the candidate declares.
    pub fn track_states(
        &self,
        entity: EntityId,
        handler: HandlerId,
        request: &ActionRequest,
    ) -> TrackStates {
        let mut states = TrackStates::new();
        for activation in self.active.for_entity(entity) {
            if let Some(owner) = self.registry.get(activation.handler()) {
                owner.track_requirements(entity, &activation.request, &mut states);
            }
        }

        states.begin_candidate();
        if let Some(candidate) = self.registry.get(handler) {
            candidate.track_requirements(entity, request, &mut states);
        }
        states
    }

    /// Whether `request` could start on `entity` under `handler` right now.
    ///
    /// All-or-nothing: one contended track rejects the candidate.
    pub fn try_activate(&self, entity: EntityId, handler: HandlerId, request: &ActionRequest) -> bool {
        self.track_states(entity, handler, request).is_accepted()
    }

    /// Rank of `entity` among live orders sharing the pattern of `id`.
    pub fn group(&self, queue: &OrderQueue, entity: EntityId, id: RequestId) -> Group {
        group(&self.active, queue, entity, id)
    }

    /// Asks the owning handler to start `activation`.
    pub(crate) fn begin(
        &mut self,
        env: OrderEnv<'_>,
        queue: &OrderQueue,
        entity: EntityId,
        activation: &ActionActivation,
    ) -> bool {
        let ctx = OrderContext::new(env, &self.active, queue);
        let Some(handler) = self.registry.get_mut(activation.handler()) else {
            return false;
        };
        handler.begin(&ctx, entity, activation)
    }

    pub(crate) fn record_activation(&mut self, entity: EntityId, activation: ActionActivation) {
        debug!(
            target: "orders::dispatch",
            entity = %entity,
            request = %activation.id,
            "order activated"
        );
        self.active.insert(entity, activation);
    }

    pub(crate) fn notify(&mut self, handler: HandlerId, completion: &CompletionInstance) {
        self.listeners.notify(handler, completion);
    }

    /// Cancels every active order of `entity` covered by `filter`.
    ///
    /// Each owning handler's `cancel` runs before the activation leaves the
    /// active set; listeners then receive a `Canceled` completion.
    pub fn cancel(
        &mut self,
        env: OrderEnv<'_>,
        queue: &OrderQueue,
        entity: EntityId,
        filter: RequestId,
    ) -> usize {
        let covered: Vec<ActionActivation> = self
            .active
            .for_entity(entity)
            .filter(|activation| filter.covers(activation.id))
            .copied()
            .collect();
        if covered.is_empty() {
            return 0;
        }

        let ctx = OrderContext::new(env, &self.active, queue);
        for activation in &covered {
            if let Some(handler) = self.registry.get_mut(activation.handler()) {
                handler.cancel(&ctx, entity, activation.id);
            }
        }

        self.active.remove_covered(entity, filter);
        for activation in &covered {
            debug!(
                target: "orders::dispatch",
                entity = %entity,
                request = %activation.id,
                "active order canceled"
            );
            self.listeners.notify(
                activation.handler(),
                &CompletionInstance::canceled(entity, activation.id),
            );
        }
        covered.len()
    }

    /// Drops activations owned by or targeting a destroyed entity.
    ///
    /// Handlers get an idempotent `cancel` so they can release what they hold,
    /// but no completion is reported: the work never finished.
    pub fn on_entity_destroyed(
        &mut self,
        env: OrderEnv<'_>,
        queue: &OrderQueue,
        entity: EntityId,
    ) -> usize {
        let mut released: Vec<(EntityId, ActionActivation)> = self
            .active
            .remove_entity(entity)
            .into_iter()
            .map(|activation| (entity, activation))
            .collect();
        released.extend(self.active.remove_targeting(entity));

        let ctx = OrderContext::new(env, &self.active, queue);
        for (owner, activation) in &released {
            if let Some(handler) = self.registry.get_mut(activation.handler()) {
                handler.cancel(&ctx, *owner, activation.id);
            }
            debug!(
                target: "orders::dispatch",
                entity = %owner,
                request = %activation.id,
                destroyed = %entity,
                "activation released after entity destruction"
            );
        }
        released.len()
    }

    /// Records that `handler` finished `completion.id` on `completion.entity`.
    ///
    /// Returns false (and notifies nobody) when no such activation exists,
    /// e.g. because it was canceled earlier in the same tick.
    pub fn complete(&mut self, handler: HandlerId, completion: CompletionInstance) -> bool {
        if self.active.remove(completion.entity, completion.id).is_none() {
            debug!(
                target: "orders::dispatch",
                entity = %completion.entity,
                request = %completion.id,
                handler = %handler,
                "completion for unknown activation ignored"
            );
            return false;
        }

        debug!(
            target: "orders::dispatch",
            entity = %completion.entity,
            request = %completion.id,
            status = %completion.status,
            "activation finished"
        );
        self.listeners.notify(handler, &completion);
        true
    }

    /// Runs every handler's `update` and routes the completions it reports.
    pub fn update_handlers(&mut self, env: OrderEnv<'_>, queue: &OrderQueue) -> usize {
        let mut reported = Vec::new();
        let mut buffer = Vec::new();
        {
            let ctx = OrderContext::new(env, &self.active, queue);
            for (id, handler) in self.registry.iter_mut() {
                handler.update(&ctx, &mut buffer);
                reported.extend(buffer.drain(..).map(|completion| (id, completion)));
            }
        }

        let mut finished = 0;
        for (id, completion) in reported {
            if self.complete(id, completion) {
                finished += 1;
            }
        }
        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DispatchConfig;
    use crate::env::{EntityOracle, Env, TimeOracle};
    use crate::request::{ActionType, CompletionStatus};
    use crate::track::{Priority, Track};
    use crate::types::{Position, Tick};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct World;
    impl EntityOracle for World {
        fn contains(&self, _entity: EntityId) -> bool {
            true
        }
        fn position(&self, _entity: EntityId) -> Option<Position> {
            Some(Position::ORIGIN)
        }
    }
    impl TimeOracle for World {
        fn now(&self) -> Tick {
            Tick::ZERO
        }
        fn tick_size(&self) -> u64 {
            1
        }
    }

    struct Fixed {
        name: &'static str,
        score: f32,
        track: Track,
        priority: Priority,
        canceled: Rc<RefCell<Vec<RequestId>>>,
    }

    impl Fixed {
        fn new(name: &'static str, score: f32, track: Track, priority: Priority) -> Self {
            Self {
                name,
                score,
                track,
                priority,
                canceled: Rc::default(),
            }
        }
    }

    impl OrderHandler for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }
        fn score(&self, _ctx: &OrderContext<'_>, _entity: EntityId, _order: &OrderInstance) -> f32 {
            self.score
        }
        fn track_requirements(&self, _entity: EntityId, _request: &ActionRequest, tracks: &mut TrackStates) {
            tracks.declare(self.track, self.priority);
        }
        fn begin(&mut self, _ctx: &OrderContext<'_>, _entity: EntityId, _activation: &ActionActivation) -> bool {
            true
        }
        fn cancel(&mut self, _ctx: &OrderContext<'_>, _entity: EntityId, id: RequestId) {
            self.canceled.borrow_mut().push(id);
        }
    }

    fn order(pattern: u32) -> OrderInstance {
        OrderInstance::new(
            ActionRequest::new(ActionType::MOVE, Tick::ZERO),
            RequestId::new(HandlerId::UNASSIGNED, pattern),
        )
    }

    #[test]
    fn allocates_sequential_patterns_and_wraps() {
        let mut dispatch = OrderDispatch::new();
        let first = dispatch.allocate_request_id(HandlerId::UNASSIGNED);
        let second = dispatch.allocate_request_id(HandlerId(2));
        assert_eq!(first.pattern(), 1);
        assert_eq!(second, RequestId::new(HandlerId(2), 2));

        dispatch.next_pattern = RequestId::PATTERN_MASK;
        assert_eq!(dispatch.allocate_request_id(HandlerId::UNASSIGNED).pattern(), 1);
    }

    #[test]
    fn highest_score_wins_and_ties_keep_first() {
        let mut dispatch = OrderDispatch::new();
        let low = dispatch.register_handler(Box::new(Fixed::new("low", 0.5, Track::Move, Priority::NORMAL)));
        let first = dispatch.register_handler(Box::new(Fixed::new("first", 2.0, Track::Move, Priority::NORMAL)));
        let _tied = dispatch.register_handler(Box::new(Fixed::new("tied", 2.0, Track::Move, Priority::NORMAL)));
        let queue = OrderQueue::new(&DispatchConfig::default());
        let env = Env::new(&World, &World);
        let ctx = OrderContext::new(env.as_order_env(), &dispatch.active, &queue);

        assert_eq!(dispatch.select_handler(&ctx, EntityId(1), &order(1)), Some(first));

        let mut forced = order(2);
        forced.request = forced.request.with_forced_handler(low);
        assert_eq!(dispatch.select_handler(&ctx, EntityId(1), &forced), Some(low));

        forced.request = forced.request.with_forced_handler(HandlerId(99));
        assert_eq!(dispatch.select_handler(&ctx, EntityId(1), &forced), None);
    }

    #[test]
    fn non_positive_scores_are_never_selected() {
        let mut dispatch = OrderDispatch::new();
        dispatch.register_handler(Box::new(Fixed::new("zero", 0.0, Track::Move, Priority::NORMAL)));
        dispatch.register_handler(Box::new(Fixed::new("nan", f32::NAN, Track::Move, Priority::NORMAL)));
        let queue = OrderQueue::new(&DispatchConfig::default());
        let env = Env::new(&World, &World);
        let ctx = OrderContext::new(env.as_order_env(), &dispatch.active, &queue);

        assert_eq!(dispatch.select_handler(&ctx, EntityId(1), &order(1)), None);
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn double_registration_panics() {
        let mut dispatch = OrderDispatch::new();
        dispatch.register_handler(Box::new(Fixed::new("move", 1.0, Track::Move, Priority::NORMAL)));
        dispatch.register_handler(Box::new(Fixed::new("move", 1.0, Track::Move, Priority::NORMAL)));
    }

    #[test]
    fn active_orders_reserve_their_tracks() {
        let mut dispatch = OrderDispatch::new();
        let mover = dispatch.register_handler(Box::new(Fixed::new("move", 1.0, Track::Move, Priority::NORMAL)));
        let urgent = dispatch.register_handler(Box::new(Fixed::new("urgent", 1.0, Track::Move, Priority::HIGH)));
        let trainer = dispatch.register_handler(Box::new(Fixed::new("train", 1.0, Track::Train, Priority::NORMAL)));
        let request = ActionRequest::new(ActionType::MOVE, Tick::ZERO);

        assert!(dispatch.try_activate(EntityId(1), mover, &request));
        dispatch.record_activation(EntityId(1), ActionActivation::new(request, RequestId::new(mover, 1)));

        assert!(!dispatch.try_activate(EntityId(1), mover, &request));
        assert!(dispatch.try_activate(EntityId(1), urgent, &request));
        assert!(dispatch.try_activate(EntityId(1), trainer, &request));
        assert!(dispatch.try_activate(EntityId(2), mover, &request));
    }

    #[test]
    fn cancel_invokes_handler_and_notifies() {
        let mut dispatch = OrderDispatch::new();
        let handler = Fixed::new("move", 1.0, Track::Move, Priority::NORMAL);
        let canceled = Rc::clone(&handler.canceled);
        let mover = dispatch.register_handler(Box::new(handler));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        dispatch.subscribe(Box::new(move |id, completion| sink.borrow_mut().push((id, *completion))));

        let request = ActionRequest::new(ActionType::MOVE, Tick::ZERO);
        let id = RequestId::new(mover, 5);
        dispatch.record_activation(EntityId(1), ActionActivation::new(request, id));

        let queue = OrderQueue::new(&DispatchConfig::default());
        let env = Env::new(&World, &World);
        let removed = dispatch.cancel(env.as_order_env(), &queue, EntityId(1), id.with_action_id(HandlerId::UNASSIGNED));

        assert_eq!(removed, 1);
        assert_eq!(*canceled.borrow(), vec![id]);
        assert_eq!(seen.borrow()[0], (mover, CompletionInstance::canceled(EntityId(1), id)));
        assert!(dispatch.active().is_empty());
    }

    #[test]
    fn completion_for_unknown_activation_is_ignored() {
        let mut dispatch = OrderDispatch::new();
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        dispatch.subscribe(Box::new(move |_, _| *sink.borrow_mut() += 1));

        let completion = CompletionInstance::new(EntityId(1), RequestId::new(HandlerId(1), 1), CompletionStatus::Completed);
        assert!(!dispatch.complete(HandlerId(1), completion));
        assert_eq!(*seen.borrow(), 0);
    }
}
