//! Fixed-step simulation driving the order system.
//!
//! # Step order
//!
//! ```text
//! step()
//! ├── clock.advance()
//! ├── forward destroyed entities    → OrderSystem::on_entity_destroyed
//! ├── navigation.advance(store)     (moves entities, records arrivals)
//! └── OrderSystem::tick             (handler updates, then queue heads)
//! ```
use tracing::debug;

use order_handlers::{
    AccrualHandler, HandlersConfig, InteractHandler, Ledger, MoveHandler, TrainHandler,
};
use orders_core::{
    ActionRequest, CompletionInstance, EntityId, Env, HandlerId, ListenerId, OrderSystem, Position,
    RequestId, Tick, TickReport, TimeOracle,
};

use crate::clock::SimClock;
use crate::config::RuntimeConfig;
use crate::error::Result;
use crate::navigation::GridNavigation;
use crate::store::{EntityStore, Subscription};

/// One self-contained simulation instance.
pub struct Simulation {
    store: EntityStore,
    clock: SimClock,
    orders: OrderSystem,
    navigation: GridNavigation,
    ledger: Ledger,
    handlers: HandlersConfig,
    destroyed_feed: Subscription,
}

impl Simulation {
    /// Creates a simulation with no handlers registered.
    pub fn new(config: RuntimeConfig) -> Self {
        let mut store = EntityStore::new();
        let destroyed_feed = store.subscribe();
        Self {
            store,
            clock: SimClock::new(config.tick_size),
            orders: OrderSystem::new(config.dispatch),
            navigation: GridNavigation::new(),
            ledger: Ledger::new(),
            handlers: config.handlers,
            destroyed_feed,
        }
    }

    /// Creates a simulation with every built-in handler registered.
    pub fn with_default_handlers(config: RuntimeConfig) -> Self {
        let mut simulation = Self::new(config);
        simulation.register_default_handlers();
        simulation
    }

    /// Registers move, interact, train and accrual handlers, in that order.
    pub fn register_default_handlers(&mut self) {
        let config = &self.handlers;
        self.orders
            .register_handler(MoveHandler::new(self.navigation.clone()));
        self.orders
            .register_handler(InteractHandler::new(config.interact_steps));
        self.orders
            .register_handler(TrainHandler::new(config.train_steps));
        self.orders.register_handler(AccrualHandler::new(
            config.accrual_rate,
            config.accrual_quota,
            self.ledger.clone(),
        ));
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn orders(&self) -> &OrderSystem {
        &self.orders
    }

    pub fn orders_mut(&mut self) -> &mut OrderSystem {
        &mut self.orders
    }

    pub fn navigation(&self) -> &GridNavigation {
        &self.navigation
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn now(&self) -> Tick {
        self.clock.now()
    }

    pub fn handler_id(&self, name: &str) -> Option<HandlerId> {
        self.orders.handler_id(name)
    }

    pub fn spawn(&mut self, position: Position) -> Result<EntityId> {
        self.store.spawn(position)
    }

    /// Removes `entity` from the store. The order system hears about it at
    /// the start of the next step.
    pub fn destroy(&mut self, entity: EntityId) -> Result<()> {
        self.store.destroy(entity)
    }

    pub fn on_completion<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(HandlerId, &CompletionInstance) + 'static,
    {
        self.orders.register_completion_listener(listener)
    }

    pub fn enqueue(&mut self, entity: EntityId, request: ActionRequest) -> Result<RequestId> {
        let env = Env::new(&self.store, &self.clock);
        Ok(self.orders.enqueue(env.as_order_env(), entity, request)?)
    }

    pub fn enqueue_group(&mut self, entities: &[EntityId], request: ActionRequest) -> Result<RequestId> {
        let env = Env::new(&self.store, &self.clock);
        Ok(self.orders.enqueue_group(env.as_order_env(), entities, request)?)
    }

    pub fn cancel(&mut self, entity: EntityId, id: RequestId) -> usize {
        let env = Env::new(&self.store, &self.clock);
        self.orders.cancel(env.as_order_env(), entity, id)
    }

    pub fn cancel_all(&mut self, entity: EntityId) -> usize {
        self.cancel(entity, RequestId::ALL)
    }

    /// Advances the world by one fixed step.
    pub fn step(&mut self) -> TickReport {
        let now = self.clock.advance();

        let destroyed = self.store.drain_destroyed(self.destroyed_feed);
        if !destroyed.is_empty() {
            let env = Env::new(&self.store, &self.clock);
            for entity in destroyed {
                self.orders.on_entity_destroyed(env.as_order_env(), entity);
            }
        }

        self.navigation.advance(&mut self.store);

        let env = Env::new(&self.store, &self.clock);
        let report = self.orders.tick(env.as_order_env());
        debug!(
            target: "runtime::simulation",
            tick = %now,
            activated = report.activated,
            completed = report.completed,
            blocked = report.blocked,
            "step finished"
        );
        report
    }

    /// Runs `steps` steps and sums their reports.
    pub fn run(&mut self, steps: u64) -> TickReport {
        let mut total = TickReport::default();
        for _ in 0..steps {
            total += self.step();
        }
        total
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::with_default_handlers(RuntimeConfig::default())
    }
}
