use tracing::debug;

use orders_core::{
    ActionActivation, ActionRequest, ActionType, CompletionInstance, EntityId, OrderContext,
    OrderHandler, OrderInstance, Priority, RequestId, Track, TrackStates,
};

use crate::timed::TimedWork;

/// Runs `TRAIN` orders: production that takes a fixed number of steps.
pub struct TrainHandler {
    steps: u64,
    work: TimedWork,
}

impl TrainHandler {
    pub const NAME: &'static str = "train";

    pub fn new(steps: u64) -> Self {
        Self {
            steps,
            work: TimedWork::new(),
        }
    }

    pub fn work(&self) -> &TimedWork {
        &self.work
    }
}

impl OrderHandler for TrainHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn score(&self, _ctx: &OrderContext<'_>, _entity: EntityId, order: &OrderInstance) -> f32 {
        if order.request.kind.contains(ActionType::TRAIN) {
            1.0
        } else {
            0.0
        }
    }

    fn track_requirements(&self, _entity: EntityId, _request: &ActionRequest, tracks: &mut TrackStates) {
        tracks.declare(Track::Train, Priority::NORMAL);
    }

    fn begin(&mut self, ctx: &OrderContext<'_>, entity: EntityId, activation: &ActionActivation) -> bool {
        self.work.start(ctx, entity, activation.id, None, self.steps);
        debug!(
            target: "orders::handlers",
            entity = %entity,
            request = %activation.id,
            steps = self.steps,
            "training started"
        );
        true
    }

    fn cancel(&mut self, _ctx: &OrderContext<'_>, entity: EntityId, id: RequestId) {
        self.work.cancel(entity, id);
    }

    fn update(&mut self, ctx: &OrderContext<'_>, completions: &mut Vec<CompletionInstance>) {
        self.work.drain_due(ctx.now(), completions);
    }
}
