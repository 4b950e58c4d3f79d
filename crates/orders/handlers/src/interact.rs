use tracing::{debug, warn};

use orders_core::{
    ActionActivation, ActionRequest, ActionType, CompletionInstance, EntityId, OrderContext,
    OrderHandler, OrderInstance, Priority, RequestId, Track, TrackStates,
};

use crate::timed::TimedWork;

/// Runs attack, gather and build orders against a target entity.
///
/// Besides the interaction track the handler holds the movement track at low
/// priority: work cannot start while the unit is walking, but an explicit
/// move order still takes the lane.
pub struct InteractHandler {
    steps: u64,
    work: TimedWork,
}

impl InteractHandler {
    pub const NAME: &'static str = "interact";

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

impl OrderHandler for InteractHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn score(&self, _ctx: &OrderContext<'_>, _entity: EntityId, order: &OrderInstance) -> f32 {
        let request = &order.request;
        if request.kind.intersects(ActionType::INTERACT) && request.target_entity.is_some() {
            1.0
        } else {
            0.0
        }
    }

    fn track_requirements(&self, _entity: EntityId, _request: &ActionRequest, tracks: &mut TrackStates) {
        tracks.declare(Track::Interact, Priority::NORMAL);
        tracks.declare(Track::Move, Priority::LOW);
    }

    fn begin(&mut self, ctx: &OrderContext<'_>, entity: EntityId, activation: &ActionActivation) -> bool {
        let target = activation
            .request
            .target_entity
            .filter(|&target| ctx.env().entities().contains(target));
        let Some(target) = target else {
            warn!(
                target: "orders::handlers",
                entity = %entity,
                request = %activation.id,
                "interaction target is gone"
            );
            return false;
        };

        self.work
            .start(ctx, entity, activation.id, Some(target), self.steps);
        debug!(
            target: "orders::handlers",
            entity = %entity,
            request = %activation.id,
            target = %target,
            "interaction started"
        );
        true
    }

    fn cancel(&mut self, _ctx: &OrderContext<'_>, entity: EntityId, id: RequestId) {
        self.work.cancel(entity, id);
    }

    fn update(&mut self, ctx: &OrderContext<'_>, completions: &mut Vec<CompletionInstance>) {
        let entities = ctx.env().entities();
        self.work.fail_where(
            |job| job.target.is_some_and(|target| !entities.contains(target)),
            completions,
        );
        self.work.drain_due(ctx.now(), completions);
    }
}
