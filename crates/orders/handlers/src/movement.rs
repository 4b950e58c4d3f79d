//! Movement orders backed by an external navigation service.

use tracing::{debug, warn};

use orders_core::{
    ActionActivation, ActionRequest, ActionType, CompletionInstance, EntityId, OrderContext,
    OrderHandler, OrderInstance, Position, Priority, RequestId, Track, TrackStates,
};

use crate::formation::spiral_offset;

/// How a navigation attempt ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavigationOutcome {
    pub entity: EntityId,
    pub id: RequestId,
    /// False when the path was lost or the goal became unreachable.
    pub arrived: bool,
}

/// Path-following service the move handler delegates to.
pub trait Navigation {
    /// Starts steering `entity` to within `range` tiles of `goal`.
    /// Returns false when no path can be started right now.
    fn begin_navigation(&mut self, entity: EntityId, id: RequestId, goal: Position, range: u32)
    -> bool;

    /// Stops the navigation started for `id`. Unknown ids are ignored.
    fn cancel(&mut self, entity: EntityId, id: RequestId);

    /// Moves every finished navigation into `out`.
    fn drain_completed(&mut self, out: &mut Vec<NavigationOutcome>);
}

/// Runs `MOVE` orders on the movement track.
///
/// Members of a group order spread around the shared goal using
/// [`spiral_offset`] so they do not all queue for the same tile.
pub struct MoveHandler<N> {
    navigation: N,
    running: Vec<(EntityId, RequestId)>,
    outcomes: Vec<NavigationOutcome>,
}

impl<N: Navigation> MoveHandler<N> {
    pub const NAME: &'static str = "move";

    pub fn new(navigation: N) -> Self {
        Self {
            navigation,
            running: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    pub fn navigation(&self) -> &N {
        &self.navigation
    }

    pub fn is_running(&self, entity: EntityId, id: RequestId) -> bool {
        self.running.contains(&(entity, id))
    }

    /// Goal tile and stopping range for `request`.
    ///
    /// Chasing an entity stops next to it; walking to a location stops on it.
    fn destination(ctx: &OrderContext<'_>, request: &ActionRequest) -> Option<(Position, u32)> {
        if let Some(target) = request.target_entity {
            if let Some(position) = ctx.env().entities().position(target) {
                return Some((position, 1));
            }
        }
        request.target_location.map(|location| (location, 0))
    }
}

impl<N: Navigation> OrderHandler for MoveHandler<N> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn score(&self, _ctx: &OrderContext<'_>, _entity: EntityId, order: &OrderInstance) -> f32 {
        let request = &order.request;
        let has_goal = request.target_entity.is_some() || request.target_location.is_some();
        if request.kind.contains(ActionType::MOVE) && has_goal {
            1.0
        } else {
            0.0
        }
    }

    fn track_requirements(&self, _entity: EntityId, _request: &ActionRequest, tracks: &mut TrackStates) {
        tracks.declare(Track::Move, Priority::NORMAL);
    }

    fn begin(&mut self, ctx: &OrderContext<'_>, entity: EntityId, activation: &ActionActivation) -> bool {
        let Some((mut goal, range)) = Self::destination(ctx, &activation.request) else {
            warn!(
                target: "orders::handlers",
                entity = %entity,
                request = %activation.id,
                "move order has no reachable goal"
            );
            return false;
        };

        let group = ctx.group(entity, activation.id);
        if group.count > 1 {
            goal = goal + spiral_offset(group.index);
        }

        if !self.navigation.begin_navigation(entity, activation.id, goal, range) {
            return false;
        }
        debug!(
            target: "orders::handlers",
            entity = %entity,
            request = %activation.id,
            goal = %goal,
            range,
            "navigation started"
        );
        self.running.push((entity, activation.id));
        true
    }

    fn cancel(&mut self, _ctx: &OrderContext<'_>, entity: EntityId, id: RequestId) {
        if let Some(index) = self.running.iter().position(|&running| running == (entity, id)) {
            self.running.remove(index);
            self.navigation.cancel(entity, id);
        }
    }

    fn update(&mut self, _ctx: &OrderContext<'_>, completions: &mut Vec<CompletionInstance>) {
        self.navigation.drain_completed(&mut self.outcomes);
        for outcome in self.outcomes.drain(..) {
            let key = (outcome.entity, outcome.id);
            let Some(index) = self.running.iter().position(|&running| running == key) else {
                continue;
            };
            self.running.remove(index);
            completions.push(if outcome.arrived {
                CompletionInstance::completed(outcome.entity, outcome.id)
            } else {
                CompletionInstance::failed(outcome.entity, outcome.id)
            });
        }
    }
}
