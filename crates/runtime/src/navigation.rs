//! Straight-line grid navigation.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace};

use order_handlers::{Navigation, NavigationOutcome};
use orders_core::{EntityId, EntityOracle, Position, RequestId};

use crate::store::EntityStore;

#[derive(Clone, Copy, Debug)]
struct Journey {
    entity: EntityId,
    id: RequestId,
    goal: Position,
    range: u32,
}

#[derive(Debug, Default)]
struct State {
    journeys: Vec<Journey>,
    finished: Vec<NavigationOutcome>,
}

/// Moves entities one tile per step (diagonals allowed) towards their goal.
///
/// Clones share state: the move handler holds one handle and the simulation
/// holds another to advance journeys against the entity store.
#[derive(Clone, Debug, Default)]
pub struct GridNavigation {
    state: Rc<RefCell<State>>,
}

impl GridNavigation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Journeys in progress.
    pub fn len(&self) -> usize {
        self.state.borrow().journeys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().journeys.is_empty()
    }

    /// Advances every journey by one step.
    ///
    /// Journeys of vanished entities end as failures.
    pub fn advance(&self, store: &mut EntityStore) {
        let mut state = self.state.borrow_mut();
        let State { journeys, finished } = &mut *state;
        journeys.retain(|journey| {
            let Some(position) = store.position(journey.entity) else {
                finished.push(NavigationOutcome {
                    entity: journey.entity,
                    id: journey.id,
                    arrived: false,
                });
                return false;
            };

            let next = if position.distance(journey.goal) > journey.range {
                let step = step_towards(position, journey.goal);
                if store.set_position(journey.entity, step).is_err() {
                    return true;
                }
                trace!(target: "runtime::navigation", entity = %journey.entity, position = %step, "stepped");
                step
            } else {
                position
            };

            if next.distance(journey.goal) > journey.range {
                return true;
            }
            debug!(target: "runtime::navigation", entity = %journey.entity, goal = %journey.goal, "arrived");
            finished.push(NavigationOutcome {
                entity: journey.entity,
                id: journey.id,
                arrived: true,
            });
            false
        });
    }
}

fn step_towards(from: Position, to: Position) -> Position {
    Position::new(from.x + (to.x - from.x).signum(), from.y + (to.y - from.y).signum())
}

impl Navigation for GridNavigation {
    fn begin_navigation(&mut self, entity: EntityId, id: RequestId, goal: Position, range: u32) -> bool {
        self.state.borrow_mut().journeys.push(Journey {
            entity,
            id,
            goal,
            range,
        });
        true
    }

    fn cancel(&mut self, entity: EntityId, id: RequestId) {
        self.state
            .borrow_mut()
            .journeys
            .retain(|journey| !(journey.entity == entity && journey.id == id));
    }

    fn drain_completed(&mut self, out: &mut Vec<NavigationOutcome>) {
        out.append(&mut self.state.borrow_mut().finished);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orders_core::HandlerId;

    #[test]
    fn walks_diagonally_then_straight() {
        let mut store = EntityStore::new();
        let entity = store.spawn(Position::ORIGIN).unwrap();
        let mut navigation = GridNavigation::new();
        let id = RequestId::new(HandlerId(1), 1);
        navigation.begin_navigation(entity, id, Position::new(3, 1), 0);

        let mut path = Vec::new();
        for _ in 0..3 {
            navigation.advance(&mut store);
            path.extend(store.get(entity));
        }
        assert_eq!(path, vec![Position::new(1, 1), Position::new(2, 1), Position::new(3, 1)]);

        let mut done = Vec::new();
        navigation.drain_completed(&mut done);
        assert_eq!(done, vec![NavigationOutcome { entity, id, arrived: true }]);
        assert!(navigation.is_empty());
    }

    #[test]
    fn vanished_entity_fails_its_journey() {
        let mut store = EntityStore::new();
        let entity = store.spawn(Position::ORIGIN).unwrap();
        let mut navigation = GridNavigation::new();
        let id = RequestId::new(HandlerId(1), 1);
        navigation.begin_navigation(entity, id, Position::new(5, 5), 0);
        store.destroy(entity).unwrap();

        navigation.advance(&mut store);
        let mut done = Vec::new();
        navigation.drain_completed(&mut done);
        assert_eq!(done, vec![NavigationOutcome { entity, id, arrived: false }]);
    }
}
