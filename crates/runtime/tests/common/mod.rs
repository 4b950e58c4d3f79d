//! Shared helpers for runtime integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use orders_core::{
    ActionRequest, ActionType, CompletionInstance, CompletionStatus, EntityId, HandlerId, Position,
    RequestId,
};
use runtime::Simulation;

pub type Log = Rc<RefCell<Vec<(HandlerId, CompletionInstance)>>>;

/// Records every completion the simulation reports.
pub fn record(simulation: &mut Simulation) -> Log {
    let log: Log = Rc::default();
    let sink = Rc::clone(&log);
    simulation.on_completion(move |handler, completion| {
        sink.borrow_mut().push((handler, *completion));
    });
    log
}

pub fn move_to(simulation: &Simulation, x: i32, y: i32) -> ActionRequest {
    ActionRequest::new(ActionType::MOVE, simulation.now()).with_target_location(Position::new(x, y))
}

pub fn gather(simulation: &Simulation, target: EntityId) -> ActionRequest {
    ActionRequest::new(ActionType::GATHER, simulation.now()).with_target_entity(target)
}

pub fn train(simulation: &Simulation) -> ActionRequest {
    ActionRequest::new(ActionType::TRAIN, simulation.now())
}

pub fn accrue(simulation: &Simulation) -> ActionRequest {
    ActionRequest::new(ActionType::ACCRUE, simulation.now())
}

/// Statuses reported for orders sharing the pattern of `id`.
pub fn statuses_for(log: &Log, id: RequestId) -> Vec<CompletionStatus> {
    log.borrow()
        .iter()
        .filter(|(_, completion)| completion.id.matches_pattern(id))
        .map(|(_, completion)| completion.status)
        .collect()
}

pub fn active_ids(simulation: &Simulation, entity: EntityId) -> Vec<RequestId> {
    simulation
        .orders()
        .active_orders_for(entity)
        .map(|activation| activation.id)
        .collect()
}
