use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

use orders_core::{
    ActionActivation, ActionRequest, ActionType, CompletionInstance, EntityId, OrderContext,
    OrderHandler, OrderInstance, Priority, RequestId, Track, TrackStates,
};

/// Per-entity balances credited by accrual orders.
///
/// Cloning yields another handle to the same balances, so the simulation can
/// read what the handler (owned by the order system) has credited.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    balances: Rc<RefCell<BTreeMap<EntityId, u64>>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, entity: EntityId) -> u64 {
        self.balances.borrow().get(&entity).copied().unwrap_or(0)
    }

    pub fn credit(&self, entity: EntityId, amount: u64) {
        let mut balances = self.balances.borrow_mut();
        let balance = balances.entry(entity).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Balances in entity order.
    pub fn snapshot(&self) -> Vec<(EntityId, u64)> {
        self.balances
            .borrow()
            .iter()
            .map(|(entity, balance)| (*entity, *balance))
            .collect()
    }
}

#[derive(Clone, Copy, Debug)]
struct Accrual {
    entity: EntityId,
    id: RequestId,
    collected: u64,
}

/// Runs `ACCRUE` orders: credits a fixed amount every step until the quota is
/// collected.
pub struct AccrualHandler {
    rate: u64,
    quota: u64,
    ledger: Ledger,
    running: Vec<Accrual>,
}

impl AccrualHandler {
    pub const NAME: &'static str = "accrual";

    pub fn new(rate: u64, quota: u64, ledger: Ledger) -> Self {
        Self {
            rate,
            quota,
            ledger,
            running: Vec::new(),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}

impl OrderHandler for AccrualHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn score(&self, _ctx: &OrderContext<'_>, _entity: EntityId, order: &OrderInstance) -> f32 {
        if order.request.kind.contains(ActionType::ACCRUE) {
            1.0
        } else {
            0.0
        }
    }

    fn track_requirements(&self, _entity: EntityId, _request: &ActionRequest, tracks: &mut TrackStates) {
        tracks.declare(Track::Accrue, Priority::NORMAL);
    }

    fn begin(&mut self, _ctx: &OrderContext<'_>, entity: EntityId, activation: &ActionActivation) -> bool {
        // A zero rate would never reach the quota.
        if self.rate == 0 && self.quota > 0 {
            return false;
        }
        self.running.push(Accrual {
            entity,
            id: activation.id,
            collected: 0,
        });
        true
    }

    fn cancel(&mut self, _ctx: &OrderContext<'_>, entity: EntityId, id: RequestId) {
        self.running
            .retain(|accrual| !(accrual.entity == entity && accrual.id == id));
    }

    fn update(&mut self, _ctx: &OrderContext<'_>, completions: &mut Vec<CompletionInstance>) {
        let (rate, quota) = (self.rate, self.quota);
        let ledger = &self.ledger;
        self.running.retain_mut(|accrual| {
            let amount = rate.min(quota.saturating_sub(accrual.collected));
            accrual.collected += amount;
            ledger.credit(accrual.entity, amount);
            if accrual.collected < quota {
                return true;
            }
            debug!(
                target: "orders::handlers",
                entity = %accrual.entity,
                request = %accrual.id,
                collected = accrual.collected,
                "accrual quota reached"
            );
            completions.push(CompletionInstance::completed(accrual.entity, accrual.id));
            false
        });
    }
}
