use orders_core::{Tick, TimeOracle};

/// Fixed-step simulation clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimClock {
    now: Tick,
    tick_size: u64,
}

impl SimClock {
    pub fn new(tick_size: u64) -> Self {
        Self {
            now: Tick::ZERO,
            tick_size,
        }
    }

    /// Moves time forward by one step and returns the new time.
    pub fn advance(&mut self) -> Tick {
        self.now = self.now + self.tick_size;
        self.now
    }
}

impl TimeOracle for SimClock {
    fn now(&self) -> Tick {
        self.now
    }

    fn tick_size(&self) -> u64 {
        self.tick_size
    }
}
