/// Tunables of the built-in handlers.
///
/// Durations are expressed in simulation steps and converted to [`Tick`]s
/// through the time oracle's tick size when work begins.
///
/// [`Tick`]: orders_core::Tick
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HandlersConfig {
    /// Steps a training order runs before completing.
    pub train_steps: u64,
    /// Steps an attack, gather or build order runs before completing.
    pub interact_steps: u64,
    /// Amount credited to the ledger per step of accrual.
    pub accrual_rate: u64,
    /// Amount an accrual order collects before completing.
    pub accrual_quota: u64,
}

impl HandlersConfig {
    pub const DEFAULT_TRAIN_STEPS: u64 = 5;
    pub const DEFAULT_INTERACT_STEPS: u64 = 3;
    pub const DEFAULT_ACCRUAL_RATE: u64 = 1;
    pub const DEFAULT_ACCRUAL_QUOTA: u64 = 10;

    pub fn new() -> Self {
        Self {
            train_steps: Self::DEFAULT_TRAIN_STEPS,
            interact_steps: Self::DEFAULT_INTERACT_STEPS,
            accrual_rate: Self::DEFAULT_ACCRUAL_RATE,
            accrual_quota: Self::DEFAULT_ACCRUAL_QUOTA,
        }
    }
}

impl Default for HandlersConfig {
    fn default() -> Self {
        Self::new()
    }
}
