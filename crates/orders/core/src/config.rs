/// Dispatch configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DispatchConfig {
    /// Minimum number of free arena slots before the pending queue compacts.
    /// Compaction also requires free slots to outnumber live ones.
    pub compaction_min_free: usize,

    /// Drop a queued order after this many consecutive `begin` refusals.
    /// `None` keeps retrying every tick for as long as the order is queued.
    pub max_begin_failures: Option<u16>,
}

impl DispatchConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of distinct tracks one evaluation can record.
    pub const MAX_TRACKS: usize = 16;
    /// Maximum number of registered handlers (ids 1..=254).
    pub const MAX_HANDLERS: usize = 254;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_COMPACTION_MIN_FREE: usize = 64;

    pub fn new() -> Self {
        Self {
            compaction_min_free: Self::DEFAULT_COMPACTION_MIN_FREE,
            max_begin_failures: None,
        }
    }

    pub fn with_max_begin_failures(mut self, limit: u16) -> Self {
        self.max_begin_failures = Some(limit);
        self
    }

    pub fn with_compaction_min_free(mut self, slots: usize) -> Self {
        self.compaction_min_free = slots;
        self
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self::new()
    }
}
