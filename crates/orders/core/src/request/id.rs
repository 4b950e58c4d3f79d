//! Compact identifiers for handlers and requests.

use std::fmt;

/// Registry index of an order handler.
///
/// `0` means "no handler assigned yet". Handlers registered with the dispatch
/// receive ids starting at [`HandlerId::FIRST`]; `255` is never handed out so
/// that [`RequestId::ALL`] cannot collide with a live order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HandlerId(pub u8);

impl HandlerId {
    pub const UNASSIGNED: Self = Self(0);
    pub const FIRST: Self = Self(1);
    pub const LAST: Self = Self(254);

    #[inline]
    pub const fn is_assigned(self) -> bool {
        self.0 != Self::UNASSIGNED.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 32-bit request identifier.
///
/// Layout: the high byte holds the owning [`HandlerId`] and the low 24 bits hold
/// the *pattern*, a counter shared by every per-entity order spawned from one
/// logical command. Rebinding the id to a handler never touches the pattern, so
/// sibling orders stay correlated after each of them is picked up by a
/// different handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RequestId(u32);

impl RequestId {
    pub const PATTERN_MASK: u32 = 0x00FF_FFFF;
    const ACTION_SHIFT: u32 = 24;

    /// The all-zero id. Never assigned to a queued or active order.
    pub const INVALID: Self = Self(0);

    /// Wildcard accepted by cancellation to address every order of an entity.
    pub const ALL: Self = Self(u32::MAX);

    pub const fn new(action: HandlerId, pattern: u32) -> Self {
        Self(((action.0 as u32) << Self::ACTION_SHIFT) | (pattern & Self::PATTERN_MASK))
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Handler that owns this request (high byte).
    #[inline]
    pub const fn action_id(self) -> HandlerId {
        HandlerId((self.0 >> Self::ACTION_SHIFT) as u8)
    }

    /// Correlation counter (low 24 bits).
    #[inline]
    pub const fn pattern(self) -> u32 {
        self.0 & Self::PATTERN_MASK
    }

    /// Rebinds the request to `action`, keeping the pattern.
    #[inline]
    pub const fn with_action_id(self, action: HandlerId) -> Self {
        Self(((action.0 as u32) << Self::ACTION_SHIFT) | (self.0 & Self::PATTERN_MASK))
    }

    /// True when both ids carry the same pattern, whatever handler owns them.
    #[inline]
    pub const fn matches_pattern(self, other: Self) -> bool {
        ((self.0 ^ other.0) & Self::PATTERN_MASK) == 0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }

    #[inline]
    pub const fn is_all(self) -> bool {
        self.0 == Self::ALL.0
    }

    /// Whether a cancellation filter of `self` addresses the order `other`.
    #[inline]
    pub const fn covers(self, other: Self) -> bool {
        self.is_all() || self.matches_pattern(other)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all() {
            return write!(f, "all");
        }
        write!(f, "{}:{}", self.action_id(), self.pattern())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_handler_in_high_byte() {
        let id = RequestId::new(HandlerId(3), 0x12_3456);
        assert_eq!(id.raw(), 0x0312_3456);
        assert_eq!(id.action_id(), HandlerId(3));
        assert_eq!(id.pattern(), 0x12_3456);
    }

    #[test]
    fn pattern_is_truncated_to_24_bits() {
        let id = RequestId::new(HandlerId::UNASSIGNED, 0xAB12_3456);
        assert_eq!(id.pattern(), 0x12_3456);
        assert_eq!(id.action_id(), HandlerId::UNASSIGNED);
    }

    #[test]
    fn matches_pattern_is_reflexive_and_symmetric() {
        let ids = [
            RequestId::new(HandlerId(0), 1),
            RequestId::new(HandlerId(1), 1),
            RequestId::new(HandlerId(7), 2),
            RequestId::new(HandlerId(254), 0xFF_FFFE),
        ];

        for a in ids {
            assert!(a.matches_pattern(a));
            for b in ids {
                assert_eq!(a.matches_pattern(b), b.matches_pattern(a));
            }
        }
    }

    #[test]
    fn rebinding_handler_preserves_pattern_matching() {
        let base = RequestId::new(HandlerId::UNASSIGNED, 42);
        let other = RequestId::new(HandlerId(9), 42);
        let unrelated = RequestId::new(HandlerId::UNASSIGNED, 43);

        for handler in [HandlerId(1), HandlerId(2), HandlerId::LAST] {
            let bound = base.with_action_id(handler);
            assert_eq!(bound.action_id(), handler);
            assert_eq!(bound.pattern(), base.pattern());
            assert!(bound.matches_pattern(base));
            assert!(bound.matches_pattern(other));
            assert!(!bound.matches_pattern(unrelated));
        }
    }

    #[test]
    fn wildcard_covers_everything() {
        assert!(RequestId::ALL.covers(RequestId::new(HandlerId(1), 5)));
        assert!(RequestId::ALL.covers(RequestId::new(HandlerId(0), 9)));
        assert!(!RequestId::new(HandlerId(0), 5).covers(RequestId::new(HandlerId(0), 9)));
    }

    #[test]
    fn displays_action_and_pattern() {
        assert_eq!(RequestId::new(HandlerId(1), 1).to_string(), "1:1");
        assert_eq!(RequestId::ALL.to_string(), "all");
    }
}
