//! Track contention.
//!
//! A *track* is a behavior lane (movement, interaction, training…) that at
//! most one order may hold per entity. Holding is never stored: every time a
//! candidate order is evaluated, a fresh [`TrackStates`] is filled by the
//! entity's active orders first and by the candidate last. The candidate gets
//! in only if every track it declares is either free or held at a strictly
//! lower priority.

use std::fmt;

use arrayvec::ArrayVec;

use crate::config::DispatchConfig;

/// Numeric track identifier derived from a human-readable name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackId(pub u32);

impl TrackId {
    /// Hashes `name` with 32-bit FNV-1a. Stable across builds and platforms.
    pub const fn from_name(name: &str) -> Self {
        const OFFSET: u32 = 0x811C_9DC5;
        const PRIME: u32 = 0x0100_0193;

        let bytes = name.as_bytes();
        let mut hash = OFFSET;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u32;
            hash = hash.wrapping_mul(PRIME);
            i += 1;
        }
        Self(hash)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Tracks used by the built-in handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Track {
    Move,
    Interact,
    Train,
    Accrue,
}

impl Track {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Move => "Move",
            Self::Interact => "Interact",
            Self::Train => "Train",
            Self::Accrue => "Accrue",
        }
    }

    pub const fn id(self) -> TrackId {
        TrackId::from_name(self.name())
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Track> for TrackId {
    fn from(track: Track) -> Self {
        track.id()
    }
}

/// Priority an order claims a track with. Higher wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Priority(pub u8);

impl Priority {
    pub const LOW: Self = Self(1);
    pub const NORMAL: Self = Self(8);
    pub const HIGH: Self = Self(16);
}

/// Phase of a [`TrackStates`] evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flagging {
    /// Active orders are recording what they hold.
    Reserving,
    /// The candidate is declaring; nothing has rejected it so far.
    Candidate,
    /// A declared track was already held at an equal or higher priority.
    Blocked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TrackSlot {
    track: TrackId,
    priority: Priority,
    claimed_by_candidate: bool,
}

/// Per-evaluation map of track to priority.
///
/// Handlers only ever call [`TrackStates::declare`]; whether the declaration
/// reserves or competes depends on the current [`Flagging`].
#[derive(Clone, Debug)]
pub struct TrackStates {
    slots: ArrayVec<TrackSlot, { DispatchConfig::MAX_TRACKS }>,
    flagging: Flagging,
}

impl TrackStates {
    pub fn new() -> Self {
        Self {
            slots: ArrayVec::new(),
            flagging: Flagging::Reserving,
        }
    }

    pub fn flagging(&self) -> Flagging {
        self.flagging
    }

    /// Switches from reserving to evaluating the candidate.
    pub fn begin_candidate(&mut self) {
        if self.flagging == Flagging::Reserving {
            self.flagging = Flagging::Candidate;
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.flagging == Flagging::Blocked
    }

    /// True once the candidate declared everything without being rejected.
    pub fn is_accepted(&self) -> bool {
        self.flagging == Flagging::Candidate
    }

    /// Declares that the order being evaluated needs `track` at `priority`.
    ///
    /// Running out of slots blocks the evaluation: an unrecorded reservation
    /// could otherwise let a candidate through.
    pub fn declare(&mut self, track: impl Into<TrackId>, priority: Priority) {
        let track = track.into();
        match self.flagging {
            Flagging::Blocked => {}
            Flagging::Reserving => match self.slot_mut(track) {
                Some(slot) => slot.priority = slot.priority.max(priority),
                None => self.push(track, priority, false),
            },
            Flagging::Candidate => match self.slot_mut(track) {
                Some(slot) if slot.claimed_by_candidate => {
                    slot.priority = slot.priority.max(priority);
                }
                Some(slot) if slot.priority >= priority => {
                    self.flagging = Flagging::Blocked;
                }
                Some(slot) => {
                    slot.priority = priority;
                    slot.claimed_by_candidate = true;
                }
                None => self.push(track, priority, true),
            },
        }
    }

    /// Priority currently recorded for `track`.
    pub fn priority(&self, track: impl Into<TrackId>) -> Option<Priority> {
        let track = track.into();
        self.slots
            .iter()
            .find(|slot| slot.track == track)
            .map(|slot| slot.priority)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TrackId, Priority)> + '_ {
        self.slots.iter().map(|slot| (slot.track, slot.priority))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot_mut(&mut self, track: TrackId) -> Option<&mut TrackSlot> {
        self.slots.iter_mut().find(|slot| slot.track == track)
    }

    fn push(&mut self, track: TrackId, priority: Priority, claimed_by_candidate: bool) {
        let slot = TrackSlot {
            track,
            priority,
            claimed_by_candidate,
        };
        if self.slots.try_push(slot).is_err() {
            self.flagging = Flagging::Blocked;
        }
    }
}

impl Default for TrackStates {
    fn default() -> Self {
        Self::new()
    }
}
