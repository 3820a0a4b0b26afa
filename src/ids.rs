//! Opaque identifiers and the monotonic counters that mint them.
//!
//! Every cross-reference inside game state is one of these ids, resolved
//! through a zone index rather than a live reference (see DESIGN.md,
//! "Cyclic references"). Ids and timestamps are minted by a single
//! [`IdAllocator`] owned by the `Game`, not by global atomics, so that two
//! games in the same process never share a namespace.

use serde::{Deserialize, Serialize};

/// Player identifier, small and index-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

/// Unique object identifier, monotonically increasing within one game.
///
/// Never reused: when an object changes zones it receives a new id, mirroring
/// the rule that an object's identity does not survive a zone change except
/// where the game rules say otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

/// Opaque card-definition identifier, referencing the external card database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CardId(pub u32);

/// Monotonic timestamp. Drives layer ordering (I4) and is assigned at zone
/// entry or continuous-effect installation; strictly increasing across the
/// whole game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(pub u64);

impl PlayerId {
    pub fn from_index(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ObjectId {
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }
}

impl CardId {
    pub fn from_raw(id: u32) -> Self {
        Self(id)
    }
}

/// Per-game source of truth for object ids and timestamps.
///
/// Kept as a plain struct (not global atomics) so that a tournament harness
/// running many games in parallel worker processes never has to reason about
/// cross-game id collisions or contention (§5).
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next_object: u64,
    next_timestamp: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            next_object: 1,
            next_timestamp: 1,
        }
    }

    /// Mints a fresh, never-before-seen object id.
    pub fn next_object_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_object);
        self.next_object += 1;
        id
    }

    /// Mints a strictly-greater-than-all-previous timestamp (I4).
    pub fn next_timestamp(&mut self) -> Timestamp {
        let ts = Timestamp(self.next_timestamp);
        self.next_timestamp += 1;
        ts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_ids_are_unique_and_increasing() {
        let mut alloc = IdAllocator::new();
        let a = alloc.next_object_id();
        let b = alloc.next_object_id();
        assert!(b.0 > a.0);
    }

    #[test]
    fn timestamps_are_strictly_monotonic() {
        let mut alloc = IdAllocator::new();
        let mut last = alloc.next_timestamp();
        for _ in 0..100 {
            let next = alloc.next_timestamp();
            assert!(next > last);
            last = next;
        }
    }

    #[test]
    fn two_allocators_do_not_share_a_namespace() {
        let mut a = IdAllocator::new();
        let mut b = IdAllocator::new();
        assert_eq!(a.next_object_id(), b.next_object_id());
    }
}
