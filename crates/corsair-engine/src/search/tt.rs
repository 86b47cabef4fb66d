//! Fixed-capacity transposition table.
//!
//! Slots are allocated up front (a power of two sized from the configured
//! megabytes) and indexed by the low bits of the position fingerprint. Each
//! slot keeps the full 64-bit key, so a probe only hits when the key matches.
//!
//! Replacement is depth-preferred: a store overwrites a slot that is empty,
//! holds the same position, or holds a result searched no deeper than the
//! new one.

use crate::config::MAX_HASH_MB;
use crate::search::negamax::MATE_THRESHOLD;

/// How a stored score relates to the true value of the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The score is exact (it fell strictly inside the search window).
    Exact,
    /// The score is a lower bound (the node failed high).
    LowerBound,
    /// The score is an upper bound (the node failed low).
    UpperBound,
}

impl Bound {
    /// Classify `best` against the window the node was searched with.
    pub fn classify(best: i32, original_alpha: i32, beta: i32) -> Bound {
        if best <= original_alpha {
            Bound::UpperBound
        } else if best >= beta {
            Bound::LowerBound
        } else {
            Bound::Exact
        }
    }
}

/// Convert a search score to TT-storable form.
///
/// Mate scores are `MATE_SCORE - ply` from the root; stored scores count
/// the distance from the node instead, so they stay valid on any path.
pub fn score_to_tt(score: i32, ply: usize) -> i32 {
    let ply = ply as i32;
    if score > MATE_THRESHOLD {
        score + ply
    } else if score < -MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

/// Reverse [`score_to_tt`] at the probing node's ply.
pub fn score_from_tt(score: i32, ply: usize) -> i32 {
    let ply = ply as i32;
    if score > MATE_THRESHOLD {
        score - ply
    } else if score < -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

/// A successful probe.
#[derive(Debug, Clone, PartialEq)]
pub struct TtHit<M> {
    /// Remaining depth the entry was searched to.
    pub depth: i32,
    /// Score, already adjusted back to the probing ply.
    pub score: i32,
    /// Relation of `score` to the true value.
    pub bound: Bound,
    /// Best (or refuting) move found for the position.
    pub best_move: Option<M>,
}

#[derive(Debug, Clone)]
struct Slot<M> {
    key: u64,
    depth: i32,
    score: i32,
    bound: Bound,
    best_move: Option<M>,
}

/// Transposition table keyed by position fingerprint.
pub struct TranspositionTable<M> {
    slots: Box<[Option<Slot<M>>]>,
    mask: usize,
    occupied: usize,
}

impl<M: Clone> TranspositionTable<M> {
    /// Create a table of roughly `mb` megabytes, clamped to
    /// `1..=MAX_HASH_MB`.
    ///
    /// The slot count is rounded down to a power of two, at least one.
    pub fn new(mb: usize) -> Self {
        let num_slots = slot_count(mb, std::mem::size_of::<Option<Slot<M>>>());

        let slots: Box<[Option<Slot<M>>]> = (0..num_slots).map(|_| None).collect();

        Self {
            slots,
            mask: num_slots - 1,
            occupied: 0,
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of filled slots.
    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Empty every slot, keeping the allocation.
    pub fn clear(&mut self) {
        if self.occupied == 0 {
            return;
        }
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.occupied = 0;
    }

    /// Look up `key`, adjusting mate scores to `ply`.
    pub fn probe(&self, key: u64, ply: usize) -> Option<TtHit<M>> {
        let slot = self.slots[self.index(key)].as_ref()?;
        if slot.key != key {
            return None;
        }
        Some(TtHit {
            depth: slot.depth,
            score: score_from_tt(slot.score, ply),
            bound: slot.bound,
            best_move: slot.best_move.clone(),
        })
    }

    /// Record a search result for `key`.
    pub fn store(
        &mut self,
        key: u64,
        depth: i32,
        score: i32,
        bound: Bound,
        best_move: Option<M>,
        ply: usize,
    ) {
        let index = self.index(key);
        let slot = &mut self.slots[index];

        let replace = match slot {
            None => true,
            Some(existing) => existing.key == key || depth >= existing.depth,
        };
        if !replace {
            return;
        }

        if slot.is_none() {
            self.occupied += 1;
        }
        *slot = Some(Slot {
            key,
            depth,
            score: score_to_tt(score, ply),
            bound,
            best_move,
        });
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key as usize) & self.mask
    }
}

impl<M> std::fmt::Debug for TranspositionTable<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("slots", &self.slots.len())
            .field("occupied", &self.occupied)
            .finish()
    }
}

/// Largest power of two number of `slot_size`-byte slots that fits in `mb`
/// megabytes.
fn slot_count(mb: usize, slot_size: usize) -> usize {
    let bytes = mb.clamp(1, MAX_HASH_MB).saturating_mul(1024 * 1024);
    let fits = bytes / slot_size.max(1);
    if fits == 0 {
        return 1;
    }
    1 << (usize::BITS - 1 - fits.leading_zeros())
}
