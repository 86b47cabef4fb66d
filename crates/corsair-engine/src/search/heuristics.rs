//! Killer moves and the history heuristic for move ordering.

use crate::search::negamax::MAX_PLY;

/// Killer moves kept per depth.
pub const KILLERS_PER_DEPTH: usize = 2;

/// Moves that caused a beta cutoff, remembered per remaining depth.
///
/// Each depth holds at most [`KILLERS_PER_DEPTH`] distinct moves, newest
/// first; inserting into a full list evicts the oldest.
#[derive(Debug, Clone)]
pub struct KillerTable<M> {
    slots: Vec<Vec<M>>,
}

impl<M: Clone + PartialEq> KillerTable<M> {
    /// Create an empty killer table.
    pub fn new() -> Self {
        Self {
            slots: vec![Vec::with_capacity(KILLERS_PER_DEPTH); MAX_PLY],
        }
    }

    /// Record a cutoff move at `depth`. A move already listed is left in place.
    pub fn store(&mut self, depth: i32, mv: M) {
        let Some(slot) = self.slot_mut(depth) else {
            return;
        };
        if slot.contains(&mv) {
            return;
        }
        slot.insert(0, mv);
        slot.truncate(KILLERS_PER_DEPTH);
    }

    /// Killers at `depth`, newest first.
    pub fn killers(&self, depth: i32) -> &[M] {
        usize::try_from(depth)
            .ok()
            .and_then(|d| self.slots.get(d))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `mv` is a killer at `depth`.
    pub fn is_killer(&self, depth: i32, mv: &M) -> bool {
        self.killers(depth).contains(mv)
    }

    /// Forget every killer.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.clear();
        }
    }

    /// Whether no killer is recorded at any depth.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Vec::is_empty)
    }

    fn slot_mut(&mut self, depth: i32) -> Option<&mut Vec<M>> {
        usize::try_from(depth)
            .ok()
            .and_then(|d| self.slots.get_mut(d))
    }
}

impl<M: Clone + PartialEq> Default for KillerTable<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cutoff counters indexed by `(from, to)`.
///
/// A cutoff at remaining depth `d` adds `2^d`, saturating. Counters only
/// grow until [`HistoryTable::clear`].
#[derive(Debug, Clone)]
pub struct HistoryTable {
    squares: usize,
    table: Vec<u64>,
}

impl HistoryTable {
    /// Zeroed table for a game with `squares` from/to indices.
    pub fn new(squares: usize) -> Self {
        Self {
            squares,
            table: vec![0; squares * squares],
        }
    }

    /// Reward the move `(from, to)` for a cutoff at `depth`.
    pub fn reward(&mut self, (from, to): (usize, usize), depth: i32) {
        let bonus = 1u64 << depth.clamp(0, 62);
        if let Some(entry) = self.table.get_mut(from * self.squares + to) {
            *entry = entry.saturating_add(bonus);
        }
    }

    /// Counter for `(from, to)`.
    pub fn score(&self, (from, to): (usize, usize)) -> u64 {
        self.table
            .get(from * self.squares + to)
            .copied()
            .unwrap_or(0)
    }

    /// Zero every counter.
    pub fn clear(&mut self) {
        self.table.fill(0);
    }

    /// Whether every counter is zero.
    pub fn is_empty(&self) -> bool {
        self.table.iter().all(|&c| c == 0)
    }
}
