//! Zobrist keys for the connect-five grid.

use crate::grid::GRID_CELLS;

/// Key for each (stone colour, cell). Indexed by `[Side::index()][Cell::index()]`.
pub(crate) static STONE_CELL: [[u64; GRID_CELLS]; 2] = {
    let mut table = [[0u64; GRID_CELLS]; 2];
    let mut state = SEED;
    let mut side = 0;
    while side < 2 {
        let mut cell = 0;
        while cell < GRID_CELLS {
            let (val, next) = xorshift64(state);
            table[side][cell] = val;
            state = next;
            cell += 1;
        }
        side += 1;
    }
    table
};

/// Key XORed in while the second player is to move.
pub(crate) static SECOND_TO_MOVE: u64 = {
    let mut state = SEED;
    // Skip the 2 * 225 stone keys.
    let mut i = 0;
    while i < 2 * GRID_CELLS {
        let (_, next) = xorshift64(state);
        state = next;
        i += 1;
    }
    let (val, _) = xorshift64(state);
    val
};

const SEED: u64 = 0x4749_5244_4b45_5953; // "GIRDKEYS"

/// Xorshift64 step. Returns (value, next_state).
const fn xorshift64(mut state: u64) -> (u64, u64) {
    state ^= state << 13;
    state ^= state >> 7;
    state ^= state << 17;
    (state, state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_nonzero_and_unique() {
        let mut keys: Vec<u64> = STONE_CELL.iter().flatten().copied().collect();
        keys.push(SECOND_TO_MOVE);
        assert!(keys.iter().all(|&k| k != 0));

        let count = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), count, "some grid keys collide");
    }
}
