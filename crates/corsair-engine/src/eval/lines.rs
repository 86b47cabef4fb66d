//! Line-window evaluation for the connect-five grid.
//!
//! Every run of [`WIN_LENGTH`] cells in each of the four directions is a
//! window. A window holding stones of only one colour is still open for that
//! colour and scores by how many stones it holds; mixed windows are dead.
//! Black-positive.

use corsair_core::{Cell, GRID_SIZE, Grid, Side, WIN_LENGTH};

use crate::eval::Evaluator;
use crate::search::negamax::MATE_THRESHOLD;

/// Value of an open window by stone count.
const WINDOW_WEIGHT: [i32; WIN_LENGTH + 1] = [0, 1, 12, 150, 2_000, 50_000];

const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Static evaluator for [`Grid`] positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridEvaluator;

impl GridEvaluator {
    /// Sum of open-window weights, Black minus White.
    pub fn windows(grid: &Grid) -> i32 {
        let mut score = 0;
        for row in 0..GRID_SIZE as isize {
            for col in 0..GRID_SIZE as isize {
                for &(dr, dc) in &DIRECTIONS {
                    if let Some(counts) = window_counts(grid, row, col, dr, dc) {
                        score += match counts {
                            (black, 0) => WINDOW_WEIGHT[black],
                            (0, white) => -WINDOW_WEIGHT[white],
                            _ => 0,
                        };
                    }
                }
            }
        }
        score
    }

    /// Centre-proximity bonus per stone, Black minus White.
    pub fn centrality(grid: &Grid) -> i32 {
        let mid = GRID_SIZE / 2;
        (0..GRID_SIZE * GRID_SIZE)
            .filter_map(Cell::from_index)
            .filter_map(|cell| {
                let side = grid.stone_at(cell)?;
                let distance = cell.row().abs_diff(mid) + cell.col().abs_diff(mid);
                Some((GRID_SIZE - distance) as i32 * side.sign())
            })
            .sum()
    }
}

/// `(black, white)` stone counts of the window starting at `(row, col)`,
/// or `None` if it runs off the board.
fn window_counts(grid: &Grid, row: isize, col: isize, dr: isize, dc: isize) -> Option<(usize, usize)> {
    let mut black = 0;
    let mut white = 0;
    for step in 0..WIN_LENGTH as isize {
        let r = usize::try_from(row + dr * step).ok()?;
        let c = usize::try_from(col + dc * step).ok()?;
        let cell = Cell::new(r, c)?;
        match grid.stone_at(cell) {
            Some(Side::First) => black += 1,
            Some(Side::Second) => white += 1,
            None => {}
        }
    }
    Some((black, white))
}

impl Evaluator<Grid> for GridEvaluator {
    fn evaluate(&self, grid: &Grid) -> i32 {
        let score = Self::windows(grid) + Self::centrality(grid);
        // Static scores never read as a proven win.
        score.clamp(-(MATE_THRESHOLD - 1), MATE_THRESHOLD - 1)
    }

    fn piece_value(&self, _piece: Side) -> i32 {
        0
    }
}
