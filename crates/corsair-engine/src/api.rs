//! Boundary operations: encoded position in, serialisable report out.
//!
//! Scores at this boundary are absolute: White-positive for chess,
//! Black-positive for the grid. Malformed input never reaches the search;
//! it yields an empty report and a warning.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use corsair_core::{Cell, ChessPosition, Game, Grid};

use crate::config::SearchLimits;
use crate::eval::{ChessEvaluator, Evaluator, GridEvaluator};
use crate::search::negamax::MATE_SCORE;
use crate::search::{SearchResult, Searcher};

/// Result of [`get_best_move`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestMoveReport {
    /// Coordinate move (`e2e4`, `e7e8q`), or `None` without a legal move.
    #[serde(rename = "move")]
    pub best_move: Option<String>,
    /// White-positive score.
    pub eval_score: i32,
    pub depth_reached: i32,
    /// `1` the side to move mates, `-1` it is mated, `0` no mate seen,
    /// `None` when nothing was searched.
    pub mate_indicator: Option<i32>,
}

impl BestMoveReport {
    fn none() -> Self {
        Self {
            best_move: None,
            eval_score: 0,
            depth_reached: 0,
            mate_indicator: None,
        }
    }
}

/// Result of [`get_best_cell`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellReport {
    pub row: Option<usize>,
    pub col: Option<usize>,
    /// Black-positive score.
    pub eval_score: i32,
    pub depth_reached: i32,
    /// Same convention as [`BestMoveReport::mate_indicator`].
    pub mate_indicator: Option<i32>,
}

impl CellReport {
    fn none() -> Self {
        Self {
            row: None,
            col: None,
            eval_score: 0,
            depth_reached: 0,
            mate_indicator: None,
        }
    }
}

/// Best move for a FEN position within `time_budget_ms`.
pub fn get_best_move(fen: &str, time_budget_ms: u64) -> BestMoveReport {
    search_chess(fen, SearchLimits::millis(time_budget_ms))
}

/// [`get_best_move`] with an additional depth cap.
pub fn get_best_move_with_depth(fen: &str, time_budget_ms: u64, max_depth: i32) -> BestMoveReport {
    search_chess(fen, SearchLimits::millis(time_budget_ms).with_depth(max_depth))
}

fn search_chess(fen: &str, limits: SearchLimits) -> BestMoveReport {
    let mut pos = match ChessPosition::from_fen(fen) {
        Ok(pos) => pos,
        Err(e) => {
            warn!(error = %e, "rejected position");
            return BestMoveReport::none();
        }
    };

    let side = pos.side_to_move();
    let mut searcher = Searcher::default();
    let result = searcher.search(&mut pos, &ChessEvaluator, &limits, |_, _, _, _| {});

    let report = BestMoveReport {
        best_move: result.best_move.as_ref().map(ToString::to_string),
        eval_score: result.score * side.sign(),
        depth_reached: result.depth,
        mate_indicator: result.mate_in(),
    };
    info!(
        best = ?report.best_move,
        score = report.eval_score,
        depth = report.depth_reached,
        nodes = result.nodes,
        "best move"
    );
    report
}

/// Best cell for a 225-character grid encoding within `time_budget_ms`.
pub fn get_best_cell(cells: &str, time_budget_ms: u64) -> CellReport {
    search_grid(cells, SearchLimits::millis(time_budget_ms))
}

/// [`get_best_cell`] with an additional depth cap.
pub fn get_best_cell_with_depth(cells: &str, time_budget_ms: u64, max_depth: i32) -> CellReport {
    search_grid(cells, SearchLimits::millis(time_budget_ms).with_depth(max_depth))
}

fn search_grid(cells: &str, limits: SearchLimits) -> CellReport {
    let mut grid: Grid = match cells.parse() {
        Ok(grid) => grid,
        Err(e) => {
            warn!(error = %e, "rejected grid");
            return CellReport::none();
        }
    };
    if grid.is_game_over() {
        return CellReport::none();
    }

    let side = grid.side_to_move();

    // Completing five ends the game; nothing to search.
    if let Some(cell) = grid.winning_cell(side) {
        info!(%cell, "winning cell");
        return CellReport {
            row: Some(cell.row()),
            col: Some(cell.col()),
            eval_score: (MATE_SCORE - 1) * side.sign(),
            depth_reached: 1,
            mate_indicator: Some(1),
        };
    }

    // The opponent's five must be blocked.
    if let Some(cell) = grid.winning_cell(!side) {
        info!(%cell, "forced block");
        return blocking_report(&mut grid, cell);
    }

    // So must a cell that would give the opponent two ways to make five.
    if let Some(cell) = grid.double_threat_cell(!side) {
        info!(%cell, "double threat block");
        return blocking_report(&mut grid, cell);
    }

    let mut searcher = Searcher::default();
    let result: SearchResult<_> = searcher.search(&mut grid, &GridEvaluator, &limits, |_, _, _, _| {});

    let report = CellReport {
        row: result.best_move.map(|cell| cell.row()),
        col: result.best_move.map(|cell| cell.col()),
        eval_score: result.score * side.sign(),
        depth_reached: result.depth,
        mate_indicator: result.mate_in(),
    };
    info!(
        row = ?report.row,
        col = ?report.col,
        score = report.eval_score,
        depth = report.depth_reached,
        nodes = result.nodes,
        "best cell"
    );
    report
}

/// Report for a block played without searching: the static score after it.
fn blocking_report(grid: &mut Grid, cell: Cell) -> CellReport {
    let eval_score = {
        let blocked = grid.play(&cell);
        GridEvaluator.evaluate(&*blocked)
    };
    CellReport {
        row: Some(cell.row()),
        col: Some(cell.col()),
        eval_score,
        depth_reached: 1,
        mate_indicator: Some(0),
    }
}
