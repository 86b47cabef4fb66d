//! Search and evaluation for corsair.

pub mod api;
pub mod config;
pub mod eval;
pub mod search;
pub mod time;

pub use api::{
    BestMoveReport, CellReport, get_best_cell, get_best_cell_with_depth, get_best_move,
    get_best_move_with_depth,
};
pub use config::{SearchConfig, SearchLimits};
pub use eval::{ChessEvaluator, Evaluator, GridEvaluator};
pub use search::control::{Aborted, SearchControl};
pub use search::{SearchResult, Searcher};
pub use time::{budget_from_go, compute_budget};
