//! Search algorithms and move ordering.

pub mod control;
pub mod heuristics;
pub mod negamax;
pub mod ordering;
pub mod quiescence;
pub mod tt;

use corsair_core::Game;
use tracing::{debug, info};

use crate::config::{SearchConfig, SearchLimits};
use crate::eval::Evaluator;
use control::{Aborted, SearchControl};
use heuristics::{HistoryTable, KillerTable};
use negamax::{INF, MAX_PLY, PvTable, SearchContext, mate_distance, negamax};
use tt::TranspositionTable;

/// Result of a top-level search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<M> {
    /// Best move at the deepest completed depth; `None` without legal moves.
    pub best_move: Option<M>,
    /// Score from the side to move's point of view.
    pub score: i32,
    /// Deepest completed depth (0 if none).
    pub depth: i32,
    /// Principal variation from the root.
    pub pv: Vec<M>,
    /// Total nodes visited, including any aborted iteration.
    pub nodes: u64,
    /// Full-window re-searches after aspiration failures.
    pub researches: u32,
}

impl<M> SearchResult<M> {
    fn empty() -> Self {
        Self {
            best_move: None,
            score: 0,
            depth: 0,
            pv: Vec::new(),
            nodes: 0,
            researches: 0,
        }
    }

    /// `Some(1)` if the side to move forces mate, `Some(-1)` if it gets
    /// mated, `Some(0)` otherwise; `None` if no depth completed.
    pub fn mate_in(&self) -> Option<i32> {
        if self.depth == 0 {
            return None;
        }
        Some(match mate_distance(self.score) {
            Some(_) => self.score.signum(),
            None => 0,
        })
    }
}

/// Iterative-deepening searcher: one session per top-level call.
///
/// The searcher owns its transposition, killer and history tables and
/// empties all three at the start of every [`Searcher::search`], so nothing
/// learned about one position leaks into the next call.
pub struct Searcher<G: Game> {
    config: SearchConfig,
    tt: TranspositionTable<G::Move>,
    killers: KillerTable<G::Move>,
    history: HistoryTable,
}

impl<G: Game> Searcher<G> {
    /// Create a searcher with the given configuration.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            tt: TranspositionTable::new(config.hash_mb),
            killers: KillerTable::new(),
            history: HistoryTable::new(G::SQUARES),
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Resize the transposition table to the given size in megabytes.
    pub fn resize_tt(&mut self, mb: usize) {
        self.config.hash_mb = mb;
        self.tt = TranspositionTable::new(mb);
    }

    /// Set the default depth cap used when a call does not give one.
    pub fn set_max_depth(&mut self, depth: i32) {
        self.config.max_depth = depth;
    }

    pub fn tt(&self) -> &TranspositionTable<G::Move> {
        &self.tt
    }

    pub fn killers(&self) -> &KillerTable<G::Move> {
        &self.killers
    }

    pub fn history(&self) -> &HistoryTable {
        &self.history
    }

    /// Run an iterative-deepening search of `pos`.
    ///
    /// Calls `on_iter(depth, score, nodes, pv)` after each completed depth.
    /// When the budget runs out mid-depth, that depth is discarded and the
    /// deepest completed one is returned. `pos` is left as it was given.
    pub fn search<E, F>(
        &mut self,
        pos: &mut G,
        evaluator: &E,
        limits: &SearchLimits,
        mut on_iter: F,
    ) -> SearchResult<G::Move>
    where
        E: Evaluator<G>,
        F: FnMut(i32, i32, u64, &[G::Move]),
    {
        let control = SearchControl::new(limits.time_budget);

        self.tt.clear();
        self.killers.clear();
        self.history.clear();

        let root_moves = pos.legal_moves();
        let Some(first_legal) = root_moves.first().cloned() else {
            debug!("no legal moves at the root");
            return SearchResult::empty();
        };

        let max_depth = limits
            .max_depth
            .unwrap_or(self.config.max_depth)
            .clamp(1, MAX_PLY as i32 - 1);
        let window = self.config.aspiration_window;

        let mut ctx = SearchContext {
            nodes: 0,
            tt: &mut self.tt,
            killers: &mut self.killers,
            history: &mut self.history,
            pv: PvTable::new(),
            control: &control,
            evaluator,
            abortable: false,
            researches: 0,
        };

        let mut result = SearchResult::empty();

        for depth in 1..=max_depth {
            // Depth 1 always completes; later depths start only within budget.
            if depth > 1 && control.expired() {
                break;
            }
            ctx.abortable = depth > 1;

            let score = match aspiration(pos, depth, result.score, window, &mut ctx) {
                Ok(score) => score,
                Err(Aborted) => {
                    debug!(depth, nodes = ctx.nodes, "iteration aborted");
                    break;
                }
            };

            let pv = ctx.pv.root_pv().to_vec();
            result.best_move = pv.first().cloned().or_else(|| Some(first_legal.clone()));
            result.score = score;
            result.depth = depth;
            result.pv = pv;

            info!(
                depth,
                score,
                nodes = ctx.nodes,
                elapsed_ms = control.elapsed().as_millis() as u64,
                "depth complete"
            );
            on_iter(depth, score, ctx.nodes, &result.pv);

            // A mate inside the horizon cannot be improved by looking deeper.
            if mate_distance(score).is_some_and(|plies| plies <= depth) {
                break;
            }
        }

        result.nodes = ctx.nodes;
        result.researches = ctx.researches;
        if result.best_move.is_none() {
            result.best_move = Some(first_legal);
        }
        result
    }
}

impl<G: Game> Default for Searcher<G> {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl<G: Game> std::fmt::Debug for Searcher<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher")
            .field("config", &self.config)
            .field("tt", &self.tt)
            .finish()
    }
}

/// Search the root at `depth` inside a window around `prev_score`.
///
/// Depth 1 uses the full window. A windowed score outside its bounds is
/// never trusted: the depth is searched again with the full window.
fn aspiration<G, E>(
    pos: &mut G,
    depth: i32,
    prev_score: i32,
    window: i32,
    ctx: &mut SearchContext<'_, G, E>,
) -> Result<i32, Aborted>
where
    G: Game,
    E: Evaluator<G>,
{
    if depth == 1 {
        return negamax(pos, depth, 0, -INF, INF, true, ctx);
    }

    // A zero window still searches a null window, never an empty one.
    let window = window.max(0);
    let alpha = prev_score.saturating_sub(window).max(-INF);
    let beta = prev_score.saturating_add(window.max(1)).min(INF);
    let score = negamax(pos, depth, 0, alpha, beta, true, ctx)?;
    if score > alpha && score < beta {
        return Ok(score);
    }

    debug!(depth, score, alpha, beta, "aspiration failed, searching full window");
    ctx.researches += 1;
    negamax(pos, depth, 0, -INF, INF, true, ctx)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use corsair_core::{Cell, ChessPosition, Grid};

    use crate::eval::{ChessEvaluator, GridEvaluator};
    use negamax::MATE_THRESHOLD;

    const SCHOLARS_MATE: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";
    const STALEMATE: &str = "k7/2K5/1Q6/8/8/8/8/8 b - - 0 1";
    const MATED: &str = "7k/6Q1/5K2/8/8/8/8/8 b - - 0 1";

    fn search_depth(pos: &mut ChessPosition, depth: i32) -> SearchResult<corsair_core::ChessMove> {
        let mut searcher = Searcher::default();
        searcher.search(pos, &ChessEvaluator, &SearchLimits::depth(depth), |_, _, _, _| {})
    }

    #[test]
    fn depth_1_returns_legal_move() {
        let mut pos = ChessPosition::startpos();
        let result = search_depth(&mut pos, 1);
        let best = result.best_move.expect("a move at depth 1");
        assert!(pos.legal_moves().contains(&best));
        assert_eq!(result.depth, 1);
    }

    #[test]
    fn finds_mate_in_one() {
        let mut pos: ChessPosition = SCHOLARS_MATE.parse().unwrap();
        let result = search_depth(&mut pos, 3);
        assert_eq!(result.best_move.as_ref().unwrap().to_string(), "h5f7");
        assert_eq!(result.score, negamax::MATE_SCORE - 1);
        assert_eq!(result.mate_in(), Some(1));
    }

    #[test]
    fn mate_stops_deepening_early() {
        let mut pos: ChessPosition = SCHOLARS_MATE.parse().unwrap();
        let result = search_depth(&mut pos, 10);
        assert!(result.depth < 10, "stopped at depth {}", result.depth);
        assert!(result.score > MATE_THRESHOLD);
    }

    #[test]
    fn no_legal_moves_is_an_empty_result() {
        for fen in [STALEMATE, MATED] {
            let mut pos: ChessPosition = fen.parse().unwrap();
            let result = search_depth(&mut pos, 4);
            assert_eq!(result.best_move, None, "{fen}");
            assert_eq!(result.score, 0, "{fen}");
            assert_eq!(result.depth, 0, "{fen}");
            assert_eq!(result.mate_in(), None, "{fen}");
        }
    }

    #[test]
    fn iterative_deepening_calls_callback() {
        let mut pos = ChessPosition::startpos();
        let mut searcher = Searcher::default();
        let mut depths_seen = Vec::new();
        searcher.search(&mut pos, &ChessEvaluator, &SearchLimits::depth(4), |depth, _, _, pv| {
            assert!(!pv.is_empty());
            depths_seen.push(depth);
        });
        assert_eq!(depths_seen, vec![1, 2, 3, 4]);
    }

    #[test]
    fn pv_starts_with_best_move() {
        let mut pos = ChessPosition::startpos();
        let result = search_depth(&mut pos, 4);
        assert!(result.pv.len() >= 2, "pv {:?}", result.pv);
        assert_eq!(result.pv.first(), result.best_move.as_ref());
    }

    #[test]
    fn search_restores_the_position() {
        let mut pos: ChessPosition = SCHOLARS_MATE.parse().unwrap();
        let before = pos.fingerprint();
        search_depth(&mut pos, 4);
        assert_eq!(pos.fingerprint(), before);
        let fresh: ChessPosition = SCHOLARS_MATE.parse().unwrap();
        assert_eq!(pos.legal_moves(), fresh.legal_moves());
    }

    #[test]
    fn tables_are_reset_between_calls() {
        let mut pos = ChessPosition::startpos();
        let mut searcher = Searcher::default();
        searcher.search(&mut pos, &ChessEvaluator, &SearchLimits::depth(4), |_, _, _, _| {});
        assert!(!searcher.tt().is_empty());

        // A decided position returns before searching, after the reset.
        let mut mated: ChessPosition = MATED.parse().unwrap();
        searcher.search(&mut mated, &ChessEvaluator, &SearchLimits::depth(4), |_, _, _, _| {});
        assert!(searcher.tt().is_empty());
        assert!(searcher.killers().is_empty());
        assert!(searcher.history().is_empty());
    }

    #[test]
    fn repeated_searches_agree() {
        let mut pos = ChessPosition::startpos();
        let mut searcher = Searcher::default();
        let first = searcher.search(&mut pos, &ChessEvaluator, &SearchLimits::depth(4), |_, _, _, _| {});
        let second = searcher.search(&mut pos, &ChessEvaluator, &SearchLimits::depth(4), |_, _, _, _| {});
        assert_eq!(first, second);
    }

    #[test]
    fn zero_budget_still_completes_depth_1() {
        let mut pos = ChessPosition::startpos();
        let mut searcher = Searcher::default();
        let limits = SearchLimits {
            time_budget: Some(Duration::ZERO),
            max_depth: None,
        };
        let result = searcher.search(&mut pos, &ChessEvaluator, &limits, |_, _, _, _| {});
        assert!(result.depth >= 1);
        assert!(pos.legal_moves().contains(&result.best_move.unwrap()));
    }

    #[test]
    fn queen_is_not_given_away() {
        // Qxb7+ hands the queen to the king; the search keeps it.
        let mut pos: ChessPosition = "k7/1p6/1Q6/8/8/8/8/6K1 w - - 0 1".parse().unwrap();
        let result = search_depth(&mut pos, 3);
        assert!(result.score > 500, "score {}", result.score);
    }

    #[test]
    fn grid_opening_takes_the_centre() {
        let mut grid = Grid::new();
        let mut searcher = Searcher::default();
        let result = searcher.search(&mut grid, &GridEvaluator, &SearchLimits::depth(2), |_, _, _, _| {});
        assert_eq!(result.best_move, Some(Cell::center()));
    }

    #[test]
    fn grid_completes_five() {
        let mut grid: Grid = four_in_a_row();
        let mut searcher = Searcher::default();
        let result = searcher.search(&mut grid, &GridEvaluator, &SearchLimits::depth(2), |_, _, _, _| {});
        let cell = result.best_move.unwrap();
        assert_eq!(cell.row(), 7);
        assert!(cell.col() == 3 || cell.col() == 8, "played {cell}");
        assert_eq!(result.mate_in(), Some(1));
    }

    /// Black stones on (7,4)..(7,7), White scattered; Black to move.
    fn four_in_a_row() -> Grid {
        let mut grid = Grid::new();
        for (b, w) in [((7, 4), (0, 0)), ((7, 5), (0, 14)), ((7, 6), (14, 0)), ((7, 7), (14, 14))] {
            grid.apply(&Cell::new(b.0, b.1).unwrap());
            grid.apply(&Cell::new(w.0, w.1).unwrap());
        }
        grid
    }
}
