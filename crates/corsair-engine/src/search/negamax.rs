//! Negamax alpha-beta search with null-move pruning.

use corsair_core::{Game, Terminal};

use crate::eval::Evaluator;
use crate::search::control::{Aborted, SearchControl};
use crate::search::heuristics::{HistoryTable, KillerTable};
use crate::search::ordering::order_moves;
use crate::search::quiescence::quiescence;
use crate::search::tt::{Bound, TranspositionTable};

/// Score representing an unreachable upper/lower bound.
pub const INF: i32 = 10_000_000;

/// Base score for a decided game (adjusted by ply for distance to mate).
pub const MATE_SCORE: i32 = 1_000_000;

/// Scores beyond this magnitude indicate a forced win or loss.
pub const MATE_THRESHOLD: i32 = 100_000;

/// Maximum search depth (in plies) for table sizing and recursion limits.
pub const MAX_PLY: usize = 128;

/// Depth reduction applied to the null-move search.
pub const NULL_MOVE_REDUCTION: i32 = 3;

/// Score of a finished game for the side to move, `ply` plies from the root.
pub fn terminal_score(terminal: Terminal, side_to_move: corsair_core::Side, ply: usize) -> i32 {
    match terminal {
        Terminal::Checkmate => -(MATE_SCORE - ply as i32),
        Terminal::LineCompleted { by } if by == side_to_move => MATE_SCORE - ply as i32,
        Terminal::LineCompleted { .. } => -(MATE_SCORE - ply as i32),
        Terminal::Stalemate
        | Terminal::InsufficientMaterial
        | Terminal::ClaimableDraw
        | Terminal::BoardFull => 0,
    }
}

/// Plies to mate encoded in `score`, if it is a mate score.
pub fn mate_distance(score: i32) -> Option<i32> {
    (score.abs() > MATE_THRESHOLD).then(|| MATE_SCORE - score.abs())
}

/// Negamax alpha-beta search.
///
/// Returns the best score for the side to move; the principal variation is
/// collected into `ctx.pv`. `Err(Aborted)` unwinds the whole iteration; every
/// frame's moves are taken back by their guards on the way out.
pub(super) fn negamax<G, E>(
    pos: &mut G,
    depth: i32,
    ply: usize,
    mut alpha: i32,
    beta: i32,
    allow_null: bool,
    ctx: &mut SearchContext<'_, G, E>,
) -> Result<i32, Aborted>
where
    G: Game,
    E: Evaluator<G>,
{
    ctx.pv.clear_ply(ply);
    ctx.nodes += 1;
    ctx.checkpoint()?;

    let key = pos.fingerprint();

    // Probe transposition table
    let mut tt_move = None;
    if let Some(hit) = ctx.tt.probe(key, ply) {
        // The root always searches so it can report a move.
        if ply > 0 && hit.depth >= depth {
            let cutoff = match hit.bound {
                Bound::Exact => true,
                Bound::LowerBound => hit.score >= beta,
                Bound::UpperBound => hit.score <= alpha,
            };
            if cutoff {
                return Ok(hit.score);
            }
        }
        tt_move = hit.best_move;
    }

    // Horizon or decided game: resolve with quiescence
    if depth <= 0 || ply + 1 >= MAX_PLY || (ply > 0 && pos.is_game_over()) {
        return quiescence(pos, ply, alpha, beta, ctx);
    }

    // Null move: if passing still fails high, so will a real move
    if allow_null && ply > 0 && depth >= NULL_MOVE_REDUCTION && !pos.is_in_check() {
        if let Some(mut passed) = pos.play_null() {
            let score = -negamax(
                &mut *passed,
                depth - NULL_MOVE_REDUCTION,
                ply + 1,
                -beta,
                -beta + 1,
                false,
                ctx,
            )?;
            if score >= beta {
                return Ok(beta);
            }
        }
    }

    let moves = pos.legal_moves();
    if moves.is_empty() {
        return quiescence(pos, ply, alpha, beta, ctx);
    }
    let ordered = order_moves(
        pos,
        moves,
        tt_move.as_ref(),
        ctx.killers.killers(depth),
        ctx.history,
        ctx.evaluator,
    );

    let original_alpha = alpha;
    let mut best_score = -INF;
    let mut best_move = None;

    for mv in ordered {
        ctx.checkpoint()?;

        let score = {
            let mut child = pos.play(&mv);
            -negamax(&mut *child, depth - 1, ply + 1, -beta, -alpha, true, ctx)?
        };

        if score > best_score {
            best_score = score;
            best_move = Some(mv.clone());
            if score > alpha {
                alpha = score;
                ctx.pv.update(ply, mv.clone());
            }
        }

        if alpha >= beta {
            ctx.history.reward(pos.move_key(&mv), depth);
            ctx.killers.store(depth, mv);
            break;
        }
    }

    let bound = Bound::classify(best_score, original_alpha, beta);
    debug_assert!(
        match bound {
            Bound::UpperBound => best_score <= original_alpha,
            Bound::LowerBound => best_score >= beta,
            Bound::Exact => best_score > original_alpha && best_score < beta,
        },
        "bound {bound:?} does not fit score {best_score} in ({original_alpha}, {beta})"
    );

    ctx.tt
        .store(key, depth, best_score, bound, best_move.or(tt_move), ply);

    Ok(best_score)
}

/// Row-per-ply principal variation table.
///
/// Row `ply` holds the best line found from that ply onward.
pub struct PvTable<M> {
    rows: Vec<Vec<M>>,
}

impl<M: Clone> PvTable<M> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            rows: vec![Vec::new(); MAX_PLY + 1],
        }
    }

    /// Clear the line at `ply` (called at the top of each node).
    pub fn clear_ply(&mut self, ply: usize) {
        if let Some(row) = self.rows.get_mut(ply) {
            row.clear();
        }
    }

    /// Set `mv` as the best move at `ply` followed by the line from `ply + 1`.
    pub fn update(&mut self, ply: usize, mv: M) {
        if ply >= MAX_PLY {
            return;
        }
        let (top, bottom) = self.rows.split_at_mut(ply + 1);
        let row = &mut top[ply];
        row.clear();
        row.push(mv);
        row.extend_from_slice(&bottom[0]);
    }

    /// The principal variation from the root.
    pub fn root_pv(&self) -> &[M] {
        &self.rows[0]
    }
}

impl<M: Clone> Default for PvTable<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Search state threaded through negamax calls.
pub(super) struct SearchContext<'a, G: Game, E> {
    /// Total nodes visited.
    pub nodes: u64,
    pub tt: &'a mut TranspositionTable<G::Move>,
    pub killers: &'a mut KillerTable<G::Move>,
    pub history: &'a mut HistoryTable,
    pub pv: PvTable<G::Move>,
    pub control: &'a SearchControl,
    pub evaluator: &'a E,
    /// Whether running out of time may abort the current iteration.
    pub abortable: bool,
    /// Full-window re-searches after an aspiration failure.
    pub researches: u32,
}

impl<G: Game, E: Evaluator<G>> SearchContext<'_, G, E> {
    /// Cancellation point.
    #[inline]
    pub fn checkpoint(&self) -> Result<(), Aborted> {
        if self.abortable && self.control.expired() {
            Err(Aborted)
        } else {
            Ok(())
        }
    }

    /// Static evaluation from the side to move's point of view.
    #[inline]
    pub fn evaluate(&self, pos: &G) -> i32 {
        self.evaluator.evaluate(pos) * pos.side_to_move().sign()
    }
}
