//! Move ordering for the main search and for quiescence.
//!
//! Main-search score bands, added together:
//! - transposition table move: 100,000
//! - capture: 10,000 + victim value
//! - promotion: 8,000
//! - killer at this depth: 5,000
//! - history counter for the move's `(from, to)`
//!
//! Sorting is stable, so equal scores keep generation order.

use std::cmp::Reverse;

use corsair_core::Game;

use crate::eval::Evaluator;
use crate::search::heuristics::HistoryTable;

pub const TT_MOVE_BONUS: i64 = 100_000;
pub const CAPTURE_BONUS: i64 = 10_000;
pub const PROMOTION_BONUS: i64 = 8_000;
pub const KILLER_BONUS: i64 = 5_000;

/// Score one move for the main search.
pub fn score_move<G, E>(
    pos: &G,
    mv: &G::Move,
    tt_move: Option<&G::Move>,
    killers: &[G::Move],
    history: &HistoryTable,
    evaluator: &E,
) -> i64
where
    G: Game,
    E: Evaluator<G>,
{
    let mut score: i64 = 0;
    if tt_move == Some(mv) {
        score += TT_MOVE_BONUS;
    }
    if pos.is_capture(mv) {
        if let Some(victim) = pos.captured_piece(mv) {
            score += CAPTURE_BONUS + i64::from(evaluator.piece_value(victim));
        }
    }
    if pos.is_promotion(mv) {
        score += PROMOTION_BONUS;
    }
    if killers.contains(mv) {
        score += KILLER_BONUS;
    }
    let history_score = i64::try_from(history.score(pos.move_key(mv))).unwrap_or(i64::MAX);
    score.saturating_add(history_score)
}

/// Order moves for the main search, best first.
pub fn order_moves<G, E>(
    pos: &G,
    moves: Vec<G::Move>,
    tt_move: Option<&G::Move>,
    killers: &[G::Move],
    history: &HistoryTable,
    evaluator: &E,
) -> Vec<G::Move>
where
    G: Game,
    E: Evaluator<G>,
{
    let mut scored: Vec<(G::Move, i64)> = moves
        .into_iter()
        .map(|mv| {
            let score = score_move(pos, &mv, tt_move, killers, history, evaluator);
            (mv, score)
        })
        .collect();
    scored.sort_by_key(|(_, score)| Reverse(*score));
    scored.into_iter().map(|(mv, _)| mv).collect()
}

/// Most valuable victim, least valuable attacker: `victim * 10 - attacker`.
pub fn mvv_lva<G, E>(pos: &G, mv: &G::Move, evaluator: &E) -> i32
where
    G: Game,
    E: Evaluator<G>,
{
    let victim = pos.captured_piece(mv).map_or(0, |p| evaluator.piece_value(p));
    let attacker = pos.moving_piece(mv).map_or(0, |p| evaluator.piece_value(p));
    victim * 10 - attacker
}

/// Captures and promotions only, ordered by [`mvv_lva`].
pub fn order_captures<G, E>(pos: &G, moves: Vec<G::Move>, evaluator: &E) -> Vec<G::Move>
where
    G: Game,
    E: Evaluator<G>,
{
    let mut scored: Vec<(G::Move, i32)> = moves
        .into_iter()
        .filter(|mv| pos.is_capture(mv) || pos.is_promotion(mv))
        .map(|mv| {
            let score = mvv_lva(pos, &mv, evaluator);
            (mv, score)
        })
        .collect();
    scored.sort_by_key(|(_, score)| Reverse(*score));
    scored.into_iter().map(|(mv, _)| mv).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use corsair_core::ChessPosition;

    use crate::eval::ChessEvaluator;

    // The d4 queen can take the c5 pawn or the e5 rook.
    const CAPTURES_FEN: &str = "4k3/8/8/2p1r3/3Q4/8/8/K7 w - - 0 1";

    #[test]
    fn tt_move_comes_first() {
        let pos = ChessPosition::startpos();
        let tt_move = pos.parse_move("a2a3").unwrap();
        let history = HistoryTable::new(64);
        let ordered = order_moves(
            &pos,
            pos.legal_moves(),
            Some(&tt_move),
            &[],
            &history,
            &ChessEvaluator,
        );
        assert_eq!(ordered[0], tt_move);
        assert_eq!(ordered.len(), 20);
    }

    #[test]
    fn captures_rank_by_victim_value() {
        let pos: ChessPosition = CAPTURES_FEN.parse().unwrap();
        let history = HistoryTable::new(64);
        let ordered = order_moves(&pos, pos.legal_moves(), None, &[], &history, &ChessEvaluator);
        assert_eq!(ordered[0].to_string(), "d4e5");
        assert_eq!(ordered[1].to_string(), "d4c5");
    }

    #[test]
    fn killers_and_history_lift_quiet_moves() {
        let pos = ChessPosition::startpos();
        let killer = pos.parse_move("b1c3").unwrap();
        let favoured = pos.parse_move("h2h4").unwrap();
        let mut history = HistoryTable::new(64);
        history.reward(pos.move_key(&favoured), 3);

        let ordered = order_moves(
            &pos,
            pos.legal_moves(),
            None,
            std::slice::from_ref(&killer),
            &history,
            &ChessEvaluator,
        );
        assert_eq!(ordered[0], killer);
        assert_eq!(ordered[1], favoured);
    }

    #[test]
    fn equal_scores_keep_generation_order() {
        let pos = ChessPosition::startpos();
        let history = HistoryTable::new(64);
        let generated = pos.legal_moves();
        let ordered = order_moves(&pos, generated.clone(), None, &[], &history, &ChessEvaluator);
        assert_eq!(ordered, generated);
    }

    #[test]
    fn quiescence_keeps_only_tactical_moves() {
        let pos: ChessPosition = CAPTURES_FEN.parse().unwrap();
        let ordered = order_captures(&pos, pos.legal_moves(), &ChessEvaluator);
        let texts: Vec<String> = ordered.iter().map(ToString::to_string).collect();
        assert_eq!(texts, vec!["d4e5", "d4c5"]);
    }

    #[test]
    fn mvv_lva_prefers_cheap_attackers() {
        // Pawn and queen can both take the rook on d5.
        let pos: ChessPosition = "4k3/8/8/3r4/2P5/8/8/3QK3 w - - 0 1".parse().unwrap();
        let ordered = order_captures(&pos, pos.legal_moves(), &ChessEvaluator);
        assert_eq!(ordered[0].to_string(), "c4d5");
        assert_eq!(ordered[1].to_string(), "d1d5");
    }
}
