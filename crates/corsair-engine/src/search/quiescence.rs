//! Quiescence search: captures and promotions only, below the main horizon.

use corsair_core::Game;

use crate::eval::Evaluator;
use crate::search::control::Aborted;
use crate::search::negamax::{MAX_PLY, SearchContext, terminal_score};
use crate::search::ordering::order_captures;

/// Margin added to the victim's value before a capture is judged hopeless.
pub const DELTA_MARGIN: i32 = 50;

/// Resolve tactical sequences before trusting the static evaluation.
///
/// Decided positions score exactly. Otherwise the side to move may stand pat;
/// the result is `beta` on a cutoff and never below the stand-pat score.
pub(super) fn quiescence<G, E>(
    pos: &mut G,
    ply: usize,
    mut alpha: i32,
    beta: i32,
    ctx: &mut SearchContext<'_, G, E>,
) -> Result<i32, Aborted>
where
    G: Game,
    E: Evaluator<G>,
{
    ctx.nodes += 1;
    ctx.checkpoint()?;

    if let Some(terminal) = pos.terminal() {
        return Ok(terminal_score(terminal, pos.side_to_move(), ply));
    }

    // Stand pat: the side to move can decline every capture
    let stand_pat = ctx.evaluate(pos);
    if stand_pat >= beta {
        return Ok(beta);
    }
    if ply >= MAX_PLY {
        return Ok(stand_pat);
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    let captures = order_captures(pos, pos.legal_moves(), ctx.evaluator);
    let mut best = stand_pat;

    for mv in captures {
        ctx.checkpoint()?;

        // Delta pruning
        if pos.is_capture(&mv) {
            let gain = pos
                .captured_piece(&mv)
                .map_or(0, |victim| ctx.evaluator.piece_value(victim));
            if stand_pat + gain + DELTA_MARGIN < alpha {
                continue;
            }
        }

        let score = {
            let mut child = pos.play(&mv);
            -quiescence(&mut *child, ply + 1, -beta, -alpha, ctx)?
        };

        if score >= beta {
            return Ok(beta);
        }
        if score > best {
            best = score;
        }
        if score > alpha {
            alpha = score;
        }
    }

    Ok(best)
}
