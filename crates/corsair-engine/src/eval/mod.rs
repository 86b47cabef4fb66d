//! Static evaluation.
//!
//! Evaluators score a position from `Side::First`'s point of view (White in
//! chess, Black on the grid); the search negates for the side to move.

pub mod lines;
pub mod material;
pub mod pst;

use corsair_core::{ChessPosition, Game, Role};

pub use lines::GridEvaluator;

/// Static evaluation of a [`Game`] position.
pub trait Evaluator<G: Game> {
    /// Score of `pos` from `Side::First`'s point of view.
    fn evaluate(&self, pos: &G) -> i32;

    /// Value of a piece kind, used to order captures and to prune hopeless ones.
    fn piece_value(&self, piece: G::Piece) -> i32;
}

/// Material, piece placement and simple pawn/bishop terms. White-positive.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChessEvaluator;

impl Evaluator<ChessPosition> for ChessEvaluator {
    fn evaluate(&self, pos: &ChessPosition) -> i32 {
        let endgame = material::is_endgame(pos);
        material::material(pos) + pst::placement(pos, endgame) + material::structure(pos)
    }

    fn piece_value(&self, piece: Role) -> i32 {
        material::capture_value(piece)
    }
}
