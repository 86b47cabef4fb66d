//! Errors raised while decoding positions and moves.

/// Errors from turning external text into a position or a move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    /// The FEN string could not be parsed.
    #[error("invalid FEN \"{fen}\": {reason}")]
    InvalidFen {
        /// The rejected FEN string.
        fen: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The FEN parsed but describes an impossible chess position.
    #[error("illegal position \"{fen}\": {reason}")]
    IllegalPosition {
        /// The rejected FEN string.
        fen: String,
        /// Validation diagnostic.
        reason: String,
    },

    /// A coordinate move that is not legal in the current position.
    #[error("illegal or malformed move: {text}")]
    IllegalMove {
        /// The move text as received.
        text: String,
    },

    /// A grid encoding shorter than the board.
    #[error("grid encoding has {found} cells, expected {expected}")]
    GridLength {
        /// Number of characters received.
        found: usize,
        /// Number of cells on the board.
        expected: usize,
    },

    /// A grid character that is not a stone or an empty marker.
    #[error("invalid grid character '{character}' at cell {index}")]
    GridCell {
        /// The offending character.
        character: char,
        /// Row-major cell index.
        index: usize,
    },

    /// Stone counts that no sequence of alternating moves produces.
    #[error("impossible stone counts: {black} black, {white} white")]
    GridStoneCount {
        /// Stones of the first player.
        black: usize,
        /// Stones of the second player.
        white: usize,
    },
}
