//! Game rules behind the search: a common [`Game`] interface, a chess adapter
//! over `shakmaty`, and the 15x15 connect-five grid.

mod chess;
mod error;
mod game;
mod grid;
mod side;
mod zobrist;

pub use chess::{ChessMove, ChessPosition, STARTING_FEN};
pub use error::PositionError;
pub use game::{Game, Played, Terminal};
pub use grid::{Cell, GRID_CELLS, GRID_SIZE, Grid, WIN_LENGTH};
pub use side::Side;

/// Chess piece kinds, as reported by [`ChessPosition`].
pub use shakmaty::Role;
