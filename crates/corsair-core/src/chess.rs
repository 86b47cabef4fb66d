//! Chess rules over `shakmaty`, with the undo stack and repetition history
//! the search needs.

use std::fmt;
use std::str::FromStr;

use shakmaty::fen::Fen;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position, Role};
use tracing::{debug, warn};

use crate::error::PositionError;
use crate::game::{Game, Terminal};
use crate::side::Side;

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Halfmove clock value at which the fifty-move rule can be claimed.
const FIFTY_MOVE_PLIES: u32 = 100;

/// Occurrences of one position that allow a repetition claim.
const REPETITION_CLAIM: usize = 3;

/// A legal chess move.
///
/// Two moves are equal when their origin, destination and promotion match.
/// Displays as a coordinate string such as `e2e4` or `e7e8q`.
#[derive(Clone, Debug)]
pub struct ChessMove(Move);

impl ChessMove {
    /// The underlying `shakmaty` move.
    pub fn inner(&self) -> &Move {
        &self.0
    }

    /// Origin square index (a1 = 0, h8 = 63).
    pub fn from_index(&self) -> usize {
        self.0.from().unwrap_or_else(|| self.0.to()) as usize
    }

    /// Destination square index (a1 = 0, h8 = 63).
    pub fn to_index(&self) -> usize {
        self.0.to() as usize
    }

    /// Promotion piece, if any.
    pub fn promotion(&self) -> Option<Role> {
        self.0.promotion()
    }
}

impl PartialEq for ChessMove {
    fn eq(&self, other: &Self) -> bool {
        self.0.from() == other.0.from()
            && self.0.to() == other.0.to()
            && self.0.promotion() == other.0.promotion()
    }
}

impl Eq for ChessMove {}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_uci(CastlingMode::Standard))
    }
}

/// A chess position that can be searched in place.
#[derive(Clone, Debug)]
pub struct ChessPosition {
    current: Chess,
    undo_stack: Vec<Chess>,
    /// Fingerprints of every position since construction, current last.
    history: Vec<u64>,
}

impl ChessPosition {
    /// The standard starting position.
    pub fn startpos() -> ChessPosition {
        ChessPosition::from_chess(Chess::default())
    }

    /// Parse a FEN string.
    pub fn from_fen(fen: &str) -> Result<ChessPosition, PositionError> {
        let parsed = fen
            .trim()
            .parse::<Fen>()
            .map_err(|e| PositionError::InvalidFen {
                fen: fen.to_string(),
                reason: e.to_string(),
            })?;
        let chess: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| PositionError::IllegalPosition {
                fen: fen.to_string(),
                reason: e.to_string(),
            })?;
        Ok(ChessPosition::from_chess(chess))
    }

    fn from_chess(current: Chess) -> ChessPosition {
        let hash = zobrist_of(&current);
        ChessPosition {
            current,
            undo_stack: Vec::new(),
            history: vec![hash],
        }
    }

    /// Resolve a coordinate move (`e2e4`, `e7e8q`) against the legal moves.
    pub fn parse_move(&self, text: &str) -> Result<ChessMove, PositionError> {
        let wanted = text.trim().to_ascii_lowercase();
        self.legal_moves()
            .into_iter()
            .find(|mv| mv.to_string() == wanted)
            .ok_or_else(|| PositionError::IllegalMove {
                text: text.to_string(),
            })
    }

    /// The wrapped `shakmaty` position.
    pub fn chess(&self) -> &Chess {
        &self.current
    }

    /// Every piece on the board as `(side, role, square index)`.
    pub fn pieces(&self) -> impl Iterator<Item = (Side, Role, usize)> + '_ {
        let board = self.current.board();
        board.occupied().into_iter().filter_map(move |sq| {
            board
                .piece_at(sq)
                .map(|piece| (side_of(piece.color), piece.role, sq as usize))
        })
    }

    fn repetitions(&self) -> usize {
        let current = zobrist_of(&self.current);
        self.history.iter().filter(|&&h| h == current).count()
    }
}

impl Default for ChessPosition {
    fn default() -> Self {
        ChessPosition::startpos()
    }
}

impl FromStr for ChessPosition {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChessPosition::from_fen(s)
    }
}

fn zobrist_of(pos: &Chess) -> u64 {
    pos.zobrist_hash::<Zobrist64>(EnPassantMode::Legal).0
}

fn side_of(color: Color) -> Side {
    match color {
        Color::White => Side::First,
        Color::Black => Side::Second,
    }
}

impl Game for ChessPosition {
    type Move = ChessMove;
    type Piece = Role;

    const SQUARES: usize = 64;

    fn side_to_move(&self) -> Side {
        side_of(self.current.turn())
    }

    fn legal_moves(&self) -> Vec<ChessMove> {
        self.current.legal_moves().into_iter().map(ChessMove).collect()
    }

    fn apply(&mut self, mv: &ChessMove) {
        let next = {
            let mut next = self.current.clone();
            next.play_unchecked(&mv.0);
            next
        };
        let prior = std::mem::replace(&mut self.current, next);
        self.undo_stack.push(prior);
        self.history.push(zobrist_of(&self.current));
    }

    fn apply_null(&mut self) -> bool {
        match self.current.clone().swap_turn() {
            Ok(passed) => {
                let prior = std::mem::replace(&mut self.current, passed);
                self.undo_stack.push(prior);
                self.history.push(zobrist_of(&self.current));
                true
            }
            Err(e) => {
                debug!(error = %e, "null move refused");
                false
            }
        }
    }

    fn undo(&mut self) {
        let Some(prior) = self.undo_stack.pop() else {
            warn!("undo without a matching apply");
            debug_assert!(false, "undo without a matching apply");
            return;
        };
        self.current = prior;
        self.history.pop();
    }

    fn is_capture(&self, mv: &ChessMove) -> bool {
        mv.0.is_capture()
    }

    fn captured_piece(&self, mv: &ChessMove) -> Option<Role> {
        mv.0.capture()
    }

    fn moving_piece(&self, mv: &ChessMove) -> Option<Role> {
        Some(mv.0.role())
    }

    fn is_promotion(&self, mv: &ChessMove) -> bool {
        mv.0.is_promotion()
    }

    fn is_in_check(&self) -> bool {
        self.current.is_check()
    }

    fn terminal(&self) -> Option<Terminal> {
        if self.current.legal_moves().is_empty() {
            return Some(if self.current.is_check() {
                Terminal::Checkmate
            } else {
                Terminal::Stalemate
            });
        }
        if self.current.is_insufficient_material() {
            return Some(Terminal::InsufficientMaterial);
        }
        if self.current.halfmoves() >= FIFTY_MOVE_PLIES
            || self.repetitions() >= REPETITION_CLAIM
        {
            return Some(Terminal::ClaimableDraw);
        }
        None
    }

    fn fingerprint(&self) -> u64 {
        zobrist_of(&self.current)
    }

    fn move_key(&self, mv: &ChessMove) -> (usize, usize) {
        (mv.from_index(), mv.to_index())
    }
}
