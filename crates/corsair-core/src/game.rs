//! The rules interface consumed by the search.
//!
//! A [`Game`] is a mutable position: moves are applied in place and taken
//! back with [`Game::undo`]. The search never calls `apply`/`undo` directly;
//! it goes through [`Game::play`], whose guard undoes the move when it goes
//! out of scope, so every exit path of a search frame restores the position.

use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::side::Side;

/// Why a position admits no further play (or may be claimed drawn).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// The side to move is in check and has no legal move.
    Checkmate,
    /// The side to move is not in check and has no legal move.
    Stalemate,
    /// Neither side can deliver mate.
    InsufficientMaterial,
    /// Fifty-move rule or threefold repetition.
    ClaimableDraw,
    /// A line of five was completed by `by`.
    LineCompleted {
        /// The side that completed the line.
        by: Side,
    },
    /// Every cell is occupied and nobody won.
    BoardFull,
}

impl Terminal {
    /// Whether this ending scores as a draw.
    pub fn is_draw(self) -> bool {
        matches!(
            self,
            Terminal::Stalemate
                | Terminal::InsufficientMaterial
                | Terminal::ClaimableDraw
                | Terminal::BoardFull
        )
    }
}

/// Rules of a two-player, zero-sum, perfect-information board game.
pub trait Game {
    /// A move, displayed in its wire encoding.
    type Move: Clone + PartialEq + fmt::Debug + fmt::Display;

    /// Kind of piece moved or captured.
    type Piece: Copy + fmt::Debug;

    /// Size of the square index space returned by [`Game::move_key`].
    const SQUARES: usize;

    /// The side whose turn it is.
    fn side_to_move(&self) -> Side;

    /// All legal moves in generation order.
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Play `mv`, which must be legal in the current position.
    fn apply(&mut self, mv: &Self::Move);

    /// Pass the turn without moving.
    ///
    /// Returns `false` (and leaves the position untouched) when passing is
    /// not possible; in that case there is nothing to undo.
    fn apply_null(&mut self) -> bool;

    /// Take back the most recent `apply` or successful `apply_null`.
    fn undo(&mut self);

    /// Whether `mv` captures a piece.
    fn is_capture(&self, mv: &Self::Move) -> bool;

    /// The kind of piece `mv` captures, if any.
    fn captured_piece(&self, mv: &Self::Move) -> Option<Self::Piece>;

    /// The kind of piece making `mv`, if pieces move at all.
    fn moving_piece(&self, mv: &Self::Move) -> Option<Self::Piece>;

    /// Whether `mv` promotes a piece.
    fn is_promotion(&self, mv: &Self::Move) -> bool;

    /// Whether the side to move is in check.
    fn is_in_check(&self) -> bool;

    /// How the game has ended, if it has.
    fn terminal(&self) -> Option<Terminal>;

    /// Hash key identifying the position, stable across transpositions.
    fn fingerprint(&self) -> u64;

    /// `(from, to)` indices of `mv`, each below [`Game::SQUARES`].
    fn move_key(&self, mv: &Self::Move) -> (usize, usize);

    fn is_game_over(&self) -> bool {
        self.terminal().is_some()
    }

    fn is_checkmate(&self) -> bool {
        self.terminal() == Some(Terminal::Checkmate)
    }

    fn is_stalemate(&self) -> bool {
        self.terminal() == Some(Terminal::Stalemate)
    }

    fn is_insufficient_material(&self) -> bool {
        self.terminal() == Some(Terminal::InsufficientMaterial)
    }

    fn can_claim_draw(&self) -> bool {
        self.terminal() == Some(Terminal::ClaimableDraw)
    }

    /// Apply `mv` and return a guard that undoes it on drop.
    fn play(&mut self, mv: &Self::Move) -> Played<'_, Self>
    where
        Self: Sized,
    {
        self.apply(mv);
        Played { game: self }
    }

    /// Pass the turn, returning a guard that restores it on drop.
    fn play_null(&mut self) -> Option<Played<'_, Self>>
    where
        Self: Sized,
    {
        if self.apply_null() {
            Some(Played { game: self })
        } else {
            None
        }
    }
}

/// A position with one move applied; the move is taken back on drop.
pub struct Played<'a, G: Game> {
    game: &'a mut G,
}

impl<G: Game> Deref for Played<'_, G> {
    type Target = G;

    fn deref(&self) -> &G {
        self.game
    }
}

impl<G: Game> DerefMut for Played<'_, G> {
    fn deref_mut(&mut self) -> &mut G {
        self.game
    }
}

impl<G: Game> Drop for Played<'_, G> {
    fn drop(&mut self) {
        self.game.undo();
    }
}
