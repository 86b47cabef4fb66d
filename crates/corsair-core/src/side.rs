//! The two players of a game.

use std::fmt;
use std::ops::Not;

/// One of the two players.
///
/// `First` moves first: White in chess, Black in connect-five. Static
/// evaluations are always expressed from `First`'s point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    First = 0,
    Second = 1,
}

impl Side {
    /// Total number of sides.
    pub const COUNT: usize = 2;

    /// Both sides in index order.
    pub const ALL: [Side; 2] = [Side::First, Side::Second];

    /// Return the index (0 for First, 1 for Second).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Return the opponent.
    #[inline]
    pub const fn flip(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    /// Multiplier turning a `First`-relative score into this side's view.
    #[inline]
    pub const fn sign(self) -> i32 {
        match self {
            Side::First => 1,
            Side::Second => -1,
        }
    }
}

impl Not for Side {
    type Output = Side;

    #[inline]
    fn not(self) -> Side {
        self.flip()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::First => write!(f, "first"),
            Side::Second => write!(f, "second"),
        }
    }
}
