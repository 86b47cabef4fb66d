//! Material balance and simple structural terms.
//!
//! All scores are returned from White's perspective (positive = White ahead).

use corsair_core::{ChessPosition, Role, Side};

/// Evaluation value of each piece kind. The king is not counted.
pub const fn material_value(role: Role) -> i32 {
    match role {
        Role::Pawn => 100,
        Role::Knight => 320,
        Role::Bishop => 330,
        Role::Rook => 500,
        Role::Queen => 900,
        Role::King => 0,
    }
}

/// Value of a captured piece for move ordering and delta pruning.
///
/// Same as [`material_value`] except that the king is worth 20000.
pub const fn capture_value(role: Role) -> i32 {
    match role {
        Role::King => 20_000,
        other => material_value(other),
    }
}

/// Bonus for holding two or more bishops.
const BISHOP_PAIR_BONUS: i32 = 30;

/// Penalty per pawn beyond the first on a file.
const DOUBLED_PAWN_PENALTY: i32 = 10;

/// Sum of material values, White minus Black.
pub fn material(pos: &ChessPosition) -> i32 {
    pos.pieces()
        .map(|(side, role, _)| material_value(role) * side.sign())
        .sum()
}

/// Bishop pair and doubled pawns, White minus Black.
pub fn structure(pos: &ChessPosition) -> i32 {
    let mut bishops = [0; Side::COUNT];
    let mut pawns_per_file = [[0i32; 8]; Side::COUNT];

    for (side, role, sq) in pos.pieces() {
        match role {
            Role::Bishop => bishops[side.index()] += 1,
            Role::Pawn => pawns_per_file[side.index()][sq % 8] += 1,
            _ => {}
        }
    }

    let mut score = 0;
    for side in Side::ALL {
        let mut own = 0;
        if bishops[side.index()] >= 2 {
            own += BISHOP_PAIR_BONUS;
        }
        for &count in &pawns_per_file[side.index()] {
            if count > 1 {
                own -= DOUBLED_PAWN_PENALTY * (count - 1);
            }
        }
        score += own * side.sign();
    }
    score
}

/// Whether the king should head for the centre.
///
/// True with at most 8 non-king pieces, with no queens, or with a single
/// queen and at most 10 non-king pieces.
pub fn is_endgame(pos: &ChessPosition) -> bool {
    let mut pieces = 0;
    let mut queens = 0;
    for (_, role, _) in pos.pieces() {
        if role != Role::King {
            pieces += 1;
        }
        if role == Role::Queen {
            queens += 1;
        }
    }
    pieces <= 8 || queens == 0 || (queens <= 1 && pieces <= 10)
}
