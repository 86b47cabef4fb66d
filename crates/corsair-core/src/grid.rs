//! The 15x15 connect-five grid.
//!
//! Black (`Side::First`) moves first; a move drops a stone on an empty cell.
//! Five or more stones in a row, in any of the four directions, wins.

use std::fmt;
use std::str::FromStr;

use crate::error::PositionError;
use crate::game::{Game, Terminal};
use crate::side::Side;
use crate::zobrist;

use tracing::warn;

/// Cells per row and per column.
pub const GRID_SIZE: usize = 15;

/// Total number of cells.
pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;

/// Stones in a row needed to win.
pub const WIN_LENGTH: usize = 5;

/// Candidate moves lie within this Chebyshev distance of an existing stone.
const CANDIDATE_RADIUS: isize = 2;

const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// A cell of the grid, stored as its row-major index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell(u8);

impl Cell {
    /// The cell at `(row, col)`, or `None` when off the board.
    pub fn new(row: usize, col: usize) -> Option<Cell> {
        if row < GRID_SIZE && col < GRID_SIZE {
            Some(Cell((row * GRID_SIZE + col) as u8))
        } else {
            None
        }
    }

    /// The cell with row-major index `index`.
    pub fn from_index(index: usize) -> Option<Cell> {
        (index < GRID_CELLS).then(|| Cell(index as u8))
    }

    /// The centre cell, the only candidate on an empty board.
    pub const fn center() -> Cell {
        Cell(((GRID_SIZE / 2) * GRID_SIZE + GRID_SIZE / 2) as u8)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn row(self) -> usize {
        self.index() / GRID_SIZE
    }

    #[inline]
    pub const fn col(self) -> usize {
        self.index() % GRID_SIZE
    }

    /// Neighbour offset by `(dr, dc)`, if still on the board.
    fn offset(self, dr: isize, dc: isize) -> Option<Cell> {
        let row = self.row() as isize + dr;
        let col = self.col() as isize + dc;
        if (0..GRID_SIZE as isize).contains(&row) && (0..GRID_SIZE as isize).contains(&col) {
            Cell::new(row as usize, col as usize)
        } else {
            None
        }
    }

    /// Manhattan distance to the centre cell.
    fn center_distance(self) -> usize {
        let mid = GRID_SIZE / 2;
        self.row().abs_diff(mid) + self.col().abs_diff(mid)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row(), self.col())
    }
}

/// Reverts one `apply` or `apply_null`.
#[derive(Debug, Clone, Copy)]
enum Undo {
    Stone { cell: Cell, prior_winner: Option<Side> },
    Pass,
}

/// A connect-five position with its undo history.
#[derive(Clone)]
pub struct Grid {
    cells: [Option<Side>; GRID_CELLS],
    side_to_move: Side,
    stones: [usize; Side::COUNT],
    winner: Option<Side>,
    hash: u64,
    history: Vec<Undo>,
}

impl Grid {
    /// An empty grid with Black to move.
    pub fn new() -> Grid {
        Grid {
            cells: [None; GRID_CELLS],
            side_to_move: Side::First,
            stones: [0; Side::COUNT],
            winner: None,
            hash: 0,
            history: Vec::new(),
        }
    }

    /// The stone on `cell`, if any.
    #[inline]
    pub fn stone_at(&self, cell: Cell) -> Option<Side> {
        self.cells[cell.index()]
    }

    /// Number of stones `side` has on the board.
    pub fn stone_count(&self, side: Side) -> usize {
        self.stones[side.index()]
    }

    /// Whether every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.stones.iter().sum::<usize>() == GRID_CELLS
    }

    /// The side that has completed a line, if any.
    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    /// First empty cell (row-major) on which `side` would complete a line.
    pub fn winning_cell(&self, side: Side) -> Option<Cell> {
        (0..GRID_CELLS)
            .filter_map(Cell::from_index)
            .find(|&cell| self.stone_at(cell).is_none() && self.completes_line(cell, side))
    }

    /// First empty cell (row-major) on which a `side` stone would leave two
    /// or more cells that each complete a line for `side`, such as an open
    /// four. One reply cannot cover both.
    pub fn double_threat_cell(&self, side: Side) -> Option<Cell> {
        (0..GRID_CELLS)
            .filter_map(Cell::from_index)
            .filter(|&cell| self.stone_at(cell).is_none())
            .find(|&cell| self.threats_after(cell, side) >= 2)
    }

    /// Distinct empty cells completing a line for `side` once a `side`
    /// stone stands on `cell`. Only lines through `cell` are counted.
    fn threats_after(&self, cell: Cell, side: Side) -> usize {
        let mut trial = self.clone();
        trial.cells[cell.index()] = Some(side);

        let reach = WIN_LENGTH as isize - 1;
        let mut threats: Vec<Cell> = Vec::new();
        for &(dr, dc) in &DIRECTIONS {
            for step in (-reach..=reach).filter(|&step| step != 0) {
                let Some(target) = cell.offset(dr * step, dc * step) else {
                    continue;
                };
                if trial.stone_at(target).is_none()
                    && trial.completes_line(target, side)
                    && !threats.contains(&target)
                {
                    threats.push(target);
                }
            }
        }
        threats.len()
    }

    /// Whether a `side` stone on `cell` would sit in a line of at least
    /// [`WIN_LENGTH`], ignoring whatever currently occupies `cell`.
    pub fn completes_line(&self, cell: Cell, side: Side) -> bool {
        DIRECTIONS.iter().any(|&(dr, dc)| {
            1 + self.run_length(cell, side, dr, dc) + self.run_length(cell, side, -dr, -dc)
                >= WIN_LENGTH
        })
    }

    /// Consecutive `side` stones starting next to `cell` in direction `(dr, dc)`.
    fn run_length(&self, cell: Cell, side: Side, dr: isize, dc: isize) -> usize {
        let mut count = 0;
        let mut at = cell;
        while let Some(next) = at.offset(dr, dc) {
            if self.stone_at(next) != Some(side) {
                break;
            }
            count += 1;
            at = next;
        }
        count
    }

    /// Empty cells within reach of a stone, best candidates first.
    fn candidates(&self) -> Vec<Cell> {
        if self.stones == [0, 0] {
            return vec![Cell::center()];
        }

        let mut near = [false; GRID_CELLS];
        for index in 0..GRID_CELLS {
            if self.cells[index].is_none() {
                continue;
            }
            let Some(stone) = Cell::from_index(index) else {
                continue;
            };
            for dr in -CANDIDATE_RADIUS..=CANDIDATE_RADIUS {
                for dc in -CANDIDATE_RADIUS..=CANDIDATE_RADIUS {
                    if let Some(cell) = stone.offset(dr, dc) {
                        if self.stone_at(cell).is_none() {
                            near[cell.index()] = true;
                        }
                    }
                }
            }
        }

        let us = self.side_to_move;
        let mut scored: Vec<(Cell, i32)> = (0..GRID_CELLS)
            .filter(|&index| near[index])
            .filter_map(Cell::from_index)
            .map(|cell| {
                let mut score = (GRID_SIZE as i32 - cell.center_distance() as i32) * 10;
                if self.completes_line(cell, us) {
                    score += 10_000;
                }
                if self.completes_line(cell, !us) {
                    score += 5_000;
                }
                (cell, score)
            })
            .collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.into_iter().map(|(cell, _)| cell).collect()
    }

    fn toggle_stone(&mut self, cell: Cell, side: Side) {
        self.hash ^= zobrist::STONE_CELL[side.index()][cell.index()];
    }

    fn toggle_side(&mut self) {
        self.side_to_move = !self.side_to_move;
        self.hash ^= zobrist::SECOND_TO_MOVE;
    }
}

impl Default for Grid {
    fn default() -> Self {
        Grid::new()
    }
}

impl Game for Grid {
    type Move = Cell;
    type Piece = Side;

    const SQUARES: usize = GRID_CELLS;

    fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    fn legal_moves(&self) -> Vec<Cell> {
        if self.terminal().is_some() {
            return Vec::new();
        }
        self.candidates()
    }

    fn apply(&mut self, mv: &Cell) {
        let cell = *mv;
        let side = self.side_to_move;
        debug_assert!(self.stone_at(cell).is_none(), "stone dropped on occupied cell {cell}");

        self.history.push(Undo::Stone {
            cell,
            prior_winner: self.winner,
        });
        self.cells[cell.index()] = Some(side);
        self.stones[side.index()] += 1;
        self.toggle_stone(cell, side);
        if self.winner.is_none() && self.completes_line(cell, side) {
            self.winner = Some(side);
        }
        self.toggle_side();
    }

    fn apply_null(&mut self) -> bool {
        self.history.push(Undo::Pass);
        self.toggle_side();
        true
    }

    fn undo(&mut self) {
        let Some(undo) = self.history.pop() else {
            warn!("undo without a matching apply");
            debug_assert!(false, "undo without a matching apply");
            return;
        };
        self.toggle_side();
        if let Undo::Stone { cell, prior_winner } = undo {
            let side = self.side_to_move;
            self.cells[cell.index()] = None;
            self.stones[side.index()] -= 1;
            self.toggle_stone(cell, side);
            self.winner = prior_winner;
        }
    }

    fn is_capture(&self, _mv: &Cell) -> bool {
        false
    }

    fn captured_piece(&self, _mv: &Cell) -> Option<Side> {
        None
    }

    fn moving_piece(&self, _mv: &Cell) -> Option<Side> {
        Some(self.side_to_move)
    }

    fn is_promotion(&self, _mv: &Cell) -> bool {
        false
    }

    fn is_in_check(&self) -> bool {
        false
    }

    fn terminal(&self) -> Option<Terminal> {
        if let Some(by) = self.winner {
            Some(Terminal::LineCompleted { by })
        } else if self.is_full() {
            Some(Terminal::BoardFull)
        } else {
            None
        }
    }

    fn fingerprint(&self) -> u64 {
        self.hash
    }

    fn move_key(&self, mv: &Cell) -> (usize, usize) {
        (mv.index(), mv.index())
    }
}

impl FromStr for Grid {
    type Err = PositionError;

    /// Reads the first [`GRID_CELLS`] characters, row-major: `.`/`-` empty,
    /// `B`/`b` Black, `W`/`w` White. Anything past the board is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let found = s.chars().count();
        if found < GRID_CELLS {
            return Err(PositionError::GridLength {
                found,
                expected: GRID_CELLS,
            });
        }

        let mut grid = Grid::new();
        for (index, character) in s.chars().take(GRID_CELLS).enumerate() {
            let stone = match character {
                '.' | '-' => None,
                'B' | 'b' => Some(Side::First),
                'W' | 'w' => Some(Side::Second),
                _ => return Err(PositionError::GridCell { character, index }),
            };
            if let (Some(side), Some(cell)) = (stone, Cell::from_index(index)) {
                grid.cells[index] = Some(side);
                grid.stones[side.index()] += 1;
                grid.toggle_stone(cell, side);
            }
        }

        let black = grid.stone_count(Side::First);
        let white = grid.stone_count(Side::Second);
        if black == white {
            grid.side_to_move = Side::First;
        } else if black == white + 1 {
            grid.side_to_move = Side::Second;
            grid.hash ^= zobrist::SECOND_TO_MOVE;
        } else {
            return Err(PositionError::GridStoneCount { black, white });
        }

        grid.winner = (0..GRID_CELLS).filter_map(Cell::from_index).find_map(|cell| {
            grid.stone_at(cell)
                .filter(|&side| grid.completes_line(cell, side))
        });

        Ok(grid)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stone in &self.cells {
            let c = match stone {
                None => '.',
                Some(Side::First) => 'B',
                Some(Side::Second) => 'W',
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                let c = match self.cells[row * GRID_SIZE + col] {
                    None => '.',
                    Some(Side::First) => 'B',
                    Some(Side::Second) => 'W',
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        write!(f, "{} to move", self.side_to_move)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build an encoding from `(row, col, stone)` placements.
    fn encode(stones: &[(usize, usize, char)]) -> String {
        let mut cells = vec!['.'; GRID_CELLS];
        for &(row, col, stone) in stones {
            cells[row * GRID_SIZE + col] = stone;
        }
        cells.into_iter().collect()
    }

    fn cell(row: usize, col: usize) -> Cell {
        Cell::new(row, col).unwrap()
    }

    #[test]
    fn cell_coordinates() {
        let c = cell(3, 11);
        assert_eq!(c.row(), 3);
        assert_eq!(c.col(), 11);
        assert_eq!(c.index(), 3 * 15 + 11);
        assert_eq!(c.to_string(), "3,11");
        assert_eq!(Cell::new(15, 0), None);
        assert_eq!(Cell::center(), cell(7, 7));
    }

    #[test]
    fn empty_grid_offers_center_only() {
        let grid = Grid::new();
        assert_eq!(grid.legal_moves(), vec![cell(7, 7)]);
        assert_eq!(grid.side_to_move(), Side::First);
    }

    #[test]
    fn parse_and_display_roundtrip() {
        let text = encode(&[(7, 7, 'B'), (7, 8, 'W'), (8, 8, 'B')]);
        let grid: Grid = text.parse().unwrap();
        assert_eq!(grid.to_string(), text);
        assert_eq!(grid.side_to_move(), Side::Second);
        assert_eq!(grid.stone_at(cell(7, 8)), Some(Side::Second));
    }

    #[test]
    fn parse_accepts_lowercase_and_dashes_and_ignores_tail() {
        let mut text = encode(&[(0, 0, 'b'), (14, 14, 'w')]).replace('.', "-");
        text.push_str("trailing");
        let grid: Grid = text.parse().unwrap();
        assert_eq!(grid.stone_count(Side::First), 1);
        assert_eq!(grid.stone_count(Side::Second), 1);
        assert_eq!(grid.side_to_move(), Side::First);
    }

    #[test]
    fn parse_rejects_short_input() {
        let err = "B.W".parse::<Grid>().unwrap_err();
        assert_eq!(
            err,
            PositionError::GridLength {
                found: 3,
                expected: GRID_CELLS
            }
        );
    }

    #[test]
    fn parse_rejects_unknown_character() {
        let mut text = encode(&[]);
        text.replace_range(20..21, "x");
        let err = text.parse::<Grid>().unwrap_err();
        assert_eq!(
            err,
            PositionError::GridCell {
                character: 'x',
                index: 20
            }
        );
    }

    #[test]
    fn parse_rejects_impossible_counts() {
        let text = encode(&[(0, 0, 'W')]);
        let err = text.parse::<Grid>().unwrap_err();
        assert_eq!(err, PositionError::GridStoneCount { black: 0, white: 1 });
    }

    #[test]
    fn candidates_stay_near_stones() {
        let grid: Grid = encode(&[(0, 0, 'B')]).parse().unwrap();
        let moves = grid.legal_moves();
        assert_eq!(moves.len(), 8);
        assert!(moves.iter().all(|c| c.row() <= 2 && c.col() <= 2));
        // Nearest to the centre first.
        assert_eq!(moves[0], cell(2, 2));
    }

    #[test]
    fn completing_five_is_ordered_first() {
        let grid: Grid = encode(&[
            (0, 0, 'B'),
            (0, 1, 'B'),
            (0, 2, 'B'),
            (0, 3, 'B'),
            (10, 10, 'W'),
            (10, 11, 'W'),
            (10, 12, 'W'),
            (10, 13, 'W'),
        ])
        .parse()
        .unwrap();
        let moves = grid.legal_moves();
        assert_eq!(moves[0], cell(0, 4));
        assert_eq!(grid.winning_cell(Side::First), Some(cell(0, 4)));
        assert_eq!(grid.winning_cell(Side::Second), Some(cell(10, 9)));
    }

    #[test]
    fn open_three_has_a_double_threat_cell() {
        // White's open three on row 7: extending it makes an open four.
        let grid: Grid = encode(&[
            (7, 5, 'W'),
            (7, 6, 'W'),
            (7, 7, 'W'),
            (0, 0, 'B'),
            (0, 14, 'B'),
            (14, 0, 'B'),
        ])
        .parse()
        .unwrap();
        assert_eq!(grid.double_threat_cell(Side::Second), Some(cell(7, 4)));
        assert_eq!(grid.double_threat_cell(Side::First), None);
    }

    #[test]
    fn closed_three_has_no_double_threat_cell() {
        let grid: Grid = encode(&[
            (7, 4, 'B'),
            (7, 5, 'W'),
            (7, 6, 'W'),
            (7, 7, 'W'),
            (0, 0, 'B'),
            (14, 0, 'B'),
        ])
        .parse()
        .unwrap();
        assert_eq!(grid.double_threat_cell(Side::Second), None);
    }

    #[test]
    fn two_crossing_threes_make_a_double_threat() {
        // (7, 7) turns both the row and the column into fours.
        let grid: Grid = encode(&[
            (7, 4, 'W'),
            (7, 5, 'W'),
            (7, 6, 'W'),
            (4, 7, 'W'),
            (5, 7, 'W'),
            (6, 7, 'W'),
            (7, 3, 'B'),
            (3, 7, 'B'),
            (0, 0, 'B'),
            (14, 14, 'B'),
            (0, 14, 'B'),
            (14, 0, 'B'),
        ])
        .parse()
        .unwrap();
        assert_eq!(grid.double_threat_cell(Side::Second), Some(cell(7, 7)));
    }

    #[test]
    fn five_in_a_row_ends_the_game() {
        let mut grid: Grid = encode(&[
            (3, 3, 'B'),
            (4, 4, 'B'),
            (5, 5, 'B'),
            (6, 6, 'B'),
            (0, 10, 'W'),
            (0, 12, 'W'),
            (0, 14, 'W'),
            (2, 10, 'W'),
        ])
        .parse()
        .unwrap();
        assert_eq!(grid.terminal(), None);

        grid.apply(&cell(7, 7));
        assert_eq!(
            grid.terminal(),
            Some(Terminal::LineCompleted { by: Side::First })
        );
        assert!(grid.legal_moves().is_empty());

        grid.undo();
        assert_eq!(grid.terminal(), None);
        assert_eq!(grid.stone_at(cell(7, 7)), None);
    }

    #[test]
    fn parsed_winner_is_detected() {
        let grid: Grid = encode(&[
            (5, 0, 'B'),
            (6, 0, 'B'),
            (7, 0, 'B'),
            (8, 0, 'B'),
            (9, 0, 'B'),
            (0, 5, 'W'),
            (0, 7, 'W'),
            (0, 9, 'W'),
            (0, 11, 'W'),
        ])
        .parse()
        .unwrap();
        assert_eq!(grid.winner(), Some(Side::First));
        assert!(grid.is_game_over());
    }

    #[test]
    fn apply_undo_restores_hash() {
        let mut grid: Grid = encode(&[(7, 7, 'B')]).parse().unwrap();
        let before = grid.fingerprint();
        for mv in grid.legal_moves() {
            grid.apply(&mv);
            assert_ne!(grid.fingerprint(), before);
            grid.undo();
            assert_eq!(grid.fingerprint(), before);
        }
    }

    #[test]
    fn transpositions_share_a_fingerprint() {
        let mut a = Grid::new();
        a.apply(&cell(7, 7));
        a.apply(&cell(0, 0));
        a.apply(&cell(7, 8));

        let mut b = Grid::new();
        b.apply(&cell(7, 8));
        b.apply(&cell(0, 0));
        b.apply(&cell(7, 7));

        assert_eq!(a.fingerprint(), b.fingerprint());

        let parsed: Grid = a.to_string().parse().unwrap();
        assert_eq!(parsed.fingerprint(), a.fingerprint());
    }

    #[test]
    fn full_board_is_drawn() {
        // Pairs shifted by one each row: no run longer than two.
        let text: String = (0..GRID_CELLS)
            .map(|i| {
                let (r, c) = (i / GRID_SIZE, i % GRID_SIZE);
                if (c / 2 + r) % 2 == 0 { 'B' } else { 'W' }
            })
            .collect();
        let grid: Grid = text.parse().unwrap();
        assert!(grid.is_full());
        assert_eq!(grid.stone_count(Side::First), 113);
        assert_eq!(grid.winner(), None);
        assert_eq!(grid.terminal(), Some(Terminal::BoardFull));
        assert!(grid.legal_moves().is_empty());
    }
}
