use serde::{Deserialize, Serialize};
use std::fmt;

use super::letters::Tile;

pub const BOARD_SIZE: usize = 15;
pub const CENTER: Coord = Coord { row: 7, col: 7 };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Bounds-checked construction from raw client coordinates.
    pub fn checked(row: i64, col: i64) -> Option<Self> {
        let size = BOARD_SIZE as i64;
        if (0..size).contains(&row) && (0..size).contains(&col) {
            Some(Self::new(row as usize, col as usize))
        } else {
            None
        }
    }

    /// Moves one step in the given direction, staying on the board.
    pub fn step(&self, dr: isize, dc: isize) -> Option<Self> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        (row < BOARD_SIZE && col < BOARD_SIZE).then_some(Self::new(row, col))
    }

    pub fn orthogonal_neighbours(&self) -> impl Iterator<Item = Coord> + '_ {
        [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .into_iter()
            .filter_map(move |(dr, dc)| self.step(dr, dc))
    }

    /// Chebyshev distance (king moves).
    pub fn distance(&self, other: &Coord) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }

    pub(crate) fn index(&self) -> usize {
        self.row * BOARD_SIZE + self.col
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.row, self.col)
    }
}

/// Fixed premium squares. The start cell doubles the word like `DoubleWord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusKind {
    #[serde(rename = "H2")]
    DoubleLetter,
    #[serde(rename = "H3")]
    TripleLetter,
    #[serde(rename = "K2")]
    DoubleWord,
    #[serde(rename = "K3")]
    TripleWord,
    #[serde(rename = "start")]
    Start,
}

impl BonusKind {
    pub fn letter_multiplier(&self) -> u32 {
        match self {
            BonusKind::DoubleLetter => 2,
            BonusKind::TripleLetter => 3,
            _ => 1,
        }
    }

    pub fn word_multiplier(&self) -> u32 {
        match self {
            BonusKind::DoubleWord | BonusKind::Start => 2,
            BonusKind::TripleWord => 3,
            _ => 1,
        }
    }
}

const TRIPLE_WORD: [(usize, usize); 8] = [
    (0, 0), (0, 7), (0, 14), (7, 0), (7, 14), (14, 0), (14, 7), (14, 14),
];

const DOUBLE_WORD: [(usize, usize); 16] = [
    (1, 1), (2, 2), (3, 3), (4, 4), (1, 13), (2, 12), (3, 11), (4, 10),
    (10, 4), (11, 3), (12, 2), (13, 1), (10, 10), (11, 11), (12, 12), (13, 13),
];

const TRIPLE_LETTER: [(usize, usize); 12] = [
    (1, 5), (1, 9), (5, 1), (5, 5), (5, 9), (5, 13),
    (9, 1), (9, 5), (9, 9), (9, 13), (13, 5), (13, 9),
];

const DOUBLE_LETTER: [(usize, usize); 24] = [
    (0, 3), (0, 11), (2, 6), (2, 8), (3, 0), (3, 7), (3, 14), (6, 2),
    (6, 6), (6, 8), (6, 12), (7, 3), (7, 11), (8, 2), (8, 6), (8, 8),
    (8, 12), (11, 0), (11, 7), (11, 14), (12, 6), (12, 8), (14, 3), (14, 11),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub letter: Option<char>,
    pub bonus: Option<BonusKind>,
    /// What was physically put down, kept apart from `letter` for jokers.
    pub original_tile: Option<Tile>,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        self.letter.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    grid: Vec<Vec<Cell>>,
}

impl Board {
    /// An empty board carrying the fixed bonus layout.
    pub fn new() -> Self {
        let mut grid = vec![vec![Cell::default(); BOARD_SIZE]; BOARD_SIZE];

        let tiers: [(&[(usize, usize)], BonusKind); 5] = [
            (&TRIPLE_WORD, BonusKind::TripleWord),
            (&DOUBLE_WORD, BonusKind::DoubleWord),
            (&TRIPLE_LETTER, BonusKind::TripleLetter),
            (&DOUBLE_LETTER, BonusKind::DoubleLetter),
            (&[(CENTER.row, CENTER.col)], BonusKind::Start),
        ];
        for (cells, kind) in tiers {
            for &(row, col) in cells {
                // first tier to claim a cell keeps it
                grid[row][col].bonus.get_or_insert(kind);
            }
        }

        Self { grid }
    }

    pub fn cell(&self, coord: Coord) -> &Cell {
        &self.grid[coord.row][coord.col]
    }

    pub fn letter_at(&self, coord: Coord) -> Option<char> {
        self.cell(coord).letter
    }

    pub fn is_occupied(&self, coord: Coord) -> bool {
        self.cell(coord).letter.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.iter().flatten().all(Cell::is_empty)
    }

    pub fn place(&mut self, coord: Coord, letter: char, tile: Tile) {
        let cell = &mut self.grid[coord.row][coord.col];
        cell.letter = Some(letter);
        cell.original_tile = Some(tile);
    }

    /// Moves a tile (letter and physical token) to another cell. Bonuses stay put.
    pub fn relocate(&mut self, from: Coord, to: Coord) {
        let source = &mut self.grid[from.row][from.col];
        let letter = source.letter.take();
        let tile = source.original_tile.take();

        let target = &mut self.grid[to.row][to.col];
        target.letter = letter;
        target.original_tile = tile;
    }

    pub fn coords() -> impl Iterator<Item = Coord> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Coord::new(row, col)))
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.grid
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bonus_layout_is_fixed_and_disjoint() {
        let board = Board::new();
        let bonus_cells = Board::coords()
            .filter(|c| board.cell(*c).bonus.is_some())
            .count();

        assert_eq!(bonus_cells, 8 + 16 + 12 + 24 + 1);
        assert_eq!(board.cell(CENTER).bonus, Some(BonusKind::Start));
        assert_eq!(board.cell(Coord::new(0, 0)).bonus, Some(BonusKind::TripleWord));
        assert_eq!(board.cell(Coord::new(4, 4)).bonus, Some(BonusKind::DoubleWord));
        assert_eq!(board.cell(Coord::new(5, 5)).bonus, Some(BonusKind::TripleLetter));
        assert_eq!(board.cell(Coord::new(7, 3)).bonus, Some(BonusKind::DoubleLetter));
        assert_eq!(board.cell(Coord::new(7, 8)).bonus, None);
    }

    #[test]
    fn test_layout_is_symmetric() {
        let board = Board::new();
        for coord in Board::coords() {
            let mirrored = Coord::new(coord.col, coord.row);
            let flipped = Coord::new(BOARD_SIZE - 1 - coord.row, coord.col);
            assert_eq!(board.cell(coord).bonus, board.cell(mirrored).bonus, "{}", coord);
            assert_eq!(board.cell(coord).bonus, board.cell(flipped).bonus, "{}", coord);
        }
    }

    #[test]
    fn test_relocate_keeps_bonus_in_place() {
        let mut board = Board::new();
        board.place(CENTER, 'E', Tile::Joker);
        board.relocate(CENTER, Coord::new(7, 8));

        assert!(board.cell(CENTER).is_empty());
        assert_eq!(board.cell(CENTER).bonus, Some(BonusKind::Start));
        assert_eq!(board.letter_at(Coord::new(7, 8)), Some('E'));
        assert_eq!(board.cell(Coord::new(7, 8)).original_tile, Some(Tile::Joker));
        assert_eq!(board.cell(Coord::new(7, 8)).bonus, None);
    }

    #[test]
    fn test_coordinate_helpers() {
        assert_eq!(Coord::checked(-1, 3), None);
        assert_eq!(Coord::checked(3, 15), None);
        assert_eq!(Coord::checked(14, 0), Some(Coord::new(14, 0)));
        assert_eq!(Coord::new(0, 0).step(-1, 0), None);
        assert_eq!(Coord::new(0, 0).orthogonal_neighbours().count(), 2);
        assert_eq!(Coord::new(3, 3).distance(&Coord::new(4, 4)), 1);
        assert_eq!(Coord::new(3, 3).distance(&Coord::new(5, 4)), 2);
    }
}
