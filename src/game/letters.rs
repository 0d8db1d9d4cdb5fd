use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of tiles a hand is refilled to after every placement.
pub const HAND_SIZE: usize = 7;

const JOKER_LABEL: &str = "JOKER";
const JOKER_COUNT: usize = 2;

/// (letter, count in a fresh pool, point value)
pub const LETTER_DISTRIBUTION: [(char, usize, u32); 29] = [
    ('A', 12, 1),
    ('B', 2, 3),
    ('C', 2, 4),
    ('Ç', 2, 4),
    ('D', 2, 3),
    ('E', 8, 1),
    ('F', 1, 7),
    ('G', 1, 5),
    ('Ğ', 1, 8),
    ('H', 1, 5),
    ('I', 4, 2),
    ('İ', 7, 1),
    ('J', 1, 10),
    ('K', 7, 1),
    ('L', 7, 1),
    ('M', 4, 2),
    ('N', 5, 1),
    ('O', 3, 2),
    ('Ö', 1, 7),
    ('P', 1, 5),
    ('R', 6, 1),
    ('S', 3, 2),
    ('Ş', 2, 4),
    ('T', 5, 1),
    ('U', 3, 2),
    ('Ü', 2, 3),
    ('V', 1, 7),
    ('Y', 2, 3),
    ('Z', 1, 4),
];

/// Upper-cases a letter with Turkish dotted/dotless i rules.
pub fn fold_letter(c: char) -> char {
    match c {
        'i' => 'İ',
        'ı' => 'I',
        other => other.to_uppercase().next().unwrap_or(other),
    }
}

/// Upper-cases a whole word with [`fold_letter`].
pub fn fold_word(word: &str) -> String {
    word.chars().map(fold_letter).collect()
}

pub fn is_alphabet_letter(c: char) -> bool {
    LETTER_DISTRIBUTION.iter().any(|(letter, _, _)| *letter == c)
}

pub fn letter_points(c: char) -> Option<u32> {
    LETTER_DISTRIBUTION
        .iter()
        .find(|(letter, _, _)| *letter == c)
        .map(|(_, _, points)| *points)
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown tile: {0}")]
pub struct TileParseError(pub String);

/// A physical token: either a lettered tile or a blank joker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Tile {
    Letter(char),
    Joker,
}

impl Tile {
    /// Jokers are always worth zero, whatever letter they stand for.
    pub fn points(&self) -> u32 {
        match self {
            Tile::Letter(c) => letter_points(*c).unwrap_or(0),
            Tile::Joker => 0,
        }
    }

    pub fn is_joker(&self) -> bool {
        matches!(self, Tile::Joker)
    }

    pub fn from_string(s: &str) -> Result<Self, TileParseError> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(JOKER_LABEL) {
            return Ok(Tile::Joker);
        }

        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                let folded = fold_letter(c);
                if is_alphabet_letter(folded) {
                    Ok(Tile::Letter(folded))
                } else {
                    Err(TileParseError(s.to_string()))
                }
            }
            _ => Err(TileParseError(s.to_string())),
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tile::Letter(c) => write!(f, "{}", c),
            Tile::Joker => write!(f, "{}", JOKER_LABEL),
        }
    }
}

impl TryFrom<String> for Tile {
    type Error = TileParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Tile::from_string(&value)
    }
}

impl From<Tile> for String {
    fn from(tile: Tile) -> Self {
        tile.to_string()
    }
}

/// Total point value of a rack.
pub fn rack_value(tiles: &[Tile]) -> u32 {
    tiles.iter().map(Tile::points).sum()
}

/// The undrawn tiles of a match. Drawing is destructive and may return
/// fewer tiles than asked for once the pool runs dry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LetterPool {
    tiles: Vec<Tile>,
}

impl LetterPool {
    /// Expands the distribution table into a shuffled pool.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut tiles: Vec<Tile> = LETTER_DISTRIBUTION
            .iter()
            .flat_map(|(letter, count, _)| std::iter::repeat(Tile::Letter(*letter)).take(*count))
            .chain(std::iter::repeat(Tile::Joker).take(JOKER_COUNT))
            .collect();
        tiles.shuffle(rng);
        Self { tiles }
    }

    pub fn from_tiles(tiles: Vec<Tile>) -> Self {
        Self { tiles }
    }

    pub fn draw(&mut self, n: usize) -> Vec<Tile> {
        let take = n.min(self.tiles.len());
        self.tiles.split_off(self.tiles.len() - take)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn count_of(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|t| **t == tile).count()
    }
}
