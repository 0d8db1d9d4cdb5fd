use serde::Serialize;

use super::board::{Board, BonusKind, Coord};
use super::dictionary::Dictionary;
use super::errors::GameError;
use super::letters::Tile;

const ACROSS: (isize, isize) = (0, 1);
const DOWN: (isize, isize) = (1, 0);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordTile {
    pub coord: Coord,
    pub letter: char,
    pub tile: Tile,
    pub bonus: Option<BonusKind>,
}

/// A maximal run of letters on one axis, read start to end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormedWord {
    pub word: String,
    pub tiles: Vec<WordTile>,
}

impl FormedWord {
    fn span(&self) -> Option<(Coord, Coord)> {
        Some((self.tiles.first()?.coord, self.tiles.last()?.coord))
    }
}

/// Walks back to the start of the run through `start`, then reads forward.
/// Returns an empty word when `start` holds no letter.
pub fn trace_word(board: &Board, start: Coord, (dr, dc): (isize, isize)) -> FormedWord {
    let mut first = start;
    while let Some(prev) = first.step(-dr, -dc).filter(|c| board.is_occupied(*c)) {
        first = prev;
    }

    let mut tiles = Vec::new();
    let mut cursor = Some(first);
    while let Some(coord) = cursor {
        let cell = board.cell(coord);
        let Some(letter) = cell.letter else { break };
        tiles.push(WordTile {
            coord,
            letter,
            tile: cell.original_tile.unwrap_or(Tile::Letter(letter)),
            bonus: cell.bonus,
        });
        cursor = coord.step(dr, dc);
    }

    FormedWord {
        word: tiles.iter().map(|t| t.letter).collect(),
        tiles,
    }
}

/// Every word of two or more letters running through a placed cell.
/// `board` must already carry the placement.
pub fn find_all_formed_words(board: &Board, placed: &[Coord]) -> Vec<FormedWord> {
    let Some(&anchor) = placed.first() else {
        return Vec::new();
    };

    let mut candidates = Vec::new();
    let cross = if placed.len() == 1 {
        candidates.push(trace_word(board, anchor, ACROSS));
        candidates.push(trace_word(board, anchor, DOWN));
        DOWN
    } else if placed.iter().all(|c| c.row == anchor.row) {
        candidates.push(trace_word(board, anchor, ACROSS));
        DOWN
    } else {
        candidates.push(trace_word(board, anchor, DOWN));
        ACROSS
    };
    candidates.extend(placed.iter().map(|coord| trace_word(board, *coord, cross)));

    let mut words: Vec<FormedWord> = Vec::new();
    for candidate in candidates {
        if candidate.tiles.len() < 2 {
            continue;
        }
        if words.iter().any(|w| w.span() == candidate.span()) {
            continue;
        }
        words.push(candidate);
    }
    words
}

/// Rejects the move if any distinct word is unknown, reporting all of them.
pub fn check_words(words: &[FormedWord], dictionary: &dyn Dictionary) -> Result<(), GameError> {
    let mut invalid: Vec<String> = words
        .iter()
        .filter(|w| !dictionary.is_valid_word(&w.word))
        .map(|w| w.word.clone())
        .collect();
    invalid.sort();
    invalid.dedup();

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(GameError::InvalidWords(invalid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::dictionary::{PermissiveDictionary, WordList};

    fn place_word(board: &mut Board, row: usize, col: usize, word: &str, across: bool) -> Vec<Coord> {
        word.chars()
            .enumerate()
            .map(|(i, letter)| {
                let coord = if across {
                    Coord::new(row, col + i)
                } else {
                    Coord::new(row + i, col)
                };
                board.place(coord, letter, Tile::Letter(letter));
                coord
            })
            .collect()
    }

    #[test]
    fn test_main_word_through_center() {
        let mut board = Board::new();
        let placed = place_word(&mut board, 7, 6, "KALE", true);

        let words = find_all_formed_words(&board, &placed);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].word, "KALE");
        assert_eq!(words[0].tiles.len(), 4);
    }

    #[test]
    fn test_main_word_extends_through_existing_letters() {
        let mut board = Board::new();
        place_word(&mut board, 7, 7, "EV", true);
        let placed = place_word(&mut board, 7, 5, "KA", true);

        let words = find_all_formed_words(&board, &placed);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].word, "KAEV");
    }

    #[test]
    fn test_cross_words_are_found() {
        let mut board = Board::new();
        place_word(&mut board, 7, 7, "EV", true);
        // "AT" placed under "EV" forms "AT" plus the crossings "EA" and "VT"
        let placed = place_word(&mut board, 8, 7, "AT", true);

        let mut found: Vec<String> = find_all_formed_words(&board, &placed)
            .into_iter()
            .map(|w| w.word)
            .collect();
        found.sort();
        assert_eq!(found, vec!["AT", "EA", "VT"]);
    }

    #[test]
    fn test_single_tile_tries_both_axes() {
        let mut board = Board::new();
        place_word(&mut board, 7, 7, "EV", true);
        place_word(&mut board, 5, 9, "DA", false);
        let placed = place_word(&mut board, 7, 9, "L", true);

        let mut found: Vec<String> = find_all_formed_words(&board, &placed)
            .into_iter()
            .map(|w| w.word)
            .collect();
        found.sort();
        assert_eq!(found, vec!["DAL", "EVL"]);
    }

    #[test]
    fn test_lone_tile_forms_no_word() {
        let mut board = Board::new();
        let placed = place_word(&mut board, 7, 7, "A", true);

        assert!(find_all_formed_words(&board, &placed).is_empty());
    }

    #[test]
    fn test_same_spelling_at_different_spots_counts_twice() {
        let mut board = Board::new();
        place_word(&mut board, 6, 7, "A", true);
        place_word(&mut board, 6, 8, "A", true);
        // a second row of "LL" under "AA" forms "AL" twice
        let placed = place_word(&mut board, 7, 7, "LL", true);

        let words: Vec<String> = find_all_formed_words(&board, &placed)
            .into_iter()
            .map(|w| w.word)
            .collect();
        assert_eq!(words.iter().filter(|w| *w == "AL").count(), 2);
    }

    #[test]
    fn test_check_words_reports_every_invalid_word() {
        let mut board = Board::new();
        place_word(&mut board, 7, 7, "EV", true);
        let placed = place_word(&mut board, 8, 7, "AT", true);
        let words = find_all_formed_words(&board, &placed);

        let dictionary = WordList::from_words(["at"]);
        assert_eq!(
            check_words(&words, &dictionary),
            Err(GameError::InvalidWords(vec!["EA".to_string(), "VT".to_string()]))
        );
        assert!(check_words(&words, &PermissiveDictionary).is_ok());
    }
}
