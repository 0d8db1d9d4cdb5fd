use std::collections::HashSet;

use super::board::Coord;
use super::letters::HAND_SIZE;
use super::words::FormedWord;

pub const BINGO_BONUS: u32 = 50;

/// Premiums only count on cells filled this turn; reused letters score
/// their bare value.
pub fn word_score(word: &FormedWord, placed: &HashSet<Coord>) -> u32 {
    let mut letters = 0;
    let mut word_multiplier = 1;

    for tile in &word.tiles {
        let base = tile.tile.points();
        match tile.bonus.filter(|_| placed.contains(&tile.coord)) {
            Some(bonus) => {
                letters += base * bonus.letter_multiplier();
                word_multiplier *= bonus.word_multiplier();
            }
            None => letters += base,
        }
    }

    letters * word_multiplier
}

pub fn is_bingo(placed: &HashSet<Coord>) -> bool {
    placed.len() == HAND_SIZE
}

/// Sum of every formed word, plus the bingo bonus for a full rack.
pub fn move_score(words: &[FormedWord], placed: &HashSet<Coord>) -> u32 {
    let words_total: u32 = words.iter().map(|w| word_score(w, placed)).sum();
    if is_bingo(placed) {
        words_total + BINGO_BONUS
    } else {
        words_total
    }
}
