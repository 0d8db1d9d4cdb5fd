use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::board::Coord;
use super::errors::GameError;
use super::validator::{parse_placement, TileDrop};

/// A move after request parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum Move {
    Pass,
    Shift { from: Coord, to: Coord },
    Place(Vec<TileDrop>),
}

/// Wire format of a move submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoveRequest {
    pub move_type: String,
    #[serde(default)]
    pub positions: Vec<[i64; 2]>,
    #[serde(default)]
    pub used_letters: Vec<String>,
    #[serde(default)]
    pub pass_move: bool,
    /// Letters assigned to jokers, keyed `"row,col"`.
    #[serde(default)]
    pub joker_assignments: HashMap<String, String>,
}

impl MoveRequest {
    pub fn pass() -> Self {
        Self {
            move_type: "pass".to_string(),
            pass_move: true,
            ..Self::default()
        }
    }

    pub fn shift(from: [i64; 2], to: [i64; 2]) -> Self {
        Self {
            move_type: "shift_letter".to_string(),
            positions: vec![from, to],
            ..Self::default()
        }
    }

    pub fn place(positions: Vec<[i64; 2]>, letters: &[&str]) -> Self {
        Self {
            move_type: "place_word".to_string(),
            positions,
            used_letters: letters.iter().map(|l| l.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_joker(mut self, row: i64, col: i64, letter: &str) -> Self {
        self.joker_assignments
            .insert(format!("{},{}", row, col), letter.to_string());
        self
    }

    pub fn parse(&self) -> Result<Move, GameError> {
        if self.pass_move || self.move_type == "pass" {
            return Ok(Move::Pass);
        }

        match self.move_type.as_str() {
            "shift_letter" => {
                let [from, to] = self.positions.as_slice() else {
                    return Err(GameError::MalformedShift);
                };
                Ok(Move::Shift {
                    from: checked(*from)?,
                    to: checked(*to)?,
                })
            }
            "place_word" => parse_placement(
                &self.positions,
                &self.used_letters,
                &self.joker_assignments,
            )
            .map(Move::Place),
            other => Err(GameError::UnknownMoveType(other.to_string())),
        }
    }
}

fn checked([row, col]: [i64; 2]) -> Result<Coord, GameError> {
    Coord::checked(row, col).ok_or(GameError::OutOfBounds(row, col))
}

/// Wire format of a placement preview.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub positions: Vec<[i64; 2]>,
    pub used_letters: Vec<String>,
    #[serde(default)]
    pub joker_assignments: HashMap<String, String>,
}

impl PreviewRequest {
    pub fn parse(&self) -> Result<Vec<TileDrop>, GameError> {
        parse_placement(&self.positions, &self.used_letters, &self.joker_assignments)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub is_valid: bool,
    pub potential_score: u32,
    pub message: String,
    pub invalid_words: Vec<String>,
}
