use thiserror::Error;

use super::board::Coord;
use super::core::MatchStatus;
use super::hazards::RewardKind;
use super::letters::Tile;

/// Broad classes of rejection, used to pick the response a caller sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedRequest,
    IllegalMove,
    Forbidden,
    StateConflict,
}

/// Reasons a command against a match is refused. A refused command never
/// mutates the match.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error("Positions and letters must be non-empty and of equal length")]
    MismatchedPlacement,
    #[error("Position out of bounds: [{0},{1}]")]
    OutOfBounds(i64, i64),
    #[error("Unknown tile: {0}")]
    UnknownTile(String),
    #[error("A shift needs exactly a source and a destination")]
    MalformedShift,
    #[error("Unknown move type: {0}")]
    UnknownMoveType(String),
    #[error("Unknown reward: {0}")]
    UnknownReward(String),

    #[error("It is not your turn")]
    NotYourTurn,
    #[error("Tile not in hand: {0}")]
    TileNotInHand(Tile),
    #[error("Tile is frozen this turn: {0}")]
    FrozenTile(Tile),
    #[error("Cell {0} is already occupied")]
    Occupied(Coord),
    #[error("Cell {0} is in a blocked region")]
    RegionBlocked(Coord),
    #[error("Joker at {0} needs an assigned letter")]
    JokerUnassigned(Coord),
    #[error("Tiles must lie in a single row or column")]
    NotInLine,
    #[error("Cell {0} leaves a gap between the placed tiles")]
    GapInPlacement(Coord),
    #[error("The first move must cover the center cell")]
    CenterNotCovered,
    #[error("Placement must touch an existing letter")]
    NotConnected,
    #[error("No valid word was formed")]
    NoWordFormed,
    #[error("Invalid words: {}", .0.join(", "))]
    InvalidWords(Vec<String>),
    #[error("Cell {0} has no letter to shift")]
    ShiftSourceEmpty(Coord),
    #[error("A letter can only be shifted to an adjacent cell")]
    ShiftTooFar,
    #[error("Reward not available: {0}")]
    RewardUnavailable(RewardKind),
    #[error("Reward {0} applies when uncovered and cannot be used")]
    RewardNotHeld(RewardKind),

    #[error("You are not a player in this match")]
    NotParticipant,

    #[error("Match is not active ({0})")]
    NotActive(MatchStatus),
    #[error("Match cannot start from {0}")]
    AlreadyStarted(MatchStatus),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::MismatchedPlacement
            | GameError::OutOfBounds(..)
            | GameError::UnknownTile(_)
            | GameError::MalformedShift
            | GameError::UnknownMoveType(_)
            | GameError::UnknownReward(_) => ErrorKind::MalformedRequest,
            GameError::NotParticipant => ErrorKind::Forbidden,
            GameError::NotActive(_) | GameError::AlreadyStarted(_) => ErrorKind::StateConflict,
            _ => ErrorKind::IllegalMove,
        }
    }
}
