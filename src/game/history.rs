use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::board::Coord;
use super::hazards::{MineKind, RewardKind};
use super::letters::Tile;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedTile {
    pub coord: Coord,
    pub tile: Tile,
    pub letter: char,
}

/// Append-only record of what happened in a match. Only sent to clients
/// once the match is over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventLogEntry {
    Pass {
        player: String,
        timestamp: DateTime<Utc>,
    },
    Shift {
        player: String,
        from: Coord,
        to: Coord,
        timestamp: DateTime<Utc>,
    },
    PlaceWord {
        player: String,
        tiles: Vec<LoggedTile>,
        words: Vec<String>,
        score_before_effects: u32,
        score_after_effects: u32,
        timestamp: DateTime<Utc>,
    },
    MineTriggered {
        player: String,
        kind: MineKind,
        coord: Coord,
        effect_description: String,
        timestamp: DateTime<Utc>,
    },
    RewardEarned {
        player: String,
        kind: RewardKind,
        coord: Coord,
        timestamp: DateTime<Utc>,
    },
    RewardUsed {
        player: String,
        kind: RewardKind,
        timestamp: DateTime<Utc>,
    },
    ExtraMoveUsed {
        player: String,
        timestamp: DateTime<Utc>,
    },
    Surrender {
        player: String,
        timestamp: DateTime<Utc>,
    },
    Timeout {
        player: String,
        timestamp: DateTime<Utc>,
    },
}
