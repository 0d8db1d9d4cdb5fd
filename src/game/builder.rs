use chrono::{DateTime, Utc};

use super::board::{Board, Coord};
use super::core::{Match, MatchStatus, PlayerKey};
use super::hazards::{Hazard, HazardGrid, RewardKind};
use super::letters::{LetterPool, Tile};

/// Assembles an active match in a chosen position: hands, pool, board
/// letters, hazards and scores are all explicit. Nothing is random.
pub struct MatchBuilder {
    game: Match,
}

impl MatchBuilder {
    pub fn new(player1: &str, player2: &str) -> Self {
        let mut game = Match::new(
            uuid::Uuid::new_v4().to_string(),
            player1.to_string(),
            player2.to_string(),
            "5m".to_string(),
            Board::new(),
            HazardGrid::empty(),
            LetterPool::default(),
            Utc::now(),
        );
        game.status = MatchStatus::Active;
        Self { game }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.game.id = id.to_string();
        self
    }

    pub fn hand(mut self, key: PlayerKey, tiles: Vec<Tile>) -> Self {
        self.player(key).hand = tiles;
        self
    }

    pub fn score(mut self, key: PlayerKey, score: u32) -> Self {
        self.player(key).score = score;
        self
    }

    pub fn reward(mut self, key: PlayerKey, reward: RewardKind) -> Self {
        self.player(key).rewards.push(reward);
        self
    }

    pub fn pool(mut self, tiles: Vec<Tile>) -> Self {
        self.game.pool = LetterPool::from_tiles(tiles);
        self
    }

    /// Letters already on the board, as `(row, col, letter)`.
    pub fn letters(mut self, letters: &[(usize, usize, char)]) -> Self {
        for &(row, col, letter) in letters {
            self.game
                .board
                .place(Coord::new(row, col), letter, Tile::Letter(letter));
        }
        self
    }

    pub fn hazard(mut self, coord: Coord, hazard: Hazard) -> Self {
        self.game.hazards.set(coord, hazard);
        self
    }

    pub fn turn(mut self, key: PlayerKey) -> Self {
        self.game.turn = key;
        self
    }

    pub fn time_option(mut self, option: &str) -> Self {
        self.game.time_option = option.to_string();
        self
    }

    pub fn last_move_time(mut self, at: DateTime<Utc>) -> Self {
        self.game.last_move_time = at;
        self
    }

    pub fn build(self) -> Match {
        self.game
    }

    fn player(&mut self, key: PlayerKey) -> &mut super::core::PlayerState {
        match key {
            PlayerKey::Player1 => &mut self.game.players[0],
            PlayerKey::Player2 => &mut self.game.players[1],
        }
    }
}
