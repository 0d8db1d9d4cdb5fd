use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::board::Cell;
use super::core::{Match, MatchStatus, PlayerKey, RegionBlock};
use super::effects::TriggeredHazard;
use super::hazards::RewardKind;
use super::history::EventLogEntry;
use super::letters::Tile;

/// What one viewer may see of a match. Hazards never appear; the hand,
/// frozen letters and rewards are the viewer's own (empty for outsiders);
/// the event log appears only once the match is over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchView {
    pub game_id: String,
    pub player1_username: String,
    pub player2_username: String,
    pub viewer_key: Option<PlayerKey>,
    pub board: Vec<Vec<Cell>>,
    pub hand: Vec<Tile>,
    pub frozen_letters: Vec<Tile>,
    pub available_rewards: Vec<RewardKind>,
    pub scores: BTreeMap<PlayerKey, u32>,
    pub hand_sizes: BTreeMap<PlayerKey, usize>,
    pub turn: String,
    pub turn_key: PlayerKey,
    pub status: MatchStatus,
    pub time_option: String,
    pub started_at: DateTime<Utc>,
    pub last_move_time: DateTime<Utc>,
    pub pool_remaining: usize,
    pub region_block: Option<RegionBlock>,
    pub extra_move_in_progress: bool,
    pub consecutive_passes: u32,
    pub winner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_log: Option<Vec<EventLogEntry>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggered_cells: Vec<TriggeredHazard>,
}

impl MatchView {
    pub fn for_viewer(game: &Match, viewer: Option<&str>) -> Self {
        let keys = [PlayerKey::Player1, PlayerKey::Player2];
        let viewer_key = viewer.and_then(|identity| game.key_of(identity));
        let own = viewer_key.map(|key| game.player(key));

        Self {
            game_id: game.id().to_string(),
            player1_username: game.player(PlayerKey::Player1).identity.clone(),
            player2_username: game.player(PlayerKey::Player2).identity.clone(),
            viewer_key,
            board: game.board().rows().to_vec(),
            hand: own.map(|p| p.hand.clone()).unwrap_or_default(),
            frozen_letters: own.map(|p| p.frozen.clone()).unwrap_or_default(),
            available_rewards: own.map(|p| p.rewards.clone()).unwrap_or_default(),
            scores: keys.iter().map(|k| (*k, game.player(*k).score)).collect(),
            hand_sizes: keys.iter().map(|k| (*k, game.player(*k).hand.len())).collect(),
            turn: game.turn_identity().to_string(),
            turn_key: game.turn(),
            status: game.status(),
            time_option: game.time_option().to_string(),
            started_at: game.started_at(),
            last_move_time: game.last_move_time(),
            pool_remaining: game.pool().len(),
            region_block: game.region_block(),
            extra_move_in_progress: game.extra_move_in_progress(),
            consecutive_passes: game.consecutive_passes(),
            winner: game.winner_identity().map(str::to_string),
            event_log: game
                .status()
                .is_terminal()
                .then(|| game.event_log().to_vec()),
            triggered_cells: Vec::new(),
        }
    }

    pub fn with_triggered(mut self, triggered: Vec<TriggeredHazard>) -> Self {
        self.triggered_cells = triggered;
        self
    }
}

/// One line of a player's match list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub game_id: String,
    pub opponent: String,
    pub my_score: u32,
    pub opponent_score: u32,
    pub status: MatchStatus,
    pub is_my_turn: bool,
    pub winner: Option<String>,
    pub last_move_time: DateTime<Utc>,
}

impl MatchSummary {
    pub fn for_player(game: &Match, identity: &str) -> Option<Self> {
        let me = game.key_of(identity)?;
        let opponent = game.player(me.opponent());
        Some(Self {
            game_id: game.id().to_string(),
            opponent: opponent.identity.clone(),
            my_score: game.player(me).score,
            opponent_score: opponent.score,
            status: game.status(),
            is_my_turn: game.status() == MatchStatus::Active && game.turn() == me,
            winner: game.winner_identity().map(str::to_string),
            last_move_time: game.last_move_time(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::Coord;
    use crate::game::builder::MatchBuilder;
    use crate::game::hazards::{Hazard, MineKind};
    use chrono::Utc;

    #[test]
    fn test_view_shows_only_own_hand() {
        let game = MatchBuilder::new("alice", "bob")
            .hand(PlayerKey::Player1, vec![Tile::Letter('A')])
            .hand(PlayerKey::Player2, vec![Tile::Letter('B'), Tile::Joker])
            .build();

        let alice = MatchView::for_viewer(&game, Some("alice"));
        assert_eq!(alice.hand, vec![Tile::Letter('A')]);
        assert_eq!(alice.hand_sizes[&PlayerKey::Player2], 2);

        let outsider = MatchView::for_viewer(&game, Some("eve"));
        assert!(outsider.hand.is_empty());
        assert_eq!(outsider.viewer_key, None);
    }

    #[test]
    fn test_view_never_leaks_hazards() {
        let game = MatchBuilder::new("alice", "bob")
            .hazard(Coord::new(2, 3), Hazard::Mine(MineKind::WordCancel))
            .build();

        let json = serde_json::to_string(&MatchView::for_viewer(&game, Some("alice"))).unwrap();
        assert!(!json.contains("word_cancel"));
        assert!(!json.contains("hazard"));
    }

    #[test]
    fn test_event_log_only_after_finish() {
        let mut game = MatchBuilder::new("alice", "bob").build();
        assert!(MatchView::for_viewer(&game, Some("alice")).event_log.is_none());

        game.surrender("alice", Utc::now()).unwrap();
        let view = MatchView::for_viewer(&game, Some("bob"));
        assert_eq!(view.event_log.map(|log| log.len()), Some(1));
        assert_eq!(view.winner.as_deref(), Some("bob"));
    }

    #[test]
    fn test_summary_is_from_the_players_side() {
        let game = MatchBuilder::new("alice", "bob")
            .score(PlayerKey::Player2, 7)
            .turn(PlayerKey::Player2)
            .build();

        let summary = MatchSummary::for_player(&game, "bob").unwrap();
        assert_eq!(summary.opponent, "alice");
        assert_eq!(summary.my_score, 7);
        assert!(summary.is_my_turn);
        assert!(MatchSummary::for_player(&game, "eve").is_none());
    }
}
