use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;
use strum_macros::Display;

use super::board::{Board, Coord, BOARD_SIZE, CENTER};
use super::config::{parse_time_option, GameConfig};
use super::dictionary::Dictionary;
use super::effects::{resolve_effects, TriggeredHazard};
use super::errors::GameError;
use super::hazards::{assign_hazards, Hazard, HazardGrid, RewardKind};
use super::history::{EventLogEntry, LoggedTile};
use super::letters::{rack_value, LetterPool, Tile, HAND_SIZE};
use super::moves::{Move, MoveRequest};
use super::scoring::{is_bingo, move_score, BINGO_BONUS};
use super::validator::{check_hand, validate_placement, PlacedTile, TileDrop};
use super::words::{check_words, find_all_formed_words, FormedWord};

/// Identity of the synthetic demo opponent. Matches against it never count
/// towards statistics.
pub const BOT_IDENTITY: &str = "Bot";

const PASSES_TO_FINISH: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlayerKey {
    Player1,
    Player2,
}

impl PlayerKey {
    pub fn opponent(self) -> Self {
        match self {
            PlayerKey::Player1 => PlayerKey::Player2,
            PlayerKey::Player2 => PlayerKey::Player1,
        }
    }

    fn index(self) -> usize {
        match self {
            PlayerKey::Player1 => 0,
            PlayerKey::Player2 => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchStatus {
    Waiting,
    Active,
    FinishedPass,
    FinishedHand,
    FinishedTimeout,
    FinishedSurrender,
}

impl MatchStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MatchStatus::Waiting | MatchStatus::Active)
    }
}

/// Half of the board closed to one player by a region-ban.
/// `Right` closes columns 7.. to player 2, `Left` closes ..7 to player 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionBlock {
    Left,
    Right,
}

impl RegionBlock {
    pub fn blocked_columns(self, mover: PlayerKey) -> Option<Range<usize>> {
        match (self, mover) {
            (RegionBlock::Right, PlayerKey::Player2) => Some(CENTER.col..BOARD_SIZE),
            (RegionBlock::Left, PlayerKey::Player1) => Some(0..CENTER.col),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub identity: String,
    pub hand: Vec<Tile>,
    pub score: u32,
    pub frozen: Vec<Tile>,
    pub rewards: Vec<RewardKind>,
}

impl PlayerState {
    pub fn new(identity: String) -> Self {
        Self {
            identity,
            hand: Vec::new(),
            score: 0,
            frozen: Vec::new(),
            rewards: Vec::new(),
        }
    }

    fn remove_tile(&mut self, tile: Tile) {
        if let Some(position) = self.hand.iter().position(|t| *t == tile) {
            self.hand.remove(position);
        }
    }
}

/// What a committed command did, for broadcasting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveOutcome {
    pub notifications: Vec<String>,
    pub triggered: Vec<TriggeredHazard>,
    pub words: Vec<String>,
    pub score_gained: u32,
    pub timed_out: bool,
}

/// A placement that passed every check, ready to commit or preview.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub board: Board,
    pub placed: Vec<PlacedTile>,
    pub words: Vec<FormedWord>,
    pub score: u32,
}

/// Validates, extracts words and scores a placement without touching the match.
pub fn evaluate_placement(
    board: &Board,
    drops: &[TileDrop],
    blocked_columns: Option<Range<usize>>,
    dictionary: &dyn Dictionary,
) -> Result<Evaluation, GameError> {
    let placed = validate_placement(board, drops, blocked_columns)?;

    let mut next = board.clone();
    for tile in &placed {
        next.place(tile.coord, tile.letter, tile.tile);
    }

    let coords: Vec<Coord> = placed.iter().map(|p| p.coord).collect();
    let words = find_all_formed_words(&next, &coords);
    if words.is_empty() {
        // a lone opening tile is the only placement allowed to spell nothing
        if board.is_empty() && placed.len() == 1 {
            return Ok(Evaluation {
                board: next,
                placed,
                words,
                score: 0,
            });
        }
        return Err(GameError::NoWordFormed);
    }
    check_words(&words, dictionary)?;

    let placed_set: HashSet<Coord> = coords.into_iter().collect();
    let score = move_score(&words, &placed_set);

    Ok(Evaluation {
        board: next,
        placed,
        words,
        score,
    })
}

/// Aggregate root of one game. Mutated only through the methods below; a
/// command that returns `Err` leaves the match untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub(crate) id: String,
    pub(crate) players: [PlayerState; 2],
    pub(crate) board: Board,
    pub(crate) hazards: HazardGrid,
    pub(crate) pool: LetterPool,
    pub(crate) turn: PlayerKey,
    pub(crate) status: MatchStatus,
    pub(crate) region_block: Option<RegionBlock>,
    pub(crate) extra_move_in_progress: bool,
    pub(crate) consecutive_passes: u32,
    pub(crate) time_option: String,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) last_move_time: DateTime<Utc>,
    pub(crate) event_log: Vec<EventLogEntry>,
    pub(crate) winner: Option<PlayerKey>,
    pub(crate) version: u64,
}

impl Match {
    /// A match in `Waiting`, with board, hazards and pool prepared but no
    /// tiles dealt yet.
    pub fn new(
        id: String,
        player1: String,
        player2: String,
        time_option: String,
        board: Board,
        hazards: HazardGrid,
        pool: LetterPool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            players: [PlayerState::new(player1), PlayerState::new(player2)],
            board,
            hazards,
            pool,
            turn: PlayerKey::Player1,
            status: MatchStatus::Waiting,
            region_block: None,
            extra_move_in_progress: false,
            consecutive_passes: 0,
            time_option,
            started_at: now,
            last_move_time: now,
            event_log: Vec::new(),
            winner: None,
            version: 0,
        }
    }

    /// Builds and starts a fresh match between two players.
    pub fn new_game<R: Rng + ?Sized>(
        id: String,
        player1: String,
        player2: String,
        time_option: String,
        config: &GameConfig,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<Self, GameError> {
        let board = Board::new();
        let hazards = assign_hazards(&board, &config.hazards, rng);
        let pool = LetterPool::generate(rng);

        let mut game = Self::new(id, player1, player2, time_option, board, hazards, pool, now);
        game.start(rng, now)?;
        Ok(game)
    }

    /// `Waiting -> Active`: deals both hands and picks who opens.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R, now: DateTime<Utc>) -> Result<(), GameError> {
        if self.status != MatchStatus::Waiting {
            return Err(GameError::AlreadyStarted(self.status));
        }

        for player in self.players.iter_mut() {
            player.hand = self.pool.draw(HAND_SIZE);
        }
        self.turn = if rng.random_bool(0.5) {
            PlayerKey::Player1
        } else {
            PlayerKey::Player2
        };
        self.status = MatchStatus::Active;
        self.started_at = now;
        self.last_move_time = now;
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn hazards(&self) -> &HazardGrid {
        &self.hazards
    }

    pub fn pool(&self) -> &LetterPool {
        &self.pool
    }

    pub fn player(&self, key: PlayerKey) -> &PlayerState {
        &self.players[key.index()]
    }

    fn player_mut(&mut self, key: PlayerKey) -> &mut PlayerState {
        &mut self.players[key.index()]
    }

    pub fn identities(&self) -> [&str; 2] {
        [&self.players[0].identity, &self.players[1].identity]
    }

    pub fn key_of(&self, identity: &str) -> Option<PlayerKey> {
        [PlayerKey::Player1, PlayerKey::Player2]
            .into_iter()
            .find(|key| self.player(*key).identity == identity)
    }

    pub fn is_participant(&self, identity: &str) -> bool {
        self.key_of(identity).is_some()
    }

    pub fn turn(&self) -> PlayerKey {
        self.turn
    }

    pub fn turn_identity(&self) -> &str {
        &self.player(self.turn).identity
    }

    pub fn region_block(&self) -> Option<RegionBlock> {
        self.region_block
    }

    pub fn extra_move_in_progress(&self) -> bool {
        self.extra_move_in_progress
    }

    pub fn consecutive_passes(&self) -> u32 {
        self.consecutive_passes
    }

    pub fn time_option(&self) -> &str {
        &self.time_option
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn last_move_time(&self) -> DateTime<Utc> {
        self.last_move_time
    }

    pub fn event_log(&self) -> &[EventLogEntry] {
        &self.event_log
    }

    pub fn winner(&self) -> Option<PlayerKey> {
        self.winner
    }

    pub fn winner_identity(&self) -> Option<&str> {
        self.winner.map(|key| self.player(key).identity.as_str())
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    pub fn involves_bot(&self) -> bool {
        self.players.iter().any(|p| p.identity == BOT_IDENTITY)
    }

    /// Budget for the move currently awaited.
    pub fn time_budget(&self, config: &GameConfig) -> Duration {
        if self.board.is_empty() {
            config.first_move_budget
        } else {
            parse_time_option(&self.time_option)
        }
    }

    pub fn is_timed_out(&self, config: &GameConfig, now: DateTime<Utc>) -> bool {
        now - self.last_move_time >= self.time_budget(config)
    }

    fn ensure_active(&self) -> Result<(), GameError> {
        if self.status == MatchStatus::Active {
            Ok(())
        } else {
            Err(GameError::NotActive(self.status))
        }
    }

    fn participant(&self, identity: &str) -> Result<PlayerKey, GameError> {
        self.ensure_active()?;
        self.key_of(identity).ok_or(GameError::NotParticipant)
    }

    /// Runs one move end to end. A move arriving after the time budget ran
    /// out is not played, nor even parsed; instead the mover forfeits.
    pub fn apply_move(
        &mut self,
        identity: &str,
        request: &MoveRequest,
        dictionary: &dyn Dictionary,
        config: &GameConfig,
        now: DateTime<Utc>,
    ) -> Result<MoveOutcome, GameError> {
        let mover = self.participant(identity)?;
        if self.turn != mover {
            return Err(GameError::NotYourTurn);
        }

        if self.is_timed_out(config, now) {
            return Ok(self.forfeit_on_time(mover, now));
        }

        let mv = request.parse()?;
        let had_extra_move = self.extra_move_in_progress;
        let (mut outcome, earned_extra_move) = match mv {
            Move::Pass => (self.pass(mover, now), false),
            Move::Shift { from, to } => (self.shift(mover, from, to, now)?, false),
            Move::Place(drops) => self.place(mover, &drops, dictionary, now)?,
        };

        self.last_move_time = now;
        if self.status == MatchStatus::Active {
            self.hand_off(mover, had_extra_move, earned_extra_move, now, &mut outcome);
        } else {
            outcome.notifications.push(self.game_over_message());
        }
        Ok(outcome)
    }

    fn pass(&mut self, mover: PlayerKey, now: DateTime<Utc>) -> MoveOutcome {
        let identity = self.player(mover).identity.clone();
        self.consecutive_passes += 1;
        self.event_log.push(EventLogEntry::Pass {
            player: identity.clone(),
            timestamp: now,
        });

        if self.consecutive_passes >= PASSES_TO_FINISH {
            self.finish(MatchStatus::FinishedPass, None);
        }

        MoveOutcome {
            notifications: vec![format!("{} passed.", identity)],
            ..MoveOutcome::default()
        }
    }

    fn shift(
        &mut self,
        mover: PlayerKey,
        from: Coord,
        to: Coord,
        now: DateTime<Utc>,
    ) -> Result<MoveOutcome, GameError> {
        if !self.board.is_occupied(from) {
            return Err(GameError::ShiftSourceEmpty(from));
        }
        if self.board.is_occupied(to) {
            return Err(GameError::Occupied(to));
        }
        if from.distance(&to) != 1 {
            return Err(GameError::ShiftTooFar);
        }
        let blocked = self.region_block.and_then(|b| b.blocked_columns(mover));
        if blocked.is_some_and(|columns| columns.contains(&to.col)) {
            return Err(GameError::RegionBlocked(to));
        }

        self.board.relocate(from, to);
        self.consecutive_passes = 0;
        self.extra_move_in_progress = false;

        let identity = self.player(mover).identity.clone();
        self.event_log.push(EventLogEntry::Shift {
            player: identity.clone(),
            from,
            to,
            timestamp: now,
        });

        Ok(MoveOutcome {
            notifications: vec![format!("{} shifted a letter: {} -> {}", identity, from, to)],
            ..MoveOutcome::default()
        })
    }

    fn place(
        &mut self,
        mover: PlayerKey,
        drops: &[TileDrop],
        dictionary: &dyn Dictionary,
        now: DateTime<Utc>,
    ) -> Result<(MoveOutcome, bool), GameError> {
        let player = self.player(mover);
        check_hand(&player.hand, &player.frozen, drops)?;
        let blocked = self.region_block.and_then(|b| b.blocked_columns(mover));
        let evaluation = evaluate_placement(&self.board, drops, blocked, dictionary)?;

        // Everything below commits.
        let coords: Vec<Coord> = evaluation.placed.iter().map(|p| p.coord).collect();
        let effects = resolve_effects(&mut self.hazards, &coords, evaluation.score);
        self.board = evaluation.board;
        self.consecutive_passes = 0;

        let identity = self.player(mover).identity.clone();
        let opponent_identity = self.player(mover.opponent()).identity.clone();
        let words: Vec<String> = evaluation.words.iter().map(|w| w.word.clone()).collect();

        let player = self.player_mut(mover);
        for tile in &evaluation.placed {
            player.remove_tile(tile.tile);
        }
        player.score += effects.final_score;
        player.rewards.extend(effects.rewards.iter().copied());
        if effects.lose_hand {
            player.hand.clear();
        }
        let missing = HAND_SIZE.saturating_sub(player.hand.len());
        let drawn = self.pool.draw(missing);
        self.player_mut(mover).hand.extend(drawn);
        self.player_mut(mover.opponent()).score += effects.transferred;

        self.event_log.push(EventLogEntry::PlaceWord {
            player: identity.clone(),
            tiles: evaluation
                .placed
                .iter()
                .map(|p| LoggedTile {
                    coord: p.coord,
                    tile: p.tile,
                    letter: p.letter,
                })
                .collect(),
            words: words.clone(),
            score_before_effects: effects.base_score,
            score_after_effects: effects.final_score,
            timestamp: now,
        });

        let mut notifications = Vec::new();
        if words.is_empty() {
            notifications.push(format!("{} opened with a single letter.", identity));
        } else {
            notifications.push(format!(
                "{} formed {} ({} points)",
                identity,
                words.join(", "),
                effects.base_score
            ));
        }
        let placed_set: HashSet<Coord> = coords.iter().copied().collect();
        if is_bingo(&placed_set) {
            notifications.push(format!("{} played all seven tiles! (+{})", identity, BINGO_BONUS));
        }

        for hit in &effects.triggered {
            match hit.hazard {
                Hazard::Mine(kind) => {
                    self.event_log.push(EventLogEntry::MineTriggered {
                        player: identity.clone(),
                        kind,
                        coord: hit.coord,
                        effect_description: hit.description.clone(),
                        timestamp: now,
                    });
                    notifications.push(format!("Mine at {}: {}", hit.coord, hit.description));
                }
                Hazard::Reward(kind) => {
                    self.event_log.push(EventLogEntry::RewardEarned {
                        player: identity.clone(),
                        kind,
                        coord: hit.coord,
                        timestamp: now,
                    });
                    notifications.push(format!("Reward at {}: {}", hit.coord, hit.description));
                }
            }
        }
        if effects.transferred > 0 {
            notifications.push(format!(
                "{} points went to {}.",
                effects.transferred, opponent_identity
            ));
        }

        if self.player(mover).hand.is_empty() {
            self.finish(MatchStatus::FinishedHand, Some(mover));
        }

        let outcome = MoveOutcome {
            notifications,
            triggered: effects.triggered,
            words,
            score_gained: effects.final_score,
            timed_out: false,
        };
        Ok((outcome, effects.extra_move))
    }

    fn hand_off(
        &mut self,
        mover: PlayerKey,
        had_extra_move: bool,
        earned_extra_move: bool,
        now: DateTime<Utc>,
        outcome: &mut MoveOutcome,
    ) {
        let identity = self.player(mover).identity.clone();
        if had_extra_move {
            self.extra_move_in_progress = false;
            self.turn = mover.opponent();
            self.event_log.push(EventLogEntry::ExtraMoveUsed {
                player: identity.clone(),
                timestamp: now,
            });
            outcome
                .notifications
                .push(format!("{} used their extra move.", identity));
        } else if earned_extra_move {
            self.extra_move_in_progress = true;
            outcome
                .notifications
                .push(format!("{} earned an extra move!", identity));
        } else {
            self.turn = mover.opponent();
        }

        // a region ban lasts for one move of the blocked player
        if self
            .region_block
            .is_some_and(|b| b.blocked_columns(mover).is_some())
        {
            self.region_block = None;
        }

        let next = self.turn;
        self.player_mut(next).frozen.clear();
    }

    fn forfeit_on_time(&mut self, mover: PlayerKey, now: DateTime<Utc>) -> MoveOutcome {
        let identity = self.player(mover).identity.clone();
        self.event_log.push(EventLogEntry::Timeout {
            player: identity.clone(),
            timestamp: now,
        });
        self.finish(MatchStatus::FinishedTimeout, Some(mover.opponent()));

        MoveOutcome {
            notifications: vec![
                format!("{} ran out of time.", identity),
                self.game_over_message(),
            ],
            timed_out: true,
            ..MoveOutcome::default()
        }
    }

    /// Ends the match for `identity`; the opponent wins.
    pub fn surrender(&mut self, identity: &str, now: DateTime<Utc>) -> Result<MoveOutcome, GameError> {
        let mover = self.participant(identity)?;
        self.event_log.push(EventLogEntry::Surrender {
            player: identity.to_string(),
            timestamp: now,
        });
        self.finish(MatchStatus::FinishedSurrender, Some(mover.opponent()));

        Ok(MoveOutcome {
            notifications: vec![
                format!("{} surrendered.", identity),
                self.game_over_message(),
            ],
            ..MoveOutcome::default()
        })
    }

    /// Spends a reward from the caller's inventory against the opponent.
    /// Extra moves take effect when uncovered and are never held, so they
    /// cannot be spent here.
    pub fn use_reward(
        &mut self,
        identity: &str,
        kind: RewardKind,
        now: DateTime<Utc>,
    ) -> Result<String, GameError> {
        let me = self.participant(identity)?;
        let spend: fn(&mut Self, PlayerKey) -> String = match kind {
            RewardKind::RegionBan => Self::ban_region,
            RewardKind::LetterBan => Self::freeze_letters,
            RewardKind::ExtraMove => return Err(GameError::RewardNotHeld(kind)),
        };
        let slot = self
            .player(me)
            .rewards
            .iter()
            .position(|r| *r == kind)
            .ok_or(GameError::RewardUnavailable(kind))?;

        let message = spend(self, me);
        self.player_mut(me).rewards.remove(slot);
        self.event_log.push(EventLogEntry::RewardUsed {
            player: identity.to_string(),
            kind,
            timestamp: now,
        });
        Ok(message)
    }

    fn ban_region(&mut self, me: PlayerKey) -> String {
        self.region_block = Some(match me {
            PlayerKey::Player1 => RegionBlock::Right,
            PlayerKey::Player2 => RegionBlock::Left,
        });
        format!(
            "{} closed half of the board to {}.",
            self.player(me).identity,
            self.player(me.opponent()).identity
        )
    }

    fn freeze_letters(&mut self, me: PlayerKey) -> String {
        let opponent = me.opponent();
        let frozen: Vec<Tile> = self.player(opponent).hand.iter().take(2).copied().collect();
        self.player_mut(opponent).frozen.extend(frozen.iter().copied());
        format!(
            "{} froze {} of {}'s letters.",
            self.player(me).identity,
            frozen.len(),
            self.player(opponent).identity
        )
    }

    /// Scores a placement for a participant without committing anything.
    /// Hidden hazards are not consulted.
    pub fn preview(
        &self,
        identity: &str,
        drops: &[TileDrop],
        dictionary: &dyn Dictionary,
    ) -> Result<Evaluation, GameError> {
        let me = self.participant(identity)?;
        let player = self.player(me);
        check_hand(&player.hand, &player.frozen, drops)?;
        let blocked = self.region_block.and_then(|b| b.blocked_columns(me));
        evaluate_placement(&self.board, drops, blocked, dictionary)
    }

    fn leader(&self) -> Option<PlayerKey> {
        let (one, two) = (self.players[0].score, self.players[1].score);
        match one.cmp(&two) {
            std::cmp::Ordering::Greater => Some(PlayerKey::Player1),
            std::cmp::Ordering::Less => Some(PlayerKey::Player2),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Moves the match into a terminal state. Without an explicit winner
    /// the higher score wins. Running out of tiles also hands the loser's
    /// rack value to the finisher before the winner is settled by score.
    fn finish(&mut self, status: MatchStatus, winner: Option<PlayerKey>) {
        self.status = status;
        self.extra_move_in_progress = false;
        self.winner = winner.or_else(|| self.leader());

        if status == MatchStatus::FinishedHand {
            if let Some(finisher) = self.winner {
                let loser = finisher.opponent();
                let value = rack_value(&self.player(loser).hand);
                let loser_state = self.player_mut(loser);
                loser_state.score = loser_state.score.saturating_sub(value);
                self.player_mut(finisher).score += value;
                self.winner = self.leader();
            }
        }
    }

    fn game_over_message(&self) -> String {
        match self.winner_identity() {
            Some(winner) => format!("Game over! Winner: {}", winner),
            None => "Game over! It's a draw.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::builder::MatchBuilder;
    use crate::game::dictionary::{PermissiveDictionary, WordList};
    use crate::game::hazards::MineKind;
    use crate::game::letters::letter_points;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;

    fn tiles(letters: &str) -> Vec<Tile> {
        letters.chars().map(Tile::Letter).collect()
    }

    fn play(game: &mut Match, who: &str, request: MoveRequest) -> Result<MoveOutcome, GameError> {
        let now = game.last_move_time() + Duration::seconds(5);
        play_at(game, who, request, now)
    }

    fn play_at(
        game: &mut Match,
        who: &str,
        request: MoveRequest,
        now: DateTime<Utc>,
    ) -> Result<MoveOutcome, GameError> {
        game.apply_move(who, &request, &PermissiveDictionary, &GameConfig::default(), now)
    }

    fn kale_through_center() -> MoveRequest {
        MoveRequest::place(vec![[7, 7], [7, 8], [7, 9], [7, 10]], &["K", "A", "L", "E"])
    }

    #[test]
    fn test_new_game_deals_hands_and_hazards() {
        let mut rng = StdRng::seed_from_u64(11);
        let game = Match::new_game(
            "m1".to_string(),
            "alice".to_string(),
            "bob".to_string(),
            "5m".to_string(),
            &GameConfig::default(),
            &mut rng,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(game.status(), MatchStatus::Active);
        assert_eq!(game.player(PlayerKey::Player1).hand.len(), HAND_SIZE);
        assert_eq!(game.player(PlayerKey::Player2).hand.len(), HAND_SIZE);
        assert_eq!(game.pool().len(), 99 - 14);
        assert_eq!(game.hazards().count(), 23);
        assert!(game.board().is_empty());
    }

    #[test]
    fn test_start_only_from_waiting() {
        let mut game = MatchBuilder::new("alice", "bob").build();
        let result = game.start(&mut StdRng::seed_from_u64(1), Utc::now());
        assert_eq!(result, Err(GameError::AlreadyStarted(MatchStatus::Active)));
    }

    #[test]
    fn test_kale_through_center_scores_literal_sum() {
        let mut game = MatchBuilder::new("alice", "bob")
            .letters(&[(7, 7, 'E')])
            .hand(PlayerKey::Player1, tiles("KALMNRS"))
            .pool(tiles("AAAA"))
            .build();

        // K A L down column 7 onto the existing E; none of the new cells is a premium
        let request = MoveRequest::place(vec![[4, 7], [5, 7], [6, 7]], &["K", "A", "L"]);
        let outcome = play(&mut game, "alice", request).unwrap();

        let letters: u32 = "KALE".chars().map(|c| letter_points(c).unwrap()).sum();
        assert_eq!(outcome.words, vec!["KALE".to_string()]);
        assert_eq!(game.player(PlayerKey::Player1).score, letters);
        assert_eq!(game.player(PlayerKey::Player1).hand.len(), 4 + 3);
        assert_eq!(game.turn(), PlayerKey::Player2);
    }

    #[test]
    fn test_opening_word_is_doubled_by_start_cell() {
        let mut game = MatchBuilder::new("alice", "bob")
            .hand(PlayerKey::Player1, tiles("KALEMNR"))
            .pool(tiles("AAAA"))
            .build();

        play(&mut game, "alice", kale_through_center()).unwrap();

        assert_eq!(game.player(PlayerKey::Player1).score, 4 * 2);
        assert_eq!(game.player(PlayerKey::Player1).hand.len(), HAND_SIZE);
    }

    #[test]
    fn test_single_center_tile_opens_with_zero() {
        let mut game = MatchBuilder::new("alice", "bob")
            .hand(PlayerKey::Player1, tiles("A"))
            .pool(tiles("EEEEEEE"))
            .build();

        let outcome = play(&mut game, "alice", MoveRequest::place(vec![[7, 7]], &["A"])).unwrap();

        assert!(outcome.words.is_empty());
        assert_eq!(game.player(PlayerKey::Player1).score, 0);
        assert_eq!(game.board().letter_at(CENTER), Some('A'));
    }

    #[test]
    fn test_single_off_center_tile_is_rejected() {
        let mut game = MatchBuilder::new("alice", "bob")
            .hand(PlayerKey::Player1, tiles("A"))
            .build();
        let before = game.clone();

        let result = play(&mut game, "alice", MoveRequest::place(vec![[7, 8]], &["A"]));
        assert_eq!(result, Err(GameError::CenterNotCovered));
        assert_eq!(game, before);
    }

    #[test]
    fn test_joker_contributes_nothing() {
        let mut game = MatchBuilder::new("alice", "bob")
            .hand(PlayerKey::Player1, vec![Tile::Joker, Tile::Letter('A')])
            .pool(tiles("EEEEEEE"))
            .build();

        let request =
            MoveRequest::place(vec![[7, 7], [7, 8]], &["JOKER", "A"]).with_joker(7, 7, "J");
        play(&mut game, "alice", request).unwrap();

        // "JA" on the start cell: (0 + 1) * 2
        assert_eq!(game.player(PlayerKey::Player1).score, 2);
        assert_eq!(game.board().letter_at(CENTER), Some('J'));
        assert_eq!(game.board().cell(CENTER).original_tile, Some(Tile::Joker));
    }

    #[test]
    fn test_wrong_turn_and_outsider() {
        let mut game = MatchBuilder::new("alice", "bob").build();

        assert_eq!(
            play(&mut game, "bob", MoveRequest::pass()),
            Err(GameError::NotYourTurn)
        );
        assert_eq!(
            play(&mut game, "mallory", MoveRequest::pass()),
            Err(GameError::NotParticipant)
        );
    }

    #[test]
    fn test_invalid_word_rejects_whole_move() {
        let mut game = MatchBuilder::new("alice", "bob")
            .hand(PlayerKey::Player1, tiles("KALE"))
            .build();
        let before = game.clone();
        let dictionary = WordList::from_words(["ev"]);

        let result = game.apply_move("alice", &kale_through_center(), &dictionary, &GameConfig::default(), Utc::now());

        assert_eq!(result, Err(GameError::InvalidWords(vec!["KALE".to_string()])));
        assert_eq!(game, before);
    }

    #[test]
    fn test_two_passes_finish_with_leader_winning() {
        let mut game = MatchBuilder::new("alice", "bob")
            .score(PlayerKey::Player2, 12)
            .build();

        play(&mut game, "alice", MoveRequest::pass()).unwrap();
        assert_eq!(game.status(), MatchStatus::Active);
        assert_eq!(game.consecutive_passes(), 1);

        play(&mut game, "bob", MoveRequest::pass()).unwrap();
        assert_eq!(game.status(), MatchStatus::FinishedPass);
        assert_eq!(game.winner_identity(), Some("bob"));
    }

    #[test]
    fn test_two_passes_with_equal_scores_is_a_draw() {
        let mut game = MatchBuilder::new("alice", "bob").build();

        play(&mut game, "alice", MoveRequest::pass()).unwrap();
        let outcome = play(&mut game, "bob", MoveRequest::pass()).unwrap();

        assert_eq!(game.status(), MatchStatus::FinishedPass);
        assert_eq!(game.winner(), None);
        assert!(outcome.notifications.iter().any(|n| n.contains("draw")));
    }

    #[test]
    fn test_placement_resets_pass_counter() {
        let mut game = MatchBuilder::new("alice", "bob")
            .hand(PlayerKey::Player2, tiles("A"))
            .pool(tiles("EEEEEEE"))
            .build();

        play(&mut game, "alice", MoveRequest::pass()).unwrap();
        play(&mut game, "bob", MoveRequest::place(vec![[7, 7]], &["A"])).unwrap();
        assert_eq!(game.consecutive_passes(), 0);

        play(&mut game, "alice", MoveRequest::pass()).unwrap();
        assert_eq!(game.status(), MatchStatus::Active);
    }

    #[test]
    fn test_emptying_hand_with_empty_pool_finishes_and_transfers_rack() {
        let mut game = MatchBuilder::new("alice", "bob")
            .letters(&[(7, 7, 'E')])
            .hand(PlayerKey::Player1, tiles("V"))
            .hand(PlayerKey::Player2, tiles("JĞ"))
            .score(PlayerKey::Player1, 3)
            .score(PlayerKey::Player2, 10)
            .build();

        play(&mut game, "alice", MoveRequest::place(vec![[7, 8]], &["V"])).unwrap();

        // EV = 1 + 7; bob's rack J(10) + Ğ(8) moves to alice, bob floors at 0
        assert_eq!(game.status(), MatchStatus::FinishedHand);
        assert_eq!(game.player(PlayerKey::Player1).score, 3 + 8 + 18);
        assert_eq!(game.player(PlayerKey::Player2).score, 0);
        assert_eq!(game.winner_identity(), Some("alice"));
    }

    #[test]
    fn test_hand_finish_winner_is_recomputed_from_scores() {
        let mut game = MatchBuilder::new("alice", "bob")
            .letters(&[(7, 7, 'E')])
            .hand(PlayerKey::Player1, tiles("N"))
            .hand(PlayerKey::Player2, tiles("A"))
            .score(PlayerKey::Player2, 50)
            .build();

        play(&mut game, "alice", MoveRequest::place(vec![[7, 8]], &["N"])).unwrap();

        assert_eq!(game.status(), MatchStatus::FinishedHand);
        assert_eq!(game.player(PlayerKey::Player1).score, 2 + 1);
        assert_eq!(game.player(PlayerKey::Player2).score, 49);
        assert_eq!(game.winner_identity(), Some("bob"));
    }

    #[test]
    fn test_late_move_forfeits_regardless_of_legality() {
        let mut game = MatchBuilder::new("alice", "bob")
            .letters(&[(7, 7, 'E')])
            .time_option("2m")
            .build();
        let late = game.last_move_time() + Duration::seconds(121);

        // not in hand and nowhere near a letter, but the clock decides first
        let outcome =
            play_at(&mut game, "alice", MoveRequest::place(vec![[0, 0]], &["A"]), late).unwrap();
        assert!(outcome.timed_out);
        assert_eq!(game.status(), MatchStatus::FinishedTimeout);
        assert_eq!(game.winner_identity(), Some("bob"));
        assert!(game.board().letter_at(Coord::new(0, 0)).is_none());
    }

    #[rstest]
    #[case::unknown_tile(MoveRequest::place(vec![[7, 8]], &["Q"]))]
    #[case::off_board(MoveRequest::place(vec![[7, 15]], &["A"]))]
    #[case::bad_shift(MoveRequest { positions: vec![[7, 7]], ..MoveRequest::shift([7, 7], [7, 8]) })]
    #[case::unknown_type(MoveRequest { move_type: "swap".into(), ..MoveRequest::default() })]
    fn test_late_malformed_move_still_forfeits(#[case] request: MoveRequest) {
        let mut game = MatchBuilder::new("alice", "bob")
            .letters(&[(7, 7, 'E')])
            .time_option("2m")
            .build();
        let late = game.last_move_time() + Duration::seconds(600);

        let outcome = play_at(&mut game, "alice", request, late).unwrap();
        assert!(outcome.timed_out);
        assert_eq!(game.status(), MatchStatus::FinishedTimeout);
        assert_eq!(game.winner_identity(), Some("bob"));
    }

    #[test]
    fn test_stray_tile_along_the_line_is_rejected() {
        let mut game = MatchBuilder::new("alice", "bob")
            .letters(&[(7, 7, 'E')])
            .hand(PlayerKey::Player1, tiles("VZ"))
            .build();

        let result = play(
            &mut game,
            "alice",
            MoveRequest::place(vec![[7, 8], [7, 13]], &["V", "Z"]),
        );
        assert_eq!(result, Err(GameError::GapInPlacement(Coord::new(7, 9))));
        assert!(game.board().letter_at(Coord::new(7, 13)).is_none());
        assert_eq!(game.player(PlayerKey::Player1).hand, tiles("VZ"));
    }

    #[test]
    fn test_malformed_move_in_time_is_rejected() {
        let mut game = MatchBuilder::new("alice", "bob")
            .letters(&[(7, 7, 'E')])
            .build();

        let result = play(&mut game, "alice", MoveRequest::place(vec![[7, 8]], &["Q"]));
        assert!(matches!(result, Err(GameError::UnknownTile(_))));
        assert_eq!(game.status(), MatchStatus::Active);
    }

    #[test]
    fn test_first_move_gets_extended_budget() {
        let mut game = MatchBuilder::new("alice", "bob").time_option("2m").build();
        let later = game.last_move_time() + Duration::minutes(30);

        play_at(&mut game, "alice", MoveRequest::pass(), later).unwrap();
        assert_eq!(game.status(), MatchStatus::Active);
    }

    #[test]
    fn test_shift_moves_one_cell() {
        let mut game = MatchBuilder::new("alice", "bob")
            .letters(&[(7, 7, 'E')])
            .build();
        game.consecutive_passes = 1;

        assert_eq!(
            play(&mut game, "alice", MoveRequest::shift([7, 7], [7, 9])),
            Err(GameError::ShiftTooFar)
        );
        assert_eq!(
            play(&mut game, "alice", MoveRequest::shift([6, 6], [6, 7])),
            Err(GameError::ShiftSourceEmpty(Coord::new(6, 6)))
        );

        play(&mut game, "alice", MoveRequest::shift([7, 7], [8, 8])).unwrap();
        assert_eq!(game.board().letter_at(Coord::new(8, 8)), Some('E'));
        assert!(!game.board().is_occupied(CENTER));
        assert_eq!(game.consecutive_passes(), 0);
        assert_eq!(game.turn(), PlayerKey::Player2);
    }

    #[test]
    fn test_extra_move_keeps_turn_once() {
        let mut game = MatchBuilder::new("alice", "bob")
            .hand(PlayerKey::Player1, tiles("KALEKAL"))
            .pool(tiles("EEEEEEEEEE"))
            .hazard(Coord::new(7, 8), Hazard::Reward(RewardKind::ExtraMove))
            .build();

        let outcome = play(&mut game, "alice", kale_through_center()).unwrap();
        assert_eq!(game.turn(), PlayerKey::Player1);
        assert!(game.extra_move_in_progress());
        assert!(outcome.notifications.iter().any(|n| n.contains("extra move")));

        play(&mut game, "alice", MoveRequest::pass()).unwrap();
        assert_eq!(game.turn(), PlayerKey::Player2);
        assert!(!game.extra_move_in_progress());
        assert!(game
            .event_log()
            .iter()
            .any(|e| matches!(e, EventLogEntry::ExtraMoveUsed { .. })));
    }

    #[test]
    fn test_score_transfer_credits_opponent() {
        let mut game = MatchBuilder::new("alice", "bob")
            .letters(&[(7, 7, 'E')])
            .hand(PlayerKey::Player1, tiles("VJ"))
            .pool(tiles("AAAAAAA"))
            .hazard(Coord::new(7, 8), Hazard::Mine(MineKind::ScoreTransfer))
            .build();

        let request = MoveRequest::place(vec![[7, 8], [7, 9]], &["V", "J"]);
        let outcome = play(&mut game, "alice", request).unwrap();

        // E V J = 1 + 7 + 10, no premiums touched
        assert_eq!(outcome.score_gained, 0);
        assert_eq!(game.player(PlayerKey::Player1).score, 0);
        assert_eq!(game.player(PlayerKey::Player2).score, 18);
    }

    #[test]
    fn test_letter_loss_redraws_full_hand() {
        let mut game = MatchBuilder::new("alice", "bob")
            .letters(&[(7, 7, 'E')])
            .hand(PlayerKey::Player1, tiles("VKKKKKK"))
            .pool(tiles("AAAAAAAAAA"))
            .hazard(Coord::new(7, 8), Hazard::Mine(MineKind::LetterLoss))
            .build();

        play(&mut game, "alice", MoveRequest::place(vec![[7, 8]], &["V"])).unwrap();

        assert_eq!(game.player(PlayerKey::Player1).hand, tiles("AAAAAAA"));
        assert_eq!(game.pool().len(), 3);
    }

    #[test]
    fn test_hazard_fires_only_once() {
        let mut game = MatchBuilder::new("alice", "bob")
            .letters(&[(7, 7, 'E')])
            .hand(PlayerKey::Player1, tiles("V"))
            .pool(tiles("AAAAAAAAAA"))
            .hazard(Coord::new(7, 8), Hazard::Mine(MineKind::WordCancel))
            .build();

        let outcome = play(&mut game, "alice", MoveRequest::place(vec![[7, 8]], &["V"])).unwrap();
        assert_eq!(outcome.triggered.len(), 1);
        assert!(game.hazards().get(Coord::new(7, 8)).is_none());
    }

    #[test]
    fn test_region_ban_blocks_opponent_half_for_one_move() {
        let mut game = MatchBuilder::new("alice", "bob")
            .letters(&[(7, 7, 'E')])
            .hand(PlayerKey::Player2, tiles("VV"))
            .pool(tiles("AAAAAAAAAA"))
            .reward(PlayerKey::Player1, RewardKind::RegionBan)
            .build();

        game.use_reward("alice", RewardKind::RegionBan, Utc::now()).unwrap();
        assert_eq!(game.region_block(), Some(RegionBlock::Right));
        assert!(game.player(PlayerKey::Player1).rewards.is_empty());

        play(&mut game, "alice", MoveRequest::pass()).unwrap();
        assert_eq!(
            play(&mut game, "bob", MoveRequest::place(vec![[7, 8]], &["V"])),
            Err(GameError::RegionBlocked(Coord::new(7, 8)))
        );
        play(&mut game, "bob", MoveRequest::place(vec![[7, 6]], &["V"])).unwrap();
        assert_eq!(game.region_block(), None);
    }

    #[test]
    fn test_letter_ban_freezes_opponent_tiles_until_their_turn_returns() {
        let mut game = MatchBuilder::new("alice", "bob")
            .letters(&[(7, 7, 'E')])
            .hand(PlayerKey::Player1, tiles("VNR"))
            .pool(tiles("AAAAAAAAAA"))
            .turn(PlayerKey::Player1)
            .reward(PlayerKey::Player2, RewardKind::LetterBan)
            .build();

        game.use_reward("bob", RewardKind::LetterBan, Utc::now()).unwrap();
        assert_eq!(game.player(PlayerKey::Player1).frozen, tiles("VN"));

        assert_eq!(
            play(&mut game, "alice", MoveRequest::place(vec![[7, 8]], &["V"])),
            Err(GameError::FrozenTile(Tile::Letter('V')))
        );
        play(&mut game, "alice", MoveRequest::pass()).unwrap();
        assert_eq!(game.player(PlayerKey::Player1).frozen, tiles("VN"));

        play(&mut game, "bob", MoveRequest::shift([7, 7], [6, 6])).unwrap();
        assert!(game.player(PlayerKey::Player1).frozen.is_empty());
    }

    #[test]
    fn test_missing_reward_is_rejected() {
        let mut game = MatchBuilder::new("alice", "bob").build();
        assert_eq!(
            game.use_reward("alice", RewardKind::LetterBan, Utc::now()),
            Err(GameError::RewardUnavailable(RewardKind::LetterBan))
        );
    }

    #[test]
    fn test_extra_move_cannot_be_spent() {
        let mut game = MatchBuilder::new("alice", "bob")
            .reward(PlayerKey::Player1, RewardKind::ExtraMove)
            .build();
        assert_eq!(
            game.use_reward("alice", RewardKind::ExtraMove, Utc::now()),
            Err(GameError::RewardNotHeld(RewardKind::ExtraMove))
        );
        assert!(!game.extra_move_in_progress());
        assert_eq!(game.turn(), PlayerKey::Player1);
    }

    #[test]
    fn test_surrender_hands_win_to_opponent() {
        let mut game = MatchBuilder::new("alice", "bob")
            .score(PlayerKey::Player1, 90)
            .build();

        game.surrender("alice", Utc::now()).unwrap();
        assert_eq!(game.status(), MatchStatus::FinishedSurrender);
        assert_eq!(game.winner_identity(), Some("bob"));

        assert_eq!(
            game.surrender("bob", Utc::now()).unwrap_err(),
            GameError::NotActive(MatchStatus::FinishedSurrender)
        );
    }

    #[test]
    fn test_preview_does_not_mutate() {
        let game = MatchBuilder::new("alice", "bob")
            .hand(PlayerKey::Player1, tiles("KALE"))
            .hazard(Coord::new(7, 8), Hazard::Mine(MineKind::WordCancel))
            .build();
        let before = game.clone();

        let Move::Place(drops) = kale_through_center().parse().unwrap() else {
            panic!("expected placement");
        };
        let evaluation = game.preview("bob", &drops, &PermissiveDictionary);
        assert!(matches!(evaluation, Err(GameError::TileNotInHand(_))));

        let evaluation = game.preview("alice", &drops, &PermissiveDictionary).unwrap();
        assert_eq!(evaluation.score, 4 * 2);
        assert_eq!(game, before);
    }

    #[test]
    fn test_round_trip_preserves_legality() {
        let mut game = MatchBuilder::new("alice", "bob")
            .letters(&[(7, 7, 'E')])
            .hand(PlayerKey::Player1, tiles("VA"))
            .pool(tiles("KKKK"))
            .build();
        let json = serde_json::to_string(&game).unwrap();
        let mut reloaded: Match = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, game);

        let now = game.last_move_time() + Duration::seconds(1);
        for request in [
            MoveRequest::place(vec![[7, 8], [7, 9]], &["V", "A"]),
            MoveRequest::place(vec![[3, 3]], &["V"]),
        ] {
            let original = play_at(&mut game.clone(), "alice", request.clone(), now);
            let restored = play_at(&mut reloaded.clone(), "alice", request, now);
            assert_eq!(original, restored);
        }
    }
}
