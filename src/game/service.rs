use chrono::Utc;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{debug, info, instrument, warn};

use super::config::{is_valid_time_option, GameConfig};
use super::core::{Match, MoveOutcome};
use super::dictionary::Dictionary;
use super::errors::{ErrorKind, GameError};
use super::hazards::RewardKind;
use super::moves::{MoveRequest, PreviewRequest, PreviewResponse};
use super::projection::{MatchSummary, MatchView};
use super::repository::MatchRepository;
use crate::shared::AppError;
use crate::stats::{StatsService, UserStats};
use crate::websockets::{ConnectionManager, WebSocketMessage};

/// Runs every command against a match as one critical section:
/// load, apply, persist, then broadcast to the match room.
pub struct GameService {
    repository: Arc<dyn MatchRepository>,
    stats: Arc<StatsService>,
    connections: Arc<dyn ConnectionManager>,
    dictionary: Arc<dyn Dictionary>,
    config: GameConfig,
    match_mutexes: Arc<RwLock<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl GameService {
    pub fn new(
        repository: Arc<dyn MatchRepository>,
        stats: Arc<StatsService>,
        connections: Arc<dyn ConnectionManager>,
        dictionary: Arc<dyn Dictionary>,
        config: GameConfig,
    ) -> Self {
        Self {
            repository,
            stats,
            connections,
            dictionary,
            config,
            match_mutexes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Creates, starts and stores a match between two players.
    #[instrument(skip(self))]
    pub async fn create_match(
        &self,
        player1: &str,
        player2: &str,
        time_option: &str,
    ) -> Result<Match, AppError> {
        if player1.trim().is_empty() || player2.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Player identities cannot be empty".to_string(),
            ));
        }
        if player1 == player2 {
            return Err(AppError::BadRequest(
                "A player cannot be matched against themselves".to_string(),
            ));
        }
        if !is_valid_time_option(time_option) {
            return Err(AppError::BadRequest(format!(
                "Invalid time option: {}",
                time_option
            )));
        }

        let game = {
            let mut rng = rand::rng();
            Match::new_game(
                uuid::Uuid::new_v4().to_string(),
                player1.to_string(),
                player2.to_string(),
                time_option.to_string(),
                &self.config,
                &mut rng,
                Utc::now(),
            )?
        };

        self.repository.insert_match(&game).await?;
        info!(
            match_id = %game.id(),
            first_turn = %game.turn_identity(),
            "Match created"
        );
        Ok(game)
    }

    /// Applies a move for `identity` and returns the caller's new view.
    #[instrument(skip(self, request))]
    pub async fn play_move(
        &self,
        game_id: &str,
        identity: &str,
        request: &MoveRequest,
    ) -> Result<MatchView, AppError> {
        self.mutate(game_id, identity, |game, dictionary, config| {
            game.apply_move(identity, request, dictionary, config, Utc::now())
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn surrender(&self, game_id: &str, identity: &str) -> Result<MatchView, AppError> {
        self.mutate(game_id, identity, |game, _, _| {
            game.surrender(identity, Utc::now())
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn use_reward(
        &self,
        game_id: &str,
        identity: &str,
        reward_type: &str,
    ) -> Result<MatchView, AppError> {
        let kind = RewardKind::from_str(reward_type)
            .map_err(|_| AppError::from(GameError::UnknownReward(reward_type.to_string())))?;

        self.mutate(game_id, identity, |game, _, _| {
            let message = game.use_reward(identity, kind, Utc::now())?;
            Ok(MoveOutcome {
                notifications: vec![message],
                ..MoveOutcome::default()
            })
        })
        .await
    }

    /// Scores a placement without committing it. Rule violations come back
    /// as an invalid preview, not as an error.
    #[instrument(skip(self, request))]
    pub async fn preview_move(
        &self,
        game_id: &str,
        identity: &str,
        request: &PreviewRequest,
    ) -> Result<PreviewResponse, AppError> {
        let game = self.load(game_id).await?;

        let result = request
            .parse()
            .and_then(|drops| game.preview(identity, &drops, self.dictionary.as_ref()));

        match result {
            Ok(evaluation) => Ok(PreviewResponse {
                is_valid: true,
                potential_score: evaluation.score,
                message: format!(
                    "Valid move: {}",
                    evaluation
                        .words
                        .iter()
                        .map(|w| w.word.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                invalid_words: Vec::new(),
            }),
            Err(e) => match e.kind() {
                ErrorKind::Forbidden | ErrorKind::StateConflict => {
                    Err(self.reject(&game, identity, e))
                }
                _ => Ok(PreviewResponse {
                    is_valid: false,
                    potential_score: 0,
                    message: e.to_string(),
                    invalid_words: match e {
                        GameError::InvalidWords(words) => words,
                        _ => Vec::new(),
                    },
                }),
            },
        }
    }

    /// The match as seen by one of its players.
    pub async fn get_view(&self, game_id: &str, identity: &str) -> Result<MatchView, AppError> {
        let game = self.load(game_id).await?;
        if !game.is_participant(identity) {
            return Err(GameError::NotParticipant.into());
        }
        Ok(MatchView::for_viewer(&game, Some(identity)))
    }

    /// The match as seen by a room member, who may be a spectator.
    pub async fn room_view(&self, game_id: &str, identity: &str) -> Result<MatchView, AppError> {
        let game = self.load(game_id).await?;
        Ok(MatchView::for_viewer(&game, Some(identity)))
    }

    pub async fn list_matches(
        &self,
        identity: &str,
        finished: bool,
    ) -> Result<Vec<MatchSummary>, AppError> {
        let matches = self.repository.list_matches_for_player(identity).await?;
        Ok(matches
            .iter()
            .filter(|m| m.status().is_terminal() == finished)
            .filter_map(|m| MatchSummary::for_player(m, identity))
            .collect())
    }

    pub async fn user_stats(&self, identity: &str) -> Result<UserStats, AppError> {
        Ok(self.stats.user_stats(identity).await?)
    }

    /// Read-modify-write of one match under its lock. A failed command
    /// persists nothing and broadcasts nothing.
    async fn mutate<F>(&self, game_id: &str, identity: &str, command: F) -> Result<MatchView, AppError>
    where
        F: FnOnce(&mut Match, &dyn Dictionary, &GameConfig) -> Result<MoveOutcome, GameError>,
    {
        let match_lock = self.match_lock(game_id).await;
        let result = {
            let _guard = match_lock.lock().await;
            self.commit(game_id, identity, command).await
        };
        self.release_match_lock(game_id, match_lock).await;
        result
    }

    async fn commit<F>(&self, game_id: &str, identity: &str, command: F) -> Result<MatchView, AppError>
    where
        F: FnOnce(&mut Match, &dyn Dictionary, &GameConfig) -> Result<MoveOutcome, GameError>,
    {
        let mut game = self.load(game_id).await?;
        let expected_version = game.version();

        let outcome = match command(&mut game, self.dictionary.as_ref(), &self.config) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(match_id = %game_id, player = %identity, error = %e, "Command rejected");
                return Err(self.reject(&game, identity, e));
            }
        };

        let version = self.repository.update_match(&game, expected_version).await?;
        game.set_version(version);

        info!(
            match_id = %game_id,
            player = %identity,
            status = %game.status(),
            score_gained = outcome.score_gained,
            timed_out = outcome.timed_out,
            "Command committed"
        );

        if game.status().is_terminal() {
            if let Err(e) = self.stats.record_finished_match(&game).await {
                warn!(match_id = %game_id, error = %e, "Failed to record match result");
            }
        }

        self.broadcast(&game, &outcome).await;

        let view = MatchView::for_viewer(&game, Some(identity)).with_triggered(outcome.triggered);
        Ok(view)
    }

    /// Sends each room member their own state update, then the notifications.
    async fn broadcast(&self, game: &Match, outcome: &MoveOutcome) {
        let triggered = outcome.triggered.clone();
        let render = |viewer: &str| {
            let view = MatchView::for_viewer(game, Some(viewer)).with_triggered(triggered.clone());
            WebSocketMessage::state_update(&view)
                .and_then(|message| message.to_json())
                .map_err(|e| warn!(error = %e, "Failed to encode state update"))
                .ok()
        };
        self.connections.broadcast_with(game.id(), &render).await;

        for notification in &outcome.notifications {
            match WebSocketMessage::notification(notification).to_json() {
                Ok(message) => self.connections.broadcast(game.id(), &message).await,
                Err(e) => warn!(error = %e, "Failed to encode notification"),
            }
        }
        debug!(
            match_id = %game.id(),
            notifications = outcome.notifications.len(),
            "Broadcast sent"
        );
    }

    /// Converts an engine rejection, attaching the caller's view when the
    /// match is no longer in a playable state.
    fn reject(&self, game: &Match, identity: &str, error: GameError) -> AppError {
        let error = AppError::from(error);
        match error {
            AppError::Conflict { message, .. } => AppError::Conflict {
                message,
                state: serde_json::to_value(MatchView::for_viewer(game, Some(identity))).ok(),
            },
            other => other,
        }
    }

    async fn load(&self, game_id: &str) -> Result<Match, AppError> {
        self.repository
            .get_match(game_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Match {} not found", game_id)))
    }

    async fn match_lock(&self, game_id: &str) -> Arc<AsyncMutex<()>> {
        {
            let guard = self.match_mutexes.read().await;
            if let Some(lock) = guard.get(game_id) {
                return lock.clone();
            }
        }

        let mut guard = self.match_mutexes.write().await;
        guard
            .entry(game_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Drops the map entry once no other command holds or awaits the lock,
    /// so the map only ever holds matches with commands in flight.
    async fn release_match_lock(&self, game_id: &str, lock: Arc<AsyncMutex<()>>) {
        let mut guard = self.match_mutexes.write().await;
        let idle = guard
            .get(game_id)
            .is_some_and(|stored| Arc::ptr_eq(stored, &lock) && Arc::strong_count(&lock) == 2);
        if idle {
            guard.remove(game_id);
        }
    }
}
