use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::queue::{MatchmakingQueue, QueueEntry};
use crate::game::{is_valid_time_option, GameService, Match, MatchView, BOT_IDENTITY};
use crate::shared::AppError;
use crate::websockets::{ConnectionManager, WebSocketMessage};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueRequest {
    pub time_option: String,
    #[serde(default)]
    pub demo: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueResponse {
    pub message: String,
    pub game_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_state: Option<MatchView>,
}

impl QueueResponse {
    fn waiting(message: String) -> Self {
        Self {
            message,
            game_id: None,
            game_state: None,
        }
    }

    fn started(message: &str, game: &Match, identity: &str) -> Self {
        Self {
            message: message.to_string(),
            game_id: Some(game.id().to_string()),
            game_state: Some(MatchView::for_viewer(game, Some(identity))),
        }
    }
}

/// Owns the matchmaking queue. Queue mutations, including the match
/// creation that follows a pairing, run under one lock.
pub struct MatchmakingService {
    queue: Mutex<MatchmakingQueue>,
    game_service: Arc<GameService>,
    connections: Arc<dyn ConnectionManager>,
}

impl MatchmakingService {
    pub fn new(game_service: Arc<GameService>, connections: Arc<dyn ConnectionManager>) -> Self {
        Self {
            queue: Mutex::new(MatchmakingQueue::new()),
            game_service,
            connections,
        }
    }

    #[instrument(skip(self))]
    pub async fn enter_queue(
        &self,
        identity: &str,
        request: &QueueRequest,
    ) -> Result<QueueResponse, AppError> {
        let option = request.time_option.as_str();
        if !is_valid_time_option(option) {
            warn!(time_option = %option, "Rejected queue entry with invalid time option");
            return Err(AppError::BadRequest(format!("Invalid time option: {}", option)));
        }

        if request.demo {
            let game = self
                .game_service
                .create_match(identity, BOT_IDENTITY, option)
                .await?;
            info!(match_id = %game.id(), player = %identity, "Demo match created");
            return Ok(QueueResponse::started("Demo match created!", &game, identity));
        }

        let mut queue = self.queue.lock().await;
        let opponent = match queue.enter(identity, option) {
            QueueEntry::Waiting => {
                info!(player = %identity, time_option = %option, "Player queued");
                return Ok(QueueResponse::waiting(format!(
                    "Queued for {}, waiting for an opponent.",
                    option
                )));
            }
            QueueEntry::AlreadyWaiting => {
                debug!(player = %identity, time_option = %option, "Player already queued");
                return Ok(QueueResponse::waiting(
                    "You are already waiting for an opponent with this time option.".to_string(),
                ));
            }
            QueueEntry::WaitingElsewhere(other) => {
                warn!(player = %identity, waiting_in = %other, "Player queued in another bucket");
                return Err(AppError::Conflict {
                    message: format!(
                        "You are already waiting in the {} queue. Leave it first.",
                        other
                    ),
                    state: None,
                });
            }
            QueueEntry::Paired(opponent) => opponent,
        };

        info!(player = %identity, opponent = %opponent, time_option = %option, "Opponent found");
        let game = match self
            .game_service
            .create_match(identity, &opponent, option)
            .await
        {
            Ok(game) => game,
            Err(e) => {
                warn!(error = %e, opponent = %opponent, "Match creation failed, restoring queue");
                queue.requeue_front(option, &opponent);
                return Err(e);
            }
        };
        drop(queue);

        let notice = format!(
            "Opponent found: {} vs {}. Game starting!",
            identity, opponent
        );
        match WebSocketMessage::notification(&notice).to_json() {
            Ok(message) => self.connections.broadcast(game.id(), &message).await,
            Err(e) => warn!(error = %e, "Failed to encode match start notification"),
        }

        Ok(QueueResponse::started("Match found!", &game, identity))
    }

    #[instrument(skip(self))]
    pub async fn leave_queue(&self, identity: &str) -> QueueResponse {
        let mut queue = self.queue.lock().await;
        match queue.leave(identity) {
            Some(option) => {
                info!(player = %identity, time_option = %option, "Player left the queue");
                QueueResponse::waiting(format!("Left the {} queue.", option))
            }
            None => QueueResponse::waiting("You are not in the queue.".to_string()),
        }
    }

    pub async fn waiting(&self, time_option: &str) -> Vec<String> {
        self.queue.lock().await.waiting(time_option)
    }
}
