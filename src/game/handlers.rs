use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};

use super::moves::{MoveRequest, PreviewRequest, PreviewResponse};
use super::projection::{MatchSummary, MatchView};
use crate::auth::AuthenticatedUser;
use crate::matchmaking::{QueueRequest, QueueResponse};
use crate::shared::{AppError, AppState};
use crate::stats::UserStats;
use crate::websockets::websocket_handler;

/// Every HTTP and WebSocket route of the game server.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/game/queue", post(enter_queue).delete(leave_queue))
        .route("/game/move/:game_id", post(play_move))
        .route("/game/preview/:game_id", post(preview_move))
        .route("/game/surrender/:game_id", post(surrender))
        .route("/game/detail/:game_id", get(game_detail))
        .route("/game/list/active", get(list_active))
        .route("/game/list/finished", get(list_finished))
        .route("/game/user/stats", get(user_stats))
        .route("/reward/use", post(use_reward))
        .route("/ws/game/:game_id", get(websocket_handler))
}

/// POST /game/queue
/// Queues the caller for a time option, or pairs them with the head of
/// that queue.
#[instrument(name = "enter_queue", skip(state))]
pub async fn enter_queue(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Json(request): Json<QueueRequest>,
) -> Result<Json<QueueResponse>, AppError> {
    let response = state.matchmaking.enter_queue(&identity, &request).await?;
    info!(identity = %identity, game_id = ?response.game_id, "Queue entry handled");
    Ok(Json(response))
}

/// DELETE /game/queue
#[instrument(name = "leave_queue", skip(state))]
pub async fn leave_queue(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Json<QueueResponse> {
    Json(state.matchmaking.leave_queue(&identity).await)
}

/// POST /game/move/:game_id
#[instrument(name = "play_move", skip(state, request))]
pub async fn play_move(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(game_id): Path<String>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<MatchView>, AppError> {
    let view = state
        .game_service
        .play_move(&game_id, &identity, &request)
        .await?;
    Ok(Json(view))
}

/// POST /game/preview/:game_id
#[instrument(name = "preview_move", skip(state, request))]
pub async fn preview_move(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(game_id): Path<String>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    let preview = state
        .game_service
        .preview_move(&game_id, &identity, &request)
        .await?;
    Ok(Json(preview))
}

/// POST /game/surrender/:game_id
#[instrument(name = "surrender", skip(state))]
pub async fn surrender(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(game_id): Path<String>,
) -> Result<Json<MatchView>, AppError> {
    let view = state.game_service.surrender(&game_id, &identity).await?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct UseRewardParams {
    pub game_id: String,
    pub reward_type: String,
}

/// POST /reward/use?game_id=...&reward_type=...
#[instrument(name = "use_reward", skip(state))]
pub async fn use_reward(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Query(params): Query<UseRewardParams>,
) -> Result<Json<MatchView>, AppError> {
    let view = state
        .game_service
        .use_reward(&params.game_id, &identity, &params.reward_type)
        .await?;
    Ok(Json(view))
}

/// GET /game/detail/:game_id
#[instrument(name = "game_detail", skip(state))]
pub async fn game_detail(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(game_id): Path<String>,
) -> Result<Json<MatchView>, AppError> {
    Ok(Json(state.game_service.get_view(&game_id, &identity).await?))
}

/// GET /game/list/active
pub async fn list_active(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<Vec<MatchSummary>>, AppError> {
    Ok(Json(state.game_service.list_matches(&identity, false).await?))
}

/// GET /game/list/finished
pub async fn list_finished(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<Vec<MatchSummary>>, AppError> {
    Ok(Json(state.game_service.list_matches(&identity, true).await?))
}

/// GET /game/user/stats
pub async fn user_stats(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<UserStats>, AppError> {
    Ok(Json(state.game_service.user_stats(&identity).await?))
}
