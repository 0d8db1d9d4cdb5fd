use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::TokenConfig;
use crate::game::{ErrorKind, GameError, GameService};
use crate::matchmaking::MatchmakingService;
use crate::websockets::ConnectionManager;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub game_service: Arc<GameService>,
    pub matchmaking: Arc<MatchmakingService>,
    pub connection_manager: Arc<dyn ConnectionManager>,
    pub token_config: TokenConfig,
}

impl AppState {
    pub fn new(
        game_service: Arc<GameService>,
        matchmaking: Arc<MatchmakingService>,
        connection_manager: Arc<dyn ConnectionManager>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            game_service,
            matchmaking,
            connection_manager,
            token_config,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The match is not in a state that allows the request. `state` is the
    /// caller's current view of the match, when one could be produced.
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        state: Option<serde_json::Value>,
    },

    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::MalformedRequest => AppError::BadRequest(message),
            ErrorKind::IllegalMove => AppError::IllegalMove(message),
            ErrorKind::Forbidden => AppError::Forbidden(message),
            ErrorKind::StateConflict => AppError::Conflict {
                message,
                state: None,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, game_state) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::IllegalMove(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            AppError::Conflict { message, state } => (StatusCode::CONFLICT, message, state),
            AppError::JwtError(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
                None,
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                None,
            ),
        };

        let body = match game_state {
            Some(state) => json!({ "error": error_message, "game_state": state }),
            None => json!({ "error": error_message }),
        };

        (status, Json(body)).into_response()
    }
}
