use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State, WebSocketUpgrade},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::game::GameService;
use crate::shared::{AppError, AppState};

use super::messages::{ClientMessage, WebSocketMessage};
use super::socket::{Connection, MessageHandler};

/// Routes commands received on a match socket into the game service.
pub struct WebsocketReceiveHandler {
    game_service: Arc<GameService>,
}

impl WebsocketReceiveHandler {
    pub fn new(game_service: Arc<GameService>) -> Self {
        Self { game_service }
    }

    async fn dispatch(
        &self,
        identity: &str,
        game_id: &str,
        message: ClientMessage,
    ) -> Result<Option<WebSocketMessage>, AppError> {
        match message {
            ClientMessage::Move(request) => {
                self.game_service
                    .play_move(game_id, identity, &request)
                    .await?;
                Ok(None)
            }
            ClientMessage::Preview(request) => {
                let preview = self
                    .game_service
                    .preview_move(game_id, identity, &request)
                    .await?;
                let reply =
                    WebSocketMessage::preview_result(&preview).map_err(|_| AppError::Internal)?;
                Ok(Some(reply))
            }
            ClientMessage::Surrender => {
                self.game_service.surrender(game_id, identity).await?;
                Ok(None)
            }
            ClientMessage::UseReward { reward_type } => {
                self.game_service
                    .use_reward(game_id, identity, &reward_type)
                    .await?;
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl MessageHandler for WebsocketReceiveHandler {
    async fn handle_message(
        &self,
        identity: &str,
        game_id: &str,
        message: String,
    ) -> Option<String> {
        debug!(identity = %identity, game_id = %game_id, message = %message, "Received message");

        let reply = match serde_json::from_str::<ClientMessage>(&message) {
            Ok(command) => match self.dispatch(identity, game_id, command).await {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(identity = %identity, game_id = %game_id, error = %e, "Command failed");
                    Some(WebSocketMessage::error(&e.to_string()))
                }
            },
            Err(e) => {
                warn!(
                    identity = %identity,
                    game_id = %game_id,
                    error = %e,
                    "Failed to parse WebSocket message"
                );
                Some(WebSocketMessage::error("Unrecognised message"))
            }
        };

        reply.and_then(|message| message.to_json().ok())
    }
}

#[derive(Debug, Deserialize)]
pub struct WebSocketParams {
    pub token: Option<String>,
}

/// GET /ws/game/:game_id?token=<jwt>
/// The token is checked before the upgrade; unauthenticated callers never
/// join the room.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(game_id): Path<String>,
    Query(params): Query<WebSocketParams>,
    State(app_state): State<AppState>,
) -> Result<Response, AppError> {
    info!(game_id = %game_id, "WebSocket connection requested");

    let token = params.token.ok_or_else(|| {
        warn!(game_id = %game_id, "Missing token on WebSocket request");
        AppError::Unauthorized("Authentication required".to_string())
    })?;
    let identity = app_state.token_config.validate_token(&token)?.sub;

    // rejects unknown matches before upgrading
    app_state.game_service.room_view(&game_id, &identity).await?;

    info!(game_id = %game_id, identity = %identity, "WebSocket authentication successful");
    Ok(ws.on_upgrade(move |socket| {
        handle_websocket_connection(socket, game_id, identity, app_state)
    }))
}

async fn handle_websocket_connection(
    socket: axum::extract::ws::WebSocket,
    game_id: String,
    identity: String,
    app_state: AppState,
) {
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();

    let connection_id = app_state
        .connection_manager
        .join_room(&game_id, identity.clone(), outbound_sender.clone())
        .await;

    // Current state for the newly joined socket
    match app_state.game_service.room_view(&game_id, &identity).await {
        Ok(view) => {
            if let Ok(message) = WebSocketMessage::state_update(&view).and_then(|m| m.to_json()) {
                let _ = outbound_sender.send(message);
            }
        }
        Err(e) => warn!(game_id = %game_id, error = %e, "Failed to load initial state"),
    }
    drop(outbound_sender);

    let message_handler = Arc::new(WebsocketReceiveHandler::new(
        app_state.game_service.clone(),
    ));
    let connection = Connection::new(
        identity.clone(),
        game_id.clone(),
        Box::new(socket),
        outbound_receiver,
        message_handler,
    );

    match connection.run().await {
        Ok(()) => info!(game_id = %game_id, identity = %identity, "WebSocket connection closed cleanly"),
        Err(e) => warn!(game_id = %game_id, identity = %identity, error = ?e, "WebSocket connection error"),
    }

    app_state
        .connection_manager
        .leave_room(&game_id, connection_id)
        .await;
}
