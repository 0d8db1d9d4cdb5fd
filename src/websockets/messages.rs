use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::game::{MatchView, MoveRequest, PreviewRequest};

/// Server -> client message types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    StateUpdate,
    Notification,
    Error,
    PreviewResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessageMeta {
    pub timestamp: DateTime<Utc>,
}

/// Base structure for outbound WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub payload: serde_json::Value,
    pub meta: Option<WebSocketMessageMeta>,
}

impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: serde_json::Value) -> Self {
        Self {
            message_type,
            payload,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
            }),
        }
    }

    pub fn state_update(view: &MatchView) -> Result<Self, serde_json::Error> {
        Ok(Self::new(MessageType::StateUpdate, serde_json::to_value(view)?))
    }

    pub fn notification(message: &str) -> Self {
        Self::new(MessageType::Notification, json!({ "message": message }))
    }

    pub fn error(message: &str) -> Self {
        Self::new(MessageType::Error, json!({ "message": message }))
    }

    pub fn preview_result<T: Serialize>(result: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(
            MessageType::PreviewResult,
            serde_json::to_value(result)?,
        ))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Client -> server commands over the match socket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientMessage {
    Move(MoveRequest),
    Preview(PreviewRequest),
    Surrender,
    UseReward { reward_type: String },
}
