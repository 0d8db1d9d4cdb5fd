use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use wordmines::websockets::{ConnectionId, ConnectionManager, Renderer};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Records what each room member would have received instead of writing
/// to sockets.
#[derive(Clone, Default)]
pub struct MockConnectionManager {
    // room id -> (connection id, identity)
    rooms: Arc<RwLock<HashMap<String, Vec<(ConnectionId, String)>>>>,
    sent_messages: Arc<RwLock<HashMap<String, Vec<String>>>>,
    next_id: Arc<AtomicU64>,
}

impl MockConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins `identity` to a room without a real socket.
    pub async fn connect(&self, room_id: &str, identity: &str) {
        let (sender, _receiver) = mpsc::unbounded_channel();
        self.join_room(room_id, identity.to_string(), sender).await;
    }

    pub async fn get_messages_for(&self, identity: &str) -> Vec<serde_json::Value> {
        self.sent_messages
            .read()
            .await
            .get(identity)
            .map(|messages| {
                messages
                    .iter()
                    .filter_map(|m| serde_json::from_str(m).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Messages of one `type` received by `identity`.
    pub async fn messages_of_type(&self, identity: &str, message_type: &str) -> Vec<serde_json::Value> {
        self.get_messages_for(identity)
            .await
            .into_iter()
            .filter(|m| m["type"] == message_type)
            .collect()
    }

    pub async fn clear_messages(&self) {
        self.sent_messages.write().await.clear();
    }
}

#[async_trait]
impl ConnectionManager for MockConnectionManager {
    async fn join_room(
        &self,
        room_id: &str,
        identity: String,
        _sender: mpsc::UnboundedSender<String>,
    ) -> ConnectionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.rooms
            .write()
            .await
            .entry(room_id.to_string())
            .or_default()
            .push((id, identity));
        id
    }

    async fn leave_room(&self, room_id: &str, connection_id: ConnectionId) {
        if let Some(members) = self.rooms.write().await.get_mut(room_id) {
            members.retain(|(id, _)| *id != connection_id);
        }
    }

    async fn broadcast(&self, room_id: &str, message: &str) {
        self.broadcast_with(room_id, &|_: &str| Some(message.to_string()))
            .await;
    }

    async fn broadcast_with(&self, room_id: &str, render: &Renderer<'_>) {
        let members = self
            .rooms
            .read()
            .await
            .get(room_id)
            .cloned()
            .unwrap_or_default();

        let mut sent = self.sent_messages.write().await;
        for (_, identity) in members {
            if let Some(message) = render(identity.as_str()) {
                sent.entry(identity).or_default().push(message);
            }
        }
    }

    async fn room_size(&self, room_id: &str) -> usize {
        self.rooms.read().await.get(room_id).map_or(0, Vec::len)
    }
}
