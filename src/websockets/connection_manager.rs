use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

pub type ConnectionId = u64;

/// Renders a message for one socket identity. `None` skips that socket.
pub type Renderer<'a> = dyn Fn(&str) -> Option<String> + Send + Sync + 'a;

/// Registry of open sockets grouped into rooms, one room per match.
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    async fn join_room(
        &self,
        room_id: &str,
        identity: String,
        sender: mpsc::UnboundedSender<String>,
    ) -> ConnectionId;

    async fn leave_room(&self, room_id: &str, connection_id: ConnectionId);

    /// Sends the same message to every socket in the room.
    async fn broadcast(&self, room_id: &str, message: &str);

    /// Sends a per-identity rendering to every socket in the room.
    async fn broadcast_with(&self, room_id: &str, render: &Renderer<'_>);

    async fn room_size(&self, room_id: &str) -> usize;
}

struct RoomConnection {
    id: ConnectionId,
    identity: String,
    sender: mpsc::UnboundedSender<String>,
}

pub struct InMemoryConnectionManager {
    // room id -> sockets
    rooms: Arc<RwLock<HashMap<String, Vec<RoomConnection>>>>,
    next_id: AtomicU64,
}

impl InMemoryConnectionManager {
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Delivers to each socket and drops the ones whose channel is gone.
    async fn fan_out(&self, room_id: &str, render: &Renderer<'_>) {
        let mut rooms = self.rooms.write().await;
        let Some(connections) = rooms.get_mut(room_id) else {
            return;
        };

        connections.retain(|conn| match render(conn.identity.as_str()) {
            Some(message) => {
                let delivered = conn.sender.send(message).is_ok();
                if !delivered {
                    debug!(room_id = %room_id, identity = %conn.identity, "Dropping dead socket");
                }
                delivered
            }
            None => true,
        });

        if connections.is_empty() {
            rooms.remove(room_id);
        }
    }
}

impl Default for InMemoryConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionManager for InMemoryConnectionManager {
    async fn join_room(
        &self,
        room_id: &str,
        identity: String,
        sender: mpsc::UnboundedSender<String>,
    ) -> ConnectionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room_id.to_string())
            .or_default()
            .push(RoomConnection {
                id,
                identity,
                sender,
            });
        id
    }

    async fn leave_room(&self, room_id: &str, connection_id: ConnectionId) {
        let mut rooms = self.rooms.write().await;
        if let Some(connections) = rooms.get_mut(room_id) {
            connections.retain(|conn| conn.id != connection_id);
            if connections.is_empty() {
                rooms.remove(room_id);
            }
        }
    }

    async fn broadcast(&self, room_id: &str, message: &str) {
        self.fan_out(room_id, &|_: &str| Some(message.to_string())).await;
    }

    async fn broadcast_with(&self, room_id: &str, render: &Renderer<'_>) {
        self.fan_out(room_id, render).await;
    }

    async fn room_size(&self, room_id: &str) -> usize {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).map_or(0, Vec::len)
    }
}
