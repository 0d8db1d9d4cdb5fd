// Public API
pub use connection_manager::{ConnectionId, ConnectionManager, InMemoryConnectionManager, Renderer};
pub use handler::{websocket_handler, WebsocketReceiveHandler};
pub use messages::{ClientMessage, MessageType, WebSocketMessage};
pub use socket::{Connection, MessageHandler, SocketError, SocketWrapper};

// Internal modules
mod connection_manager;
mod handler;
mod messages;
mod socket;
