// Library crate for the word-mines game server
// This file exposes the public API for integration tests

pub mod auth;
pub mod game;
pub mod matchmaking;
pub mod shared;
pub mod stats;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use game::{GameService, Match, MatchView};
pub use matchmaking::MatchmakingService;
pub use shared::{AppError, AppState};
pub use websockets::{ConnectionManager, InMemoryConnectionManager, WebSocketMessage};
