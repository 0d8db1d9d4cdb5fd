// Public API
pub use queue::{MatchmakingQueue, QueueEntry};
pub use service::{MatchmakingService, QueueRequest, QueueResponse};

// Internal modules
mod queue;
mod service;
