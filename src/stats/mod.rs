// Public API
pub use errors::StatsError;
pub use models::UserStats;
pub use repository::{InMemoryStatsRepository, PostgresStatsRepository, StatsRepository};
pub use service::StatsService;

// Internal modules
mod errors;
mod models;
mod repository;
mod service;
