use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::{StatsError, UserStats};

#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Counts one finished game for every participant and a win for `winner`.
    async fn record_result(
        &self,
        participants: &[String],
        winner: Option<&str>,
    ) -> Result<(), StatsError>;
    async fn get_user_stats(&self, username: &str) -> Result<UserStats, StatsError>;
}

fn win_for(username: &str, winner: Option<&str>) -> u32 {
    u32::from(winner == Some(username))
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    wins: u32,
    total_games: u32,
}

#[derive(Debug, Default)]
pub struct InMemoryStatsRepository {
    users: Arc<RwLock<HashMap<String, Counters>>>,
}

impl InMemoryStatsRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl StatsRepository for InMemoryStatsRepository {
    async fn record_result(
        &self,
        participants: &[String],
        winner: Option<&str>,
    ) -> Result<(), StatsError> {
        let mut users = self.users.write().await;
        for username in participants {
            let counters = users.entry(username.clone()).or_default();
            counters.total_games += 1;
            counters.wins += win_for(username, winner);
        }
        Ok(())
    }

    async fn get_user_stats(&self, username: &str) -> Result<UserStats, StatsError> {
        let users = self.users.read().await;
        let counters = users.get(username).copied().unwrap_or_default();
        Ok(UserStats::new(username, counters.wins, counters.total_games))
    }
}

/// PostgreSQL implementation over one counter row per user:
///
/// ```sql
/// CREATE TABLE user_stats (
///     username TEXT PRIMARY KEY,
///     wins BIGINT NOT NULL DEFAULT 0,
///     total_games BIGINT NOT NULL DEFAULT 0
/// );
/// ```
pub struct PostgresStatsRepository {
    pool: PgPool,
}

impl PostgresStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn database_error(e: sqlx::Error) -> StatsError {
    warn!(error = %e, "Stats query failed");
    StatsError::Repository(e.to_string())
}

#[async_trait]
impl StatsRepository for PostgresStatsRepository {
    #[instrument(skip(self))]
    async fn record_result(
        &self,
        participants: &[String],
        winner: Option<&str>,
    ) -> Result<(), StatsError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        for username in participants {
            sqlx::query(
                "INSERT INTO user_stats (username, wins, total_games) VALUES ($1, $2, 1) \
                 ON CONFLICT (username) DO UPDATE SET \
                 wins = user_stats.wins + EXCLUDED.wins, \
                 total_games = user_stats.total_games + 1",
            )
            .bind(username)
            .bind(i64::from(win_for(username, winner)))
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;
        }

        tx.commit().await.map_err(database_error)?;
        debug!(players = participants.len(), "Match result stored");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_user_stats(&self, username: &str) -> Result<UserStats, StatsError> {
        let row = sqlx::query("SELECT wins, total_games FROM user_stats WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        let (wins, total_games) = match row {
            Some(row) => {
                let wins: i64 = row.get("wins");
                let total_games: i64 = row.get("total_games");
                (wins as u32, total_games as u32)
            }
            None => (0, 0),
        };
        Ok(UserStats::new(username, wins, total_games))
    }
}
