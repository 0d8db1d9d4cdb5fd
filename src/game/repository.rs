use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::core::Match;
use crate::shared::AppError;

/// Durable storage of one document per match. Updates are version-checked:
/// a write based on a stale read fails instead of overwriting.
#[async_trait]
pub trait MatchRepository: Send + Sync {
    async fn insert_match(&self, game: &Match) -> Result<(), AppError>;
    async fn get_match(&self, match_id: &str) -> Result<Option<Match>, AppError>;
    /// Stores `game` if the stored version still equals `expected_version`.
    /// Returns the new version.
    async fn update_match(&self, game: &Match, expected_version: u64) -> Result<u64, AppError>;
    async fn list_matches_for_player(&self, identity: &str) -> Result<Vec<Match>, AppError>;
}

fn version_conflict(match_id: &str) -> AppError {
    AppError::Conflict {
        message: format!("Match {} was modified concurrently", match_id),
        state: None,
    }
}

#[derive(Default)]
pub struct InMemoryMatchRepository {
    matches: Arc<RwLock<HashMap<String, Match>>>,
}

impl InMemoryMatchRepository {
    pub fn new() -> Self {
        Self {
            matches: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    async fn insert_match(&self, game: &Match) -> Result<(), AppError> {
        let mut matches = self.matches.write().await;
        if matches.contains_key(game.id()) {
            return Err(AppError::Conflict {
                message: format!("Match {} already exists", game.id()),
                state: None,
            });
        }
        matches.insert(game.id().to_string(), game.clone());
        Ok(())
    }

    async fn get_match(&self, match_id: &str) -> Result<Option<Match>, AppError> {
        let matches = self.matches.read().await;
        Ok(matches.get(match_id).cloned())
    }

    async fn update_match(&self, game: &Match, expected_version: u64) -> Result<u64, AppError> {
        let mut matches = self.matches.write().await;
        let stored = matches
            .get_mut(game.id())
            .ok_or_else(|| AppError::NotFound(format!("Match {} not found", game.id())))?;

        if stored.version() != expected_version {
            warn!(
                match_id = %game.id(),
                expected_version,
                stored_version = stored.version(),
                "Rejecting stale match update"
            );
            return Err(version_conflict(game.id()));
        }

        let next_version = expected_version + 1;
        *stored = game.clone();
        stored.set_version(next_version);
        Ok(next_version)
    }

    async fn list_matches_for_player(&self, identity: &str) -> Result<Vec<Match>, AppError> {
        let matches = self.matches.read().await;
        let mut found: Vec<Match> = matches
            .values()
            .filter(|m| m.is_participant(identity))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.last_move_time().cmp(&a.last_move_time()));
        Ok(found)
    }
}

/// PostgreSQL implementation. The match is stored as a JSON document next to
/// the columns used for lookups:
///
/// ```sql
/// CREATE TABLE matches (
///     id TEXT PRIMARY KEY,
///     player1 TEXT NOT NULL,
///     player2 TEXT NOT NULL,
///     status TEXT NOT NULL,
///     version BIGINT NOT NULL,
///     updated_at TIMESTAMPTZ NOT NULL,
///     document TEXT NOT NULL
/// );
/// ```
pub struct PostgresMatchRepository {
    pool: PgPool,
}

impl PostgresMatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn encode(game: &Match) -> Result<String, AppError> {
        serde_json::to_string(game).map_err(|e| {
            warn!(error = %e, match_id = %game.id(), "Failed to encode match");
            AppError::Internal
        })
    }

    fn decode(row: &sqlx::postgres::PgRow) -> Result<Match, AppError> {
        let document: String = row.get("document");
        let version: i64 = row.get("version");
        let mut game: Match = serde_json::from_str(&document).map_err(|e| {
            warn!(error = %e, "Failed to decode stored match");
            AppError::Internal
        })?;
        game.set_version(version as u64);
        Ok(game)
    }
}

#[async_trait]
impl MatchRepository for PostgresMatchRepository {
    #[instrument(skip(self, game), fields(match_id = %game.id()))]
    async fn insert_match(&self, game: &Match) -> Result<(), AppError> {
        debug!("Inserting match into database");
        let [player1, player2] = game.identities();

        sqlx::query(
            "INSERT INTO matches (id, player1, player2, status, version, updated_at, document) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        )
        .bind(game.id())
        .bind(player1)
        .bind(player2)
        .bind(game.status().to_string())
        .bind(game.version() as i64)
        .bind(game.last_move_time())
        .bind(Self::encode(game)?)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to insert match");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_match(&self, match_id: &str) -> Result<Option<Match>, AppError> {
        let row = sqlx::query("SELECT version, document FROM matches WHERE id = $1")
            .bind(match_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, match_id = %match_id, "Failed to fetch match");
                AppError::DatabaseError(e.to_string())
            })?;

        row.as_ref().map(Self::decode).transpose()
    }

    #[instrument(skip(self, game), fields(match_id = %game.id()))]
    async fn update_match(&self, game: &Match, expected_version: u64) -> Result<u64, AppError> {
        let next_version = expected_version + 1;
        let mut stored = game.clone();
        stored.set_version(next_version);

        let result = sqlx::query(
            "UPDATE matches SET status = $2, version = $3, updated_at = $4, document = $5 WHERE id = $1 AND version = $6"
        )
        .bind(game.id())
        .bind(game.status().to_string())
        .bind(next_version as i64)
        .bind(game.last_move_time())
        .bind(Self::encode(&stored)?)
        .bind(expected_version as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to update match");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            warn!(expected_version, "Match missing or modified concurrently");
            return Err(version_conflict(game.id()));
        }

        debug!(version = next_version, "Match updated");
        Ok(next_version)
    }

    #[instrument(skip(self))]
    async fn list_matches_for_player(&self, identity: &str) -> Result<Vec<Match>, AppError> {
        let rows = sqlx::query(
            "SELECT version, document FROM matches WHERE player1 = $1 OR player2 = $1 ORDER BY updated_at DESC"
        )
        .bind(identity)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, identity = %identity, "Failed to list matches");
            AppError::DatabaseError(e.to_string())
        })?;

        rows.iter().map(Self::decode).collect()
    }
}
