use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::game::Match;

use super::{repository::StatsRepository, StatsError, UserStats};

pub struct StatsService {
    repository: Arc<dyn StatsRepository>,
}

impl StatsService {
    pub fn new(repository: Arc<dyn StatsRepository>) -> Self {
        Self { repository }
    }

    /// Books a finished match. Matches against the demo bot are not counted.
    #[instrument(skip(self, game), fields(match_id = %game.id()))]
    pub async fn record_finished_match(&self, game: &Match) -> Result<(), StatsError> {
        if game.involves_bot() {
            debug!("Skipping stats for bot match");
            return Ok(());
        }

        let participants: Vec<String> = game.identities().iter().map(|p| p.to_string()).collect();
        let winner = game.winner_identity();
        self.repository.record_result(&participants, winner).await?;

        info!(winner = ?winner, status = %game.status(), "Match result recorded");
        Ok(())
    }

    pub async fn user_stats(&self, username: &str) -> Result<UserStats, StatsError> {
        self.repository.get_user_stats(username).await
    }
}
