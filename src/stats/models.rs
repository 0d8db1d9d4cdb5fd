use serde::{Deserialize, Serialize};

/// Lifetime win/loss counters of one player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub username: String,
    pub wins: u32,
    pub total_games: u32,
    /// Percentage of games won, 0 when no games were played.
    pub success_rate: f64,
}

impl UserStats {
    pub fn new(username: &str, wins: u32, total_games: u32) -> Self {
        let success_rate = if total_games == 0 {
            0.0
        } else {
            (f64::from(wins) / f64::from(total_games) * 10_000.0).round() / 100.0
        };
        Self {
            username: username.to_string(),
            wins,
            total_games,
            success_rate,
        }
    }
}
