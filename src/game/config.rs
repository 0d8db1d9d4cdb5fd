use chrono::Duration;
use std::path::PathBuf;

use super::hazards::HazardConfig;

/// Time options a player may queue for.
pub const VALID_TIME_OPTIONS: [&str; 4] = ["2m", "5m", "12h", "24h"];

const DEFAULT_TURN_SECONDS: i64 = 300;
const DEFAULT_FIRST_MOVE_SECONDS: i64 = 3600;

/// Game-level settings, read from the environment with defaults.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Budget for the opening move of a match, whatever its time option.
    pub first_move_budget: Duration,
    pub hazards: HazardConfig,
    pub wordlist_path: Option<PathBuf>,
}

impl GameConfig {
    pub fn new() -> Self {
        let first_move_seconds = std::env::var("FIRST_MOVE_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|s: &i64| *s > 0)
            .unwrap_or(DEFAULT_FIRST_MOVE_SECONDS);

        Self {
            first_move_budget: Duration::seconds(first_move_seconds),
            hazards: HazardConfig::default(),
            wordlist_path: std::env::var("WORDLIST_PATH").ok().map(PathBuf::from),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            first_move_budget: Duration::seconds(DEFAULT_FIRST_MOVE_SECONDS),
            hazards: HazardConfig::default(),
            wordlist_path: None,
        }
    }
}

/// Parses options like `"2m"` or `"12h"` into a per-move budget.
/// Anything unparsable or non-positive falls back to five minutes.
pub fn parse_time_option(option: &str) -> Duration {
    let option = option.trim();
    let Some(unit) = option.chars().last() else {
        return Duration::seconds(DEFAULT_TURN_SECONDS);
    };

    let multiplier = match unit {
        'm' => 60,
        'h' => 3600,
        _ => return Duration::seconds(DEFAULT_TURN_SECONDS),
    };

    match option[..option.len() - unit.len_utf8()].parse::<i64>() {
        Ok(value) if value > 0 => Duration::seconds(value * multiplier),
        _ => Duration::seconds(DEFAULT_TURN_SECONDS),
    }
}

pub fn is_valid_time_option(option: &str) -> bool {
    VALID_TIME_OPTIONS.contains(&option)
}
