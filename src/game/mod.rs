// Public API
pub use board::{BonusKind, Board, Cell, Coord, BOARD_SIZE, CENTER};
#[cfg(any(test, feature = "test-utils"))]
pub use builder::MatchBuilder;
pub use config::{is_valid_time_option, parse_time_option, GameConfig, VALID_TIME_OPTIONS};
pub use core::{
    evaluate_placement, Evaluation, Match, MatchStatus, MoveOutcome, PlayerKey, PlayerState,
    RegionBlock, BOT_IDENTITY,
};
pub use dictionary::{load_dictionary, Dictionary, DictionaryError, PermissiveDictionary, WordList};
pub use effects::{resolve_effects, EffectOutcome, TriggeredHazard};
pub use errors::{ErrorKind, GameError};
pub use handlers::routes;
pub use hazards::{assign_hazards, Hazard, HazardConfig, HazardGrid, MineKind, RewardKind};
pub use history::{EventLogEntry, LoggedTile};
pub use letters::{LetterPool, Tile, HAND_SIZE};
pub use moves::{Move, MoveRequest, PreviewRequest, PreviewResponse};
pub use projection::{MatchSummary, MatchView};
pub use repository::{InMemoryMatchRepository, MatchRepository, PostgresMatchRepository};
pub use service::GameService;
pub use validator::{PlacedTile, TileDrop};
pub use words::{FormedWord, WordTile};

// Internal modules
mod board;
#[cfg(any(test, feature = "test-utils"))]
mod builder;
mod config;
mod core;
mod dictionary;
mod effects;
mod errors;
mod handlers;
mod hazards;
mod history;
mod letters;
mod moves;
mod projection;
mod repository;
mod scoring;
mod service;
mod validator;
mod words;
