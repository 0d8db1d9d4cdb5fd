use std::sync::Arc;

use wordmines::{
    game::{
        Dictionary, GameConfig, GameService, InMemoryMatchRepository, Match, MatchRepository,
        PermissiveDictionary, Tile, WordList,
    },
    matchmaking::MatchmakingService,
    stats::{InMemoryStatsRepository, StatsService},
};

use super::mocks::MockConnectionManager;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub repository: Arc<InMemoryMatchRepository>,
    pub connections: Arc<MockConnectionManager>,
    pub game_service: Arc<GameService>,
    pub matchmaking: Arc<MatchmakingService>,
}

impl TestSetup {
    /// Stores a prepared match and connects both players to its room.
    pub async fn with_match(&self, game: &Match) {
        self.repository.insert_match(game).await.unwrap();
        for identity in game.identities() {
            self.connections.connect(game.id(), identity).await;
        }
    }

    pub async fn stored(&self, game_id: &str) -> Match {
        self.repository.get_match(game_id).await.unwrap().unwrap()
    }
}

pub struct TestSetupBuilder {
    words: Option<Vec<String>>,
    config: GameConfig,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            words: None,
            config: GameConfig::default(),
        }
    }

    /// Restricts the lexicon to `words`; otherwise every word is accepted.
    pub fn with_words(mut self, words: &[&str]) -> Self {
        self.words = Some(words.iter().map(|w| w.to_string()).collect());
        self
    }

    pub fn build(self) -> TestSetup {
        let repository = Arc::new(InMemoryMatchRepository::new());
        let connections = Arc::new(MockConnectionManager::new());
        let dictionary: Arc<dyn Dictionary> = match self.words {
            Some(words) => Arc::new(WordList::from_words(words)),
            None => Arc::new(PermissiveDictionary),
        };

        let game_service = Arc::new(GameService::new(
            repository.clone(),
            Arc::new(StatsService::new(Arc::new(InMemoryStatsRepository::new()))),
            connections.clone(),
            dictionary,
            self.config,
        ));
        let matchmaking = Arc::new(MatchmakingService::new(
            game_service.clone(),
            connections.clone(),
        ));

        TestSetup {
            repository,
            connections,
            game_service,
            matchmaking,
        }
    }
}

pub fn tiles(letters: &str) -> Vec<Tile> {
    letters.chars().map(Tile::Letter).collect()
}
