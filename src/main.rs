use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wordmines::{
    auth::TokenConfig,
    game::{self, load_dictionary, GameConfig, GameService, MatchRepository},
    matchmaking::MatchmakingService,
    stats::{InMemoryStatsRepository, PostgresStatsRepository, StatsRepository, StatsService},
    websockets::{ConnectionManager, InMemoryConnectionManager},
    AppState,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wordmines=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting word-mines game server");

    let config = GameConfig::new();
    let dictionary = load_dictionary(config.wordlist_path.as_deref());

    let match_repository: Arc<dyn MatchRepository>;
    let stats_repository: Arc<dyn StatsRepository>;
    match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = sqlx::PgPool::connect(&database_url).await?;
            info!("Persisting matches and stats in PostgreSQL");
            match_repository = Arc::new(game::PostgresMatchRepository::new(pool.clone()));
            stats_repository = Arc::new(PostgresStatsRepository::new(pool));
        }
        Err(_) => {
            info!("DATABASE_URL not set, keeping matches and stats in memory");
            match_repository = Arc::new(game::InMemoryMatchRepository::new());
            stats_repository = Arc::new(InMemoryStatsRepository::new());
        }
    }

    let connection_manager: Arc<dyn ConnectionManager> = Arc::new(InMemoryConnectionManager::new());
    let stats_service = Arc::new(StatsService::new(stats_repository));
    let game_service = Arc::new(GameService::new(
        match_repository,
        stats_service,
        connection_manager.clone(),
        dictionary,
        config,
    ));
    let matchmaking = Arc::new(MatchmakingService::new(
        game_service.clone(),
        connection_manager.clone(),
    ));

    let app_state = AppState::new(
        game_service,
        matchmaking,
        connection_manager,
        TokenConfig::new(),
    );

    let app = game::routes()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Server running on http://{}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
