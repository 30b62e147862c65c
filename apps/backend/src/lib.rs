pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use recall_core::{MemoryStore, Sm2, Store, StoreError};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::SqliteStore;
use crate::services::events::{self, EventBus};
use crate::services::sessions::SessionRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: Arc<SessionRegistry>,
    pub events: EventBus,
    pub sm2: Arc<Sm2>,
}

impl AppState {
    /// State backed by an in-memory store.
    pub fn new(config: &Config) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    /// State backed by the store named in the configuration.
    pub fn open(config: &Config) -> Result<Self, StoreError> {
        match &config.database_path {
            Some(path) => {
                tracing::info!(%path, "Opening SQLite store");
                Ok(Self::with_store(config, Arc::new(SqliteStore::open(path)?)))
            }
            None => {
                tracing::warn!("DATABASE_PATH not set, decks and cards are kept in memory");
                Ok(Self::new(config))
            }
        }
    }

    pub fn with_store(config: &Config, store: Arc<dyn Store>) -> Self {
        Self {
            store,
            sessions: Arc::new(SessionRegistry::new()),
            events: EventBus::new(config.event_channel_capacity),
            sm2: Arc::new(Sm2::default()),
        }
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Deck routes
        .route("/api/decks", get(routes::decks::list).post(routes::decks::create))
        .route(
            "/api/decks/:id",
            get(routes::decks::get).delete(routes::decks::delete),
        )
        .route("/api/decks/:id/due", get(routes::decks::due))
        .route("/api/decks/:id/cards", post(routes::cards::add))
        // Card routes
        .route(
            "/api/cards/:id",
            get(routes::cards::get)
                .put(routes::cards::update)
                .delete(routes::cards::delete),
        )
        .route("/api/cards/:id/review", post(routes::cards::review))
        // Study routes
        .route("/api/study/sessions", post(routes::study::start))
        .route(
            "/api/study/sessions/:id",
            get(routes::study::current).delete(routes::study::end),
        )
        .route("/api/study/sessions/:id/rate", post(routes::study::rate))
        .route("/api/study/sessions/:id/skip", post(routes::study::skip))
        // Stats routes
        .route("/api/stats", get(routes::stats::overview))
        .route("/api/stats/intervals", get(routes::stats::intervals))
        .route("/api/stats/easiness", get(routes::stats::easiness))
        .route("/api/stats/upcoming", get(routes::stats::upcoming))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState::open(&config)?;
    events::spawn_logger(state.events.subscribe());

    let app = router(state);
    let addr = config.addr();

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
