pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;

use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Database;
use crate::import::Importer;
use crate::source::FigmaClient;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub importer: Arc<Importer<FigmaClient, Database>>,
}

impl AppState {
    pub fn new(config: &Config, db: Database) -> anyhow::Result<Self> {
        let figma = FigmaClient::new(&config.figma_api_base, config.figma_timeouts.clone())?;
        let importer = Importer::new(figma, db.clone()).with_batch_size(config.sync_batch_size);

        Ok(Self {
            db,
            importer: Arc::new(importer),
        })
    }
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the server with the given configuration
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    // Initialize database
    let db = Database::connect(&config.database_url).await?;

    // Run migrations
    db.migrate().await?;

    let state = AppState::new(&config, db)?;
    let app = app(state);

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
