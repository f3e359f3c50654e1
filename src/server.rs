/// Server setup and initialization
///
/// Wires together all components: database, sessions, workspace handlers,
/// documents, file storage, media and HTTP routes.

use crate::{
    api::{create_routes, AppState},
    auth::SessionStore,
    config::Config,
    documents::DocumentStorage,
    files::FileStorage,
    media::MediaStorage,
    store::WorkspaceDatabase,
    workspace::{WorkspaceService, WorkspaceStorage},
};
use anyhow::Result;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Build the shared application state over an opened database
pub fn create_state(database: &WorkspaceDatabase, config: &Config) -> AppState {
    let pool = database.pool();

    AppState {
        workspace: WorkspaceService::new(WorkspaceStorage::new(pool.clone())),
        sessions: SessionStore::new(pool.clone()),
        files: FileStorage::new(pool.clone(), &config.storage),
        documents: DocumentStorage::new(pool.clone()),
        media: MediaStorage::new(pool),
        max_upload_bytes: config.storage.max_upload_bytes,
    }
}

/// Build the router for an already-created state
pub fn create_router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        // Health check endpoint
        .route("/healthz", get(health_check))
        .merge(create_routes(max_upload_bytes).with_state(state))
}

/// Create the main Axum application with all routes
pub async fn create_app(config: Config) -> Result<Router> {
    tracing::info!("📁 Ensuring upload directory exists: {}", config.storage.upload_dir);
    std::fs::create_dir_all(&config.storage.upload_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create upload directory: {}", e))?;

    tracing::info!("🏗️ Opening workspace database");
    let database = WorkspaceDatabase::open(&config.database.data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open workspace database: {}", e))?;

    tracing::info!("📡 Creating HTTP router with all endpoints");
    let app = create_router(create_state(&database, &config));

    tracing::info!("✅ Application initialized successfully");
    Ok(app)
}

/// Start the HTTP server with the given configuration
pub async fn start_server(config: Config) -> Result<()> {
    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting Notebase server...");

    let app = create_app(config.clone()).await?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "ok"
}
