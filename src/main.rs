/// Notebase server entry point
///
/// Loads configuration from the environment and starts the HTTP server:
/// - Database pages, items and views at /api/pages/*, /api/items/*, /api/views/*
/// - Documents at /api/documents/*
/// - Uploads and files at /api/upload-url, /api/uploads/*, /api/storage/*
/// - Health check at /healthz

use notebase::{config::Config, server::start_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();

    start_server(config).await?;

    Ok(())
}
