/// Configuration management for the Notebase server
///
/// Handles server binding, the SQLite data directory and blob storage settings.

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Uploaded file storage configuration
    pub storage: StorageConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Directory holding workspace.db (default: "data")
    pub data_dir: String,
}

/// Blob storage configuration for uploads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory where uploaded bytes are written, one file per storage id
    pub upload_dir: String,
    /// Externally reachable base URL used when handing out upload and file URLs
    pub public_base_url: String,
    /// Largest accepted upload body in bytes
    pub max_upload_bytes: usize,
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for k8s/container deployment
    fn default() -> Self {
        let host = std::env::var("NOTEBASE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("NOTEBASE_PORT")
            .unwrap_or_else(|_| "3210".to_string())
            .parse()
            .unwrap_or(3210);
        let data_dir = std::env::var("NOTEBASE_DATA_DIR").unwrap_or_else(|_| "data".to_string());

        Self {
            storage: StorageConfig {
                upload_dir: std::env::var("NOTEBASE_UPLOAD_DIR")
                    .unwrap_or_else(|_| format!("{}/uploads", data_dir)),
                public_base_url: std::env::var("NOTEBASE_PUBLIC_URL")
                    .unwrap_or_else(|_| format!("http://{}:{}", host, port)),
                max_upload_bytes: std::env::var("NOTEBASE_MAX_UPLOAD_BYTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(25 * 1024 * 1024),
            },
            server: ServerConfig { host, port },
            database: DatabaseConfig { data_dir },
        }
    }
}
