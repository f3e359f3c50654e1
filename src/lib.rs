/// Notebase: self-hosted workspace backend
///
/// Documents, spreadsheet-like database pages with typed schemas and multiple
/// views, and page attachments (uploads, drawings, voice notes), served over
/// HTTP with owner-scoped access control.

// Core configuration and setup
pub mod config;

// Shared error taxonomy
pub mod error;

// SQLite connection and schema bootstrap
pub mod store;

// Sessions and the ownership guard
pub mod auth;

// Database pages: schema, items, views
pub mod workspace;

// Headless view dispatch and field formatting
pub mod render;

// Rich-text documents
pub mod documents;

// Upload URLs, blobs and file metadata
pub mod files;

// Drawings and voice notes
pub mod media;

// HTTP API layer
pub mod api;

// Typed HTTP client
pub mod client;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use auth::Caller;
pub use client::NotebaseClient;
pub use error::{EntityKind, WorkspaceError};
pub use server::start_server;
pub use workspace::{ColumnDefinition, ColumnType, FieldValue, Item, Page, View, ViewType, WorkspaceService};
