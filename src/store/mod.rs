/// Backing store
///
/// A single SQLite database through sqlx stands in for the managed document
/// store. Each resource module keeps its own queries next to its types.

pub mod database;

pub use database::WorkspaceDatabase;
