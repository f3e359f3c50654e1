/// Database pages
///
/// Schemas, items and views of database pages:
/// - Type definitions (Page, ColumnDefinition, Item, View)
/// - Field validation against the page schema
/// - SQLite persistence with sqlx
/// - Guarded request handlers

pub mod types;

pub mod validation;

pub mod storage;

pub mod service;

pub use service::WorkspaceService;
pub use storage::WorkspaceStorage;
pub use types::{
    ColumnDefinition, ColumnType, FieldValue, Fields, Item, Page, PageType, SelectOption,
    SortDirection, View, ViewConfig, ViewPatch, ViewType,
};
