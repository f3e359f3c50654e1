/// Rich-text documents
///
/// Document content is an editor-owned tree that the server stores verbatim.
/// The only structure the server relies on is the `attachments` list.

pub mod storage;
pub mod types;

pub use storage::DocumentStorage;
pub use types::{Attachment, Document, RichText};
