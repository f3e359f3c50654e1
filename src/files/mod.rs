/// File uploads
///
/// Two-step upload: hand out a single-use upload URL, accept raw bytes on it,
/// then record metadata (optionally attaching the file to a document).
/// Uploaded bytes are opaque to the server.

pub mod storage;

pub use storage::{FileMetadata, FileStorage, NewFileMetadata, StoredBlob};
