/// Page-scoped media records (drawings and voice notes)

pub mod storage;
pub mod types;

pub use storage::MediaStorage;
pub use types::{Drawing, NewDrawing, NewVoiceNote, VoiceNote};
