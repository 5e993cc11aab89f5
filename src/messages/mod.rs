pub mod storage;
pub mod types;

pub use storage::Transcript;
pub use types::{ImagePreview, Message, MessageId, NewMessage, Role};
