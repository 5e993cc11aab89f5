pub mod attachment;
pub mod backend;
pub mod config;
pub mod dispatch;
pub mod messages;
pub mod profile;
pub mod session;
pub mod speech;
pub mod ui;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ChatError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("Attachment error: {0}")]
    Attachment(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ChatError {
    fn from(e: std::io::Error) -> Self {
        ChatError::Io(e.to_string())
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ChatError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            ChatError::Backend {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            ChatError::Network(e.to_string())
        }
    }
}

impl ChatError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // The user can always resubmit after a failed round trip
            ChatError::Network(_) => true,
            ChatError::Decode(_) => true,
            ChatError::Backend { .. } => true,
            // A different file can be attached
            ChatError::Attachment(_) => true,
            ChatError::Speech(_) => true,
            ChatError::Config(_) => false,
            ChatError::Channel(_) => false,
            ChatError::Io(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Network(_) => {
                "Could not reach the assistant. Please check the backend and try again.".to_string()
            }
            ChatError::Decode(_) => "The assistant sent a reply that could not be read.".to_string(),
            ChatError::Backend { status, .. } => {
                format!("The assistant backend failed (HTTP {}). Please try again.", status)
            }
            ChatError::Attachment(_) => {
                "The attached image could not be read. Please attach it again.".to_string()
            }
            ChatError::Speech(_) => "Voice features are unavailable right now.".to_string(),
            ChatError::Config(_) => "Configuration error. Please check settings.".to_string(),
            ChatError::Channel(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            ChatError::Io(_) => "File system error occurred.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;

pub use backend::ProcessingStep;
pub use messages::{Message, Role, Transcript};
pub use profile::Profile;
pub use session::SessionController;
