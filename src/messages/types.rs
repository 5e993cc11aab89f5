use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Position of a message in its transcript. Strictly increasing in append order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Locally renderable reference to an attached image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePreview {
    pub path: PathBuf,
    pub mime_type: String,
}

impl ImagePreview {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub image: Option<ImagePreview>,
    pub source: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

/// A message waiting to be appended; the transcript assigns its id.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub role: Role,
    pub content: String,
    pub image: Option<ImagePreview>,
    pub source: Option<String>,
}

impl NewMessage {
    pub fn user(content: impl Into<String>, image: Option<ImagePreview>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            image,
            source: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            image: None,
            source: None,
        }
    }

    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }
}
