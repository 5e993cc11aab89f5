//! Image attachments for outgoing turns
//!
//! An attachment is staged from a local file. It yields a preview reference
//! for the transcript right away and a base64 payload when the turn is sent.

use crate::messages::ImagePreview;
use crate::{ChatError, Result};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use mime_guess::mime;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    path: PathBuf,
    mime_type: String,
}

impl Attachment {
    /// Stage `path` as an attachment. Returns `None` unless the file looks like an image.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let guess = mime_guess::from_path(&path).first()?;
        if guess.type_() != mime::IMAGE {
            debug!("Ignoring non-image attachment {:?} ({})", path, guess);
            return None;
        }

        Some(Self {
            path,
            mime_type: guess.essence_str().to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn preview(&self) -> ImagePreview {
        ImagePreview {
            path: self.path.clone(),
            mime_type: self.mime_type.clone(),
        }
    }

    /// Read the file and encode it as standard base64
    pub async fn encode(&self) -> Result<String> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            ChatError::Attachment(format!("Failed to read {:?}: {}", self.path, e))
        })?;

        debug!("Encoded attachment {:?} ({} bytes)", self.path, bytes.len());
        Ok(BASE64_STANDARD.encode(bytes))
    }
}
