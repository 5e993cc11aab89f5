use super::types::{Message, MessageId, NewMessage};
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;

/// Append-only conversation transcript.
///
/// Entries are never reordered, edited or removed once appended. Clones share
/// the same underlying storage so rendering code can hold a handle.
#[derive(Debug, Clone)]
pub struct Transcript {
    inner: Arc<RwLock<TranscriptInner>>,
}

#[derive(Debug, Default)]
struct TranscriptInner {
    messages: Vec<Message>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(TranscriptInner::default())),
        }
    }

    pub(crate) fn append(&self, message: NewMessage) -> Message {
        let mut inner = self.inner.write();
        inner.next_id += 1;
        let message = Message {
            id: MessageId(inner.next_id),
            role: message.role,
            content: message.content,
            image: message.image,
            source: message.source,
            timestamp: Utc::now(),
        };
        inner.messages.push(message.clone());
        message
    }

    pub fn get_all(&self) -> Vec<Message> {
        self.inner.read().messages.clone()
    }

    pub fn last(&self) -> Option<Message> {
        self.inner.read().messages.last().cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().messages.is_empty()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Role;

    #[test]
    fn test_ids_increase_in_append_order() {
        let transcript = Transcript::new();
        let first = transcript.append(NewMessage::user("Hello", None));
        let second = transcript.append(NewMessage::assistant("Hi there!"));

        assert!(second.id > first.id);
        assert_eq!(transcript.len(), 2);

        let all = transcript.get_all();
        assert_eq!(all[0].role, Role::User);
        assert_eq!(all[1].role, Role::Assistant);
    }

    #[test]
    fn test_clones_share_storage() {
        let transcript = Transcript::new();
        let view = transcript.clone();
        transcript.append(NewMessage::assistant("shared"));

        assert_eq!(view.len(), 1);
        assert_eq!(view.last().map(|m| m.content), Some("shared".to_string()));
    }

    #[test]
    fn test_assistant_source_is_kept() {
        let transcript = Transcript::new();
        let message =
            transcript.append(NewMessage::assistant("42").with_source(Some("search".into())));
        assert_eq!(message.source.as_deref(), Some("search"));
        assert!(message.image.is_none());
    }
}
