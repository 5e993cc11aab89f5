use crate::{ChatError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Base64 image payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Step identifiers arrive as numbers from some backends and strings from others
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepId {
    Number(i64),
    Text(String),
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepId::Number(n) => write!(f, "{}", n),
            StepId::Text(s) => f.write_str(s),
        }
    }
}

/// Backend progress line for the in-flight request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStep {
    pub id: StepId,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub status: String,
}

/// Response body of `POST /chat` as it appears on the wire
#[derive(Debug, Deserialize)]
pub(crate) struct RawChatResponse {
    reply: Option<String>,
    response: Option<String>,
    source: Option<String>,
    steps: Option<Vec<ProcessingStep>>,
}

/// Decoded reply to one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
    pub source: Option<String>,
    pub steps: Vec<ProcessingStep>,
}

impl TryFrom<RawChatResponse> for ChatReply {
    type Error = ChatError;

    fn try_from(raw: RawChatResponse) -> Result<Self> {
        // `reply` wins when both are present
        let reply = raw
            .reply
            .or(raw.response)
            .ok_or_else(|| ChatError::Decode("response has neither `reply` nor `response`".into()))?;

        Ok(Self {
            reply,
            source: raw.source,
            steps: raw.steps.unwrap_or_default(),
        })
    }
}

impl ChatReply {
    pub fn from_json(body: &str) -> Result<Self> {
        let raw: RawChatResponse =
            serde_json::from_str(body).map_err(|e| ChatError::Decode(e.to_string()))?;
        raw.try_into()
    }
}
