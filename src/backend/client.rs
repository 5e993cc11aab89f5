use super::types::{ChatReply, ChatRequest, RawChatResponse};
use crate::config::BackendConfig;
use crate::profile::Profile;
use crate::{ChatError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::debug;

/// Remote assistant service
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// `GET /profile`
    async fn fetch_profile(&self) -> Result<Profile>;

    /// `POST /chat`, exactly one attempt
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply>;
}

/// [`ChatBackend`] over HTTP/JSON
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ChatError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string());
    Err(ChatError::Backend {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn fetch_profile(&self) -> Result<Profile> {
        let url = self.endpoint("profile");
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let profile = ensure_success(response).await?.json::<Profile>().await?;
        Ok(profile)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        let url = self.endpoint("chat");
        debug!(
            "POST {} ({} chars, image: {})",
            url,
            request.message.len(),
            request.image.is_some()
        );

        let response = self.client.post(&url).json(request).send().await?;
        let raw = ensure_success(response)
            .await?
            .json::<RawChatResponse>()
            .await?;
        raw.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = BackendConfig {
            base_url: "http://localhost:9000/".into(),
            timeout_secs: None,
        };
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:9000");
        assert_eq!(backend.endpoint("chat"), "http://localhost:9000/chat");
    }
}
