//! Application configuration
//!
//! Defaults are usable out of the box. A TOML file at
//! `<config dir>/maya/config.toml` overrides them, and `MAYA_BACKEND_URL`
//! overrides the backend address last.

use crate::speech::DEFAULT_SPEECH_RATE;
use crate::{ChatError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
pub const BACKEND_URL_ENV: &str = "MAYA_BACKEND_URL";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the assistant service
    pub base_url: String,

    /// Optional per-request timeout. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name the assistant introduces itself with
    pub assistant_name: String,

    /// Pause between a reply arriving and it being shown
    pub reply_delay_ms: u64,

    /// Pause between revealing consecutive processing steps
    pub step_reveal_interval_ms: u64,

    /// Submit voice transcripts immediately instead of leaving them in the draft
    pub auto_send_voice: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            assistant_name: "Maya".to_string(),
            reply_delay_ms: 800,
            step_reveal_interval_ms: 600,
            auto_send_voice: false,
        }
    }
}

impl SessionConfig {
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    pub fn step_reveal_interval(&self) -> Duration {
        Duration::from_millis(self.step_reveal_interval_ms)
    }

    /// No artificial pacing; replies are shown as soon as they arrive
    pub fn without_delays(mut self) -> Self {
        self.reply_delay_ms = 0;
        self.step_reveal_interval_ms = 0;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Speech rate for spoken replies (1.0 = natural)
    pub speech_rate: f32,

    /// Voice name fragments marking a preferred voice (case-insensitive)
    pub preferred_voices: Vec<String>,

    /// Whisper model for local speech recognition
    pub whisper_model: Option<PathBuf>,

    /// Language hint for recognition (None for auto-detection)
    pub language: Option<String>,

    /// Upper bound on one capture session
    pub max_capture_secs: f32,

    /// VITS model for local speech synthesis
    pub tts_model: Option<String>,

    /// Tokens file for the VITS model
    pub tts_tokens: Option<String>,

    /// espeak-ng data directory for the VITS model
    pub tts_data_dir: Option<String>,

    /// Speaker names exposed as voices, indexed by speaker id
    pub speakers: Vec<String>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            speech_rate: DEFAULT_SPEECH_RATE,
            preferred_voices: vec![
                "natural".to_string(),
                "google uk english female".to_string(),
                "zira".to_string(),
                "female".to_string(),
            ],
            whisper_model: None,
            language: Some("en".to_string()),
            max_capture_secs: 8.0,
            tts_model: None,
            tts_tokens: None,
            tts_data_dir: None,
            speakers: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub voice: VoiceConfig,
}

impl AppConfig {
    /// Default config file location, if the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("maya").join("config.toml"))
    }

    /// Load from the default location (if present) and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            config.backend.base_url = url;
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)
            .map_err(|e| ChatError::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ChatError::Config(e.to_string()))
    }

    /// Set the backend base URL
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend.base_url = url.into();
        self
    }

    /// Set the session configuration
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let url = self.backend.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ChatError::Config(format!(
                "Backend URL must start with http:// or https://: {}",
                self.backend.base_url
            )));
        }

        if self.backend.timeout_secs == Some(0) {
            return Err(ChatError::Config("Request timeout must be positive".into()));
        }

        if !self.voice.speech_rate.is_finite() || self.voice.speech_rate <= 0.0 {
            return Err(ChatError::Config(format!(
                "Speech rate must be positive, got {}",
                self.voice.speech_rate
            )));
        }

        if self.voice.max_capture_secs <= 0.0 {
            return Err(ChatError::Config("Capture length must be positive".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.backend.base_url, DEFAULT_BACKEND_URL);
        assert!(config.backend.request_timeout().is_none());
        assert_eq!(config.session.assistant_name, "Maya");
        assert_eq!(config.session.reply_delay(), Duration::from_millis(800));
        assert!(!config.session.auto_send_voice);
        assert!((config.voice.speech_rate - 0.95).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [backend]
            base_url = "http://10.0.0.5:8080"
            timeout_secs = 30

            [session]
            auto_send_voice = true
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.base_url, "http://10.0.0.5:8080");
        assert_eq!(config.backend.request_timeout(), Some(Duration::from_secs(30)));
        assert!(config.session.auto_send_voice);
        assert_eq!(config.session.assistant_name, "Maya");
        assert_eq!(config.voice, VoiceConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = AppConfig::from_toml("[backend\nbase_url = 1").unwrap_err();
        assert!(matches!(err, ChatError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = AppConfig::default().with_backend_url("ftp://example.com");
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.voice.speech_rate = 0.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.backend.timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_without_delays() {
        let session = SessionConfig::default().without_delays();
        assert_eq!(session.reply_delay(), Duration::ZERO);
        assert_eq!(session.step_reveal_interval(), Duration::ZERO);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[session]\nassistant_name = \"Iris\"\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.session.assistant_name, "Iris");
    }
}
