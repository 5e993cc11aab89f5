//! Voice input and output
//!
//! This module provides:
//! - Speech input: a recognizer facade that fills the draft with transcripts
//! - Speech output: a synthesizer facade that reads replies aloud
//!
//! Both capabilities are optional. Without a backend the adapters are inert.

pub mod input;
#[cfg(feature = "local-voice")]
pub mod local;
pub mod output;

pub use input::{SpeechInputAdapter, SpeechInputEvent, SpeechRecognizer};
pub use output::{
    select_voice, SpeechOutputAdapter, SpeechSynthesizer, Utterance, Voice, DEFAULT_SPEECH_RATE,
};

use crate::config::VoiceConfig;
use tracing::info;

/// Speech input with the best backend this build and configuration provide
#[cfg_attr(not(feature = "local-voice"), allow(unused_variables))]
pub fn platform_input(config: &VoiceConfig) -> SpeechInputAdapter {
    #[cfg(feature = "local-voice")]
    if let Some(whisper) = local::WhisperConfig::from_voice(config) {
        match local::WhisperRecognizer::new(whisper) {
            Ok(recognizer) => {
                info!("Voice input enabled");
                return SpeechInputAdapter::new(Some(Box::new(recognizer)));
            }
            Err(e) => tracing::warn!("Voice input disabled: {}", e),
        }
    }

    info!("Voice input unavailable");
    SpeechInputAdapter::unavailable()
}

/// Speech output with the best backend this build and configuration provide
pub fn platform_output(config: &VoiceConfig) -> SpeechOutputAdapter {
    #[cfg(feature = "local-voice")]
    if let Some(vits) = local::VitsConfig::from_voice(config) {
        match local::VitsSynthesizer::new(vits) {
            Ok(synthesizer) => {
                info!("Voice output enabled");
                return SpeechOutputAdapter::new(Some(Box::new(synthesizer)), config);
            }
            Err(e) => tracing::warn!("Voice output disabled: {}", e),
        }
    }

    info!("Voice output unavailable");
    SpeechOutputAdapter::new(None, config)
}
