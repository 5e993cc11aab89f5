//! Speech output adapter
//!
//! Reads finalized assistant replies aloud. The synthesis channel belongs to
//! the most recent `speak()`: any utterance still playing is cancelled first,
//! and nothing is ever queued behind it.

use crate::config::VoiceConfig;
use crate::Result;
use tracing::{debug, warn};

/// Rate slightly below natural speech
pub const DEFAULT_SPEECH_RATE: f32 = 0.95;

/// A voice offered by the synthesizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub id: usize,
    pub name: String,
}

/// One request to speak
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// `None` uses the platform default voice
    pub voice: Option<Voice>,
    pub rate: f32,
}

/// Platform speech synthesis capability
pub trait SpeechSynthesizer: Send {
    fn voices(&self) -> Vec<Voice>;

    /// Stop whatever is currently being spoken
    fn cancel(&mut self);

    fn speak(&mut self, utterance: Utterance) -> Result<()>;
}

/// First voice, in platform order, whose name contains any of `hints`
/// (case-insensitive).
pub fn select_voice(voices: &[Voice], hints: &[String]) -> Option<Voice> {
    let hints: Vec<String> = hints.iter().map(|h| h.to_lowercase()).collect();
    voices
        .iter()
        .find(|voice| {
            let name = voice.name.to_lowercase();
            hints.iter().any(|hint| name.contains(hint.as_str()))
        })
        .cloned()
}

pub struct SpeechOutputAdapter {
    synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    rate: f32,
    preferred_voices: Vec<String>,
}

impl SpeechOutputAdapter {
    pub fn new(synthesizer: Option<Box<dyn SpeechSynthesizer>>, config: &VoiceConfig) -> Self {
        Self {
            synthesizer,
            rate: config.speech_rate,
            preferred_voices: config.preferred_voices.clone(),
        }
    }

    /// Adapter with no synthesizer; every operation is inert
    pub fn unavailable() -> Self {
        Self::new(None, &VoiceConfig::default())
    }

    pub fn is_available(&self) -> bool {
        self.synthesizer.is_some()
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Speak `text`, interrupting any earlier utterance
    pub fn speak(&mut self, text: &str) {
        let Some(synthesizer) = self.synthesizer.as_mut() else {
            return;
        };

        synthesizer.cancel();

        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let voice = select_voice(&synthesizer.voices(), &self.preferred_voices);
        debug!(
            "Speaking {} chars with voice {:?}",
            text.len(),
            voice.as_ref().map(|v| v.name.as_str())
        );

        let utterance = Utterance {
            text: text.to_string(),
            voice,
            rate: self.rate,
        };
        if let Err(e) = synthesizer.speak(utterance) {
            warn!("Speech synthesis failed: {}", e);
        }
    }

    pub fn cancel(&mut self) {
        if let Some(synthesizer) = self.synthesizer.as_mut() {
            synthesizer.cancel();
        }
    }
}
