use crate::config::VoiceConfig;
use crate::speech::output::{SpeechSynthesizer, Utterance, Voice};
use crate::{ChatError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};
use sherpa_rs::tts::{VitsTts, VitsTtsConfig};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info, warn};

#[derive(Clone, Debug)]
pub struct VitsConfig {
    pub model_path: String,
    pub tokens_path: String,
    pub data_dir: Option<String>,
    pub speakers: Vec<String>,
}

impl VitsConfig {
    pub fn from_voice(voice: &VoiceConfig) -> Option<Self> {
        Some(Self {
            model_path: voice.tts_model.clone()?,
            tokens_path: voice.tts_tokens.clone()?,
            data_dir: voice.tts_data_dir.clone(),
            speakers: voice.speakers.clone(),
        })
    }

    /// Configured speakers as voices; speaker id is the list index
    pub fn voices(&self) -> Vec<Voice> {
        self.speakers
            .iter()
            .enumerate()
            .map(|(id, name)| Voice {
                id,
                name: name.clone(),
            })
            .collect()
    }
}

enum SynthCommand {
    Speak {
        utterance: Utterance,
        generation: u64,
    },
    Stop,
}

/// Speech synthesizer backed by a local VITS model and the default output device.
///
/// Synthesis and playback run on a worker thread. `cancel()` bumps the
/// generation counter, so a synthesis that finishes after a newer `speak()`
/// or `cancel()` is discarded instead of played.
pub struct VitsSynthesizer {
    voices: Vec<Voice>,
    command_tx: Sender<SynthCommand>,
    generation: Arc<AtomicU64>,
}

impl VitsSynthesizer {
    pub fn new(config: VitsConfig) -> Result<Self> {
        if !Path::new(&config.model_path).exists() {
            return Err(ChatError::Speech(format!(
                "TTS model not found: {}",
                config.model_path
            )));
        }
        if !Path::new(&config.tokens_path).exists() {
            return Err(ChatError::Speech(format!(
                "TTS tokens file not found: {}",
                config.tokens_path
            )));
        }

        let (command_tx, command_rx) = unbounded();
        let generation = Arc::new(AtomicU64::new(0));
        let voices = config.voices();

        let worker_generation = Arc::clone(&generation);
        thread::Builder::new()
            .name("maya-tts".into())
            .spawn(move || run_worker(config, command_rx, worker_generation))
            .map_err(|e| ChatError::Speech(format!("Failed to spawn TTS worker: {}", e)))?;

        Ok(Self {
            voices,
            command_tx,
            generation,
        })
    }
}

impl SpeechSynthesizer for VitsSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let _ = self.command_tx.send(SynthCommand::Stop);
    }

    fn speak(&mut self, utterance: Utterance) -> Result<()> {
        let generation = self.generation.load(Ordering::SeqCst);
        self.command_tx
            .send(SynthCommand::Speak {
                utterance,
                generation,
            })
            .map_err(|e| ChatError::Channel(format!("TTS worker is gone: {}", e)))
    }
}

fn run_worker(config: VitsConfig, command_rx: Receiver<SynthCommand>, generation: Arc<AtomicU64>) {
    info!("Loading VITS TTS model from: {}", config.model_path);

    let vits_config = VitsTtsConfig {
        model: config.model_path.clone(),
        tokens: config.tokens_path.clone(),
        data_dir: config.data_dir.clone().unwrap_or_default(),
        ..Default::default()
    };
    let mut tts = VitsTts::new(vits_config);

    // The output stream must stay alive (and on this thread) while sinks play
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(output) => output,
        Err(e) => {
            error!("No audio output device: {}", e);
            return;
        }
    };

    info!("TTS worker ready");
    let mut sink: Option<Sink> = None;

    while let Ok(command) = command_rx.recv() {
        match command {
            SynthCommand::Stop => {
                if let Some(current) = sink.take() {
                    current.stop();
                }
            }
            SynthCommand::Speak {
                utterance,
                generation: requested,
            } => {
                if generation.load(Ordering::SeqCst) != requested {
                    debug!("Skipping stale utterance");
                    continue;
                }

                let speaker_id = utterance.voice.as_ref().map(|v| v.id as i32).unwrap_or(0);
                let audio = match tts.create(&utterance.text, speaker_id, utterance.rate) {
                    Ok(audio) => audio,
                    Err(e) => {
                        warn!("Synthesis failed: {}", e);
                        continue;
                    }
                };

                // A newer speak or cancel arrived while synthesizing
                if generation.load(Ordering::SeqCst) != requested {
                    debug!("Discarding stale synthesis");
                    continue;
                }

                let new_sink = match Sink::try_new(&handle) {
                    Ok(sink) => sink,
                    Err(e) => {
                        warn!("Failed to open audio sink: {}", e);
                        continue;
                    }
                };
                new_sink.append(SamplesBuffer::new(1, audio.sample_rate as u32, audio.samples));
                if let Some(previous) = sink.replace(new_sink) {
                    previous.stop();
                }
            }
        }
    }

    debug!("TTS worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_requires_model_and_tokens() {
        assert!(VitsConfig::from_voice(&VoiceConfig::default()).is_none());

        let voice = VoiceConfig {
            tts_model: Some("en_US-amy.onnx".into()),
            tts_tokens: Some("tokens.txt".into()),
            speakers: vec!["Amy Female".into(), "Ryan".into()],
            ..Default::default()
        };
        let config = VitsConfig::from_voice(&voice).unwrap();
        let voices = config.voices();
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[1].id, 1);
        assert_eq!(voices[1].name, "Ryan");
    }

    #[test]
    fn test_missing_model_is_an_error() {
        let config = VitsConfig {
            model_path: "/nonexistent/model.onnx".into(),
            tokens_path: "/nonexistent/tokens.txt".into(),
            data_dir: None,
            speakers: Vec::new(),
        };
        assert!(VitsSynthesizer::new(config).is_err());
    }
}
