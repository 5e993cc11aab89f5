use super::capture::MicrophoneCapture;
use super::resampler::resample_mono;
use crate::config::VoiceConfig;
use crate::speech::input::{SpeechInputEvent, SpeechRecognizer};
use crate::{ChatError, Result};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Sample rate Whisper expects
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

#[derive(Clone, Debug)]
pub struct WhisperConfig {
    pub model_path: PathBuf,
    pub language: Option<String>,
    pub n_threads: i32,
    pub max_capture: Duration,
}

impl WhisperConfig {
    pub fn from_voice(voice: &VoiceConfig) -> Option<Self> {
        Some(Self {
            model_path: voice.whisper_model.clone()?,
            language: voice.language.clone(),
            n_threads: 4,
            max_capture: Duration::from_secs_f32(voice.max_capture_secs),
        })
    }
}

/// Speech recognizer backed by the microphone and a local Whisper model.
///
/// One capture session records until `stop()` or the capture limit, then
/// transcribes the whole recording.
pub struct WhisperRecognizer {
    config: WhisperConfig,
    context: Arc<WhisperContext>,
    stop_flag: Arc<AtomicBool>,
}

impl WhisperRecognizer {
    pub fn new(config: WhisperConfig) -> Result<Self> {
        info!("Loading Whisper model from: {:?}", config.model_path);

        if !config.model_path.exists() {
            return Err(ChatError::Speech(format!(
                "Whisper model not found: {:?}",
                config.model_path
            )));
        }

        let model_path = config
            .model_path
            .to_str()
            .ok_or_else(|| ChatError::Speech("Invalid model path".to_string()))?;
        let context = WhisperContext::new_with_params(model_path, WhisperContextParameters::default())
            .map_err(|e| ChatError::Speech(format!("Failed to load Whisper model: {:?}", e)))?;

        info!("Whisper model loaded successfully");

        Ok(Self {
            config,
            context: Arc::new(context),
            stop_flag: Arc::new(AtomicBool::new(false)),
        })
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn start(&mut self, events: Sender<SpeechInputEvent>) -> Result<()> {
        // Each session gets its own flag so stopping it cannot affect a later one
        let stop_flag = Arc::new(AtomicBool::new(false));
        self.stop_flag = Arc::clone(&stop_flag);

        let config = self.config.clone();
        let context = Arc::clone(&self.context);

        thread::Builder::new()
            .name("maya-voice-capture".into())
            .spawn(move || {
                match capture_and_transcribe(&config, &context, &stop_flag) {
                    Ok(text) if !text.is_empty() => {
                        let _ = events.send(SpeechInputEvent::Transcript(text));
                    }
                    Ok(_) => debug!("No speech recognized"),
                    Err(e) => {
                        error!("Voice capture failed: {}", e);
                        let _ = events.send(SpeechInputEvent::Error(e.to_string()));
                    }
                }
                let _ = events.send(SpeechInputEvent::End);
            })
            .map_err(|e| ChatError::Speech(format!("Failed to spawn capture thread: {}", e)))?;

        Ok(())
    }

    fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }
}

fn capture_and_transcribe(
    config: &WhisperConfig,
    context: &WhisperContext,
    stop_flag: &AtomicBool,
) -> Result<String> {
    let mut microphone = MicrophoneCapture::new()?;
    let input_rate = microphone.sample_rate();
    let (audio_tx, audio_rx) = bounded(256);
    microphone.start(audio_tx)?;

    let started = Instant::now();
    let mut recording = Vec::new();
    while !stop_flag.load(Ordering::SeqCst) && started.elapsed() < config.max_capture {
        match audio_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(chunk) => recording.extend_from_slice(&chunk),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    microphone.stop();

    debug!(
        "Captured {:.2}s of audio",
        recording.len() as f32 / input_rate as f32
    );
    if recording.is_empty() {
        return Ok(String::new());
    }

    let samples = resample_mono(&recording, input_rate, WHISPER_SAMPLE_RATE)?;
    transcribe(config, context, &samples)
}

fn transcribe(config: &WhisperConfig, context: &WhisperContext, samples: &[f32]) -> Result<String> {
    let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
    params.set_n_threads(config.n_threads);
    params.set_translate(false);
    params.set_print_special(false);
    params.set_print_progress(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);
    if let Some(ref lang) = config.language {
        params.set_language(Some(lang));
    }

    let mut state = context
        .create_state()
        .map_err(|e| ChatError::Speech(format!("Failed to create state: {:?}", e)))?;

    state
        .full(params, samples)
        .map_err(|e| ChatError::Speech(format!("Transcription failed: {:?}", e)))?;

    let num_segments = state
        .full_n_segments()
        .map_err(|e| ChatError::Speech(format!("Failed to get segments: {:?}", e)))?;

    let mut text = String::new();
    for i in 0..num_segments {
        let segment = state
            .full_get_segment_text(i)
            .map_err(|e| ChatError::Speech(format!("Failed to get segment text: {:?}", e)))?;
        text.push_str(&segment);
    }

    Ok(text.trim().to_string())
}
