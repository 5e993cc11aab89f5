//! Local voice backends
//!
//! Microphone capture with Whisper transcription for input, VITS synthesis
//! with speaker playback for output. Both run on their own threads.

mod capture;
mod resampler;
pub mod vits;
pub mod whisper;

pub use vits::{VitsConfig, VitsSynthesizer};
pub use whisper::{WhisperConfig, WhisperRecognizer};
