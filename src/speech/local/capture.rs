use crate::{ChatError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::Sender;
use tracing::{debug, error, info};

/// Microphone capture on the default input device, downmixed to mono.
///
/// The cpal stream is not `Send`, so a capture must live on the thread that
/// created it.
pub struct MicrophoneCapture {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
}

impl MicrophoneCapture {
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| ChatError::Speech("No input device available".into()))?;

        info!(
            "Using input device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = device
            .default_input_config()
            .map_err(|e| ChatError::Speech(format!("Failed to get input config: {}", e)))?
            .into();

        Ok(Self {
            device,
            config,
            stream: None,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Start sending mono sample chunks to `audio_tx`
    pub fn start(&mut self, audio_tx: Sender<Vec<f32>>) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let channels = self.config.channels as usize;
        let err_fn = |err| {
            error!("Audio input stream error: {}", err);
        };

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let samples = if channels == 1 {
                        data.to_vec()
                    } else {
                        data.chunks(channels)
                            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                            .collect()
                    };

                    if let Err(e) = audio_tx.try_send(samples) {
                        debug!("Dropping captured audio: {}", e);
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| ChatError::Speech(format!("Failed to build input stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| ChatError::Speech(format!("Failed to start input stream: {}", e)))?;

        self.stream = Some(stream);
        debug!("Microphone capture started at {} Hz", self.sample_rate());
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            debug!("Microphone capture stopped");
        }
    }
}

impl Drop for MicrophoneCapture {
    fn drop(&mut self) {
        self.stop();
    }
}
