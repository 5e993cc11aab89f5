//! Speech input adapter
//!
//! Wraps an optional speech recognizer behind a facade that tolerates its
//! absence. Each capture session gets a fresh channel, so late events from an
//! earlier session can never end a newer one.

use crate::Result;
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use tracing::{debug, info, warn};

/// Events produced by a recognizer during one capture session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechInputEvent {
    /// Final transcript of the captured speech
    Transcript(String),
    /// Capture ended (with or without a transcript)
    End,
    /// Capture failed
    Error(String),
}

/// Platform speech recognition capability
pub trait SpeechRecognizer: Send {
    /// Begin one capture session, reporting on `events`
    fn start(&mut self, events: Sender<SpeechInputEvent>) -> Result<()>;

    /// Ask the current session to finish early
    fn stop(&mut self);
}

pub struct SpeechInputAdapter {
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    listening: bool,
    events: Option<Receiver<SpeechInputEvent>>,
}

impl SpeechInputAdapter {
    pub fn new(recognizer: Option<Box<dyn SpeechRecognizer>>) -> Self {
        Self {
            recognizer,
            listening: false,
            events: None,
        }
    }

    /// Adapter with no recognizer; every operation is inert
    pub fn unavailable() -> Self {
        Self::new(None)
    }

    pub fn is_available(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Start a capture session. Returns false if unavailable, already
    /// listening, or the recognizer refused to start.
    pub fn start(&mut self) -> bool {
        let Some(recognizer) = self.recognizer.as_mut() else {
            debug!("Speech input unavailable, ignoring start");
            return false;
        };

        if self.listening {
            debug!("Already listening, ignoring start");
            return false;
        }

        let (tx, rx) = bounded(8);
        match recognizer.start(tx) {
            Ok(()) => {
                info!("Listening for voice input");
                self.listening = true;
                self.events = Some(rx);
                true
            }
            Err(e) => {
                warn!("Speech recognizer failed to start: {}", e);
                false
            }
        }
    }

    pub fn stop(&mut self) {
        if !self.listening {
            return;
        }
        if let Some(recognizer) = self.recognizer.as_mut() {
            recognizer.stop();
        }
    }

    /// Collect events from the current session. The listening flag drops as
    /// soon as a transcript, end or error is seen. A recognizer that drops its
    /// sender without reporting counts as an end of capture.
    pub fn drain_events(&mut self) -> Vec<SpeechInputEvent> {
        let Some(rx) = &self.events else {
            return Vec::new();
        };

        let mut events = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    let finished = events.iter().any(|e| {
                        matches!(e, SpeechInputEvent::End | SpeechInputEvent::Error(_))
                    });
                    if !finished {
                        warn!("Speech recognizer closed its channel without ending");
                        events.push(SpeechInputEvent::End);
                    }
                    break;
                }
            }
        }

        if !events.is_empty() {
            self.listening = false;
        }

        for event in &events {
            match event {
                SpeechInputEvent::Transcript(text) => debug!("Voice transcript: {:?}", text),
                SpeechInputEvent::End => debug!("Voice capture ended"),
                SpeechInputEvent::Error(e) => warn!("Voice capture failed: {}", e),
            }
        }

        if events.contains(&SpeechInputEvent::End)
            || events
                .iter()
                .any(|e| matches!(e, SpeechInputEvent::Error(_)))
        {
            self.events = None;
        }

        events
    }
}
