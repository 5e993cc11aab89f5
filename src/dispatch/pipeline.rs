//! Dispatch pipeline for backend round trips
//!
//! Provides a channel-based interface: the UI thread sends commands, a worker
//! thread with its own tokio runtime talks to the backend and reports events.
//! Every `Send` command resolves to exactly one terminal event.

use crate::attachment::Attachment;
use crate::backend::{ChatBackend, ChatRequest, ProcessingStep};
use crate::config::SessionConfig;
use crate::profile::Profile;
use crate::{ChatError, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Commands that can be sent to the dispatch pipeline
#[derive(Debug, Clone)]
pub enum DispatchCommand {
    /// Fetch the display profile
    FetchProfile,

    /// Send one user turn
    Send {
        /// Request ID for tracking
        request_id: Uuid,
        /// Trimmed user text (may be empty for image-only turns)
        message: String,
        /// Staged image, encoded by the worker before sending
        attachment: Option<Attachment>,
    },

    /// Shutdown the pipeline
    Shutdown,
}

/// Events emitted by the dispatch pipeline
#[derive(Debug, Clone)]
pub enum DispatchEvent {
    /// Profile fetched
    ProfileLoaded(Profile),

    /// Profile fetch failed
    ProfileUnavailable(String),

    /// Backend reported progress steps for a request
    Steps {
        request_id: Uuid,
        steps: Vec<ProcessingStep>,
    },

    /// Reply ready to be shown
    Delivered {
        request_id: Uuid,
        reply: String,
        source: Option<String>,
    },

    /// Transport, status or decoding failure
    Failed { request_id: Uuid, error: ChatError },

    /// The attachment could not be read; nothing was sent
    EncodeFailed { request_id: Uuid, error: ChatError },

    /// Pipeline has shut down
    Shutdown,
}

impl DispatchEvent {
    pub fn request_id(&self) -> Option<Uuid> {
        match self {
            DispatchEvent::Steps { request_id, .. }
            | DispatchEvent::Delivered { request_id, .. }
            | DispatchEvent::Failed { request_id, .. }
            | DispatchEvent::EncodeFailed { request_id, .. } => Some(*request_id),
            _ => None,
        }
    }
}

/// Display pacing applied by the worker before a reply is delivered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchTiming {
    /// Fixed pause after the reply arrives
    pub reply_delay: Duration,
    /// Extra pause per processing step, so every step is seen before the reply
    pub step_reveal_interval: Duration,
}

impl From<&SessionConfig> for DispatchTiming {
    fn from(config: &SessionConfig) -> Self {
        Self {
            reply_delay: config.reply_delay(),
            step_reveal_interval: config.step_reveal_interval(),
        }
    }
}

impl DispatchTiming {
    pub fn delay_for(&self, step_count: usize) -> Duration {
        self.reply_delay + self.step_reveal_interval * step_count as u32
    }
}

/// UI side of the pipeline
#[derive(Debug, Clone)]
pub struct DispatchHandle {
    command_tx: Sender<DispatchCommand>,
    event_rx: Receiver<DispatchEvent>,
}

impl DispatchHandle {
    pub fn new(command_tx: Sender<DispatchCommand>, event_rx: Receiver<DispatchEvent>) -> Self {
        Self {
            command_tx,
            event_rx,
        }
    }

    pub fn send(&self, command: DispatchCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|e| ChatError::Channel(format!("Dispatch worker is gone: {}", e)))
    }

    /// Ask the worker to stop without blocking
    pub fn shutdown(&self) {
        if self.command_tx.try_send(DispatchCommand::Shutdown).is_err() {
            debug!("Dispatch worker already gone or busy, not signalling shutdown");
        }
    }

    /// Drain every event that is ready without blocking
    pub fn try_events(&self) -> Vec<DispatchEvent> {
        self.event_rx.try_iter().collect()
    }

    pub fn event_receiver(&self) -> Receiver<DispatchEvent> {
        self.event_rx.clone()
    }
}

/// Dispatch pipeline with channel-based communication
pub struct DispatchPipeline {
    backend: Arc<dyn ChatBackend>,
    timing: DispatchTiming,
    command_tx: Sender<DispatchCommand>,
    command_rx: Receiver<DispatchCommand>,
    event_tx: Sender<DispatchEvent>,
    event_rx: Receiver<DispatchEvent>,
}

impl DispatchPipeline {
    pub fn new(backend: Arc<dyn ChatBackend>, timing: DispatchTiming) -> Self {
        let (command_tx, command_rx) = bounded(16);
        let (event_tx, event_rx) = bounded(64);

        Self {
            backend,
            timing,
            command_tx,
            command_rx,
            event_tx,
            event_rx,
        }
    }

    pub fn handle(&self) -> DispatchHandle {
        DispatchHandle::new(self.command_tx.clone(), self.event_rx.clone())
    }

    /// Start the pipeline worker thread
    ///
    /// The worker exits on `Shutdown` or once every handle has been dropped.
    pub fn start_worker(self) -> Result<JoinHandle<()>> {
        let DispatchPipeline {
            backend,
            timing,
            command_rx,
            event_tx,
            ..
        } = self;

        thread::Builder::new()
            .name("maya-dispatch".into())
            .spawn(move || {
                info!("Dispatch worker starting");

                let runtime = match Runtime::new() {
                    Ok(rt) => rt,
                    Err(e) => {
                        error!("Failed to create tokio runtime: {}", e);
                        let _ = event_tx.send(DispatchEvent::Shutdown);
                        return;
                    }
                };

                let worker = Worker {
                    backend,
                    timing,
                    event_tx,
                };

                // Profile fetches run alongside chat turns; turns stay serialized
                while let Ok(command) = command_rx.recv() {
                    match command {
                        DispatchCommand::FetchProfile => {
                            let worker = worker.clone();
                            runtime.spawn(async move { worker.fetch_profile().await });
                        }
                        DispatchCommand::Send {
                            request_id,
                            message,
                            attachment,
                        } => runtime.block_on(worker.send(request_id, message, attachment)),
                        DispatchCommand::Shutdown => break,
                    }
                }

                info!("Dispatch worker stopped");
                worker.emit(DispatchEvent::Shutdown);
            })
            .map_err(|e| ChatError::Channel(format!("Failed to spawn dispatch worker: {}", e)))
    }
}

#[derive(Clone)]
struct Worker {
    backend: Arc<dyn ChatBackend>,
    timing: DispatchTiming,
    event_tx: Sender<DispatchEvent>,
}

impl Worker {
    fn emit(&self, event: DispatchEvent) {
        // The session may already be gone; its results are no longer wanted
        if self.event_tx.send(event).is_err() {
            debug!("Dropping dispatch event, receiver closed");
        }
    }

    async fn fetch_profile(&self) {
        match self.backend.fetch_profile().await {
            Ok(profile) => {
                info!("Profile loaded for {}", profile.name);
                self.emit(DispatchEvent::ProfileLoaded(profile));
            }
            Err(e) => {
                warn!("Profile fetch failed: {}", e);
                self.emit(DispatchEvent::ProfileUnavailable(e.to_string()));
            }
        }
    }

    async fn send(&self, request_id: Uuid, message: String, attachment: Option<Attachment>) {
        debug!("Dispatching request {}", request_id);

        let image = match &attachment {
            Some(attachment) => match attachment.encode().await {
                Ok(encoded) => Some(encoded),
                Err(error) => {
                    warn!("Attachment encode failed for {}: {}", request_id, error);
                    self.emit(DispatchEvent::EncodeFailed { request_id, error });
                    return;
                }
            },
            None => None,
        };

        let request = ChatRequest { message, image };
        let reply = match self.backend.chat(&request).await {
            Ok(reply) => reply,
            Err(error) => {
                warn!("Request {} failed: {}", request_id, error);
                self.emit(DispatchEvent::Failed { request_id, error });
                return;
            }
        };

        let step_count = reply.steps.len();
        if step_count > 0 {
            self.emit(DispatchEvent::Steps {
                request_id,
                steps: reply.steps,
            });
        }

        let delay = self.timing.delay_for(step_count);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        debug!("Request {} delivered ({} steps)", request_id, step_count);
        self.emit(DispatchEvent::Delivered {
            request_id,
            reply: reply.reply,
            source: reply.source,
        });
    }
}
