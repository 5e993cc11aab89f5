//! Conversation session controller
//!
//! Single source of truth for the transcript, the draft, the busy flag and the
//! processing steps of the in-flight request. It lives on the UI thread; every
//! asynchronous result reaches it through `poll_events()`.

use super::steps::StepProgress;
use crate::attachment::Attachment;
use crate::backend::ProcessingStep;
use crate::config::SessionConfig;
use crate::dispatch::{DispatchCommand, DispatchEvent, DispatchHandle};
use crate::messages::{Message, NewMessage, Transcript};
use crate::profile::{Profile, ProfileState};
use crate::speech::{SpeechInputAdapter, SpeechInputEvent, SpeechOutputAdapter};
use crate::ChatError;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Assistant turn appended when a dispatch fails
pub const OFFLINE_NOTICE: &str =
    "I can't reach the assistant service right now. Please check that the backend is running and try again.";

/// Lifecycle of the current submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Ready to accept a submission
    Idle,
    /// A request is in flight
    Sending,
}

/// Input that has not been submitted yet
#[derive(Debug, Clone, Default)]
pub struct DraftState {
    pub text: String,
    pub attachment: Option<Attachment>,
}

impl DraftState {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.attachment.is_none()
    }
}

/// The request currently owned by the dispatch worker
#[derive(Debug)]
struct InFlight {
    request_id: Uuid,
    /// Submitted values, kept to restore the draft if encoding fails
    message: String,
    attachment: Option<Attachment>,
    progress: StepProgress,
}

pub struct SessionController {
    /// Pacing and naming
    config: SessionConfig,

    /// Append-only conversation
    transcript: Transcript,

    /// Current text input and staged attachment
    draft: DraftState,

    /// Display identity (default until the fetch succeeds)
    profile: Profile,
    profile_state: ProfileState,

    /// `Some` exactly while busy
    in_flight: Option<InFlight>,

    /// User-visible problem that is not part of the conversation
    notice: Option<String>,

    dispatch: DispatchHandle,
    speech_input: SpeechInputAdapter,
    speech_output: SpeechOutputAdapter,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        dispatch: DispatchHandle,
        speech_input: SpeechInputAdapter,
        speech_output: SpeechOutputAdapter,
    ) -> Self {
        Self {
            config,
            transcript: Transcript::new(),
            draft: DraftState::default(),
            profile: Profile::default(),
            profile_state: ProfileState::NotRequested,
            in_flight: None,
            notice: None,
            dispatch,
            speech_input,
            speech_output,
        }
    }

    /// Request the profile. The greeting is appended when it arrives.
    pub fn initialize(&mut self) {
        if self.profile_state != ProfileState::NotRequested {
            return;
        }

        self.profile_state = ProfileState::Loading;
        if let Err(e) = self.dispatch.send(DispatchCommand::FetchProfile) {
            self.on_profile_unavailable(&e.to_string());
        }
    }

    // --- Accessors ---

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Read access to the conversation; turns are only added by the session
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn messages(&self) -> Vec<Message> {
        self.transcript.get_all()
    }

    pub fn draft(&self) -> &DraftState {
        &self.draft
    }

    pub fn draft_text_mut(&mut self) -> &mut String {
        &mut self.draft.text
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.draft.attachment.as_ref()
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn profile_state(&self) -> ProfileState {
        self.profile_state
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.is_busy() {
            SessionPhase::Sending
        } else {
            SessionPhase::Idle
        }
    }

    /// Every step reported for the in-flight request
    pub fn steps(&self) -> &[ProcessingStep] {
        self.in_flight
            .as_ref()
            .map(|f| f.progress.all())
            .unwrap_or(&[])
    }

    /// Steps revealed so far at `now`
    pub fn visible_steps(&self, now: Instant) -> &[ProcessingStep] {
        self.in_flight
            .as_ref()
            .map(|f| f.progress.visible(now))
            .unwrap_or(&[])
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn is_listening(&self) -> bool {
        self.speech_input.is_listening()
    }

    pub fn voice_input_available(&self) -> bool {
        self.speech_input.is_available()
    }

    pub fn voice_output_available(&self) -> bool {
        self.speech_output.is_available()
    }

    // --- Draft ---

    pub fn update_draft_text(&mut self, text: impl Into<String>) {
        self.draft.text = text.into();
    }

    /// Stage an image attachment. Files that are not images are ignored.
    pub fn attach_file(&mut self, path: impl Into<PathBuf>) -> bool {
        match Attachment::from_path(path) {
            Some(attachment) => {
                debug!("Staged attachment {:?}", attachment.path());
                self.draft.attachment = Some(attachment);
                true
            }
            None => false,
        }
    }

    pub fn clear_attachment(&mut self) {
        self.draft.attachment = None;
    }

    /// Submit the draft. Returns false (and changes nothing) when the draft is
    /// empty or a request is already in flight.
    pub fn submit(&mut self) -> bool {
        if self.is_busy() {
            debug!("Submit ignored, request in flight");
            return false;
        }
        if self.draft.is_empty() {
            return false;
        }

        let message = self.draft.text.trim().to_string();
        let attachment = self.draft.attachment.take();
        self.draft.text.clear();

        let image = attachment.as_ref().map(Attachment::preview);
        let user_message = self.transcript.append(NewMessage::user(message.clone(), image));

        let request_id = Uuid::new_v4();
        info!("Submitting {} as request {}", user_message.id, request_id);

        self.in_flight = Some(InFlight {
            request_id,
            message: message.clone(),
            attachment: attachment.clone(),
            progress: StepProgress::new(self.config.step_reveal_interval()),
        });

        let command = DispatchCommand::Send {
            request_id,
            message,
            attachment,
        };
        if let Err(e) = self.dispatch.send(command) {
            self.on_dispatch_failure(request_id, e);
        }

        true
    }

    // --- Voice ---

    pub fn start_listening(&mut self) -> bool {
        self.speech_input.start()
    }

    pub fn stop_listening(&mut self) {
        self.speech_input.stop();
    }

    pub fn on_speech_event(&mut self, event: SpeechInputEvent) {
        match event {
            SpeechInputEvent::Transcript(text) => {
                self.draft.text = text;
                if self.config.auto_send_voice {
                    self.submit();
                }
            }
            SpeechInputEvent::End | SpeechInputEvent::Error(_) => {}
        }
    }

    // --- Event routing ---

    /// Apply every pending worker and recognizer event. Call once per frame.
    pub fn poll_events(&mut self) {
        for event in self.dispatch.try_events() {
            self.on_dispatch_event(event);
        }

        for event in self.speech_input.drain_events() {
            self.on_speech_event(event);
        }
    }

    pub fn on_dispatch_event(&mut self, event: DispatchEvent) {
        match event {
            DispatchEvent::ProfileLoaded(profile) => self.on_profile_loaded(profile),
            DispatchEvent::ProfileUnavailable(reason) => self.on_profile_unavailable(&reason),
            DispatchEvent::Steps { request_id, steps } => self.on_dispatch_steps(request_id, steps),
            DispatchEvent::Delivered {
                request_id,
                reply,
                source,
            } => self.on_dispatch_success(request_id, reply, source),
            DispatchEvent::Failed { request_id, error } => {
                self.on_dispatch_failure(request_id, error)
            }
            DispatchEvent::EncodeFailed { request_id, error } => {
                self.on_encode_failure(request_id, error)
            }
            DispatchEvent::Shutdown => warn!("Dispatch worker shut down"),
        }
    }

    pub fn on_profile_loaded(&mut self, profile: Profile) {
        if self.profile_state == ProfileState::Loaded {
            return;
        }

        let greeting = profile.greeting(&self.config.assistant_name);
        self.profile = profile;
        self.profile_state = ProfileState::Loaded;

        // Greet only an empty conversation
        if self.transcript.is_empty() {
            self.transcript.append(NewMessage::assistant(greeting));
        } else {
            debug!("Conversation already started, skipping greeting");
        }
    }

    pub fn on_profile_unavailable(&mut self, reason: &str) {
        warn!("Continuing without profile: {}", reason);
        self.profile_state = ProfileState::Unavailable;
    }

    /// Take ownership of the in-flight request if it matches `request_id`
    fn resolve(&mut self, request_id: Uuid) -> Option<InFlight> {
        match &self.in_flight {
            Some(in_flight) if in_flight.request_id == request_id => self.in_flight.take(),
            _ => {
                debug!("Ignoring event for stale request {}", request_id);
                None
            }
        }
    }

    pub fn on_dispatch_steps(&mut self, request_id: Uuid, steps: Vec<ProcessingStep>) {
        match self.in_flight.as_mut() {
            Some(in_flight) if in_flight.request_id == request_id => {
                debug!("Request {} reported {} steps", request_id, steps.len());
                in_flight.progress.record(steps, Instant::now());
            }
            _ => debug!("Ignoring steps for stale request {}", request_id),
        }
    }

    pub fn on_dispatch_success(&mut self, request_id: Uuid, reply: String, source: Option<String>) {
        if self.resolve(request_id).is_none() {
            return;
        }

        let message = self
            .transcript
            .append(NewMessage::assistant(reply).with_source(source));
        info!("Request {} delivered as {}", request_id, message.id);
        self.speech_output.speak(&message.content);
    }

    pub fn on_dispatch_failure(&mut self, request_id: Uuid, error: ChatError) {
        if self.resolve(request_id).is_none() {
            return;
        }

        warn!("Request {} failed: {}", request_id, error);
        self.transcript.append(NewMessage::assistant(OFFLINE_NOTICE));
    }

    /// Abort the submission, give the draft back if the user has not started
    /// a new one, and tell them why.
    pub fn on_encode_failure(&mut self, request_id: Uuid, error: ChatError) {
        let Some(in_flight) = self.resolve(request_id) else {
            return;
        };

        warn!("Request {} aborted: {}", request_id, error);
        if self.draft.is_empty() {
            self.draft.text = in_flight.message;
            self.draft.attachment = in_flight.attachment;
        }
        self.notice = Some(error.user_message());
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.speech_input.stop();
        self.speech_output.cancel();
        self.dispatch.shutdown();
    }
}
