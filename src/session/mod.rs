//! Conversation session: transcript, draft, busy state and step progress

pub mod controller;
pub mod steps;

pub use controller::{DraftState, SessionController, SessionPhase, OFFLINE_NOTICE};
pub use steps::StepProgress;
