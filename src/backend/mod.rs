//! Contract with the remote assistant service
//!
//! Two endpoints are used: `GET /profile` once at startup and `POST /chat`
//! once per submitted turn. No streaming, no authentication.

pub mod client;
pub mod types;

pub use client::{ChatBackend, HttpBackend};
pub use types::{ChatReply, ChatRequest, ProcessingStep, StepId};
