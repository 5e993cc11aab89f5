//! Message dispatch: one backend round trip per submitted turn
//!
//! The pipeline owns a worker thread; the session controller talks to it
//! through a [`DispatchHandle`] and never blocks on network I/O.

pub mod pipeline;

pub use pipeline::{
    DispatchCommand, DispatchEvent, DispatchHandle, DispatchPipeline, DispatchTiming,
};
