//! Streaming narration of generated text.
//!
//! Utterances arrive one line at a time while a model is still generating.
//! The [`PlaybackCoordinator`] queues them in arrival order and hands them to
//! a [`NarrationEngine`] strictly one at a time, publishing progress on the
//! event bus so a UI can highlight the line being spoken.

pub mod coordinator;
pub mod engine;
pub mod espeak;
pub mod log_engine;
pub mod playback;
pub mod queue;
pub mod service;

pub use coordinator::{CoordinatorStatus, PlaybackCoordinator, PlaybackState};
pub use engine::{NarrationEngine, VoiceSettings};
pub use espeak::EspeakEngine;
pub use log_engine::LogEngine;
pub use playback::PlaybackControl;
pub use queue::UtteranceQueue;

use thiserror::Error;

/// Failure reported by a [`NarrationEngine`] for a single utterance.
#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("failed to start speech process: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("speech failed: {0}")]
    Failed(String),
    #[error("speech interrupted")]
    Interrupted,
}

/// The coordinator task is no longer running.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("playback coordinator has shut down")]
pub struct CoordinatorError;

/// Convenience result type used throughout this crate.
pub type Result<T> = std::result::Result<T, NarrationError>;
