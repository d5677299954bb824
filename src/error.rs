//! Error types for keytrace
//!
//! Data-gap conditions (a release with no recorded press, a non-monotone
//! clock reading) are deliberately absent here: behavioral signal naturally
//! has missed edges, so the affected derived sample is skipped silently and
//! capture continues.

use thiserror::Error;

/// Errors that can occur during capture and submission.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("input does not match the reference text")]
    BufferMismatch,

    #[error("insufficient timing samples: {0}")]
    InsufficientSamples(String),

    #[error("no attempt is active")]
    AttemptNotActive,

    #[error("attempt is not completed")]
    AttemptNotCompleted,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("failed to parse event log: {0}")]
    ParseError(String),

    #[error("no prompts configured for difficulty: {0}")]
    EmptyPromptPool(String),
}
