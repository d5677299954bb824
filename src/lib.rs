//! Keytrace - On-device capture engine for keystroke-dynamics signals
//!
//! Keytrace records press/release timing while a user types a known
//! reference phrase and reduces the raw stream to a compact behavioral
//! feature vector through a deterministic pipeline: event recording →
//! interval derivation → n-gram timing extraction → feature assembly.
//! Identification and training live behind request/response seams; the
//! engine builds the payloads and renders the responses, it never scores.
//!
//! ## Modules
//!
//! - **Capture**: clock seam, event recorder, interval deriver
//! - **Features**: n-gram extractor, feature-vector assembler, gate
//! - **Lifecycle**: attempt state machine, capture session facade
//! - **Integration**: service wire contract, cross-attempt profile, config

pub mod assembler;
pub mod attempt;
pub mod clock;
pub mod config;
pub mod error;
pub mod intervals;
pub mod keymap;
pub mod ngram;
pub mod profile;
pub mod recorder;
pub mod service;
pub mod session;
pub mod types;

pub use config::CaptureConfig;
pub use error::CaptureError;
pub use session::{CaptureSession, IdentificationOutcome};

// Wire contract exports
pub use service::{
    ConfidenceBand, FeatureVector, IdentificationService, IdentifyRequest, IdentifyResponse,
    SubmissionService, SubmitAck, SubmitRequest,
};

// Data model exports
pub use types::{
    AttemptSnapshot, AttemptState, CharEvent, Difficulty, IntervalSet, KeyEvent, KeyEventKind,
    NgramAggregate,
};

/// Engine version reported by the CLI
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
