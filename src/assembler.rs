//! Feature-vector assembly and the submission gate
//!
//! Thin integration over the capture components: checks that enough
//! interval samples exist for the identification service to work with,
//! then packages the attempt's intervals, n-gram aggregate, and raw
//! keystroke sequence into the wire payloads of [`crate::service`].

use crate::attempt::Attempt;
use crate::error::CaptureError;
use crate::service::{FeatureVector, IdentifyRequest, SubmitRequest};
use crate::types::AttemptState;
use chrono::Utc;

/// Minimum sample counts required before anything is sent.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionGate {
    pub min_hold_samples: usize,
    pub min_flight_samples: usize,
    pub min_down_down_samples: usize,
}

impl Default for SubmissionGate {
    fn default() -> Self {
        Self {
            min_hold_samples: 5,
            min_flight_samples: 4,
            min_down_down_samples: 4,
        }
    }
}

impl SubmissionGate {
    /// Reject locally when any sequence is below its threshold.
    pub fn check(&self, attempt: &Attempt) -> Result<(), CaptureError> {
        let intervals = attempt.intervals();
        if intervals.hold_times.len() < self.min_hold_samples
            || intervals.flight_times.len() < self.min_flight_samples
            || intervals.down_down_times.len() < self.min_down_down_samples
        {
            return Err(CaptureError::InsufficientSamples(format!(
                "need {} hold / {} flight / {} down-down samples, have {} / {} / {}",
                self.min_hold_samples,
                self.min_flight_samples,
                self.min_down_down_samples,
                intervals.hold_times.len(),
                intervals.flight_times.len(),
                intervals.down_down_times.len(),
            )));
        }
        Ok(())
    }
}

/// Package the attempt's captured signal. Applies the gate but not the
/// exact-match rule, so replay tooling can extract features from partial
/// traces.
pub fn assemble_features(
    attempt: &Attempt,
    gate: &SubmissionGate,
) -> Result<FeatureVector, CaptureError> {
    gate.check(attempt)?;
    let intervals = attempt.intervals();
    Ok(FeatureVector {
        text: attempt.reference_text().to_string(),
        hold_times: intervals.hold_times.clone(),
        flight_times: intervals.flight_times.clone(),
        down_down_times: intervals.down_down_times.clone(),
        ngram_data: attempt.ngram_aggregate(),
        keystroke_sequence: attempt.char_events().to_vec(),
    })
}

/// Build an identification request. The buffer must match the reference
/// text exactly; otherwise the request is rejected locally and nothing is
/// sent.
pub fn build_identify_request(
    attempt: &Attempt,
    gate: &SubmissionGate,
    method: Option<String>,
) -> Result<IdentifyRequest, CaptureError> {
    if attempt.buffer() != attempt.reference_text() {
        return Err(CaptureError::BufferMismatch);
    }
    Ok(IdentifyRequest {
        method,
        features: assemble_features(attempt, gate)?,
    })
}

/// Build a training submission for a completed attempt.
pub fn build_submit_request(
    attempt: &Attempt,
    gate: &SubmissionGate,
    username: &str,
    now_ms: f64,
) -> Result<SubmitRequest, CaptureError> {
    if attempt.state() != AttemptState::Completed {
        return Err(CaptureError::AttemptNotCompleted);
    }
    let features = assemble_features(attempt, gate)?;
    Ok(SubmitRequest {
        username: username.to_string(),
        features,
        timings: attempt.key_events().to_vec(),
        input_history: attempt.input_history().to_vec(),
        errors: attempt.errors(),
        total_time_seconds: attempt.total_time_seconds().unwrap_or_default(),
        wpm: attempt.wpm(now_ms),
        accuracy: attempt.accuracy_pct(),
        difficulty: attempt.difficulty(),
        timestamp: Utc::now().to_rfc3339(),
        attempt_id: attempt.id(),
    })
}
