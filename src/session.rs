//! Capture session: the host-facing surface
//!
//! A [`CaptureSession`] owns the single live [`Attempt`], the static
//! config, and the cross-attempt n-gram profile. Exactly one attempt is
//! live at a time; starting a new round replaces it. All calls execute
//! synchronously inside the host's input dispatch.
//!
//! The identification call is fire-and-forget from the state machine's
//! perspective: the session hands out a generation-tagged request, and
//! [`CaptureSession::accept_identification`] applies a response only if
//! its generation still matches the live attempt, so late-arriving
//! responses for discarded attempts are dropped rather than corrupting
//! presentation state.

use crate::assembler;
use crate::attempt::Attempt;
use crate::clock::{Clock, MonotonicClock};
use crate::config::CaptureConfig;
use crate::error::CaptureError;
use crate::profile::NgramProfileStore;
use crate::service::{ConfidenceBand, FeatureVector, IdentifyRequest, IdentifyResponse, SubmitRequest};
use crate::types::{AttemptSnapshot, AttemptState, Difficulty, PerformanceTier};

/// Identification result retained for presentation.
#[derive(Debug, Clone)]
pub struct IdentificationOutcome {
    pub response: IdentifyResponse,
    pub band: ConfidenceBand,
}

/// Stateful session owning the attempt lifecycle.
pub struct CaptureSession {
    config: CaptureConfig,
    clock: Box<dyn Clock>,
    attempt: Option<Attempt>,
    next_generation: u64,
    profile: NgramProfileStore,
    last_identification: Option<IdentificationOutcome>,
}

impl CaptureSession {
    /// Create a session on the production monotonic clock.
    pub fn new(config: CaptureConfig) -> Self {
        Self::with_clock(config, Box::new(MonotonicClock::new()))
    }

    /// Create a session with an injected clock (tests, log replay).
    pub fn with_clock(config: CaptureConfig, clock: Box<dyn Clock>) -> Self {
        let profile = NgramProfileStore::new(config.profile_window);
        Self {
            config,
            clock,
            attempt: None,
            next_generation: 0,
            profile,
            last_identification: None,
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Start a new attempt against `reference_text`, replacing any live
    /// one, and return its generation for pairing async responses.
    pub fn start_attempt(&mut self, reference_text: &str, difficulty: Difficulty) -> u64 {
        self.next_generation += 1;
        let now = self.clock.now_ms();
        self.attempt = Some(Attempt::start(
            reference_text,
            difficulty,
            self.next_generation,
            now,
        ));
        self.next_generation
    }

    /// Start a new attempt from the configured prompt pool.
    pub fn start_round(
        &mut self,
        difficulty: Difficulty,
        prompt_index: usize,
    ) -> Result<u64, CaptureError> {
        let text = self.config.prompt(difficulty, prompt_index)?.to_string();
        Ok(self.start_attempt(&text, difficulty))
    }

    pub fn state(&self) -> AttemptState {
        self.attempt
            .as_ref()
            .map_or(AttemptState::Idle, Attempt::state)
    }

    pub fn reference_text(&self) -> Option<&str> {
        self.attempt.as_ref().map(Attempt::reference_text)
    }

    /// Forward a key press to the live attempt. No-op when idle.
    pub fn on_press(&mut self, key_id: &str) {
        let now = self.clock.now_ms();
        if let Some(attempt) = self.attempt.as_mut() {
            attempt.on_press(key_id, now);
        }
    }

    /// Forward a key release to the live attempt. No-op when idle.
    pub fn on_release(&mut self, key_id: &str) {
        let now = self.clock.now_ms();
        if let Some(attempt) = self.attempt.as_mut() {
            attempt.on_release(key_id, now);
        }
    }

    /// Forward a buffer change; on completion the attempt's n-gram
    /// aggregate is folded into the cross-attempt profile.
    pub fn on_buffer_change(&mut self, new_buffer: &str) {
        let now = self.clock.now_ms();
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        let was_completed = attempt.state() == AttemptState::Completed;
        attempt.on_buffer_change(new_buffer, now);
        if !was_completed && attempt.state() == AttemptState::Completed {
            self.profile.record_attempt(&attempt.ngram_aggregate());
        }
    }

    /// Abandon the live attempt (external reset).
    pub fn abandon(&mut self) {
        if let Some(attempt) = self.attempt.as_mut() {
            attempt.abandon();
        }
    }

    /// Current metrics for display; `None` when no attempt exists.
    pub fn snapshot(&self) -> Option<AttemptSnapshot> {
        let now = self.clock.now_ms();
        self.attempt.as_ref().map(|a| a.snapshot(now))
    }

    /// Performance tier for the end-of-attempt banner.
    pub fn performance_tier(&self) -> Option<PerformanceTier> {
        let attempt = self.attempt.as_ref()?;
        if attempt.state() != AttemptState::Completed {
            return None;
        }
        let now = self.clock.now_ms();
        Some(PerformanceTier::from_metrics(
            attempt.wpm(now),
            attempt.accuracy_pct(),
        ))
    }

    /// Gate-checked feature vector for the live attempt.
    pub fn feature_vector(&self) -> Result<FeatureVector, CaptureError> {
        let attempt = self.attempt.as_ref().ok_or(CaptureError::AttemptNotActive)?;
        assembler::assemble_features(attempt, &self.config.gate())
    }

    /// Build a generation-tagged identification request. Rejected locally
    /// when the buffer doesn't match the reference text or the sample
    /// counts are below the gate; nothing is sent and no data is lost.
    pub fn identify_request(
        &self,
        method: Option<String>,
    ) -> Result<(u64, IdentifyRequest), CaptureError> {
        let attempt = self.attempt.as_ref().ok_or(CaptureError::AttemptNotActive)?;
        let request = assembler::build_identify_request(attempt, &self.config.gate(), method)?;
        Ok((attempt.generation(), request))
    }

    /// Apply an identification response if its generation still matches
    /// the live attempt; stale responses return `None` and change nothing.
    pub fn accept_identification(
        &mut self,
        generation: u64,
        response: IdentifyResponse,
    ) -> Option<&IdentificationOutcome> {
        let attempt = self.attempt.as_ref()?;
        if attempt.generation() != generation {
            return None;
        }
        let band = ConfidenceBand::from_score(response.acceptance);
        self.last_identification = Some(IdentificationOutcome { response, band });
        self.last_identification.as_ref()
    }

    pub fn last_identification(&self) -> Option<&IdentificationOutcome> {
        self.last_identification.as_ref()
    }

    /// Build a training submission for the completed attempt.
    pub fn submit_request(&self, username: &str) -> Result<SubmitRequest, CaptureError> {
        let attempt = self.attempt.as_ref().ok_or(CaptureError::AttemptNotActive)?;
        let now = self.clock.now_ms();
        assembler::build_submit_request(attempt, &self.config.gate(), username, now)
    }

    pub fn profile(&self) -> &NgramProfileStore {
        &self.profile
    }

    pub fn save_profile(&self) -> Result<String, CaptureError> {
        self.profile.to_json().map_err(CaptureError::from)
    }

    pub fn load_profile(&mut self, json: &str) -> Result<(), CaptureError> {
        self.profile = NgramProfileStore::from_json(json)?;
        Ok(())
    }

    pub fn clear_profile(&mut self) {
        self.profile.clear();
    }
}
