//! Host-supplied static configuration
//!
//! Prompt pools per difficulty, submission-gate thresholds, and the
//! display tick interval. The host owns prompt selection; the engine only
//! exposes deterministic pool access.

use crate::assembler::SubmissionGate;
use crate::error::CaptureError;
use crate::types::Difficulty;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Static configuration for a capture session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Reference phrases per difficulty.
    pub prompt_pools: BTreeMap<Difficulty, Vec<String>>,
    pub min_hold_samples: usize,
    pub min_flight_samples: usize,
    pub min_down_down_samples: usize,
    /// Re-render interval for elapsed-time/speed/accuracy display, ms.
    /// Independent of capture; does not affect recorded data.
    pub display_tick_ms: u64,
    /// Maximum n-gram samples retained per gram across attempts.
    pub profile_window: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        let mut prompt_pools = BTreeMap::new();
        prompt_pools.insert(
            Difficulty::Easy,
            vec![
                "The quick brown fox jumps over the lazy dog.".to_string(),
                "Pack my box with five dozen liquor jugs.".to_string(),
                "How vexingly quick daft zebras jump!".to_string(),
                "Sphinx of black quartz, judge my vow.".to_string(),
                "Waltz, nymph, for quick jigs vex Bud.".to_string(),
            ],
        );
        prompt_pools.insert(
            Difficulty::Medium,
            vec![
                "The five boxing wizards jump quickly over the lazy dog while the sphinx of black quartz judges my vow.".to_string(),
                "Pack my box with five dozen liquor jugs and watch the quick brown fox jump over the lazy dog.".to_string(),
                "How vexingly quick daft zebras jump while the sphinx of black quartz judges my vow carefully.".to_string(),
            ],
        );
        prompt_pools.insert(
            Difficulty::Hard,
            vec![
                "The five boxing wizards jump quickly over the lazy dog while the sphinx of black quartz judges my vow with careful consideration of the intricate patterns.".to_string(),
                "Pack my box with five dozen liquor jugs and watch the quick brown fox jump over the lazy dog as the sphinx of black quartz judges my vow.".to_string(),
                "How vexingly quick daft zebras jump while the sphinx of black quartz judges my vow with careful consideration of the intricate patterns.".to_string(),
            ],
        );
        Self {
            prompt_pools,
            min_hold_samples: 5,
            min_flight_samples: 4,
            min_down_down_samples: 4,
            display_tick_ms: 50,
            profile_window: crate::profile::DEFAULT_PROFILE_WINDOW,
        }
    }
}

impl CaptureConfig {
    /// All prompts for a difficulty (empty when none are configured).
    pub fn prompts(&self, difficulty: Difficulty) -> &[String] {
        self.prompt_pools
            .get(&difficulty)
            .map_or(&[], Vec::as_slice)
    }

    /// Deterministic pool access: `index` wraps around the pool so hosts
    /// can feed any counter or random draw.
    pub fn prompt(&self, difficulty: Difficulty, index: usize) -> Result<&str, CaptureError> {
        let pool = self.prompts(difficulty);
        if pool.is_empty() {
            return Err(CaptureError::EmptyPromptPool(
                difficulty.as_str().to_string(),
            ));
        }
        Ok(&pool[index % pool.len()])
    }

    pub fn gate(&self) -> SubmissionGate {
        SubmissionGate {
            min_hold_samples: self.min_hold_samples,
            min_flight_samples: self.min_flight_samples,
            min_down_down_samples: self.min_down_down_samples,
        }
    }
}
