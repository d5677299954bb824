//! External service wire contract
//!
//! Request and response types for the identification and training
//! collaborators, plus the trait seams a host implements over its
//! transport. Field names and aliases match the services' JSON exactly
//! (`acceptance`/`confidence`, `acceptance`/`similarity`, `inputHistory`,
//! `totalTime`); the engine renders responses and never reinterprets them.

use crate::error::CaptureError;
use crate::types::{BufferSnapshot, CharEvent, Difficulty, KeyEvent, NgramAggregate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The packaged interval sequences and n-gram aggregates sent for
/// identification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub text: String,
    pub hold_times: Vec<f64>,
    pub flight_times: Vec<f64>,
    pub down_down_times: Vec<f64>,
    #[serde(default, skip_serializing_if = "NgramAggregate::is_empty")]
    pub ngram_data: NgramAggregate,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keystroke_sequence: Vec<CharEvent>,
}

/// Identification request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(flatten)]
    pub features: FeatureVector,
}

/// Per-user comparison entry in the identification response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEntry {
    pub user: String,
    #[serde(alias = "similarity")]
    pub acceptance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// Feature-level analysis echoed back by the identification service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentifyAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_hold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_hold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_flight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_flight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "avg_down_down")]
    pub avg_dd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_dd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_percentage: Option<f64>,
}

/// Identification response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifyResponse {
    pub user: String,
    /// 0..1 acceptance score; some deployments name this `confidence`.
    #[serde(alias = "confidence")]
    pub acceptance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<IdentifyAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_matches: Option<Vec<MatchEntry>>,
}

/// Presentation band for an acceptance/confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            ConfidenceBand::High
        } else if score >= 0.6 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }
}

/// Training submission: the feature payload plus the attempt's session
/// metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub username: String,
    #[serde(flatten)]
    pub features: FeatureVector,
    /// Full raw timing log, one entry per key transition.
    pub timings: Vec<KeyEvent>,
    #[serde(rename = "inputHistory")]
    pub input_history: Vec<BufferSnapshot>,
    pub errors: u32,
    #[serde(rename = "totalTime")]
    pub total_time_seconds: f64,
    pub wpm: f64,
    pub accuracy: f64,
    pub difficulty: Difficulty,
    /// RFC3339 submission timestamp.
    pub timestamp: String,
    pub attempt_id: Uuid,
}

/// Acknowledgement from the training service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitAck {
    pub status: String,
}

/// Identification collaborator. Lives behind the host's transport; the
/// engine only builds requests and renders responses.
pub trait IdentificationService {
    fn identify(&self, request: &IdentifyRequest) -> Result<IdentifyResponse, CaptureError>;
}

/// Training-submission collaborator.
pub trait SubmissionService {
    fn submit(&self, request: &SubmitRequest) -> Result<SubmitAck, CaptureError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_identify_request_flattens_features() {
        let request = IdentifyRequest {
            method: None,
            features: FeatureVector {
                text: "the".to_string(),
                hold_times: vec![90.0],
                flight_times: vec![40.0],
                down_down_times: vec![130.0],
                ngram_data: NgramAggregate::default(),
                keystroke_sequence: vec![],
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["text"], "the");
        assert_eq!(json["hold_times"][0], 90.0);
        assert!(json.get("method").is_none());
        assert!(json.get("ngram_data").is_none());
        assert!(json.get("features").is_none());
    }

    #[test]
    fn test_identify_response_accepts_confidence_alias() {
        let json = r#"{
            "user": "alice",
            "confidence": 0.83,
            "analysis": {
                "avg_hold": 95.2,
                "avg_flight": 41.0,
                "avg_dd": 140.5,
                "similarity_score": 0.91
            }
        }"#;
        let response: IdentifyResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.user, "alice");
        assert!((response.acceptance - 0.83).abs() < 0.001);
        let analysis = response.analysis.unwrap();
        assert_eq!(analysis.avg_hold, Some(95.2));
        assert_eq!(analysis.similarity_score, Some(0.91));
    }

    #[test]
    fn test_match_entry_accepts_similarity_alias() {
        let json = r#"{"user": "bob", "similarity": 0.72, "method": "ngram"}"#;
        let entry: MatchEntry = serde_json::from_str(json).unwrap();
        assert!((entry.acceptance - 0.72).abs() < 0.001);
        assert_eq!(entry.method.as_deref(), Some("ngram"));
    }

    #[test]
    fn test_confidence_bands() {
        assert_eq!(ConfidenceBand::from_score(0.95), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_score(0.8), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_score(0.7), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_score(0.6), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_score(0.59), ConfidenceBand::Low);
    }

    #[test]
    fn test_submit_request_wire_names() {
        let request = SubmitRequest {
            username: "alice".to_string(),
            features: FeatureVector {
                text: "hi".to_string(),
                hold_times: vec![80.0],
                flight_times: vec![30.0],
                down_down_times: vec![110.0],
                ngram_data: NgramAggregate::default(),
                keystroke_sequence: vec![],
            },
            timings: vec![],
            input_history: vec![BufferSnapshot {
                value: "h".to_string(),
                time_ms: 120.0,
            }],
            errors: 0,
            total_time_seconds: 1.5,
            wpm: 40.0,
            accuracy: 100.0,
            difficulty: Difficulty::Easy,
            timestamp: "2024-01-15T14:00:00+00:00".to_string(),
            attempt_id: Uuid::nil(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["inputHistory"][0]["value"], "h");
        assert_eq!(json["inputHistory"][0]["time"], 120.0);
        assert_eq!(json["totalTime"], 1.5);
        assert_eq!(json["difficulty"], "easy");
        assert_eq!(json["text"], "hi");
    }
}
