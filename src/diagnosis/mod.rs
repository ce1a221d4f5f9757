pub mod classify;
pub mod store;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::taxonomy::Urgency;

/// Raw sign-extended fixed-point activations in taxonomy order.
pub type ScoreVector = Vec<i64>;

/// Why a single test case was excluded from the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordError {
    #[error("invalid input shape: expected {expected} scores, got {got}")]
    InvalidInputShape { expected: usize, got: usize },
    #[error("malformed token '{token}' at position {position}: {reason}")]
    MalformedToken {
        position: usize,
        token: String,
        reason: String,
    },
    #[error("unknown ground-truth label '{label}'")]
    UnknownLabel { label: String },
    #[error("malformed block: {reason}")]
    MalformedBlock { reason: String },
}

/// A test case excluded from the batch, with enough context to locate it in the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRecord {
    pub position: usize,
    pub line: usize,
    pub test_id: u32,
    pub test_name: String,
    pub error: RecordError,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecondaryFinding {
    pub index: usize,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub primary_index: usize,
    pub primary_confidence: f64,
    pub secondary_findings: Vec<SecondaryFinding>,
    pub urgency: Urgency,
    pub probabilities: Vec<f64>,
}

impl DiagnosisResult {
    /// The `k` most probable classes, descending; equal probabilities keep index order.
    pub fn top(&self, k: usize) -> Vec<(usize, f64)> {
        let mut ranked: Vec<(usize, f64)> = self.probabilities.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(k);
        ranked
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisRecord {
    pub test_id: u32,
    pub test_name: String,
    pub expected_index: Option<usize>,
    pub predicted_index: usize,
    /// Always false for unlabeled records.
    pub correct: bool,
    pub score_vector: ScoreVector,
    pub confidence: f64,
    pub diagnosis: DiagnosisResult,
}

impl DiagnosisRecord {
    pub fn new(
        test_id: u32,
        test_name: impl Into<String>,
        expected_index: Option<usize>,
        score_vector: ScoreVector,
        diagnosis: DiagnosisResult,
    ) -> Self {
        let predicted_index = diagnosis.primary_index;
        Self {
            test_id,
            test_name: test_name.into(),
            expected_index,
            predicted_index,
            correct: expected_index == Some(predicted_index),
            score_vector,
            confidence: diagnosis.primary_confidence,
            diagnosis,
        }
    }

    pub fn is_labeled(&self) -> bool {
        self.expected_index.is_some()
    }
}
