use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::diagnosis::RejectedRecord;
use crate::eval::{ClassRating, PerformanceRating};
use crate::math::stats::SummaryStats;
use crate::taxonomy::{Condition, Urgency};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindingEntry {
    pub index: usize,
    pub name: String,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisEntry {
    pub test_id: u32,
    pub test_name: String,
    pub expected_index: Option<usize>,
    pub expected_name: Option<String>,
    pub predicted_index: usize,
    pub predicted_name: String,
    pub correct: Option<bool>,
    pub confidence: f64,
    pub urgency: Urgency,
    pub recommendation: String,
    pub secondary_findings: Vec<FindingEntry>,
    pub probabilities: Vec<f64>,
    pub raw_scores: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassAccuracyEntry {
    pub index: usize,
    pub name: String,
    pub correct: u64,
    pub total: u64,
    pub percent: f64,
    pub rating: ClassRating,
    pub main_misclassification: Option<usize>,
    pub main_misclassification_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusClassEntry {
    pub index: usize,
    pub name: String,
    pub incorrect: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionCount {
    pub index: usize,
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSection {
    pub total_tests: usize,
    pub labeled_tests: usize,
    pub total_correct: usize,
    pub accuracy_percent: f64,
    pub ground_truth_available: bool,
    pub insufficient_data: bool,
    pub rating: PerformanceRating,
    pub per_class_accuracy: Vec<ClassAccuracyEntry>,
    pub focus_classes: Vec<FocusClassEntry>,
    pub confidence: SummaryStats,
    pub prediction_frequency: Vec<PredictionCount>,
    pub urgency_counts: BTreeMap<Urgency, u64>,
    pub confusion_matrix: Vec<Vec<u64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DxEvalV1 {
    pub tool: String,
    pub version: String,
    pub schema_version: String,
    pub taxonomy_version: String,
    pub config: EngineConfig,
    pub taxonomy: Vec<Condition>,
    pub diagnoses: Vec<DiagnosisEntry>,
    pub aggregate: AggregateSection,
    pub rejected: Vec<RejectedRecord>,
    pub warnings: Vec<String>,
}
