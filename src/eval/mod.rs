pub mod aggregate;
pub mod confusion;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::stats::SummaryStats;
use crate::taxonomy::Urgency;

pub use aggregate::aggregate;
pub use confusion::ConfusionMatrix;

pub const EXCELLENT_THRESHOLD: f64 = 90.0;
pub const GOOD_THRESHOLD: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceRating {
    Excellent,
    Good,
    NeedsImprovement,
}

impl PerformanceRating {
    /// `[90, 100]` excellent, `[70, 90)` good, `[0, 70)` needs improvement.
    pub fn from_accuracy(accuracy_percent: f64) -> Self {
        if accuracy_percent >= EXCELLENT_THRESHOLD {
            Self::Excellent
        } else if accuracy_percent >= GOOD_THRESHOLD {
            Self::Good
        } else {
            Self::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "EXCELLENT",
            Self::Good => "GOOD",
            Self::NeedsImprovement => "NEEDS IMPROVEMENT",
        }
    }
}

impl fmt::Display for PerformanceRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const FAIR_THRESHOLD: f64 = 50.0;

/// Per-class note; a finer scale than the batch rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ClassRating {
    pub fn from_accuracy(accuracy_percent: f64) -> Self {
        if accuracy_percent >= EXCELLENT_THRESHOLD {
            Self::Excellent
        } else if accuracy_percent >= GOOD_THRESHOLD {
            Self::Good
        } else if accuracy_percent >= FAIR_THRESHOLD {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }
}

impl fmt::Display for ClassRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassAccuracy {
    pub correct: u64,
    pub total: u64,
    pub percent: f64,
    pub rating: ClassRating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Every record, labeled or not.
    pub total_tests: usize,
    pub labeled_tests: usize,
    pub total_correct: usize,
    pub accuracy_percent: f64,
    pub ground_truth_available: bool,
    pub insufficient_data: bool,
    pub rating: PerformanceRating,
    pub per_class_accuracy: BTreeMap<usize, ClassAccuracy>,
    pub top_misclassifications: BTreeMap<usize, Option<usize>>,
    /// Expected classes with at least one wrong prediction, ascending.
    pub focus_classes: Vec<usize>,
    pub confidence_stats: SummaryStats,
    pub prediction_frequency: Vec<u64>,
    pub urgency_counts: BTreeMap<Urgency, u64>,
    pub confusion: ConfusionMatrix,
}
