use std::collections::BTreeMap;

use crate::diagnosis::DiagnosisRecord;
use crate::eval::{AggregateReport, ClassAccuracy, ClassRating, ConfusionMatrix, PerformanceRating};
use crate::math::stats::SummaryStats;
use crate::taxonomy::ConditionTaxonomy;

/// Whole-batch reduction over a finished record sequence.
///
/// Deterministic: the same records always produce an equal report.
pub fn aggregate(records: &[DiagnosisRecord], taxonomy: &ConditionTaxonomy) -> AggregateReport {
    let classes = taxonomy.len();
    let confusion = ConfusionMatrix::from_records(records, classes);

    let labeled_tests = confusion.total() as usize;
    let total_correct = confusion.diagonal_sum() as usize;
    let ground_truth_available = labeled_tests > 0;
    let accuracy_percent = if ground_truth_available {
        100.0 * total_correct as f64 / labeled_tests as f64
    } else {
        0.0
    };

    let mut per_class_accuracy = BTreeMap::new();
    let mut top_misclassifications = BTreeMap::new();
    let mut focus_classes = Vec::new();
    for class in 0..classes {
        let total = confusion.row_sum(class);
        if total == 0 {
            continue;
        }
        let correct = confusion.get(class, class);
        let percent = 100.0 * correct as f64 / total as f64;
        per_class_accuracy.insert(
            class,
            ClassAccuracy {
                correct,
                total,
                percent,
                rating: ClassRating::from_accuracy(percent),
            },
        );
        if correct < total {
            focus_classes.push(class);
        }
        top_misclassifications.insert(class, confusion.top_misclassification(class));
    }

    let confidences: Vec<f64> = records.iter().map(|r| r.confidence).collect();
    let confidence_stats = SummaryStats::from_values(&confidences);

    let mut prediction_frequency = vec![0u64; classes];
    let mut urgency_counts = BTreeMap::new();
    for r in records {
        if let Some(slot) = prediction_frequency.get_mut(r.predicted_index) {
            *slot += 1;
        }
        if let Some(urgency) = taxonomy.urgency(r.predicted_index) {
            *urgency_counts.entry(urgency).or_insert(0u64) += 1;
        }
    }

    AggregateReport {
        total_tests: records.len(),
        labeled_tests,
        total_correct,
        accuracy_percent,
        ground_truth_available,
        insufficient_data: records.is_empty(),
        rating: PerformanceRating::from_accuracy(accuracy_percent),
        per_class_accuracy,
        top_misclassifications,
        focus_classes,
        confidence_stats,
        prediction_frequency,
        urgency_counts,
        confusion,
    }
}
