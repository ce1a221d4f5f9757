use std::path::Path;

use anyhow::{Context, Result};

use crate::ctx::Ctx;
use crate::diagnosis::DiagnosisRecord;
use crate::eval::AggregateReport;
use crate::schema::v1::{
    AggregateSection, ClassAccuracyEntry, DiagnosisEntry, DxEvalV1, FindingEntry, FocusClassEntry,
    PredictionCount,
};
use crate::taxonomy::ConditionTaxonomy;

pub fn build_report(ctx: &Ctx) -> Result<DxEvalV1> {
    let aggregate = ctx
        .aggregate
        .as_ref()
        .context("aggregate report missing")?;
    let taxonomy = &ctx.taxonomy;

    let diagnoses = ctx
        .store
        .all()
        .map(|r| diagnosis_entry(r, taxonomy))
        .collect();

    Ok(DxEvalV1 {
        tool: "kira-dxeval".to_string(),
        version: ctx.tool_version.clone(),
        schema_version: "v1".to_string(),
        taxonomy_version: taxonomy.version.clone(),
        config: ctx.config.clone(),
        taxonomy: taxonomy.conditions().to_vec(),
        diagnoses,
        aggregate: aggregate_section(aggregate, taxonomy),
        rejected: ctx.rejected.clone(),
        warnings: ctx.warnings.clone(),
    })
}

pub fn write_json(path: &Path, ctx: &Ctx) -> Result<()> {
    let report = build_report(ctx)?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &report)?;
    Ok(())
}

fn diagnosis_entry(record: &DiagnosisRecord, taxonomy: &ConditionTaxonomy) -> DiagnosisEntry {
    let diagnosis = &record.diagnosis;
    DiagnosisEntry {
        test_id: record.test_id,
        test_name: record.test_name.clone(),
        expected_index: record.expected_index,
        expected_name: record.expected_index.map(|i| taxonomy.name(i)),
        predicted_index: record.predicted_index,
        predicted_name: taxonomy.name(record.predicted_index),
        correct: record.is_labeled().then_some(record.correct),
        confidence: record.confidence,
        urgency: diagnosis.urgency,
        recommendation: taxonomy
            .get(record.predicted_index)
            .map(|c| c.recommendation.clone())
            .unwrap_or_default(),
        secondary_findings: diagnosis
            .secondary_findings
            .iter()
            .map(|f| FindingEntry {
                index: f.index,
                name: taxonomy.name(f.index),
                probability: f.probability,
            })
            .collect(),
        probabilities: diagnosis.probabilities.clone(),
        raw_scores: record.score_vector.clone(),
    }
}

fn aggregate_section(aggregate: &AggregateReport, taxonomy: &ConditionTaxonomy) -> AggregateSection {
    let per_class_accuracy = aggregate
        .per_class_accuracy
        .iter()
        .map(|(&index, acc)| {
            let main = aggregate
                .top_misclassifications
                .get(&index)
                .copied()
                .flatten();
            ClassAccuracyEntry {
                index,
                name: taxonomy.name(index),
                correct: acc.correct,
                total: acc.total,
                percent: acc.percent,
                rating: acc.rating,
                main_misclassification: main,
                main_misclassification_name: main.map(|i| taxonomy.name(i)),
            }
        })
        .collect();

    let focus_classes = aggregate
        .focus_classes
        .iter()
        .filter_map(|index| {
            let acc = aggregate.per_class_accuracy.get(index)?;
            Some(FocusClassEntry {
                index: *index,
                name: taxonomy.name(*index),
                incorrect: acc.total - acc.correct,
                total: acc.total,
            })
        })
        .collect();

    let prediction_frequency = aggregate
        .prediction_frequency
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > 0)
        .map(|(index, &count)| PredictionCount {
            index,
            name: taxonomy.name(index),
            count,
        })
        .collect();

    AggregateSection {
        total_tests: aggregate.total_tests,
        labeled_tests: aggregate.labeled_tests,
        total_correct: aggregate.total_correct,
        accuracy_percent: aggregate.accuracy_percent,
        ground_truth_available: aggregate.ground_truth_available,
        insufficient_data: aggregate.insufficient_data,
        rating: aggregate.rating,
        per_class_accuracy,
        focus_classes,
        confidence: aggregate.confidence_stats,
        prediction_frequency,
        urgency_counts: aggregate.urgency_counts.clone(),
        confusion_matrix: aggregate.confusion.rows().map(|r| r.to_vec()).collect(),
    }
}
