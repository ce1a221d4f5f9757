use std::path::Path;

use anyhow::{Context, Result};

use crate::ctx::Ctx;
use crate::diagnosis::{DiagnosisRecord, DiagnosisResult};
use crate::eval::AggregateReport;
use crate::taxonomy::ConditionTaxonomy;

const RULE: &str = "==================================================";

/// Renders one diagnosis the way it is shown to a reader of a single case.
pub fn format_diagnosis(result: &DiagnosisResult, taxonomy: &ConditionTaxonomy) -> String {
    let mut out = String::new();
    let primary = result.primary_index;
    out.push_str("PRIMARY DIAGNOSIS\n");
    out.push_str(&format!(
        "  Condition:  {} (class {})\n",
        taxonomy.name(primary),
        primary
    ));
    out.push_str(&format!(
        "  Confidence: {:.2}% ({:.4})\n",
        result.primary_confidence * 100.0,
        result.primary_confidence
    ));
    if let Some(condition) = taxonomy.get(primary) {
        out.push_str(&format!("  Recommendation: {}\n", condition.recommendation));
    }
    out.push_str(&format!(
        "  Urgency:    {} - {}\n",
        result.urgency,
        result.urgency.action()
    ));

    out.push_str("SECONDARY FINDINGS\n");
    if result.secondary_findings.is_empty() {
        out.push_str("  No significant secondary findings.\n");
    }
    for finding in &result.secondary_findings {
        out.push_str(&format!(
            "  - {}: {:.2}%\n",
            taxonomy.name(finding.index),
            finding.probability * 100.0
        ));
    }

    out.push_str("TOP 3 PREDICTIONS\n");
    for (rank, (index, p)) in result.top(3).into_iter().enumerate() {
        out.push_str(&format!(
            "  {}. {:<20} {:.4}\n",
            rank + 1,
            taxonomy.name(index),
            p
        ));
    }
    out
}

pub fn format_report(ctx: &Ctx) -> Result<String> {
    let aggregate = ctx
        .aggregate
        .as_ref()
        .context("aggregate report missing")?;
    let taxonomy = &ctx.taxonomy;
    let mut out = String::new();

    out.push_str("KIRA-DXEVAL DIAGNOSTIC EVALUATION REPORT\n");
    section_rule(&mut out);
    out.push_str(&format!("Tool version: {}\n", ctx.tool_version));
    out.push_str(&format!(
        "Taxonomy: {} ({} classes)\n",
        taxonomy.version,
        taxonomy.len()
    ));
    out.push_str(&format!(
        "Fixed point: {} bits, {} fractional; secondary threshold {}\n\n",
        ctx.config.data_width, ctx.config.frac_bits, ctx.config.secondary_threshold
    ));

    out.push_str("OVERALL PERFORMANCE\n");
    section_rule(&mut out);
    out.push_str(&format!("Total tests:      {}\n", aggregate.total_tests));
    out.push_str(&format!("Labeled tests:    {}\n", aggregate.labeled_tests));
    out.push_str(&format!("Correct:          {}\n", aggregate.total_correct));
    out.push_str(&format!(
        "Incorrect:        {}\n",
        aggregate.labeled_tests - aggregate.total_correct
    ));
    if aggregate.insufficient_data {
        out.push_str("Accuracy:         n/a (insufficient data)\n");
    } else if !aggregate.ground_truth_available {
        out.push_str("Accuracy:         n/a (no ground truth)\n");
    } else {
        out.push_str(&format!(
            "Accuracy:         {:.2}%\n",
            aggregate.accuracy_percent
        ));
        out.push_str(&format!("Rating:           {}\n", aggregate.rating));
    }
    out.push('\n');

    out.push_str("PER-TEST RESULTS\n");
    section_rule(&mut out);
    for record in ctx.store.all() {
        write_record(&mut out, record, taxonomy);
    }
    out.push('\n');

    if !aggregate.per_class_accuracy.is_empty() {
        write_class_accuracy(&mut out, aggregate, taxonomy);
    }

    if !aggregate.focus_classes.is_empty() {
        out.push_str("FOCUS AREAS FOR IMPROVEMENT\n");
        section_rule(&mut out);
        for index in &aggregate.focus_classes {
            if let Some(acc) = aggregate.per_class_accuracy.get(index) {
                out.push_str(&format!(
                    "- {}: {} of {} incorrect\n",
                    taxonomy.name(*index),
                    acc.total - acc.correct,
                    acc.total
                ));
            }
        }
        out.push('\n');
    }

    if aggregate.total_tests > 0 {
        let stats = &aggregate.confidence_stats;
        out.push_str("CONFIDENCE ANALYSIS\n");
        section_rule(&mut out);
        out.push_str(&format!("Mean:    {:.4}\n", stats.mean));
        out.push_str(&format!("Std dev: {:.4}\n", stats.stddev));
        out.push_str(&format!("Min:     {:.4}\n", stats.min));
        out.push_str(&format!("Max:     {:.4}\n\n", stats.max));

        out.push_str("PREDICTION FREQUENCY\n");
        section_rule(&mut out);
        for (index, &count) in aggregate.prediction_frequency.iter().enumerate() {
            if count > 0 {
                out.push_str(&format!("{:<20} {}\n", taxonomy.name(index), count));
            }
        }
        for (urgency, count) in aggregate.urgency_counts.iter().rev() {
            out.push_str(&format!("urgency {:<12} {}\n", urgency.label(), count));
        }
        out.push('\n');
    }

    if !ctx.rejected.is_empty() {
        out.push_str("REJECTED INPUTS\n");
        section_rule(&mut out);
        for r in &ctx.rejected {
            out.push_str(&format!(
                "block {} (line {}) test {} {}: {}\n",
                r.position, r.line, r.test_id, r.test_name, r.error
            ));
        }
        out.push('\n');
    }

    if !ctx.warnings.is_empty() {
        out.push_str("WARNINGS\n");
        section_rule(&mut out);
        for w in &ctx.warnings {
            out.push_str(&format!("- {}\n", w));
        }
    }

    Ok(out)
}

pub fn write_report(path: &Path, ctx: &Ctx) -> Result<()> {
    let report = format_report(ctx)?;
    std::fs::write(path, report).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn section_rule(out: &mut String) {
    out.push_str(RULE);
    out.push('\n');
}

fn write_class_accuracy(out: &mut String, aggregate: &AggregateReport, taxonomy: &ConditionTaxonomy) {
    out.push_str("PER-CLASS ACCURACY\n");
    section_rule(out);
    for (&index, acc) in &aggregate.per_class_accuracy {
        let main = aggregate
            .top_misclassifications
            .get(&index)
            .copied()
            .flatten()
            .map(|i| taxonomy.name(i))
            .unwrap_or_else(|| "none".to_string());
        out.push_str(&format!(
            "{:<20} {:6.1}% ({}/{})  {:<9}  main misclassification: {}\n",
            taxonomy.name(index),
            acc.percent,
            acc.correct,
            acc.total,
            acc.rating.label(),
            main
        ));
    }
    out.push('\n');
}

fn write_record(out: &mut String, record: &DiagnosisRecord, taxonomy: &ConditionTaxonomy) {
    let status = match record.expected_index {
        Some(_) if record.correct => "[CORRECT]",
        Some(_) => "[INCORRECT]",
        None => "[UNLABELED]",
    };
    out.push_str(&format!(
        "Test {:3}: {:<24} {}\n",
        record.test_id, record.test_name, status
    ));
    if let Some(expected) = record.expected_index {
        out.push_str(&format!(
            "  Expected:   class {:2} ({})\n",
            expected,
            taxonomy.name(expected)
        ));
    }
    out.push_str(&format!(
        "  Predicted:  class {:2} ({})\n",
        record.predicted_index,
        taxonomy.name(record.predicted_index)
    ));
    out.push_str(&format!("  Confidence: {:.4}\n", record.confidence));
    out.push_str(&format!("  Urgency:    {}\n", record.diagnosis.urgency));
    if !record.diagnosis.secondary_findings.is_empty() {
        let names: Vec<String> = record
            .diagnosis
            .secondary_findings
            .iter()
            .map(|f| format!("{} {:.2}", taxonomy.name(f.index), f.probability))
            .collect();
        out.push_str(&format!("  Secondary:  {}\n", names.join(", ")));
    }
}
