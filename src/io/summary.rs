use anyhow::{Context, Result};

use crate::ctx::Ctx;

pub fn format_summary(ctx: &Ctx) -> Result<String> {
    let version = &ctx.tool_version;
    let aggregate = ctx
        .aggregate
        .as_ref()
        .context("aggregate report missing")?;

    let mut out = String::new();
    out.push_str(&format!("kira-dxeval v{}\n", version));
    out.push_str(&format!(
        "Input: {} tests, {} labeled, {} rejected\n",
        aggregate.total_tests,
        aggregate.labeled_tests,
        ctx.rejected.len()
    ));

    if aggregate.insufficient_data {
        out.push_str("Accuracy: insufficient data\n");
    } else if !aggregate.ground_truth_available {
        out.push_str("Accuracy: no ground truth\n");
    } else {
        out.push_str(&format!(
            "Accuracy: {:.2}% ({}/{}) rating={}\n",
            aggregate.accuracy_percent,
            aggregate.total_correct,
            aggregate.labeled_tests,
            aggregate.rating
        ));
    }

    if aggregate.total_tests > 0 {
        let stats = &aggregate.confidence_stats;
        out.push_str(&format!(
            "Confidence: mean={:.4} sd={:.4} min={:.4} max={:.4}\n",
            stats.mean, stats.stddev, stats.min, stats.max
        ));
    }

    Ok(out)
}
