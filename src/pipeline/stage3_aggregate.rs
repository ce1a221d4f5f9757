use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::eval::aggregate;
use crate::pipeline::Stage;

pub struct Stage3Aggregate;

impl Stage3Aggregate {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Aggregate {
    fn name(&self) -> &'static str {
        "stage3_aggregate"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let report = aggregate(ctx.store.as_slice(), &ctx.taxonomy);
        if report.insufficient_data {
            ctx.warnings
                .push("no valid records: aggregate has insufficient data".to_string());
        } else if !report.ground_truth_available {
            ctx.warnings
                .push("no ground-truth labels: accuracy not computed".to_string());
        }
        info!(
            total = report.total_tests,
            labeled = report.labeled_tests,
            accuracy = report.accuracy_percent,
            "aggregate_ready"
        );
        ctx.aggregate = Some(report);
        Ok(())
    }
}
