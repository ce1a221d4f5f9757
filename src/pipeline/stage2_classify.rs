use anyhow::Result;
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::diagnosis::classify::classify_all;
use crate::diagnosis::{DiagnosisRecord, RecordError, RejectedRecord, ScoreVector};
use crate::input::ScoreCase;
use crate::pipeline::Stage;

pub struct Stage2Classify;

impl Stage2Classify {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Classify {
    fn name(&self) -> &'static str {
        "stage2_classify"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let params = ctx.config.classifier_params();
        let cases = std::mem::take(&mut ctx.cases);

        let (valid, invalid): (Vec<ScoreCase>, Vec<ScoreCase>) =
            cases.into_iter().partition(|c| c.scores.is_ok());

        let mut rejected: Vec<RejectedRecord> = invalid
            .into_iter()
            .map(|c| {
                let error = c.scores.err().unwrap_or(RecordError::InvalidInputShape {
                    expected: ctx.taxonomy.len(),
                    got: 0,
                });
                reject(c.position, c.line, c.test_id, c.test_name, error)
            })
            .collect();

        let vectors: Vec<&ScoreVector> = valid
            .iter()
            .filter_map(|c| c.scores.as_ref().ok())
            .collect();
        let results = classify_all(&vectors, &ctx.taxonomy, &params);

        let mut records: Vec<(usize, DiagnosisRecord)> = Vec::with_capacity(valid.len());
        for (case, result) in valid.into_iter().zip(results) {
            let ScoreCase {
                position,
                line,
                test_id,
                test_name,
                expected_index,
                scores,
            } = case;
            match (scores, result) {
                (Ok(scores), Ok(diagnosis)) => records.push((
                    position,
                    DiagnosisRecord::new(test_id, test_name, expected_index, scores, diagnosis),
                )),
                (_, Err(error)) | (Err(error), _) => {
                    rejected.push(reject(position, line, test_id, test_name, error));
                }
            }
        }

        records.sort_by_key(|(position, _)| *position);
        rejected.sort_by_key(|r| r.position);

        ctx.store.extend(records.into_iter().map(|(_, r)| r));
        ctx.rejected = rejected;
        info!(
            records = ctx.store.len(),
            rejected = ctx.rejected.len(),
            "diagnoses_ready"
        );
        Ok(())
    }
}

fn reject(
    position: usize,
    line: usize,
    test_id: u32,
    test_name: String,
    error: RecordError,
) -> RejectedRecord {
    warn!(
        position,
        line,
        test_id,
        test_name = %test_name,
        error = %error,
        "record_rejected"
    );
    RejectedRecord {
        position,
        line,
        test_id,
        test_name,
        error,
    }
}
