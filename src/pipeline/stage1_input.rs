use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::{Ctx, InputSource};
use crate::input;
use crate::pipeline::Stage;
use crate::synthetic;

pub struct Stage1Input;

impl Stage1Input {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Input {
    fn name(&self) -> &'static str {
        "stage1_input"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        ctx.config
            .validate(&ctx.taxonomy)
            .context("invalid engine configuration")?;

        match &ctx.source {
            InputSource::File(path) => {
                let parsed = input::read_score_file(path, &ctx.taxonomy, &ctx.config)?;
                info!(
                    input = %path.display(),
                    cases = parsed.cases.len(),
                    warnings = parsed.warnings.len(),
                    "score_blocks_loaded"
                );
                ctx.cases = parsed.cases;
                ctx.warnings.extend(parsed.warnings);
            }
            InputSource::Synthetic { rounds, seed } => {
                ctx.cases = synthetic::generate_cases(&ctx.taxonomy, *rounds, *seed);
                ctx.warnings
                    .push(format!("synthetic fixture in use (seed {})", seed));
                info!(
                    cases = ctx.cases.len(),
                    seed = *seed,
                    "synthetic_cases_generated"
                );
            }
        }
        Ok(())
    }
}
