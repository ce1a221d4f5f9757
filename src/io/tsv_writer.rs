use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::ctx::Ctx;

pub fn write_tsv(path: &Path, ctx: &Ctx) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    let taxonomy = &ctx.taxonomy;
    let n = taxonomy.len();

    write!(
        w,
        "test_id\ttest_name\texpected\tpredicted\tcorrect\tconfidence\turgency"
    )?;
    for c in taxonomy.conditions() {
        write!(w, "\tp_{}", column_name(&c.name))?;
    }
    writeln!(w)?;

    for record in ctx.store.all() {
        let probs = &record.diagnosis.probabilities;
        ensure_len(probs.len(), n, "probabilities")?;
        let expected = record
            .expected_index
            .map(|i| taxonomy.name(i))
            .unwrap_or_else(|| "NA".to_string());
        let correct = if record.is_labeled() {
            if record.correct { "1" } else { "0" }
        } else {
            "NA"
        };
        write!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{:.6}\t{}",
            record.test_id,
            record.test_name,
            expected,
            taxonomy.name(record.predicted_index),
            correct,
            record.confidence,
            record.diagnosis.urgency
        )?;
        for p in probs {
            write!(w, "\t{:.6}", p)?;
        }
        writeln!(w)?;
    }

    Ok(())
}

fn column_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

fn ensure_len(got: usize, expected: usize, name: &str) -> Result<()> {
    if got != expected {
        bail!("{} length mismatch: {} != {}", name, got, expected);
    }
    Ok(())
}
