use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::taxonomy::{Condition, ConditionTaxonomy, Urgency};

pub fn load_builtin_v1() -> Result<ConditionTaxonomy> {
    let content = include_str!("../../assets/taxonomy/conditions_v1.tsv");
    parse_taxonomy_tsv(content, "built-in v1", "v1")
}

pub fn load_taxonomy_tsv(path: &Path) -> Result<ConditionTaxonomy> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read taxonomy TSV {}", path.display()))?;
    parse_taxonomy_tsv(&content, &path.display().to_string(), "user")
}

/// Parses `index<TAB>name<TAB>urgency<TAB>recommendation` rows.
///
/// Rows may appear in any order but the indices must form `0..n` exactly once each.
pub fn parse_taxonomy_tsv(content: &str, source: &str, version: &str) -> Result<ConditionTaxonomy> {
    let mut rows: Vec<(usize, Condition)> = Vec::new();
    let mut seen_names = HashSet::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = trimmed.split('\t').collect();
        if parts.len() != 4 {
            bail!("{}:{} malformed TSV (expected 4 columns)", source, line_no);
        }
        let index: usize = parts[0]
            .trim()
            .parse()
            .with_context(|| format!("{}:{} invalid class index", source, line_no))?;
        let name = parts[1].trim();
        let recommendation = parts[3].trim();
        if name.is_empty() || recommendation.is_empty() {
            bail!("{}:{} empty field in TSV", source, line_no);
        }
        let urgency = Urgency::parse(parts[2]).ok_or_else(|| {
            anyhow::anyhow!(
                "{}:{} urgency must be high|moderate|low|standard",
                source,
                line_no
            )
        })?;
        if !seen_names.insert(name.to_ascii_lowercase()) {
            bail!("{}:{} duplicate condition '{}'", source, line_no, name);
        }

        rows.push((
            line_no,
            Condition {
                index,
                name: name.to_string(),
                urgency,
                recommendation: recommendation.to_string(),
            },
        ));
    }

    if rows.is_empty() {
        bail!("{}: taxonomy has no conditions", source);
    }

    rows.sort_by_key(|(_, c)| c.index);
    let mut conditions = Vec::with_capacity(rows.len());
    for (expected, (line_no, condition)) in rows.into_iter().enumerate() {
        if condition.index != expected {
            bail!(
                "{}:{} class indices must be contiguous from 0 (expected {}, found {})",
                source,
                line_no,
                expected,
                condition.index
            );
        }
        conditions.push(condition);
    }

    Ok(ConditionTaxonomy::from_validated(version.to_string(), conditions))
}
