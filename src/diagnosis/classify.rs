use crate::diagnosis::{DiagnosisResult, RecordError, SecondaryFinding};
use crate::math::fixed_point::FixedPointFormat;
use crate::taxonomy::ConditionTaxonomy;

#[cfg(feature = "mt")]
use rayon::prelude::*;

pub const DEFAULT_SECONDARY_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierParams {
    pub format: FixedPointFormat,
    pub secondary_threshold: f64,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            format: FixedPointFormat::default(),
            secondary_threshold: DEFAULT_SECONDARY_THRESHOLD,
        }
    }
}

pub fn classify(
    scores: &[i64],
    taxonomy: &ConditionTaxonomy,
    params: &ClassifierParams,
) -> Result<DiagnosisResult, RecordError> {
    if scores.len() != taxonomy.len() {
        return Err(RecordError::InvalidInputShape {
            expected: taxonomy.len(),
            got: scores.len(),
        });
    }
    let probabilities: Vec<f64> = scores
        .iter()
        .map(|&raw| params.format.raw_to_probability(raw))
        .collect();
    classify_probabilities(probabilities, taxonomy, params.secondary_threshold)
}

/// Selects primary, secondary findings and urgency from an already decoded vector.
pub fn classify_probabilities(
    probabilities: Vec<f64>,
    taxonomy: &ConditionTaxonomy,
    secondary_threshold: f64,
) -> Result<DiagnosisResult, RecordError> {
    if probabilities.len() != taxonomy.len() || probabilities.is_empty() {
        return Err(RecordError::InvalidInputShape {
            expected: taxonomy.len(),
            got: probabilities.len(),
        });
    }

    let primary_index = argmax_first(&probabilities);
    let primary_confidence = probabilities[primary_index];

    let mut secondary_findings: Vec<SecondaryFinding> = probabilities
        .iter()
        .enumerate()
        .filter(|&(i, &p)| i != primary_index && p > secondary_threshold)
        .map(|(index, &probability)| SecondaryFinding { index, probability })
        .collect();
    secondary_findings.sort_by(|a, b| {
        b.probability
            .total_cmp(&a.probability)
            .then(a.index.cmp(&b.index))
    });

    // The length check above keeps `primary_index` inside the taxonomy.
    let urgency = taxonomy.conditions()[primary_index].urgency;

    Ok(DiagnosisResult {
        primary_index,
        primary_confidence,
        secondary_findings,
        urgency,
        probabilities,
    })
}

/// Index of the maximum; the first occurrence wins ties.
fn argmax_first(values: &[f64]) -> usize {
    let mut best = 0usize;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Classifies independent score vectors; the output keeps input order.
pub fn classify_all<V>(
    vectors: &[V],
    taxonomy: &ConditionTaxonomy,
    params: &ClassifierParams,
) -> Vec<Result<DiagnosisResult, RecordError>>
where
    V: AsRef<[i64]> + Sync,
{
    #[cfg(feature = "mt")]
    {
        return vectors
            .par_iter()
            .map(|v| classify(v.as_ref(), taxonomy, params))
            .collect();
    }

    #[cfg(not(feature = "mt"))]
    vectors
        .iter()
        .map(|v| classify(v.as_ref(), taxonomy, params))
        .collect()
}
