use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::diagnosis::classify::{ClassifierParams, DEFAULT_SECONDARY_THRESHOLD};
use crate::math::fixed_point::{DEFAULT_DATA_WIDTH, DEFAULT_FRAC_BITS, FixedPointFormat};
use crate::taxonomy::ConditionTaxonomy;

pub const DEFAULT_NUM_CLASSES: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub data_width: u32,
    pub frac_bits: u32,
    pub num_classes: usize,
    pub secondary_threshold: f64,
    pub expected_outputs: usize,
    /// Substitute zero for malformed tokens and wrong-length vectors instead of rejecting.
    pub zero_fill_malformed: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_width: DEFAULT_DATA_WIDTH,
            frac_bits: DEFAULT_FRAC_BITS,
            num_classes: DEFAULT_NUM_CLASSES,
            secondary_threshold: DEFAULT_SECONDARY_THRESHOLD,
            expected_outputs: DEFAULT_NUM_CLASSES,
            zero_fill_malformed: false,
        }
    }
}

impl EngineConfig {
    /// Reads a JSON config; absent fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: EngineConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn format(&self) -> FixedPointFormat {
        FixedPointFormat {
            data_width: self.data_width,
            frac_bits: self.frac_bits,
        }
    }

    pub fn classifier_params(&self) -> ClassifierParams {
        ClassifierParams {
            format: self.format(),
            secondary_threshold: self.secondary_threshold,
        }
    }

    pub fn validate(&self, taxonomy: &ConditionTaxonomy) -> Result<()> {
        self.format().validate()?;
        if !(0.0..=1.0).contains(&self.secondary_threshold) {
            bail!(
                "secondary threshold must be within [0, 1] (got {})",
                self.secondary_threshold
            );
        }
        if self.num_classes != taxonomy.len() {
            bail!(
                "num_classes ({}) does not match taxonomy size ({})",
                self.num_classes,
                taxonomy.len()
            );
        }
        if self.expected_outputs != self.num_classes {
            bail!(
                "expected_outputs ({}) must equal num_classes ({})",
                self.expected_outputs,
                self.num_classes
            );
        }
        Ok(())
    }
}
