use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::EngineConfig;
use crate::synthetic::DEFAULT_SEED;
use crate::taxonomy::{self, ConditionTaxonomy};

#[derive(Debug, Parser)]
#[command(
    name = "kira-dxeval",
    version,
    about = "Fixed-point diagnostic scoring and evaluation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify every score block in a batch and aggregate accuracy statistics
    Run(RunArgs),
    /// Classify a single score vector given on the command line
    Classify(ClassifyArgs),
    Taxonomy(TaxonomyArgs),
    /// Parse and classify a batch without writing outputs
    Validate(ValidateArgs),
}

/// Options shared by every command that decodes scores.
#[derive(Debug, Clone, Default, Args)]
pub struct EngineArgs {
    #[arg(long, help = "JSON engine config; flags below override its values")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Condition taxonomy TSV replacing the built-in table")]
    pub taxonomy: Option<PathBuf>,

    #[arg(long, help = "Fixed-point word width in bits [default: 16]")]
    pub data_width: Option<u32>,

    #[arg(long, help = "Fixed-point fractional bits [default: 8]")]
    pub frac_bits: Option<u32>,

    #[arg(long, help = "Number of classes [default: 15]")]
    pub num_classes: Option<usize>,

    #[arg(long, help = "Secondary finding probability threshold [default: 0.3]")]
    pub secondary_threshold: Option<f64>,

    #[arg(long, help = "Score tokens expected per test [default: 15]")]
    pub expected_outputs: Option<usize>,

    #[arg(
        long,
        default_value_t = false,
        help = "Substitute zero for malformed scores instead of rejecting the test"
    )]
    pub zero_fill_malformed: bool,
}

impl EngineArgs {
    pub fn resolve_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        if let Some(v) = self.data_width {
            config.data_width = v;
        }
        if let Some(v) = self.frac_bits {
            config.frac_bits = v;
        }
        if let Some(v) = self.num_classes {
            config.num_classes = v;
        }
        if let Some(v) = self.secondary_threshold {
            config.secondary_threshold = v;
        }
        if let Some(v) = self.expected_outputs {
            config.expected_outputs = v;
        }
        if self.zero_fill_malformed {
            config.zero_fill_malformed = true;
        }
        Ok(config)
    }

    pub fn resolve_taxonomy(&self) -> Result<ConditionTaxonomy> {
        match &self.taxonomy {
            Some(path) => taxonomy::load_user(path),
            None => taxonomy::load_builtin(),
        }
    }
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(
        long,
        required_unless_present = "synthetic",
        conflicts_with = "synthetic",
        help = "Score-block file (optionally .gz)"
    )]
    pub input: Option<PathBuf>,

    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long, default_value_t = false)]
    pub tsv: bool,

    #[arg(long, default_value_t = false, help = "Write the full text report")]
    pub report: bool,

    #[arg(
        long,
        default_value_t = false,
        help = "Evaluate a seeded synthetic fixture instead of real input"
    )]
    pub synthetic: bool,

    #[arg(long, default_value_t = 1, help = "Synthetic cases per class")]
    pub synthetic_rounds: usize,

    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    #[arg(long, num_args = 1.., required = true, help = "Hex score tokens in class order")]
    pub scores: Vec<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Debug, Args)]
pub struct TaxonomyArgs {
    #[command(subcommand)]
    pub command: TaxonomyCommand,
}

#[derive(Debug, Subcommand)]
pub enum TaxonomyCommand {
    Show(TaxonomyShowArgs),
}

#[derive(Debug, Args)]
pub struct TaxonomyShowArgs {
    #[arg(long, help = "Optional taxonomy TSV to show instead of the built-in table")]
    pub taxonomy: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(long, help = "Score-block file (optionally .gz)")]
    pub input: PathBuf,

    #[command(flatten)]
    pub engine: EngineArgs,
}
