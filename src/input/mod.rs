//! Score-block input files.
//!
//! ```text
//! # comment
//! === Test 3: pneumonia_case ===
//! expected: Pneumonia
//! 0x0000 0x0000 0x0000 0x0000 0x0000
//! 0x0000 0x0000 0x0000 0x0000 0x0000
//! 0x0000 0x0000 0x0000 0x0500 0x0000
//! ```
//!
//! Tokens may be spread over any number of lines. The `expected:` line is
//! optional and takes a class index or a condition name.

mod blocks;

use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::EngineConfig;
use crate::diagnosis::{RecordError, ScoreVector};
use crate::io::open_maybe_gz;
use crate::taxonomy::ConditionTaxonomy;

pub use blocks::parse_score_blocks;

/// One test case as read from input, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCase {
    /// Zero-based block ordinal within the input.
    pub position: usize,
    /// Line number of the block header.
    pub line: usize,
    pub test_id: u32,
    pub test_name: String,
    pub expected_index: Option<usize>,
    pub scores: Result<ScoreVector, RecordError>,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedInput {
    pub cases: Vec<ScoreCase>,
    pub warnings: Vec<String>,
}

pub fn read_score_file(
    path: &Path,
    taxonomy: &ConditionTaxonomy,
    config: &EngineConfig,
) -> Result<ParsedInput> {
    let reader = open_maybe_gz(path)
        .with_context(|| format!("failed to open score input {}", path.display()))?;
    let reader = BufReader::new(reader);
    parse_score_blocks(reader, &path.display().to_string(), taxonomy, config)
}

pub fn parse_score_str(
    content: &str,
    taxonomy: &ConditionTaxonomy,
    config: &EngineConfig,
) -> Result<ParsedInput> {
    parse_score_blocks(content.as_bytes(), "<inline>", taxonomy, config)
}
