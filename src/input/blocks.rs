use std::io::BufRead;

use anyhow::{Context, Result, bail};
use tracing::warn;

use crate::config::EngineConfig;
use crate::diagnosis::{RecordError, ScoreVector};
use crate::input::{ParsedInput, ScoreCase};
use crate::math::fixed_point::FixedPointFormat;
use crate::taxonomy::ConditionTaxonomy;

struct OpenBlock {
    line: usize,
    test_id: u32,
    test_name: String,
    label: Option<String>,
    tokens: Vec<String>,
    /// First structural problem seen inside the block; rejects the whole block.
    defect: Option<String>,
}

impl OpenBlock {
    fn new(line: usize, test_id: u32, test_name: String) -> Self {
        Self {
            line,
            test_id,
            test_name,
            label: None,
            tokens: Vec::new(),
            defect: None,
        }
    }

    fn mark_defect(&mut self, reason: String) {
        if self.defect.is_none() {
            self.defect = Some(reason);
        }
    }
}

pub fn parse_score_blocks<R: BufRead>(
    mut reader: R,
    source: &str,
    taxonomy: &ConditionTaxonomy,
    config: &EngineConfig,
) -> Result<ParsedInput> {
    let format = config.format();
    let mut parsed = ParsedInput::default();
    let mut current: Option<OpenBlock> = None;

    let mut line = String::new();
    let mut line_no = 0usize;
    loop {
        line.clear();
        let n = reader
            .read_line(&mut line)
            .with_context(|| format!("{}:{} read failed", source, line_no + 1))?;
        if n == 0 {
            break;
        }
        line_no += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if trimmed.starts_with("===") {
            if let Some(block) = current.take() {
                let position = parsed.cases.len();
                parsed
                    .cases
                    .push(close_block(block, position, &format, taxonomy, config, &mut parsed.warnings));
            }
            // A broken header still opens a block so its lines are skipped up to the next header.
            current = Some(match parse_header(trimmed) {
                Some((test_id, test_name)) => OpenBlock::new(line_no, test_id, test_name),
                None => {
                    let mut block =
                        OpenBlock::new(line_no, header_id_hint(trimmed), trimmed.to_string());
                    block.mark_defect(format!("malformed test header at line {}", line_no));
                    block
                }
            });
            continue;
        }

        let Some(block) = current.as_mut() else {
            bail!(
                "{}:{} scores found before the first '=== Test <id>: <name> ===' header",
                source,
                line_no
            );
        };

        if let Some(label) = parse_label(trimmed) {
            if block.label.is_some() {
                block.mark_defect(format!("duplicate expected label at line {}", line_no));
            } else if !block.tokens.is_empty() {
                block.mark_defect(format!(
                    "expected label after scores at line {}",
                    line_no
                ));
            } else {
                block.label = Some(label.to_string());
            }
            continue;
        }

        block
            .tokens
            .extend(trimmed.split_whitespace().map(str::to_string));
    }

    if let Some(block) = current.take() {
        let position = parsed.cases.len();
        parsed
            .cases
            .push(close_block(block, position, &format, taxonomy, config, &mut parsed.warnings));
    }

    Ok(parsed)
}

/// `=== Test <id>: <name> ===`
fn parse_header(line: &str) -> Option<(u32, String)> {
    let inner = line.strip_prefix("===")?.strip_suffix("===")?.trim();
    let rest = inner
        .strip_prefix("Test")
        .or_else(|| inner.strip_prefix("TEST"))
        .or_else(|| inner.strip_prefix("test"))?;
    let (id, name) = rest.split_once(':')?;
    let test_id: u32 = id.trim().parse().ok()?;
    let name = name.trim();
    let test_name = if name.is_empty() {
        format!("test_{}", test_id)
    } else {
        name.to_string()
    };
    Some((test_id, test_name))
}

/// Leading digits after the `Test` keyword of a header that failed to parse, or 0.
fn header_id_hint(line: &str) -> u32 {
    let inner = line.trim_start_matches('=').trim_start();
    let rest = inner.get(4..).unwrap_or("").trim_start();
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

fn parse_label(line: &str) -> Option<&str> {
    let head = line.get(..8)?;
    if !head.eq_ignore_ascii_case("expected") {
        return None;
    }
    let rest = line[8..].trim_start().strip_prefix(':')?;
    Some(rest.trim())
}

fn close_block(
    block: OpenBlock,
    position: usize,
    format: &FixedPointFormat,
    taxonomy: &ConditionTaxonomy,
    config: &EngineConfig,
    warnings: &mut Vec<String>,
) -> ScoreCase {
    if let Some(reason) = block.defect {
        return ScoreCase {
            position,
            line: block.line,
            test_id: block.test_id,
            test_name: block.test_name,
            expected_index: None,
            scores: Err(RecordError::MalformedBlock { reason }),
        };
    }

    let expected_index = match &block.label {
        Some(label) => match taxonomy.resolve_label(label) {
            Some(idx) => Some(idx),
            None => {
                return ScoreCase {
                    position,
                    line: block.line,
                    test_id: block.test_id,
                    test_name: block.test_name,
                    expected_index: None,
                    scores: Err(RecordError::UnknownLabel {
                        label: label.clone(),
                    }),
                };
            }
        },
        None => None,
    };

    let scores = decode_tokens(&block, format, config, warnings);

    ScoreCase {
        position,
        line: block.line,
        test_id: block.test_id,
        test_name: block.test_name,
        expected_index,
        scores,
    }
}

fn decode_tokens(
    block: &OpenBlock,
    format: &FixedPointFormat,
    config: &EngineConfig,
    warnings: &mut Vec<String>,
) -> Result<ScoreVector, RecordError> {
    if block.tokens.len() != config.expected_outputs {
        if config.zero_fill_malformed {
            let msg = format!(
                "test {} ({}): {} scores instead of {}, substituted all zeros",
                block.test_id,
                block.test_name,
                block.tokens.len(),
                config.expected_outputs
            );
            warn!(test_id = block.test_id, "{}", msg);
            warnings.push(msg);
            return Ok(vec![0; config.expected_outputs]);
        }
        return Err(RecordError::InvalidInputShape {
            expected: config.expected_outputs,
            got: block.tokens.len(),
        });
    }

    let mut scores = Vec::with_capacity(block.tokens.len());
    for (position, token) in block.tokens.iter().enumerate() {
        match format.parse_token(token) {
            Ok(raw) => scores.push(raw),
            Err(err) if config.zero_fill_malformed => {
                let msg = format!(
                    "test {} ({}): {} at position {}, substituted zero",
                    block.test_id, block.test_name, err, position
                );
                warn!(test_id = block.test_id, position, "{}", msg);
                warnings.push(msg);
                scores.push(0);
            }
            Err(err) => {
                return Err(RecordError::MalformedToken {
                    position,
                    token: token.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }
    Ok(scores)
}
