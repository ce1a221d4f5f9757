use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;
use kira_dxeval::config::EngineConfig;
use kira_dxeval::diagnosis::RecordError;
use kira_dxeval::input::{ScoreCase, parse_score_str, read_score_file};
use kira_dxeval::taxonomy::load_builtin;
use tempfile::tempdir;

const ZEROS: &str = "0x0000 0x0000 0x0000 0x0000 0x0000\n0x0000 0x0000 0x0000 0x0000 0x0000\n0x0000 0x0000 0x0000 0x0000 0x0000\n";

#[test]
fn parses_blocks_labels_and_comments() {
    let tax = load_builtin().unwrap();
    let content = format!(
        "# transcript\n\n=== Test 0: normal ===\nexpected: 0\n{}=== Test 4: pneumonia case ===\nExpected : Pneumonia\n{}\n=== Test 9: unlabeled ===\n{}",
        ZEROS,
        ZEROS.replace('\n', " ").trim_end(),
        ZEROS
    );
    let parsed = parse_score_str(&content, &tax, &EngineConfig::default()).unwrap();
    assert_eq!(parsed.cases.len(), 3);
    assert!(parsed.warnings.is_empty());

    let c0 = &parsed.cases[0];
    assert_eq!((c0.position, c0.test_id, c0.line), (0, 0, 3));
    assert_eq!(c0.test_name, "normal");
    assert_eq!(c0.expected_index, Some(0));
    assert_eq!(c0.scores.as_ref().unwrap().len(), 15);

    let c1 = &parsed.cases[1];
    assert_eq!(c1.test_id, 4);
    assert_eq!(c1.test_name, "pneumonia case");
    assert_eq!(c1.expected_index, Some(13));

    let c2 = &parsed.cases[2];
    assert_eq!(c2.expected_index, None);
    assert!(c2.scores.is_ok());
}

#[test]
fn signed_tokens_without_prefix() {
    let tax = load_builtin().unwrap();
    let content = "=== Test 1: t ===\n8000 0500 0x0600 ff00 0 0 0 0 0 0 0 0 0 0 0\n";
    let parsed = parse_score_str(content, &tax, &EngineConfig::default()).unwrap();
    let scores = parsed.cases[0].scores.as_ref().unwrap();
    assert_eq!(&scores[..4], &[-32768, 1280, 1536, -256]);
}

#[test]
fn malformed_and_short_blocks_are_rejected_per_record() {
    let tax = load_builtin().unwrap();
    let content = format!(
        "=== Test 1: bad token ===\n0x0000 0xZZZZ {}=== Test 2: short ===\n0x0000 0x0000\n=== Test 3: ok ===\n{}",
        "0x0000 ".repeat(13),
        ZEROS
    );
    let parsed = parse_score_str(&content, &tax, &EngineConfig::default()).unwrap();
    assert_eq!(parsed.cases.len(), 3);
    match &parsed.cases[0].scores {
        Err(RecordError::MalformedToken { position, token, .. }) => {
            assert_eq!(*position, 1);
            assert_eq!(token, "0xZZZZ");
        }
        other => panic!("expected malformed token, got {:?}", other),
    }
    assert_eq!(
        parsed.cases[1].scores,
        Err(RecordError::InvalidInputShape {
            expected: 15,
            got: 2
        })
    );
    assert!(parsed.cases[2].scores.is_ok());
}

#[test]
fn unknown_label_is_rejected_per_record() {
    let tax = load_builtin().unwrap();
    let content = format!("=== Test 1: x ===\nexpected: Influenza\n{}", ZEROS);
    let parsed = parse_score_str(&content, &tax, &EngineConfig::default()).unwrap();
    assert_eq!(
        parsed.cases[0].scores,
        Err(RecordError::UnknownLabel {
            label: "Influenza".to_string()
        })
    );
}

#[test]
fn zero_fill_is_opt_in() {
    let tax = load_builtin().unwrap();
    let content = format!(
        "=== Test 1: bad ===\nnope {}=== Test 2: short ===\n0x0100\n",
        "0x0100 ".repeat(14)
    );
    let config = EngineConfig {
        zero_fill_malformed: true,
        ..EngineConfig::default()
    };
    let parsed = parse_score_str(&content, &tax, &config).unwrap();
    let first = parsed.cases[0].scores.as_ref().unwrap();
    assert_eq!(first[0], 0);
    assert_eq!(first[1], 256);
    assert_eq!(parsed.cases[1].scores.as_ref().unwrap(), &vec![0; 15]);
    assert_eq!(parsed.warnings.len(), 2);
}

#[test]
fn lines_before_first_header_fail_the_file() {
    let tax = load_builtin().unwrap();
    let err = parse_score_str("0x0000\n", &tax, &EngineConfig::default()).unwrap_err();
    assert!(err.to_string().contains("<inline>:1"));
}

fn assert_malformed_block(case: &ScoreCase, needle: &str) {
    match &case.scores {
        Err(RecordError::MalformedBlock { reason }) => {
            assert!(reason.contains(needle), "reason was {}", reason)
        }
        other => panic!("expected malformed block, got {:?}", other),
    }
}

#[test]
fn corrupt_block_is_rejected_without_losing_neighbours() {
    let tax = load_builtin().unwrap();
    let content = format!(
        "=== Test 0: good ===\nexpected: 0\n{zeros}=== Test 1: twice labeled ===\nexpected: 0\nexpected: 1\n{zeros}=== Test 2: late label ===\n{zeros}expected: 2\n=== Test 3: good ===\n{zeros}",
        zeros = ZEROS
    );
    let parsed = parse_score_str(&content, &tax, &EngineConfig::default()).unwrap();
    assert_eq!(parsed.cases.len(), 4);
    assert!(parsed.cases[0].scores.is_ok());
    assert_malformed_block(&parsed.cases[1], "duplicate expected label");
    assert_eq!(parsed.cases[1].test_id, 1);
    assert_malformed_block(&parsed.cases[2], "expected label after scores");
    assert!(parsed.cases[3].scores.is_ok());
    assert_eq!(parsed.cases[3].position, 3);
}

#[test]
fn bad_header_rejects_only_its_block() {
    let tax = load_builtin().unwrap();
    let content = format!(
        "=== Test 0: good ===\n{zeros}=== Test 1x: bad id ===\n{zeros}=== Test 2: good ===\n{zeros}",
        zeros = ZEROS
    );
    let parsed = parse_score_str(&content, &tax, &EngineConfig::default()).unwrap();
    assert_eq!(parsed.cases.len(), 3);
    assert!(parsed.cases[0].scores.is_ok());
    assert_malformed_block(&parsed.cases[1], "malformed test header");
    assert_eq!(parsed.cases[1].test_id, 1);
    assert_eq!(parsed.cases[1].line, 5);
    assert_eq!(parsed.cases[2].test_id, 2);
    assert!(parsed.cases[2].scores.is_ok());
}

#[test]
fn gzip_input_is_read_transparently() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scores.txt.gz");
    let file = std::fs::File::create(&path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    write!(
        encoder,
        "=== Test 7: packed ===\nexpected: Pneumonia\n{}=== Test 8: second ===\n{}",
        ZEROS, ZEROS
    )
    .unwrap();
    encoder.finish().unwrap();

    let tax = load_builtin().unwrap();
    let parsed = read_score_file(&path, &tax, &EngineConfig::default()).unwrap();
    assert_eq!(parsed.cases.len(), 2);
    assert_eq!(parsed.cases[0].test_id, 7);
    assert_eq!(parsed.cases[0].expected_index, Some(13));
    assert_eq!(parsed.cases[0].scores.as_ref().unwrap(), &vec![0; 15]);
    assert_eq!(parsed.cases[1].test_id, 8);
}

#[test]
fn empty_input_has_no_cases() {
    let tax = load_builtin().unwrap();
    let parsed = parse_score_str("# nothing here\n\n", &tax, &EngineConfig::default()).unwrap();
    assert!(parsed.cases.is_empty());
}
