use assert_cmd::Command;
use tempfile::tempdir;

fn scores_line(winner: usize, token: &str) -> String {
    (0..15)
        .map(|i| if i == winner { token } else { "0x8000" })
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn run_writes_requested_outputs() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("scores.txt");
    std::fs::write(
        &input,
        format!(
            "=== Test 0: a ===\nexpected: 0\n{}\n=== Test 1: b ===\nexpected: 0\n{}\n",
            scores_line(0, "0x0400"),
            scores_line(9, "0x0400")
        ),
    )
    .unwrap();
    let out = dir.path().join("out");

    let assert = Command::cargo_bin("kira-dxeval")
        .unwrap()
        .args(["run", "--json", "--tsv", "--report", "--input"])
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("Accuracy: 50.00% (1/2) rating=NEEDS IMPROVEMENT"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("dxeval.json")).unwrap()).unwrap();
    assert_eq!(json["aggregate"]["total_tests"], 2);
    assert_eq!(json["diagnoses"][1]["predicted_name"], "Cardiomegaly");

    let tsv = std::fs::read_to_string(out.join("dxeval.tsv")).unwrap();
    let lines: Vec<&str> = tsv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("test_id\ttest_name\texpected\tpredicted\tcorrect"));
    assert!(lines[0].ends_with("p_hernia"));

    let report = std::fs::read_to_string(out.join("dxeval_report.txt")).unwrap();
    assert!(report.contains("main misclassification: Cardiomegaly"));
    assert!(report.contains("FOCUS AREAS FOR IMPROVEMENT"));
    assert!(report.contains("- No Finding: 1 of 2 incorrect"));
    assert_eq!(json["aggregate"]["per_class_accuracy"][0]["rating"], "fair");
    assert_eq!(json["aggregate"]["focus_classes"][0]["name"], "No Finding");
    assert_eq!(json["aggregate"]["focus_classes"][0]["incorrect"], 1);
}

#[test]
fn run_without_output_flags_creates_nothing() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    Command::cargo_bin("kira-dxeval")
        .unwrap()
        .args(["run", "--synthetic", "--out"])
        .arg(&out)
        .assert()
        .success();
    assert!(!out.exists());
}

#[test]
fn run_fails_on_missing_input() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("kira-dxeval")
        .unwrap()
        .args(["run", "--input"])
        .arg(dir.path().join("missing.txt"))
        .assert()
        .failure();
}

#[test]
fn classify_prints_primary_diagnosis() {
    let mut tokens = vec!["0x8000"; 15];
    tokens[5] = "0x0600";
    let assert = Command::cargo_bin("kira-dxeval")
        .unwrap()
        .arg("classify")
        .arg("--scores")
        .args(&tokens)
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("Pneumothorax"));
    assert!(stdout.contains("HIGH"));
}

#[test]
fn classify_rejects_wrong_length() {
    Command::cargo_bin("kira-dxeval")
        .unwrap()
        .args(["classify", "--scores", "0x0100", "0x0200"])
        .assert()
        .failure();
}

#[test]
fn validate_reports_rejections() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("scores.txt");
    std::fs::write(
        &input,
        format!(
            "=== Test 0: a ===\n{}\n=== Test 1: b ===\nexpected: Influenza\n{}\n",
            scores_line(3, "0x0200"),
            scores_line(3, "0x0200")
        ),
    )
    .unwrap();
    let assert = Command::cargo_bin("kira-dxeval")
        .unwrap()
        .args(["validate", "--input"])
        .arg(&input)
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("kira-dxeval validate ok"));
    assert!(stdout.contains("records: 1"));
    assert!(stdout.contains("rejected: 1"));
    assert!(stdout.contains("Influenza"));
}

#[test]
fn taxonomy_show_lists_conditions() {
    let assert = Command::cargo_bin("kira-dxeval")
        .unwrap()
        .args(["taxonomy", "show"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("taxonomy (version v1)"));
    assert!(stdout.contains("13\tPneumonia\tSTANDARD"));
    assert_eq!(stdout.lines().count(), 16);
}
