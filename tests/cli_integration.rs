use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

#[path = "integration/fixtures/mod.rs"]
mod fixtures;
use fixtures::*;

#[path = "integration/mod.rs"]
mod test_utils;
use test_utils::TestFixture;

fn run_furigloss(root: &Path, stats_file: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_furigloss"))
        .arg(root.as_os_str())
        .arg("--no-progress")
        .arg("--stats-out")
        .arg(stats_file.as_os_str())
        .args(extra)
        .output()
        .expect("Failed to run furigloss")
}

fn read_stats(stats_file: &Path) -> Value {
    let json_content = fs::read_to_string(stats_file).expect("Failed to read stats file");
    serde_json::from_str(&json_content).expect("Failed to parse JSON")
}

/// Test that a run writes annotated output and a stats file with the expected counters
#[test]
fn test_cli_run_writes_output_and_stats() {
    let fixture = TestFixture::new();
    let doc_path = fixture.create_document_json("chapter1", CAT_DOCUMENT_JSON, CAT_PARSE_JSON);
    fixture.create_document_json(
        "broken",
        CAT_DOCUMENT_JSON,
        r#"{"tokens": [{"positionUtf16": 3, "lengthUtf16": 9, "vocabularyIndex": 0}], "vocab": []}"#,
    );
    let stats_file = fixture.root_path.join("stats.json");

    let output = run_furigloss(&fixture.root_path, &stats_file, &[]);
    assert!(
        output.status.success(),
        "furigloss command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let html = fixture.read_output(&doc_path).expect("Output should exist");
    assert_eq!(html.trim_end(), CAT_EXPECTED_HTML);

    let stats = read_stats(&stats_file);
    assert_eq!(stats["files_processed"], 1);
    assert_eq!(stats["files_failed"], 1);
    assert_eq!(stats["split_tokens"], 1);
    assert_eq!(stats["files"].as_array().map(Vec::len), Some(2));
    assert!(fixture.restart_log_path().exists());
}

/// Second run skips completed documents unless --overwrite-all is given
#[test]
fn test_cli_rerun_skips_completed() {
    let fixture = TestFixture::new();
    fixture.create_document_json("chapter1", CAT_DOCUMENT_JSON, CAT_PARSE_JSON);
    let stats_file = fixture.root_path.join("stats.json");

    assert!(run_furigloss(&fixture.root_path, &stats_file, &[]).status.success());

    assert!(run_furigloss(&fixture.root_path, &stats_file, &[]).status.success());
    let stats = read_stats(&stats_file);
    assert_eq!(stats["files_processed"], 0);
    assert_eq!(stats["files_skipped"], 1);

    assert!(run_furigloss(&fixture.root_path, &stats_file, &["--overwrite-all"]).status.success());
    let stats = read_stats(&stats_file);
    assert_eq!(stats["files_processed"], 1);
    assert_eq!(stats["files_skipped"], 0);
}

/// Fail-fast aborts with a non-zero exit on the first broken document
#[test]
fn test_cli_fail_fast_exits_with_error() {
    let fixture = TestFixture::new();
    fixture.create_document_json(
        "broken",
        CAT_DOCUMENT_JSON,
        r#"{"tokens": [{"positionUtf16": 3, "lengthUtf16": 9, "vocabularyIndex": 0}], "vocab": []}"#,
    );
    let stats_file = fixture.root_path.join("stats.json");

    let output = run_furigloss(&fixture.root_path, &stats_file, &["--fail-fast"]);

    assert!(!output.status.success());
    assert!(!stats_file.exists());
}

/// Keep-original mode retains the source text in a hidden wrapper
#[test]
fn test_cli_keep_original_horizontal() {
    let fixture = TestFixture::new();
    let doc_path = fixture.create_document_json("chapter1", CAT_DOCUMENT_JSON, CAT_PARSE_JSON);
    let stats_file = fixture.root_path.join("stats.json");

    let output = run_furigloss(
        &fixture.root_path,
        &stats_file,
        &["--keep-original", "--horizontal"],
    );
    assert!(output.status.success());

    let html = fixture.read_output(&doc_path).expect("Output should exist");
    assert!(html.contains(
        "<span class=\"jpdb-ttu-wrapper\" style=\"position:absolute;top:0;left:0;visibility:hidden\">猫が</span>"
    ));
    assert_eq!(html.matches("jpdb-ttu-wrapper").count(), 3);
}
