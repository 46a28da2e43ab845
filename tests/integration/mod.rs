// Integration test utilities and common code
// WHY: Centralized utilities avoid duplication across integration tests

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use furigloss::{ParseResult, SourceNode};

/// Test fixture helper for creating temporary directories with document/parse pairs
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self { temp_dir, root_path }
    }

    /// Write raw content to a file under the fixture root, creating parent directories
    pub fn write_file<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        let file_path = self.root_path.join(relative_path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// Write `<stem>.doc.json` and `<stem>.parse.json`; returns the document path
    pub fn create_document(&self, stem: &str, source: &SourceNode, parse: &ParseResult) -> PathBuf {
        let source_json = serde_json::to_string(source).expect("Failed to serialize document");
        let parse_json = serde_json::to_string(parse).expect("Failed to serialize parse result");
        self.write_file(format!("{stem}.parse.json"), &parse_json);
        self.write_file(format!("{stem}.doc.json"), &source_json)
    }

    /// Write a document pair from raw JSON text; returns the document path
    pub fn create_document_json(&self, stem: &str, source_json: &str, parse_json: &str) -> PathBuf {
        self.write_file(format!("{stem}.parse.json"), parse_json);
        self.write_file(format!("{stem}.doc.json"), source_json)
    }

    /// Output path matching the main implementation
    pub fn output_path<P: AsRef<Path>>(&self, document_path: P) -> PathBuf {
        furigloss::generate_aux_file_path(document_path.as_ref())
    }

    pub fn output_exists<P: AsRef<Path>>(&self, document_path: P) -> bool {
        self.output_path(document_path).exists()
    }

    pub fn read_output<P: AsRef<Path>>(&self, document_path: P) -> Result<String, std::io::Error> {
        fs::read_to_string(self.output_path(document_path))
    }

    pub fn restart_log_path(&self) -> PathBuf {
        self.root_path.join(".furigloss_restart.json")
    }
}

/// Compare two markup strings, reporting the first differing byte region on mismatch
pub fn assert_golden_html(actual: &str, expected: &str, context: &str) {
    if actual == expected {
        return;
    }

    let common = actual
        .char_indices()
        .zip(expected.chars())
        .find(|((_, a), e)| a != e)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| actual.len().min(expected.len()));
    let window = |s: &str| s.get(common..).unwrap_or("").chars().take(60).collect::<String>();

    panic!(
        "{}: markup mismatch at byte {}\nExpected: ...{}\nActual:   ...{}",
        context,
        common,
        window(expected),
        window(actual)
    );
}
