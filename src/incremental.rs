// WHY: Path conventions for incremental batch runs
// A document `name.doc.json` pairs with `name.parse.json` and produces `name.annotated.html`

use std::path::{Path, PathBuf};

pub const DOCUMENT_SUFFIX: &str = ".doc.json";
pub const PARSE_SUFFIX: &str = ".parse.json";
pub const OUTPUT_SUFFIX: &str = ".annotated.html";

/// Shared name of a document's file family, e.g. `chapter-01` for `chapter-01.doc.json`
pub fn document_stem(source_path: &Path) -> String {
    let file_name = source_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");
    file_name
        .strip_suffix(DOCUMENT_SUFFIX)
        .unwrap_or(file_name)
        .to_string()
}

/// Path of the parse result that belongs to a document
pub fn generate_parse_path(source_path: &Path) -> PathBuf {
    let mut parse_path = source_path.to_path_buf();
    parse_path.set_file_name(format!("{}{PARSE_SUFFIX}", document_stem(source_path)));
    parse_path
}

/// Path of the annotated output for a document
pub fn generate_aux_file_path(source_path: &Path) -> PathBuf {
    let mut aux_path = source_path.to_path_buf();
    aux_path.set_file_name(format!("{}{OUTPUT_SUFFIX}", document_stem(source_path)));
    aux_path
}

/// Check if annotated output already exists for a document
pub fn aux_file_exists<P: AsRef<Path>>(source_path: P) -> bool {
    generate_aux_file_path(source_path.as_ref()).exists()
}
