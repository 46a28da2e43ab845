pub mod aligner;
pub mod content;
pub mod discovery;
pub mod error;
pub mod fragments;
pub mod incremental;
pub mod offset;
pub mod parse_result;
pub mod popup;
pub mod processing;
pub mod reader;
pub mod restart_log;

// Re-export main types for convenient access
pub use aligner::{
    apply_parse_result, plan, AlignStats, EmittedSpan, Mutation, Overlay, OverlayConfig, Plan,
    SpanKind, TokenPiece, WritingMode,
};
pub use content::{furigana_to_ruby, to_html, Document, Element, NodeId, SourceNode};
pub use error::AlignError;
pub use fragments::{extract_children, extract_fragments, ContentUnit, Extraction, TextFragment};
pub use parse_result::{FuriganaPart, ParseResult, Token, VocabularyEntry};
pub use popup::{render_popup, AnnotationDisplay, HtmlPopup, PopupContent};

// Re-export batch processing utilities
pub use incremental::{aux_file_exists, generate_aux_file_path, generate_parse_path};
pub use processing::{annotate_document, FileStats, RunStats};
