// WHY: One document end to end: build tree, extract fragments, align, render, write
// Shared by the CLI and the integration tests

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::info;

use crate::aligner::{apply_parse_result, AlignStats, OverlayConfig};
use crate::content::{to_html, Document, SourceNode};
use crate::error::AlignError;
use crate::fragments::extract_children;
use crate::incremental::generate_aux_file_path;
use crate::parse_result::ParseResult;
use crate::popup::HtmlPopup;
use crate::reader::DocumentJob;

/// Annotated rendering of one document
#[derive(Debug, Clone)]
pub struct Annotated {
    pub html: String,
    pub text_length: usize,
    pub stats: AlignStats,
}

/// Per-file processing statistics
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileStats {
    /// Document path
    pub path: String,
    /// UTF-16 length of the extracted text
    pub text_length: u64,
    pub align: AlignStats,
    /// Processing time in milliseconds, including output write
    pub processing_time_ms: u64,
    /// Processing status (success, skipped, failed)
    pub status: String,
    /// Error message if processing failed
    pub error: Option<String>,
}

impl FileStats {
    pub fn skipped(path: &Path) -> Self {
        Self::with_status(path, "skipped", None)
    }

    pub fn failed(path: &Path, error: String) -> Self {
        Self::with_status(path, "failed", Some(error))
    }

    fn with_status(path: &Path, status: &str, error: Option<String>) -> Self {
        Self {
            path: path.display().to_string(),
            text_length: 0,
            align: AlignStats::default(),
            processing_time_ms: 0,
            status: status.to_string(),
            error,
        }
    }
}

/// Summary written to the stats file at the end of a run
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RunStats {
    pub run_duration_ms: u64,
    pub files_processed: u64,
    pub files_skipped: u64,
    pub files_failed: u64,
    pub words_emitted: u64,
    pub split_tokens: u64,
    pub missing_vocab: u64,
    pub files: Vec<FileStats>,
}

impl RunStats {
    pub fn record(&mut self, stats: FileStats) {
        match stats.status.as_str() {
            "success" => {
                self.files_processed += 1;
                self.words_emitted += stats.align.words as u64;
                self.split_tokens += stats.align.split_tokens as u64;
                self.missing_vocab += stats.align.missing_vocab as u64;
            }
            "skipped" => self.files_skipped += 1,
            _ => self.files_failed += 1,
        }
        self.files.push(stats);
    }

    pub async fn write_json(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

/// Align one document with its parse result and render the annotated tree
pub fn annotate_document(
    source: &SourceNode,
    parse: &ParseResult,
    config: &OverlayConfig,
) -> Result<Annotated, AlignError> {
    let mut doc = Document::from_source(source);
    let root = doc.root();
    let extraction = extract_children(&doc, root);

    let overlay = apply_parse_result(
        &mut doc,
        &extraction.fragments,
        parse,
        config,
        HtmlPopup::default(),
    )?;

    Ok(Annotated {
        html: to_html(&doc, root),
        text_length: extraction.consumed,
        stats: overlay.stats,
    })
}

/// Annotate a decoded job and write `<stem>.annotated.html` next to it
pub async fn process_job(job: &DocumentJob, config: &OverlayConfig) -> Result<FileStats> {
    let start_time = Instant::now();

    let annotated = annotate_document(&job.source, &job.parse, config)?;
    let aux_path = generate_aux_file_path(&job.path);
    write_output(&aux_path, &annotated.html).await?;

    let processing_time_ms = start_time.elapsed().as_millis() as u64;
    info!(
        "Annotated {}: {} words, {} unparsed spans in {}ms",
        job.path.display(),
        annotated.stats.words,
        annotated.stats.unparsed,
        processing_time_ms
    );

    Ok(FileStats {
        path: job.path.display().to_string(),
        text_length: annotated.text_length as u64,
        align: annotated.stats,
        processing_time_ms,
        status: "success".to_string(),
        error: None,
    })
}

/// Write rendered HTML with a trailing newline
pub async fn write_output(aux_path: &Path, html: &str) -> Result<()> {
    let file = tokio::fs::File::create(aux_path).await?;
    let mut writer = BufWriter::new(file);
    writer.write_all(html.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
