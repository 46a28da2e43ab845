use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::content::SourceNode;
use crate::parse_result::ParseResult;

/// Configuration for file reading behavior
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Whether to fail fast on first error or continue processing
    pub fail_fast: bool,
    /// Refuse inputs larger than this many bytes
    pub max_bytes: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            max_bytes: 64 * 1024 * 1024,
        }
    }
}

/// A document and its parse result, decoded and ready to align
#[derive(Debug, Clone)]
pub struct DocumentJob {
    pub path: PathBuf,
    pub source: SourceNode,
    pub parse: ParseResult,
    pub bytes_read: u64,
}

/// Async reader for document/parse pairs
pub struct DocumentReader {
    config: ReaderConfig,
}

impl DocumentReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Read and decode both halves of a job
    pub async fn read_job(&self, document_path: &Path, parse_path: &Path) -> Result<DocumentJob> {
        let start_time = std::time::Instant::now();
        debug!("Starting async read of document: {}", document_path.display());

        let (source, document_bytes): (SourceNode, u64) = self.read_json(document_path).await?;
        let (parse, parse_bytes): (ParseResult, u64) = self.read_json(parse_path).await?;

        let bytes_read = document_bytes + parse_bytes;
        info!(
            "Read {} ({} tokens, {} vocab entries, {} bytes) in {}ms",
            document_path.display(),
            parse.tokens.len(),
            parse.vocab.len(),
            bytes_read,
            start_time.elapsed().as_millis()
        );

        Ok(DocumentJob {
            path: document_path.to_path_buf(),
            source,
            parse,
            bytes_read,
        })
    }

    async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<(T, u64)> {
        let metadata = fs::metadata(path)
            .await
            .with_context(|| format!("Failed to open file {}", path.display()))?;

        if metadata.len() > self.config.max_bytes {
            anyhow::bail!(
                "File {} is {} bytes, limit is {}",
                path.display(),
                metadata.len(),
                self.config.max_bytes
            );
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let value = serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;

        Ok((value, content.len() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_job_decodes_both_files() {
        let temp_dir = TempDir::new().unwrap();
        let doc_path = temp_dir.path().join("a.doc.json");
        let parse_path = temp_dir.path().join("a.parse.json");
        fs::write(&doc_path, r#"{"type":"element","tag":"p","children":[{"type":"text","text":"猫"}]}"#)
            .await
            .unwrap();
        fs::write(&parse_path, r#"{"tokens":[],"vocab":[]}"#).await.unwrap();

        let reader = DocumentReader::new(ReaderConfig::default());
        let job = reader.read_job(&doc_path, &parse_path).await.unwrap();

        assert_eq!(job.source, SourceNode::element("p", vec![SourceNode::text("猫")]));
        assert!(job.parse.tokens.is_empty());
        assert!(job.bytes_read > 0);
    }

    #[tokio::test]
    async fn test_invalid_json_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let doc_path = temp_dir.path().join("bad.doc.json");
        fs::write(&doc_path, "{not json").await.unwrap();

        let reader = DocumentReader::new(ReaderConfig::default());
        let err = reader.read_job(&doc_path, &doc_path).await.unwrap_err();
        assert!(err.to_string().contains("bad.doc.json"));
    }

    #[tokio::test]
    async fn test_size_limit_enforced() {
        let temp_dir = TempDir::new().unwrap();
        let doc_path = temp_dir.path().join("big.doc.json");
        fs::write(&doc_path, r#"{"type":"text","text":"0123456789"}"#).await.unwrap();

        let reader = DocumentReader::new(ReaderConfig {
            fail_fast: false,
            max_bytes: 8,
        });
        let err = reader.read_job(&doc_path, &doc_path).await.unwrap_err();
        assert!(err.to_string().contains("limit"));
    }
}
