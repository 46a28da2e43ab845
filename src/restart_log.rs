use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::incremental::generate_aux_file_path;

/// Tracks documents that were annotated successfully so an interrupted run can resume
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct RestartLog {
    /// Set of successfully processed document paths
    completed_files: HashSet<String>,
    /// Seconds since the epoch of the last update
    last_updated: u64,
}

impl RestartLog {
    /// Load restart log from file, returns empty log if file doesn't exist or is unreadable
    pub async fn load(root_dir: &Path) -> Self {
        match fs::read_to_string(Self::get_log_path(root_dir)).await {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save restart log to file
    pub async fn save(&self, root_dir: &Path) -> Result<()> {
        let log_path = Self::get_log_path(root_dir);
        let content = serde_json::to_string_pretty(self)?;

        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&log_path, content).await?;
        Ok(())
    }

    pub fn is_completed(&self, file_path: &Path) -> bool {
        self.completed_files
            .contains(file_path.to_string_lossy().as_ref())
    }

    pub fn mark_completed(&mut self, file_path: &Path) {
        self.completed_files
            .insert(file_path.to_string_lossy().to_string());
        self.touch();
    }

    pub fn completed_count(&self) -> usize {
        self.completed_files.len()
    }

    /// Forget everything, forcing a full rerun
    pub fn clear(&mut self) {
        self.completed_files.clear();
        self.touch();
    }

    /// Drop entries whose document or annotated output has disappeared; returns the dropped paths
    pub fn verify_completed_files(&mut self) -> Vec<PathBuf> {
        let mut invalid_files = Vec::new();

        self.completed_files.retain(|file_path_str| {
            let file_path = PathBuf::from(file_path_str);
            let valid = file_path.exists() && generate_aux_file_path(&file_path).exists();
            if !valid {
                invalid_files.push(file_path);
            }
            valid
        });

        invalid_files
    }

    fn touch(&mut self) {
        self.last_updated = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
    }

    fn get_log_path(root_dir: &Path) -> PathBuf {
        root_dir.join(".furigloss_restart.json")
    }
}
