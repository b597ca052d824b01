//! Durable crawl progress checkpointing
//!
//! The checkpoint is a small JSON object holding the set of processed
//! project links and the last completed page. Saves are crash-safe: the new
//! state is written to a temporary path and atomically renamed over the
//! canonical file, so an interrupted write never corrupts the previously
//! committed checkpoint. Loading is best-effort - a missing or unreadable
//! checkpoint means "start fresh," never a fatal error.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Persisted crawl progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlProgress {
    /// Links of projects already handed to the sink
    #[serde(default)]
    pub visited_projects: HashSet<String>,

    /// Last fully completed listing page
    #[serde(default = "default_last_page")]
    pub last_page: u32,
}

fn default_last_page() -> u32 {
    1
}

impl Default for CrawlProgress {
    fn default() -> Self {
        Self {
            visited_projects: HashSet::new(),
            last_page: default_last_page(),
        }
    }
}

/// Loads and saves [`CrawlProgress`] at a fixed path
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads saved progress, falling back to a fresh default
    pub fn load(&self) -> CrawlProgress {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<CrawlProgress>(&content) {
                Ok(progress) => {
                    tracing::info!(
                        "Loaded progress from {}: {} visited projects, last page {}",
                        self.path.display(),
                        progress.visited_projects.len(),
                        progress.last_page
                    );
                    progress
                }
                Err(e) => {
                    tracing::error!(
                        "Error decoding progress file {}: {}, starting fresh",
                        self.path.display(),
                        e
                    );
                    CrawlProgress::default()
                }
            },
            Err(_) => {
                tracing::info!("No saved progress found, starting from scratch");
                CrawlProgress::default()
            }
        }
    }

    /// Atomically saves `progress`
    ///
    /// On any failure the temporary file is discarded and the last good
    /// checkpoint remains intact; the caller logs and continues crawling.
    pub fn save(&self, progress: &CrawlProgress) -> std::io::Result<()> {
        let temp_path = temp_path_for(&self.path);

        let data = serde_json::to_string(progress)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        if let Err(e) = std::fs::write(&temp_path, data) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e);
        }

        if let Err(e) = std::fs::rename(&temp_path, &self.path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e);
        }

        tracing::debug!("Progress saved to {}", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut os_string = path.as_os_str().to_os_string();
    os_string.push(".tmp");
    PathBuf::from(os_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_is_fresh() {
        let dir = TempDir::new().unwrap();
        let store = ProgressStore::new(dir.path().join("progress.json"));

        let progress = store.load();
        assert!(progress.visited_projects.is_empty());
        assert_eq!(progress.last_page, 1);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = ProgressStore::new(dir.path().join("progress.json"));

        let mut progress = CrawlProgress::default();
        progress.visited_projects.insert("/project/a/".to_string());
        progress.visited_projects.insert("/project/b/".to_string());
        progress.last_page = 4;
        store.save(&progress).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.visited_projects.len(), 2);
        assert!(loaded.visited_projects.contains("/project/a/"));
        assert_eq!(loaded.last_page, 4);
    }

    #[test]
    fn test_corrupt_checkpoint_is_fresh() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("progress.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = ProgressStore::new(&path);
        let progress = store.load();
        assert!(progress.visited_projects.is_empty());
        assert_eq!(progress.last_page, 1);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("progress.json");
        let store = ProgressStore::new(&path);

        store.save(&CrawlProgress::default()).unwrap();

        assert!(path.exists());
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_failed_save_keeps_prior_checkpoint() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("progress.json");

        let store = ProgressStore::new(&path);
        let mut progress = CrawlProgress::default();
        progress.last_page = 2;
        store.save(&progress).unwrap();

        // A store pointed at a directory that does not exist cannot write
        let bad_store = ProgressStore::new(dir.path().join("missing/progress.json"));
        assert!(bad_store.save(&progress).is_err());

        // The original checkpoint is untouched
        let loaded = store.load();
        assert_eq!(loaded.last_page, 2);
    }
}
