use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::WatchError;
use crate::watch::subsystem::FileScanner;

/// Lists directories on the local filesystem with `walkdir`.
///
/// There is no dialog backend here; `select_files` and `select_folder`
/// always come back empty.
#[derive(Debug, Clone, Default)]
pub struct WalkdirScanner {
    follow_links: bool,
}

impl WalkdirScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Blocking walk. Unreadable entries are skipped, not fatal.
    pub fn scan_blocking(&self, root: &Path, recursive: bool) -> Result<Vec<String>, WatchError> {
        if !root.is_dir() {
            return Err(WatchError::Scan {
                path: root.display().to_string(),
                message: "not a directory".to_string(),
            });
        }

        let max_depth = if recursive { usize::MAX } else { 1 };
        let mut files = Vec::new();
        let mut skipped = 0;

        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(self.follow_links)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    skipped += 1;
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            match entry.path().to_str() {
                Some(path) => files.push(path.to_string()),
                None => {
                    skipped += 1;
                    warn!("Skipping non UTF-8 path: {}", entry.path().display());
                }
            }
        }

        info!(
            "Scanned {}: {} file(s), {} skipped (recursive: {})",
            root.display(),
            files.len(),
            skipped,
            recursive
        );
        Ok(files)
    }
}

#[async_trait]
impl FileScanner for WalkdirScanner {
    async fn select_files(&self) -> Vec<String> {
        Vec::new()
    }

    async fn select_folder(&self) -> Option<String> {
        None
    }

    async fn scan_directory(&self, path: &str, recursive: bool) -> Result<Vec<String>, WatchError> {
        let scanner = self.clone();
        let root = PathBuf::from(path);
        tokio::task::spawn_blocking(move || scanner.scan_blocking(&root, recursive))
            .await
            .map_err(|e| WatchError::Scan {
                path: path.to_string(),
                message: e.to_string(),
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    fn names(files: &[String]) -> Vec<String> {
        files
            .iter()
            .map(|f| crate::paths::file_name(f).to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_scan_top_level_only() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.txt").touch().unwrap();
        temp.child("b.pdf").touch().unwrap();
        temp.child("nested").create_dir_all().unwrap();
        temp.child("nested/c.srt").touch().unwrap();

        let files = WalkdirScanner::new()
            .scan_directory(temp.path().to_str().unwrap(), false)
            .await
            .unwrap();

        assert_eq!(names(&files), vec!["a.txt", "b.pdf"]);
    }

    #[tokio::test]
    async fn test_scan_recursive() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.txt").touch().unwrap();
        temp.child("nested/deeper").create_dir_all().unwrap();
        temp.child("nested/deeper/c.srt").touch().unwrap();

        let files = WalkdirScanner::new()
            .scan_directory(temp.path().to_str().unwrap(), true)
            .await
            .unwrap();

        let mut found = names(&files);
        found.sort();
        assert_eq!(found, vec!["a.txt", "c.srt"]);
        assert!(files.iter().all(|f| Path::new(f).is_absolute()));
    }

    #[tokio::test]
    async fn test_scan_missing_directory_is_error() {
        let temp = assert_fs::TempDir::new().unwrap();
        let missing = temp.child("gone");

        let err = WalkdirScanner::new()
            .scan_directory(missing.path().to_str().unwrap(), false)
            .await
            .unwrap_err();

        assert!(matches!(err, WatchError::Scan { .. }));
    }

    #[tokio::test]
    async fn test_dialogs_are_empty() {
        let scanner = WalkdirScanner::new();
        assert!(scanner.select_files().await.is_empty());
        assert!(scanner.select_folder().await.is_none());
    }
}
