//! Watch-folder set: persistence, subsystem registration and discovery scans.

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{info_span, Instrument};

use crate::error::WatchError;
use crate::paths::{self, PathCase};
use crate::queue::{IngestFunnel, IngestReport, IngestSource};
use crate::sanitize;
use crate::storage::{DocumentRepository, WATCH_FOLDERS_KEY};
use crate::watch::folder::{normalize_file_types, WatchFolderConfig};
use crate::watch::subsystem::{FileScanner, WatchSubsystem};

/// Owns the watch-folder set.
///
/// Changes are registered with the watch subsystem first; the local set is
/// only updated after the subsystem reports success.
pub struct WatchFolderManager {
    folders: Vec<WatchFolderConfig>,
    repo: DocumentRepository,
    subsystem: Arc<dyn WatchSubsystem>,
    scanner: Arc<dyn FileScanner>,
    funnel: IngestFunnel,
    path_case: PathCase,
}

impl std::fmt::Debug for WatchFolderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchFolderManager")
            .field("folders", &self.folders.len())
            .field("path_case", &self.path_case)
            .finish_non_exhaustive()
    }
}

impl WatchFolderManager {
    /// Loads the persisted set. A malformed document yields an empty set.
    pub fn load(
        repo: DocumentRepository,
        subsystem: Arc<dyn WatchSubsystem>,
        scanner: Arc<dyn FileScanner>,
        funnel: IngestFunnel,
        path_case: PathCase,
    ) -> Self {
        let folders = match repo.load::<Vec<WatchFolderConfig>>(WATCH_FOLDERS_KEY) {
            Ok(Some(folders)) => dedup_by_path(folders, path_case),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Ignoring unreadable watch folder document: {}", e);
                Vec::new()
            }
        };
        log::info!("Loaded {} watch folder(s)", folders.len());

        Self {
            folders,
            repo,
            subsystem,
            scanner,
            funnel,
            path_case,
        }
    }

    pub fn folders(&self) -> &[WatchFolderConfig] {
        &self.folders
    }

    pub fn get(&self, id: &str) -> Option<&WatchFolderConfig> {
        self.folders.iter().find(|f| f.id == id)
    }

    pub fn contains_path(&self, path: &str) -> bool {
        let key = self.path_key(path);
        self.folders.iter().any(|f| self.path_key(&f.path) == key)
    }

    /// Registers a new folder.
    ///
    /// Empty and already-watched paths are rejected before the subsystem is
    /// contacted.
    pub async fn add(&mut self, mut config: WatchFolderConfig) -> Result<WatchFolderConfig, WatchError> {
        config.path = config.path.trim().to_string();
        if config.path.is_empty() {
            return Err(WatchError::EmptyPath);
        }
        if self.contains_path(&config.path) {
            return Err(WatchError::DuplicatePath(config.path));
        }

        self.subsystem
            .add(&config)
            .await
            .into_result("add")
            .map_err(|e| self.report_failure(e))?;

        log::info!("Added watch folder {}", config.path);
        let mut next = self.folders.clone();
        next.push(config.clone());
        self.commit(next);
        Ok(config)
    }

    pub async fn toggle(&mut self, id: &str, enabled: bool) -> Result<(), WatchError> {
        let index = self.index_of(id)?;
        self.subsystem
            .toggle(id, enabled)
            .await
            .into_result("toggle")
            .map_err(|e| self.report_failure(e))?;

        let mut next = self.folders.clone();
        next[index].enabled = enabled;
        self.commit(next);
        Ok(())
    }

    /// Replaces a folder's type filter. An empty list accepts every supported type.
    pub async fn set_file_types(&mut self, id: &str, file_types: &[String]) -> Result<(), WatchError> {
        let file_types = normalize_file_types(file_types);
        self.update(id, |folder| folder.file_types = file_types).await
    }

    pub async fn set_include_subdirs(&mut self, id: &str, include_subdirs: bool) -> Result<(), WatchError> {
        self.update(id, |folder| folder.include_subdirs = include_subdirs)
            .await
    }

    pub async fn remove(&mut self, id: &str) -> Result<WatchFolderConfig, WatchError> {
        let index = self.index_of(id)?;
        self.subsystem
            .remove(id)
            .await
            .into_result("remove")
            .map_err(|e| self.report_failure(e))?;

        let mut next = self.folders.clone();
        let removed = next.remove(index);
        log::info!("Removed watch folder {}", removed.path);
        self.commit(next);
        Ok(removed)
    }

    /// Startup pass: registers every enabled folder, scans them all
    /// concurrently and ingests the merged result as one batch.
    pub async fn bootstrap(&self) -> IngestReport {
        let enabled: Vec<&WatchFolderConfig> = self.folders.iter().filter(|f| f.enabled).collect();
        let span = info_span!("bootstrap_watch_folders", folders = enabled.len());

        async move {
            for folder in &enabled {
                if let Err(e) = self.subsystem.add(folder).await.into_result("add") {
                    self.report_failure(e);
                }
            }

            let paths = self.scan_merged(&enabled).await;
            self.funnel.ingest(paths, IngestSource::Watch).await
        }
        .instrument(span)
        .await
    }

    /// Scans one folder again and ingests what it finds.
    pub async fn rescan(&self, id: &str) -> Result<IngestReport, WatchError> {
        let folder = self
            .get(id)
            .ok_or_else(|| WatchError::NotFound(id.to_string()))?;
        let paths = self.scan_merged(&[folder]).await;
        Ok(self.funnel.ingest(paths, IngestSource::Watch).await)
    }

    async fn update<F>(&mut self, id: &str, apply: F) -> Result<(), WatchError>
    where
        F: FnOnce(&mut WatchFolderConfig),
    {
        let index = self.index_of(id)?;
        let mut updated = self.folders[index].clone();
        apply(&mut updated);

        self.subsystem
            .add(&updated)
            .await
            .into_result("update")
            .map_err(|e| self.report_failure(e))?;

        let mut next = self.folders.clone();
        next[index] = updated;
        self.commit(next);
        Ok(())
    }

    /// Scans folders concurrently, filters each by its own type filter and
    /// merges the results in folder order without duplicates.
    async fn scan_merged(&self, folders: &[&WatchFolderConfig]) -> Vec<String> {
        let scans = folders.iter().map(|folder| async move {
            let result = self
                .scanner
                .scan_directory(&folder.path, folder.include_subdirs)
                .await;
            (*folder, result)
        });

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for (folder, result) in join_all(scans).await {
            let files = match result {
                Ok(files) => files,
                Err(e) => {
                    log::warn!(
                        "Scan of watch folder {} failed: {}",
                        sanitize::hash_path(&folder.path),
                        e
                    );
                    self.funnel
                        .notifier()
                        .error("Watch folder", format!("Scan failed: {}", e));
                    continue;
                }
            };

            let found = files.len();
            let accepted: Vec<String> = files.into_iter().filter(|f| folder.accepts(f)).collect();
            log::debug!(
                "Watch folder {}: {} of {} file(s) accepted",
                folder.id,
                accepted.len(),
                found
            );
            for path in accepted {
                if seen.insert(path.clone()) {
                    merged.push(path);
                }
            }
        }
        merged
    }

    fn index_of(&self, id: &str) -> Result<usize, WatchError> {
        self.folders
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| WatchError::NotFound(id.to_string()))
    }

    fn path_key(&self, path: &str) -> String {
        path_key(path, self.path_case)
    }

    /// Logs and broadcasts an external failure, handing the error back.
    fn report_failure(&self, error: WatchError) -> WatchError {
        log::error!("Watch folder operation failed: {}", error);
        self.funnel
            .notifier()
            .error("Watch folder", error.to_string());
        error
    }

    fn commit(&mut self, next: Vec<WatchFolderConfig>) {
        self.folders = next;
        if let Err(e) = self.repo.save(WATCH_FOLDERS_KEY, &self.folders) {
            log::error!("Failed to persist watch folders: {}", e);
            self.funnel
                .notifier()
                .error("Watch folders not saved", e.to_string());
        }
    }
}

fn path_key(path: &str, case: PathCase) -> String {
    let normalized = paths::normalize_for_compare(path, case);
    match normalized.trim_end_matches('/') {
        "" => normalized,
        trimmed => trimmed.to_string(),
    }
}

fn dedup_by_path(folders: Vec<WatchFolderConfig>, case: PathCase) -> Vec<WatchFolderConfig> {
    let mut seen = HashSet::new();
    let before = folders.len();
    let kept: Vec<WatchFolderConfig> = folders
        .into_iter()
        .filter(|f| !f.path.trim().is_empty() && seen.insert(path_key(&f.path, case)))
        .collect();
    if kept.len() != before {
        log::warn!("Dropped {} invalid or duplicate watch folder(s)", before - kept.len());
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::{NotificationBroadcaster, NotificationLevel};
    use crate::config::GlobalDefaults;
    use crate::queue::{KnownNames, QueueStore};
    use crate::storage::MemoryStore;
    use crate::watch::subsystem::SubsystemResponse;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct FakeSubsystem {
        fail: AtomicBool,
    }

    impl FakeSubsystem {
        fn respond(&self) -> SubsystemResponse {
            if self.fail.load(Ordering::SeqCst) {
                SubsystemResponse::failed("subsystem offline")
            } else {
                SubsystemResponse::ok()
            }
        }
    }

    #[async_trait]
    impl WatchSubsystem for FakeSubsystem {
        async fn add(&self, _config: &WatchFolderConfig) -> SubsystemResponse {
            self.respond()
        }

        async fn toggle(&self, _id: &str, _enabled: bool) -> SubsystemResponse {
            self.respond()
        }

        async fn remove(&self, _id: &str) -> SubsystemResponse {
            self.respond()
        }
    }

    #[derive(Default)]
    struct FakeScanner {
        listings: HashMap<String, Vec<String>>,
    }

    #[async_trait]
    impl FileScanner for FakeScanner {
        async fn select_files(&self) -> Vec<String> {
            Vec::new()
        }

        async fn select_folder(&self) -> Option<String> {
            None
        }

        async fn scan_directory(&self, path: &str, _recursive: bool) -> Result<Vec<String>, WatchError> {
            self.listings
                .get(path)
                .cloned()
                .ok_or_else(|| WatchError::Scan {
                    path: path.to_string(),
                    message: "unreadable".to_string(),
                })
        }
    }

    struct Fixture {
        manager: WatchFolderManager,
        subsystem: Arc<FakeSubsystem>,
        funnel: IngestFunnel,
        repo: DocumentRepository,
    }

    fn fixture(listings: &[(&str, &[&str])]) -> Fixture {
        let repo = DocumentRepository::new(Arc::new(MemoryStore::new()));
        let funnel = IngestFunnel::new(
            QueueStore::load(repo.clone()),
            GlobalDefaults::default(),
            KnownNames::default(),
            NotificationBroadcaster::default(),
        );
        let subsystem = Arc::new(FakeSubsystem::default());
        let scanner = FakeScanner {
            listings: listings
                .iter()
                .map(|(dir, files)| {
                    (dir.to_string(), files.iter().map(|f| f.to_string()).collect())
                })
                .collect(),
        };
        let manager = WatchFolderManager::load(
            repo.clone(),
            subsystem.clone(),
            Arc::new(scanner),
            funnel.clone(),
            PathCase::Insensitive,
        );
        Fixture {
            manager,
            subsystem,
            funnel,
            repo,
        }
    }

    fn folder(path: &str) -> WatchFolderConfig {
        WatchFolderConfig::new(path, false, Vec::<String>::new())
    }

    #[tokio::test]
    async fn test_add_rejects_empty_and_duplicate_paths() {
        let mut fx = fixture(&[]);
        fx.manager.add(folder(r"C:\Books")).await.unwrap();

        assert!(matches!(
            fx.manager.add(folder("   ")).await,
            Err(WatchError::EmptyPath)
        ));
        assert!(matches!(
            fx.manager.add(folder(r"c:\books\")).await,
            Err(WatchError::DuplicatePath(_))
        ));
        assert_eq!(fx.manager.folders().len(), 1);
    }

    #[tokio::test]
    async fn test_add_persists() {
        let mut fx = fixture(&[]);
        let added = fx.manager.add(folder("/w")).await.unwrap();

        let stored: Vec<WatchFolderConfig> = fx.repo.load(WATCH_FOLDERS_KEY).unwrap().unwrap();
        assert_eq!(stored, vec![added]);
    }

    #[tokio::test]
    async fn test_failed_toggle_keeps_prior_state() {
        let mut fx = fixture(&[]);
        let added = fx.manager.add(folder("/w")).await.unwrap();
        let mut rx = fx.funnel.notifier().subscribe();

        fx.subsystem.fail.store(true, Ordering::SeqCst);
        let err = fx.manager.toggle(&added.id, false).await.unwrap_err();

        assert!(matches!(err, WatchError::Subsystem { .. }));
        assert!(fx.manager.get(&added.id).unwrap().enabled);
        assert_eq!(rx.try_recv().unwrap().level, NotificationLevel::Error);
    }

    #[tokio::test]
    async fn test_set_file_types_and_remove() {
        let mut fx = fixture(&[]);
        let added = fx.manager.add(folder("/w")).await.unwrap();

        fx.manager
            .set_file_types(&added.id, &["SRT".to_string()])
            .await
            .unwrap();
        assert!(fx.manager.get(&added.id).unwrap().file_types.contains("srt"));

        fx.subsystem.fail.store(true, Ordering::SeqCst);
        assert!(fx.manager.remove(&added.id).await.is_err());
        assert_eq!(fx.manager.folders().len(), 1);

        fx.subsystem.fail.store(false, Ordering::SeqCst);
        fx.manager.remove(&added.id).await.unwrap();
        assert!(fx.manager.folders().is_empty());
        assert!(matches!(
            fx.manager.toggle(&added.id, true).await,
            Err(WatchError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_bootstrap_merges_enabled_folders_into_one_batch() {
        let mut fx = fixture(&[
            ("/a", &["/a/one.txt", "/a/two.pdf", "/shared/x.srt"]),
            ("/b", &["/b/three.epub", "/shared/x.srt"]),
            ("/c", &["/c/skipped.txt"]),
        ]);
        fx.manager.add(folder("/a")).await.unwrap();
        fx.manager.add(folder("/b")).await.unwrap();
        let c = fx.manager.add(folder("/c")).await.unwrap();
        fx.manager.toggle(&c.id, false).await.unwrap();

        let report = fx.manager.bootstrap().await;

        assert_eq!(report.source, IngestSource::Watch);
        assert_eq!(
            report.added,
            vec!["/a/one.txt", "/shared/x.srt", "/b/three.epub"]
        );
        assert_eq!(report.duplicates, 0);
    }

    #[tokio::test]
    async fn test_scan_failure_is_partial_result() {
        let mut fx = fixture(&[("/ok", &["/ok/a.txt"])]);
        fx.manager.add(folder("/ok")).await.unwrap();
        fx.manager.add(folder("/broken")).await.unwrap();
        let mut rx = fx.funnel.notifier().subscribe();

        let report = fx.manager.bootstrap().await;

        assert_eq!(report.added, vec!["/ok/a.txt"]);
        assert_eq!(rx.try_recv().unwrap().level, NotificationLevel::Error);
    }

    #[tokio::test]
    async fn test_rescan_unknown_folder() {
        let fx = fixture(&[]);
        assert!(matches!(
            fx.manager.rescan("missing").await,
            Err(WatchError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_drops_duplicates_and_malformed() {
        let repo = DocumentRepository::new(Arc::new(MemoryStore::new()));
        repo.save(WATCH_FOLDERS_KEY, &vec![folder("/w"), folder("/w/"), folder("")])
            .unwrap();
        let kept = dedup_by_path(
            repo.load::<Vec<WatchFolderConfig>>(WATCH_FOLDERS_KEY)
                .unwrap()
                .unwrap(),
            PathCase::Sensitive,
        );
        assert_eq!(kept.len(), 1);
    }
}
