//! Test harness for isolated test execution.
//!
//! `TestHarness` owns a temporary directory for real files, an in-memory
//! key-value store standing in for persistence, and an `IngestFunnel` built
//! on top of them. Watch-folder managers get a `FakeWatchSubsystem` whose
//! replies can be switched to failures.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::broadcast;

use transq::config::GlobalDefaults;
use transq::paths::PathCase;
use transq::queue::{IngestFunnel, KnownNames, QueueStore};
use transq::storage::{DocumentRepository, MemoryStore};
use transq::watch::{
    SubsystemResponse, WalkdirScanner, WatchFolderConfig, WatchFolderManager, WatchSubsystem,
};
use transq::{Notification, NotificationBroadcaster};

/// Watch subsystem that records calls and answers from a switch.
#[derive(Default)]
pub struct FakeWatchSubsystem {
    fail: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl FakeWatchSubsystem {
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Calls in order, as `add:<path>`, `toggle:<id>:<enabled>`, `remove:<id>`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> SubsystemResponse {
        self.calls.lock().unwrap().push(call);
        if self.fail.load(Ordering::SeqCst) {
            SubsystemResponse::failed("watcher unavailable")
        } else {
            SubsystemResponse::ok()
        }
    }
}

#[async_trait]
impl WatchSubsystem for FakeWatchSubsystem {
    async fn add(&self, config: &WatchFolderConfig) -> SubsystemResponse {
        self.record(format!("add:{}", config.path))
    }

    async fn toggle(&self, id: &str, enabled: bool) -> SubsystemResponse {
        self.record(format!("toggle:{}:{}", id, enabled))
    }

    async fn remove(&self, id: &str) -> SubsystemResponse {
        self.record(format!("remove:{}", id))
    }
}

/// Isolated environment for queue, watch-folder and import tests.
pub struct TestHarness {
    /// Temporary directory holding real files for scans.
    temp_dir: TempDir,
    /// Root for watch-folder fixtures inside `temp_dir`.
    pub watch_root: PathBuf,
    pub store: Arc<MemoryStore>,
    pub repo: DocumentRepository,
    pub notifier: NotificationBroadcaster,
    pub subsystem: Arc<FakeWatchSubsystem>,
    pub funnel: IngestFunnel,
    defaults: GlobalDefaults,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_defaults(GlobalDefaults::default())
    }

    pub fn with_defaults(defaults: GlobalDefaults) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let watch_root = temp_dir.path().join("watch");
        std::fs::create_dir_all(&watch_root).expect("Failed to create watch root");

        let store = Arc::new(MemoryStore::new());
        let repo = DocumentRepository::new(store.clone());
        let notifier = NotificationBroadcaster::default();
        let funnel = IngestFunnel::new(
            QueueStore::load(repo.clone()),
            defaults.clone(),
            KnownNames {
                models: vec![],
                providers: vec!["openai".to_string(), "deepseek".to_string()],
            },
            notifier.clone(),
        );

        Self {
            temp_dir,
            watch_root,
            store,
            repo,
            notifier,
            subsystem: Arc::new(FakeWatchSubsystem::default()),
            funnel,
            defaults,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn defaults(&self) -> &GlobalDefaults {
        &self.defaults
    }

    /// Creates a file (and its parents) under the watch root, returning its path.
    pub fn create_file(&self, relative: &str) -> String {
        let path = self.watch_root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, b"content").expect("Failed to write fixture file");
        path.to_str().expect("Non UTF-8 temp path").to_string()
    }

    /// Creates a directory under the watch root, returning its path.
    pub fn create_dir(&self, relative: &str) -> String {
        let path = self.watch_root.join(relative);
        std::fs::create_dir_all(&path).expect("Failed to create directory");
        path.to_str().expect("Non UTF-8 temp path").to_string()
    }

    /// Watch-folder manager over the harness store, the fake subsystem and a
    /// real walkdir scanner.
    pub fn watch_manager(&self) -> WatchFolderManager {
        WatchFolderManager::load(
            self.repo.clone(),
            self.subsystem.clone(),
            Arc::new(WalkdirScanner::new()),
            self.funnel.clone(),
            PathCase::Sensitive,
        )
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    /// Paths currently queued, in order.
    pub async fn queued_paths(&self) -> Vec<String> {
        self.funnel
            .lock()
            .await
            .items()
            .iter()
            .map(|item| item.path.clone())
            .collect()
    }

    /// A fresh store loaded from the same persistence, as after a restart.
    pub fn reload_queue(&self) -> QueueStore {
        QueueStore::load(self.repo.clone())
    }
}
