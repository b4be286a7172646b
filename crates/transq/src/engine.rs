//! Wires settings, persistence, ingestion and provenance into one handle.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info_span;

use crate::broadcast::NotificationBroadcaster;
use crate::config::Settings;
use crate::error::Result;
use crate::provenance::{HistoryLedger, JsonFileLedger, ProvenanceResolver, Resolution, StaticLedger};
use crate::queue::{IngestFunnel, IngestReport, IngestSource, KnownNames, QueueStore, Selection};
use crate::reconciler::{self, ImportMode, ImportPreview, ImportSummary};
use crate::storage::{DocumentRepository, FileStore, KeyValueStore};
use crate::watch::{FileScanner, WatchFolderManager, WatchSubsystem};

/// Application handle. Cheap to clone.
#[derive(Clone)]
pub struct Engine {
    settings: Arc<Settings>,
    repo: DocumentRepository,
    funnel: IngestFunnel,
    notifier: NotificationBroadcaster,
    resolver: Arc<ProvenanceResolver>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Opens the file-backed store in the settings' storage directory.
    pub fn open(settings: Settings) -> Result<Self> {
        let dir = settings.storage_dir();
        log::info!("Opening queue storage at {}", dir.display());
        let store = FileStore::open(&dir)?;
        Ok(Self::with_store(settings, Arc::new(store)))
    }

    pub fn with_store(settings: Settings, store: Arc<dyn KeyValueStore>) -> Self {
        let _span = info_span!("engine_open").entered();

        let repo = DocumentRepository::new(store);
        let notifier = NotificationBroadcaster::default();
        let funnel = IngestFunnel::new(
            QueueStore::load(repo.clone()),
            settings.defaults.clone(),
            KnownNames::from_settings(&settings),
            notifier.clone(),
        );

        let ledger: Arc<dyn HistoryLedger> = match &settings.history_file {
            Some(path) => Arc::new(JsonFileLedger::new(PathBuf::from(path))),
            None => Arc::new(StaticLedger::default()),
        };
        let resolver = ProvenanceResolver::new(ledger, settings.defaults.clone(), settings.path_case);

        Self {
            settings: Arc::new(settings),
            repo,
            funnel,
            notifier,
            resolver: Arc::new(resolver),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn funnel(&self) -> &IngestFunnel {
        &self.funnel
    }

    pub fn notifier(&self) -> &NotificationBroadcaster {
        &self.notifier
    }

    pub fn resolver(&self) -> &ProvenanceResolver {
        &self.resolver
    }

    /// Watch-folder manager sharing this engine's store and ingest funnel.
    pub fn watch_manager(
        &self,
        subsystem: Arc<dyn WatchSubsystem>,
        scanner: Arc<dyn FileScanner>,
    ) -> WatchFolderManager {
        WatchFolderManager::load(
            self.repo.clone(),
            subsystem,
            scanner,
            self.funnel.clone(),
            self.settings.path_case,
        )
    }

    pub async fn add_files(&self, paths: Vec<String>) -> IngestReport {
        self.funnel.ingest(paths, IngestSource::Manual).await
    }

    pub async fn add_dropped(&self, paths: Vec<String>) -> IngestReport {
        self.funnel.ingest(paths, IngestSource::Drop).await
    }

    /// Opens the file dialog and queues whatever was picked.
    pub async fn pick_files(&self, scanner: &dyn FileScanner) -> IngestReport {
        let paths = scanner.select_files().await;
        self.add_files(paths).await
    }

    /// Opens the folder dialog and queues the folder's contents. A failed
    /// scan queues nothing and raises an error notification.
    pub async fn pick_folder(&self, scanner: &dyn FileScanner, recursive: bool) -> IngestReport {
        let Some(folder) = scanner.select_folder().await else {
            return self.add_files(Vec::new()).await;
        };
        let paths = match scanner.scan_directory(&folder, recursive).await {
            Ok(paths) => paths,
            Err(e) => {
                log::warn!("Folder scan failed: {}", e);
                self.notifier.error("Queue", format!("Scan failed: {}", e));
                Vec::new()
            }
        };
        self.add_files(paths).await
    }

    pub async fn export_queue(&self) -> Result<String> {
        let store = self.funnel.lock().await;
        Ok(reconciler::export_to_string(store.items())?)
    }

    /// Parses `content` and reports its counts without touching the queue.
    pub async fn preview_import(&self, content: &str) -> Result<ImportPreview> {
        let document = reconciler::parse_document(content)?;
        Ok(reconciler::preview(&document))
    }

    pub async fn import(
        &self,
        content: &str,
        mode: ImportMode,
        selection: &mut Selection,
    ) -> Result<ImportSummary> {
        let document = reconciler::parse_document(content)?;
        let preview = reconciler::preview(&document);

        let mut store = self.funnel.lock().await;
        let plan = reconciler::plan(&preview, store.items(), mode);
        let summary = reconciler::apply(plan, &mut store, selection);
        drop(store);

        self.notifier.success(
            "Import",
            format!(
                "Imported {} file(s); {} duplicate in file, {} already queued, {} unsupported",
                summary.to_add,
                summary.duplicate_in_file,
                summary.duplicate_in_queue,
                summary.unsupported
            ),
        );
        Ok(summary)
    }

    /// Cache artifact of a queued item, `None` if the id is not queued.
    pub async fn resolve_provenance(&self, id: &str) -> Option<Resolution> {
        let item = self.funnel.lock().await.get(id).cloned()?;
        Some(self.resolver.resolve(&item))
    }
}
