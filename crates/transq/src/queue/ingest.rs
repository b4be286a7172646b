//! The single entry point through which files enter the queue.
//!
//! Manual additions, drops, watch-folder bootstrap scans and live watcher
//! events all call [`IngestFunnel::ingest`]. The funnel holds the queue
//! store behind an async mutex, so batches from different sources are applied
//! one after another, never interleaved.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{info_span, Instrument};

use crate::broadcast::NotificationBroadcaster;
use crate::classifier::{classify_extension, Classification, TranslatedOutputDetector, Verdict};
use crate::config::{GlobalDefaults, Settings};
use crate::paths;
use crate::queue::item::QueueItem;
use crate::queue::store::QueueStore;
use crate::sanitize;
use crate::watch::WatchEvent;

/// Where a batch of paths came from. Only affects notification wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestSource {
    Manual,
    Drop,
    Watch,
}

/// Counts reported back to the caller after a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub source: IngestSource,
    /// Paths that were appended, in order.
    pub added: Vec<String>,
    pub duplicates: usize,
    pub unsupported: usize,
    pub translated_skipped: usize,
}

impl IngestReport {
    fn empty(source: IngestSource) -> Self {
        Self {
            source,
            added: Vec::new(),
            duplicates: 0,
            unsupported: 0,
            translated_skipped: 0,
        }
    }
}

/// Names the translated-output guard compares file names against.
#[derive(Debug, Clone, Default)]
pub struct KnownNames {
    pub models: Vec<String>,
    pub providers: Vec<String>,
}

impl KnownNames {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            models: settings.known_models.clone(),
            providers: settings.known_providers.clone(),
        }
    }
}

#[derive(Clone)]
pub struct IngestFunnel {
    store: Arc<Mutex<QueueStore>>,
    defaults: Arc<GlobalDefaults>,
    known: Arc<KnownNames>,
    notifier: NotificationBroadcaster,
}

impl std::fmt::Debug for IngestFunnel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestFunnel")
            .field("known", &self.known)
            .finish_non_exhaustive()
    }
}

impl IngestFunnel {
    pub fn new(
        store: QueueStore,
        defaults: GlobalDefaults,
        known: KnownNames,
        notifier: NotificationBroadcaster,
    ) -> Self {
        Self {
            store: Arc::new(Mutex::new(store.with_notifier(notifier.clone()))),
            defaults: Arc::new(defaults),
            known: Arc::new(known),
            notifier,
        }
    }

    /// Locks the queue for a non-ingestion operation (reorder, removal,
    /// status updates). Holding the guard blocks ingestion.
    pub async fn lock(&self) -> MutexGuard<'_, QueueStore> {
        self.store.lock().await
    }

    pub fn notifier(&self) -> &NotificationBroadcaster {
        &self.notifier
    }

    pub fn defaults(&self) -> &GlobalDefaults {
        &self.defaults
    }

    /// Classifies, guards, deduplicates and appends one batch of paths.
    pub async fn ingest(&self, paths: Vec<String>, source: IngestSource) -> IngestReport {
        let span = info_span!("ingest_batch", source = ?source, count = paths.len());
        async move {
            let mut store = self.store.lock().await;
            let report = self.ingest_locked(&mut store, paths, source);
            drop(store);

            log::info!(
                "Ingested batch from {:?}: {} added, {} duplicate, {} unsupported, {} translated output",
                source,
                report.added.len(),
                report.duplicates,
                report.unsupported,
                report.translated_skipped
            );
            self.notify(&report);
            report
        }
        .instrument(span)
        .await
    }

    fn ingest_locked(
        &self,
        store: &mut QueueStore,
        paths: Vec<String>,
        source: IngestSource,
    ) -> IngestReport {
        let mut report = IngestReport::empty(source);
        let detector = self.detector_for(store);
        let mut candidates = Vec::new();

        for path in paths {
            let file_type = match classify_extension(&path) {
                Classification::Supported(file_type) => file_type,
                Classification::Unsupported => {
                    report.unsupported += 1;
                    continue;
                }
            };

            let outcome = detector.evaluate(&path);
            if outcome.verdict == Verdict::Translated {
                log::debug!(
                    "Skipping translated output {} (rule {})",
                    sanitize::redact_path(&path),
                    outcome.rule
                );
                report.translated_skipped += 1;
                continue;
            }

            candidates.push(QueueItem::new(path, file_type));
        }

        let outcome = store.append(candidates);
        report.duplicates = outcome.duplicates;
        report.added = outcome
            .added
            .iter()
            .filter_map(|id| store.get(id).map(|item| item.path.clone()))
            .collect();
        report
    }

    /// Builds the guard from configured names plus every model path in play.
    /// Overlays that defer to the global defaults contribute nothing.
    fn detector_for(&self, store: &QueueStore) -> TranslatedOutputDetector {
        let mut models = self.known.models.clone();
        let model_paths = self.defaults.model_path.iter().chain(
            store
                .items()
                .iter()
                .filter(|i| !i.config.use_global_defaults)
                .filter_map(|i| i.config.model_path.as_ref()),
        );
        for model_path in model_paths {
            models.push(paths::file_name(model_path).to_string());
        }
        TranslatedOutputDetector::new(models, self.known.providers.iter())
    }

    fn notify(&self, report: &IngestReport) {
        let skipped = report.duplicates + report.unsupported + report.translated_skipped;
        let added = report.added.len();

        match report.source {
            IngestSource::Watch => {
                if added > 0 {
                    self.notifier.info(
                        "Watch folder",
                        format!("Found {} new file(s) to translate", added),
                    );
                }
            }
            IngestSource::Manual | IngestSource::Drop => {
                if added > 0 && skipped == 0 {
                    self.notifier
                        .success("Queue", format!("Added {} file(s)", added));
                } else if added > 0 || skipped > 0 {
                    self.notifier.info(
                        "Queue",
                        format!(
                            "Added {} file(s); skipped {} duplicate, {} unsupported, {} already translated",
                            added, report.duplicates, report.unsupported, report.translated_skipped
                        ),
                    );
                }
            }
        }
    }

    /// Feeds watcher events into the funnel until the sender side closes.
    pub fn spawn_watch_listener(&self, mut events: mpsc::Receiver<WatchEvent>) -> JoinHandle<()> {
        let funnel = self.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                log::debug!(
                    "Watcher reported {} ({})",
                    sanitize::redact_path(&event.path),
                    sanitize::hash_path(&event.path)
                );
                funnel.ingest(vec![event.path], IngestSource::Watch).await;
            }
            log::info!("Watch event stream closed");
        })
    }
}
