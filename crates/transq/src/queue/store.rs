//! The ordered, deduplicated translation queue and its persisted document.

use std::collections::HashSet;

use serde::Serialize;
use tracing::info_span;

use crate::broadcast::NotificationBroadcaster;
use crate::classifier::{classify_extension, Classification};
use crate::config::ConfigOverlay;
use crate::error::StorageError;
use crate::queue::item::{QueueItem, QueueStatus};
use crate::queue::ops;
use crate::storage::{DocumentRepository, LEGACY_QUEUE_KEY, QUEUE_KEY};

/// Result of appending a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Ids of the items that made it into the queue, in order.
    pub added: Vec<String>,
    pub duplicates: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub total: usize,
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Owns the queue list.
///
/// Every mutation computes a new list, swaps it in and then writes the whole
/// document. A failed write is logged and broadcast; the in-memory change
/// stays applied.
pub struct QueueStore {
    items: Vec<QueueItem>,
    repo: DocumentRepository,
    notifier: Option<NotificationBroadcaster>,
}

impl std::fmt::Debug for QueueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueStore")
            .field("items", &self.items.len())
            .finish()
    }
}

impl QueueStore {
    /// Loads the queue, migrating the legacy path list if the current
    /// document is absent or malformed.
    pub fn load(repo: DocumentRepository) -> Self {
        let _span = info_span!("queue_load").entered();

        let items = match repo.load::<Vec<QueueItem>>(QUEUE_KEY) {
            Ok(Some(items)) => {
                let items = dedup_loaded(items);
                log::info!("Loaded {} queued item(s)", items.len());
                items
            }
            Ok(None) => migrate_legacy(&repo),
            Err(StorageError::Decode { source, .. }) => {
                log::warn!("Queue document is malformed ({}), trying legacy queue", source);
                migrate_legacy(&repo)
            }
            Err(e) => {
                log::error!("Failed to read queue document: {}", e);
                Vec::new()
            }
        };

        Self {
            items,
            repo,
            notifier: None,
        }
    }

    /// Routes persistence failures to the notification stream as well as the log.
    pub fn with_notifier(mut self, notifier: NotificationBroadcaster) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&QueueItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.items.iter().any(|item| item.path == path)
    }

    /// The item the translation pipeline should pick up next.
    pub fn next_pending(&self) -> Option<&QueueItem> {
        self.items
            .iter()
            .find(|item| item.status == QueueStatus::Pending)
    }

    pub fn stats(&self) -> QueueStats {
        let mut stats = QueueStats {
            total: self.items.len(),
            ..QueueStats::default()
        };
        for item in &self.items {
            match item.status {
                QueueStatus::Pending => stats.pending += 1,
                QueueStatus::Processing => stats.processing += 1,
                QueueStatus::Completed => stats.completed += 1,
                QueueStatus::Failed => stats.failed += 1,
            }
        }
        stats
    }

    /// Appends items whose path is not queued yet.
    pub fn append(&mut self, candidates: Vec<QueueItem>) -> AppendOutcome {
        let before = self.items.len();
        let (next, duplicates) = ops::appended(&self.items, candidates);
        let added = next[before..].iter().map(|item| item.id.clone()).collect::<Vec<_>>();

        if !added.is_empty() {
            self.commit(next);
        }

        AppendOutcome { added, duplicates }
    }

    pub fn remove(&mut self, id: &str) -> Option<QueueItem> {
        let removed = self.get(id).cloned()?;
        let next = ops::without(&self.items, |item| item.id == id);
        self.commit(next);
        Some(removed)
    }

    /// Removes every item matching `predicate`; returns how many went.
    pub fn remove_where<F>(&mut self, predicate: F) -> usize
    where
        F: FnMut(&QueueItem) -> bool,
    {
        let next = ops::without(&self.items, predicate);
        let removed = self.items.len() - next.len();
        if removed > 0 {
            self.commit(next);
        }
        removed
    }

    pub fn clear_completed(&mut self) -> usize {
        self.remove_where(|item| item.status == QueueStatus::Completed)
    }

    pub fn clear_all(&mut self) -> usize {
        let removed = self.items.len();
        self.commit(Vec::new());
        removed
    }

    /// Status update coming from the translation pipeline.
    pub fn set_status(&mut self, id: &str, status: QueueStatus, error: Option<String>) -> bool {
        match ops::with_status(&self.items, id, status, error) {
            Some(next) => {
                self.commit(next);
                true
            }
            None => false,
        }
    }

    pub fn set_config(&mut self, id: &str, overlay: ConfigOverlay) -> bool {
        match ops::updated(&self.items, id, |item| item.config = overlay) {
            Some(next) => {
                self.commit(next);
                true
            }
            None => false,
        }
    }

    /// Batch edit: every listed item gets `overlay` verbatim.
    pub fn set_config_many(&mut self, ids: &[String], overlay: &ConfigOverlay) -> usize {
        let (next, changed) = ops::with_config_for(&self.items, ids, overlay);
        if changed > 0 {
            self.commit(next);
        }
        changed
    }

    /// Drops every overlay field and follows the global defaults again.
    pub fn reset_config(&mut self, id: &str) -> bool {
        self.set_config(id, ConfigOverlay::follow_global())
    }

    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        if from == to {
            return from < self.items.len();
        }
        match ops::moved(&self.items, from, to) {
            Some(next) => {
                self.commit(next);
                true
            }
            None => false,
        }
    }

    pub fn move_to_top(&mut self, id: &str) -> bool {
        match ops::moved_to_top(&self.items, id) {
            Some(next) => {
                self.commit(next);
                true
            }
            None => false,
        }
    }

    /// Swaps in a whole new list; duplicate paths keep their first occurrence.
    pub fn replace_all(&mut self, items: Vec<QueueItem>) {
        self.commit(dedup_loaded(items));
    }

    fn commit(&mut self, next: Vec<QueueItem>) {
        self.items = next;
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.repo.save(QUEUE_KEY, &self.items) {
            log::error!("Failed to persist queue ({} items): {}", self.items.len(), e);
            if let Some(notifier) = &self.notifier {
                notifier.error("Queue not saved", e.to_string());
            }
        }
    }
}

fn dedup_loaded(items: Vec<QueueItem>) -> Vec<QueueItem> {
    let mut seen = HashSet::new();
    let before = items.len();
    let items: Vec<QueueItem> = items
        .into_iter()
        .filter(|item| seen.insert(item.path.clone()))
        .collect();
    if items.len() < before {
        log::warn!("Dropped {} duplicate queue entries", before - items.len());
    }
    items
}

/// Converts the legacy path list into queue items.
///
/// Once the converted queue is written, the legacy key is deleted, so later
/// loads read the current document only. If that write fails, the legacy key
/// stays and the next load migrates again.
fn migrate_legacy(repo: &DocumentRepository) -> Vec<QueueItem> {
    let paths = match repo.load::<Vec<String>>(LEGACY_QUEUE_KEY) {
        Ok(Some(paths)) => paths,
        Ok(None) => return Vec::new(),
        Err(e) => {
            log::warn!("Discarding unreadable legacy queue: {}", e);
            if let Err(e) = repo.remove(LEGACY_QUEUE_KEY) {
                log::error!("Failed to remove legacy queue: {}", e);
            }
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut items = Vec::new();
    for path in paths {
        if !seen.insert(path.clone()) {
            continue;
        }
        match classify_extension(&path) {
            Classification::Supported(file_type) => items.push(QueueItem::new(path, file_type)),
            Classification::Unsupported => {
                log::debug!("Skipping unsupported legacy entry: {}", path);
            }
        }
    }

    match repo.save(QUEUE_KEY, &items) {
        Ok(()) => {
            if let Err(e) = repo.remove(LEGACY_QUEUE_KEY) {
                log::error!("Failed to remove legacy queue after migration: {}", e);
            }
            log::info!("Migrated {} item(s) from the legacy queue", items.len());
        }
        Err(e) => log::error!("Failed to save migrated queue: {}", e),
    }

    items
}
