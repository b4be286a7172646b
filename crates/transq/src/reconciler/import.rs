use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::classifier::{classify_extension, Classification};
use crate::queue::item::new_item_id;
use crate::queue::{QueueItem, QueueStatus, QueueStore, Selection};
use crate::reconciler::document::ImportDocument;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Append to the live queue, skipping paths it already holds.
    #[default]
    Merge,
    /// Discard the live queue and use the imported items instead.
    Replace,
}

/// Document-only counts, computed without looking at the live queue.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportPreview {
    pub total: usize,
    pub unsupported: usize,
    pub duplicate_in_file: usize,
    /// Supported, first-occurrence entries as pending queue items.
    pub importable: Vec<QueueItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total: usize,
    pub unsupported: usize,
    pub duplicate_in_file: usize,
    /// Always zero under `Replace`: the existing queue is discarded.
    pub duplicate_in_queue: usize,
    pub to_add: usize,
    pub mode: ImportMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportPlan {
    pub mode: ImportMode,
    pub items: Vec<QueueItem>,
    pub summary: ImportSummary,
}

/// Classifies every entry and drops later duplicates within the document.
pub fn preview(document: &ImportDocument) -> ImportPreview {
    let mut unsupported = 0;
    let mut duplicate_in_file = 0;
    let mut seen_paths = HashSet::new();
    let mut seen_ids = HashSet::new();
    let mut importable = Vec::new();

    for entry in &document.items {
        let path = entry.path.trim();
        let file_type = match classify_extension(path) {
            Classification::Supported(file_type) if !path.is_empty() => file_type,
            _ => {
                unsupported += 1;
                continue;
            }
        };

        if !seen_paths.insert(path.to_string()) {
            duplicate_in_file += 1;
            continue;
        }

        let mut item = QueueItem::with_added_at(
            path,
            file_type,
            entry.added_at.unwrap_or_else(Utc::now),
        );
        item.config = entry.config.clone();
        match entry.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() && seen_ids.insert(id.to_string()) => {
                item.id = id.to_string();
            }
            _ => {
                seen_ids.insert(item.id.clone());
            }
        }
        importable.push(item);
    }

    ImportPreview {
        total: document.items.len(),
        unsupported,
        duplicate_in_file,
        importable,
    }
}

/// Decides what `apply` would add for `mode`, given the live queue.
pub fn plan(preview: &ImportPreview, live: &[QueueItem], mode: ImportMode) -> ImportPlan {
    let (items, duplicate_in_queue) = match mode {
        ImportMode::Replace => (preview.importable.clone(), 0),
        ImportMode::Merge => {
            let live_paths: HashSet<&str> = live.iter().map(|i| i.path.as_str()).collect();
            let mut used_ids: HashSet<String> = live.iter().map(|i| i.id.clone()).collect();
            let mut duplicates = 0;
            let mut items = Vec::new();

            for candidate in &preview.importable {
                if live_paths.contains(candidate.path.as_str()) {
                    duplicates += 1;
                    continue;
                }
                let mut item = candidate.clone();
                if !used_ids.insert(item.id.clone()) {
                    item.id = new_item_id();
                    used_ids.insert(item.id.clone());
                }
                items.push(item);
            }
            (items, duplicates)
        }
    };

    let summary = ImportSummary {
        total: preview.total,
        unsupported: preview.unsupported,
        duplicate_in_file: preview.duplicate_in_file,
        duplicate_in_queue,
        to_add: items.len(),
        mode,
    };
    ImportPlan {
        mode,
        items,
        summary,
    }
}

/// Applies a plan to the live queue. Replace also clears the selection.
pub fn apply(plan: ImportPlan, store: &mut QueueStore, selection: &mut Selection) -> ImportSummary {
    let ImportPlan {
        mode,
        items,
        mut summary,
    } = plan;
    let items: Vec<QueueItem> = items
        .into_iter()
        .map(|mut item| {
            item.status = QueueStatus::Pending;
            item.error = None;
            item
        })
        .collect();

    match mode {
        ImportMode::Merge => {
            let outcome = store.append(items);
            // The queue may have changed since the plan was made
            summary.duplicate_in_queue += outcome.duplicates;
            summary.to_add = outcome.added.len();
            selection.retain_existing(store.items());
        }
        ImportMode::Replace => {
            summary.to_add = items.len();
            store.replace_all(items);
            selection.clear();
        }
    }

    log::info!(
        "Imported {} item(s) ({:?}): {} unsupported, {} duplicate in file, {} already queued",
        summary.to_add,
        summary.mode,
        summary.unsupported,
        summary.duplicate_in_file,
        summary.duplicate_in_queue
    );
    summary
}
