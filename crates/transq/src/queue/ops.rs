//! Pure list transformations behind every queue mutation.
//!
//! Each function takes the current list by reference and returns a new one;
//! the store swaps the result in and persists it. Observers holding the old
//! list never see it change underneath them.

use std::collections::HashSet;

use crate::config::ConfigOverlay;
use crate::queue::item::{QueueItem, QueueStatus};

/// Appends `candidates` whose path is not yet present, in order.
///
/// Returns the new list and the number of candidates skipped as duplicates,
/// whether they collided with the existing list or with an earlier candidate.
pub fn appended(items: &[QueueItem], candidates: Vec<QueueItem>) -> (Vec<QueueItem>, usize) {
    let mut seen: HashSet<String> = items.iter().map(|i| i.path.clone()).collect();
    let mut next = items.to_vec();
    let mut duplicates = 0;

    for candidate in candidates {
        if seen.insert(candidate.path.clone()) {
            next.push(candidate);
        } else {
            duplicates += 1;
        }
    }

    (next, duplicates)
}

pub fn without<F>(items: &[QueueItem], mut predicate: F) -> Vec<QueueItem>
where
    F: FnMut(&QueueItem) -> bool,
{
    items.iter().filter(|item| !predicate(item)).cloned().collect()
}

/// Applies `update` to the item with `id`, if present.
pub fn updated<F>(items: &[QueueItem], id: &str, update: F) -> Option<Vec<QueueItem>>
where
    F: FnOnce(&mut QueueItem),
{
    let idx = items.iter().position(|item| item.id == id)?;
    let mut next = items.to_vec();
    update(&mut next[idx]);
    Some(next)
}

pub fn with_status(
    items: &[QueueItem],
    id: &str,
    status: QueueStatus,
    error: Option<String>,
) -> Option<Vec<QueueItem>> {
    updated(items, id, |item| {
        item.status = status;
        item.error = if status == QueueStatus::Failed {
            error
        } else {
            None
        };
    })
}

/// Gives every item in `ids` a copy of `overlay`, replacing what it had.
pub fn with_config_for(items: &[QueueItem], ids: &[String], overlay: &ConfigOverlay) -> (Vec<QueueItem>, usize) {
    let targets: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let mut changed = 0;
    let next = items
        .iter()
        .map(|item| {
            if targets.contains(item.id.as_str()) {
                changed += 1;
                QueueItem {
                    config: overlay.clone(),
                    ..item.clone()
                }
            } else {
                item.clone()
            }
        })
        .collect();
    (next, changed)
}

/// Drag-and-drop move: removes the element at `from` and reinserts it at
/// `to`. Everything else keeps its relative order.
pub fn moved(items: &[QueueItem], from: usize, to: usize) -> Option<Vec<QueueItem>> {
    if from >= items.len() || to >= items.len() {
        return None;
    }
    let mut next = items.to_vec();
    let item = next.remove(from);
    next.insert(to, item);
    Some(next)
}

pub fn moved_to_top(items: &[QueueItem], id: &str) -> Option<Vec<QueueItem>> {
    let from = items.iter().position(|item| item.id == id)?;
    moved(items, from, 0)
}
