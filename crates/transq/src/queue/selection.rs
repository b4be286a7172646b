use std::collections::BTreeSet;

use crate::config::ConfigOverlay;
use crate::queue::item::QueueItem;

/// Ids of the queue items currently selected for batch operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, id: &str) {
        self.ids.insert(id.to_string());
    }

    pub fn deselect(&mut self, id: &str) {
        self.ids.remove(id);
    }

    /// Flips the selection state of `id`; returns true if it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    pub fn select_all(&mut self, items: &[QueueItem]) {
        self.ids = items.iter().map(|item| item.id.clone()).collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Drops ids whose item has left the queue.
    pub fn retain_existing(&mut self, items: &[QueueItem]) {
        self.ids
            .retain(|id| items.iter().any(|item| &item.id == id));
    }

    /// Selected ids in queue order.
    pub fn ordered_ids(&self, items: &[QueueItem]) -> Vec<String> {
        items
            .iter()
            .filter(|item| self.ids.contains(&item.id))
            .map(|item| item.id.clone())
            .collect()
    }

    /// Overlay that seeds the batch editor: the first selected item's, in queue order.
    pub fn batch_edit_seed(&self, items: &[QueueItem]) -> Option<ConfigOverlay> {
        items
            .iter()
            .find(|item| self.ids.contains(&item.id))
            .map(|item| item.config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::FileType;

    fn queue() -> Vec<QueueItem> {
        ["/a.txt", "/b.txt", "/c.txt"]
            .iter()
            .map(|p| QueueItem::new(*p, FileType::Txt))
            .collect()
    }

    #[test]
    fn test_toggle_and_clear() {
        let mut selection = Selection::new();
        assert!(selection.toggle("x"));
        assert!(selection.is_selected("x"));
        assert!(!selection.toggle("x"));
        assert!(selection.is_empty());

        selection.select("y");
        selection.clear();
        assert_eq!(selection.len(), 0);
    }

    #[test]
    fn test_ordered_ids_follow_queue_order() {
        let items = queue();
        let mut selection = Selection::new();
        selection.select(&items[2].id);
        selection.select(&items[0].id);

        assert_eq!(
            selection.ordered_ids(&items),
            vec![items[0].id.clone(), items[2].id.clone()]
        );
    }

    #[test]
    fn test_batch_edit_seed_uses_first_selected() {
        let mut items = queue();
        items[1].config = ConfigOverlay {
            ctx_size: Some(1024),
            ..ConfigOverlay::custom()
        };
        items[2].config = ConfigOverlay {
            ctx_size: Some(2048),
            ..ConfigOverlay::custom()
        };

        let mut selection = Selection::new();
        selection.select(&items[2].id);
        selection.select(&items[1].id);

        let seed = selection.batch_edit_seed(&items).unwrap();
        assert_eq!(seed.ctx_size, Some(1024));
        assert!(Selection::new().batch_edit_seed(&items).is_none());
    }

    #[test]
    fn test_retain_existing_and_select_all() {
        let items = queue();
        let mut selection = Selection::new();
        selection.select_all(&items);
        assert_eq!(selection.len(), 3);

        selection.retain_existing(&items[..1]);
        assert_eq!(selection.len(), 1);
        assert!(selection.is_selected(&items[0].id));
    }
}
