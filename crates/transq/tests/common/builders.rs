//! Builder patterns for creating test data programmatically.

#![allow(dead_code)]

use transq::classifier::{classify_extension, FileType};
use transq::config::ConfigOverlay;
use transq::provenance::{HistoryConfig, HistoryRecord};
use transq::queue::{QueueItem, QueueStatus};

/// Builder for `QueueItem` instances.
pub struct QueueItemBuilder {
    item: QueueItem,
}

impl QueueItemBuilder {
    /// Item for `path`, typed from its extension (txt when unsupported).
    pub fn new(path: &str) -> Self {
        let file_type = classify_extension(path).file_type().unwrap_or(FileType::Txt);
        Self {
            item: QueueItem::new(path, file_type),
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.item.id = id.to_string();
        self
    }

    pub fn status(mut self, status: QueueStatus) -> Self {
        self.item.status = status;
        self
    }

    pub fn config(mut self, config: ConfigOverlay) -> Self {
        self.item.config = config;
        self
    }

    pub fn build(self) -> QueueItem {
        self.item
    }
}

/// Builder for `HistoryRecord` instances.
#[derive(Default)]
pub struct HistoryRecordBuilder {
    record: HistoryRecord,
}

impl HistoryRecordBuilder {
    pub fn new(file_path: &str) -> Self {
        Self {
            record: HistoryRecord {
                file_path: Some(file_path.to_string()),
                ..HistoryRecord::default()
            },
        }
    }

    /// Record that only names the source under the older `inputPath` field.
    pub fn legacy(input_path: &str) -> Self {
        Self {
            record: HistoryRecord {
                input_path: Some(input_path.to_string()),
                ..HistoryRecord::default()
            },
        }
    }

    pub fn output(mut self, output_path: &str) -> Self {
        self.record.output_path = Some(output_path.to_string());
        self
    }

    pub fn cache(mut self, cache_path: &str) -> Self {
        self.record.cache_path = Some(cache_path.to_string());
        self
    }

    pub fn cache_dir(mut self, cache_dir: &str) -> Self {
        self.record.config = Some(HistoryConfig {
            cache_dir: Some(cache_dir.to_string()),
        });
        self
    }

    pub fn build(self) -> HistoryRecord {
        self.record
    }
}

/// Overlay with `useGlobalDefaults: false` and the given output directory.
pub fn custom_overlay_with_output(output_dir: &str) -> ConfigOverlay {
    ConfigOverlay {
        output_dir: Some(output_dir.to_string()),
        ..ConfigOverlay::custom()
    }
}

/// Converts string slices to owned paths.
pub fn paths(items: &[&str]) -> Vec<String> {
    items.iter().map(|p| p.to_string()).collect()
}
