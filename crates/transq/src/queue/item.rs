use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::FileType;
use crate::config::ConfigOverlay;
use crate::paths;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

/// One file waiting for (or done with) translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    pub id: String,
    /// Absolute path of the source file; unique within the queue.
    pub path: String,
    pub file_name: String,
    /// Fixed at insertion from the path's extension.
    pub file_type: FileType,
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub status: QueueStatus,
    #[serde(default)]
    pub config: ConfigOverlay,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueueItem {
    /// Creates a pending item that follows the global defaults.
    pub fn new(path: impl Into<String>, file_type: FileType) -> Self {
        Self::with_added_at(path, file_type, Utc::now())
    }

    pub fn with_added_at(path: impl Into<String>, file_type: FileType, added_at: DateTime<Utc>) -> Self {
        let path = path.into();
        Self {
            id: new_item_id(),
            file_name: paths::file_name(&path).to_string(),
            path,
            file_type,
            added_at,
            status: QueueStatus::Pending,
            config: ConfigOverlay::follow_global(),
            error: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, QueueStatus::Completed | QueueStatus::Failed)
    }
}

pub(crate) fn new_item_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_defaults() {
        let item = QueueItem::new(r"C:\books\novel.txt", FileType::Txt);
        assert!(!item.id.is_empty());
        assert_eq!(item.file_name, "novel.txt");
        assert_eq!(item.status, QueueStatus::Pending);
        assert!(item.config.use_global_defaults);
        assert!(item.error.is_none());
        assert!(!item.is_finished());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = QueueItem::new("/a.txt", FileType::Txt);
        let b = QueueItem::new("/a.txt", FileType::Txt);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_serialized_shape() {
        let mut item = QueueItem::new("/books/a.epub", FileType::Epub);
        item.status = QueueStatus::Failed;
        item.error = Some("boom".to_string());

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["fileType"], "epub");
        assert_eq!(json["fileName"], "a.epub");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "boom");
        assert_eq!(json["config"]["useGlobalDefaults"], true);
        assert!(json["addedAt"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_deserialize_without_optional_fields() {
        let item: QueueItem = serde_json::from_str(
            r#"{"id":"x","path":"/a.srt","fileName":"a.srt","fileType":"srt","addedAt":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(item.status, QueueStatus::Pending);
        assert!(item.config.use_global_defaults);
    }
}
