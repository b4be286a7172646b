use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::FileType;
use crate::config::ConfigOverlay;
use crate::error::ImportError;
use crate::queue::QueueItem;

/// Format version written into exports. Newer documents are refused.
pub const EXPORT_VERSION: u32 = 1;

/// Portable queue document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub queue: Vec<ExportedItem>,
    pub version: u32,
    pub exported_at: DateTime<Utc>,
}

/// A queue item as exported: no status, no error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedItem {
    pub id: String,
    pub path: String,
    pub file_name: String,
    pub file_type: FileType,
    pub added_at: DateTime<Utc>,
    pub config: ConfigOverlay,
}

impl From<&QueueItem> for ExportedItem {
    fn from(item: &QueueItem) -> Self {
        Self {
            id: item.id.clone(),
            path: item.path.clone(),
            file_name: item.file_name.clone(),
            file_type: item.file_type,
            added_at: item.added_at,
            config: item.config.clone(),
        }
    }
}

pub fn export_document(items: &[QueueItem], now: DateTime<Utc>) -> ExportDocument {
    ExportDocument {
        queue: items.iter().map(ExportedItem::from).collect(),
        version: EXPORT_VERSION,
        exported_at: now,
    }
}

/// Pretty-printed export of the queue as of now.
pub fn export_to_string(items: &[QueueItem]) -> Result<String, ImportError> {
    Ok(serde_json::to_string_pretty(&export_document(items, Utc::now()))?)
}

/// An entry read from an import file.
///
/// Everything except the path is optional so hand-edited and older files
/// still load. Status and error are ignored if present.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedItem {
    #[serde(default)]
    pub id: Option<String>,
    pub path: String,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub config: ConfigOverlay,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDocument {
    pub version: u32,
    pub exported_at: Option<DateTime<Utc>>,
    pub items: Vec<ImportedItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    queue: Vec<ImportedItem>,
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    exported_at: Option<DateTime<Utc>>,
}

fn default_version() -> u32 {
    EXPORT_VERSION
}

/// Parses an export document, or a bare array of queue items.
pub fn parse_document(content: &str) -> Result<ImportDocument, ImportError> {
    if content.trim().is_empty() {
        return Err(ImportError::EmptyDocument);
    }

    let value: serde_json::Value = serde_json::from_str(content)?;
    let document = if value.is_array() {
        ImportDocument {
            version: EXPORT_VERSION,
            exported_at: None,
            items: serde_json::from_value(value)?,
        }
    } else {
        let envelope: Envelope = serde_json::from_value(value)?;
        ImportDocument {
            version: envelope.version,
            exported_at: envelope.exported_at,
            items: envelope.queue,
        }
    };

    if document.version > EXPORT_VERSION {
        return Err(ImportError::UnsupportedVersion(document.version));
    }
    if document.items.is_empty() {
        return Err(ImportError::EmptyDocument);
    }

    log::info!(
        "Parsed import document v{} with {} entries",
        document.version,
        document.items.len()
    );
    Ok(document)
}

pub fn read_document<P: AsRef<Path>>(path: P) -> Result<ImportDocument, ImportError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ImportError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&content)
}
