//! Read-only access to the translation history written by the pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Settings captured with a history record. Only the cache location matters here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    #[serde(default)]
    pub cache_dir: Option<String>,
}

/// One past translation run.
///
/// Older ledgers call the source `inputPath`; newer ones `filePath`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<HistoryConfig>,
    /// Kept as raw JSON: ledgers store either epoch millis or ISO strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<serde_json::Value>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl HistoryRecord {
    pub fn source_path(&self) -> Option<&str> {
        non_empty(&self.file_path).or_else(|| non_empty(&self.input_path))
    }

    pub fn output_path(&self) -> Option<&str> {
        non_empty(&self.output_path)
    }

    pub fn cache_path(&self) -> Option<&str> {
        non_empty(&self.cache_path)
    }

    pub fn cache_dir(&self) -> Option<&str> {
        self.config.as_ref().and_then(|c| non_empty(&c.cache_dir))
    }
}

/// Source of history records, newest first.
pub trait HistoryLedger: Send + Sync {
    fn records(&self) -> Vec<HistoryRecord>;
}

/// Fixed in-memory ledger.
#[derive(Debug, Clone, Default)]
pub struct StaticLedger {
    records: Vec<HistoryRecord>,
}

impl StaticLedger {
    pub fn new(records: Vec<HistoryRecord>) -> Self {
        Self { records }
    }
}

impl HistoryLedger for StaticLedger {
    fn records(&self) -> Vec<HistoryRecord> {
        self.records.clone()
    }
}

/// Ledger stored as a JSON array on disk, re-read on every lookup since the
/// pipeline appends to it while the queue is open.
#[derive(Debug, Clone)]
pub struct JsonFileLedger {
    path: PathBuf,
}

impl JsonFileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryLedger for JsonFileLedger {
    fn records(&self) -> Vec<HistoryRecord> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                log::warn!("Failed to read history ledger {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("History ledger {} is malformed: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        let total = entries.len();
        let records: Vec<HistoryRecord> = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect();
        if records.len() < total {
            log::debug!("Skipped {} unreadable history record(s)", total - records.len());
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_record_field_aliases() {
        let record: HistoryRecord = serde_json::from_str(
            r#"{"inputPath": "/in.txt", "outputPath": " ", "config": {"cacheDir": "/cache"}}"#,
        )
        .unwrap();
        assert_eq!(record.source_path(), Some("/in.txt"));
        assert_eq!(record.output_path(), None);
        assert_eq!(record.cache_dir(), Some("/cache"));

        let both: HistoryRecord =
            serde_json::from_str(r#"{"filePath": "/new.txt", "inputPath": "/old.txt"}"#).unwrap();
        assert_eq!(both.source_path(), Some("/new.txt"));
    }

    #[test]
    fn test_json_ledger_missing_and_malformed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("history.json");
        assert!(JsonFileLedger::new(&path).records().is_empty());

        std::fs::write(&path, "{broken").unwrap();
        assert!(JsonFileLedger::new(&path).records().is_empty());
    }

    #[test]
    fn test_json_ledger_skips_bad_records() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("history.json");
        std::fs::write(
            &path,
            r#"[{"filePath": "/a.txt", "cachePath": "/a.cache.json"}, {"filePath": 42}, {}]"#,
        )
        .unwrap();

        let records = JsonFileLedger::new(&path).records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].cache_path(), Some("/a.cache.json"));
    }
}
