//! Ports to the collaborators that own watching, dialogs and directory scans.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WatchError;
use crate::watch::folder::WatchFolderConfig;

/// Reply from the watch subsystem for a register/toggle/remove request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsystemResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubsystemResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(message.into()),
        }
    }

    /// Converts a failed reply into `WatchError::Subsystem`.
    pub fn into_result(self, operation: &str) -> Result<(), WatchError> {
        if self.ok {
            Ok(())
        } else {
            Err(WatchError::Subsystem {
                operation: operation.to_string(),
                message: self
                    .error
                    .unwrap_or_else(|| "no reason given".to_string()),
            })
        }
    }
}

/// A file the watcher saw appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchEvent {
    pub path: String,
    pub added_at: DateTime<Utc>,
}

impl WatchEvent {
    pub fn now(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            added_at: Utc::now(),
        }
    }
}

/// The component that actually watches directories.
///
/// `add` is also used to re-register a folder whose settings changed.
#[async_trait]
pub trait WatchSubsystem: Send + Sync {
    async fn add(&self, config: &WatchFolderConfig) -> SubsystemResponse;

    async fn toggle(&self, id: &str, enabled: bool) -> SubsystemResponse;

    async fn remove(&self, id: &str) -> SubsystemResponse;
}

/// File dialogs and directory listing.
#[async_trait]
pub trait FileScanner: Send + Sync {
    async fn select_files(&self) -> Vec<String>;

    async fn select_folder(&self) -> Option<String>;

    /// Lists files under `path`; only its top level unless `recursive`.
    async fn scan_directory(&self, path: &str, recursive: bool) -> Result<Vec<String>, WatchError>;
}
