use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::{classify_extension, Classification};
use crate::queue::item::new_item_id;

/// A monitored directory and its discovery filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchFolderConfig {
    pub id: String,
    /// Absolute directory path; unique within the watch-folder set.
    pub path: String,
    #[serde(default)]
    pub include_subdirs: bool,
    /// Lower-case extensions without the dot. Empty accepts every supported type.
    #[serde(default)]
    pub file_types: BTreeSet<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

fn default_enabled() -> bool {
    true
}

impl WatchFolderConfig {
    pub fn new<I, S>(path: impl Into<String>, include_subdirs: bool, file_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            id: new_item_id(),
            path: path.into(),
            include_subdirs,
            file_types: normalize_file_types(file_types),
            enabled: true,
            created_at: Utc::now(),
        }
    }

    /// Whether a discovered file passes this folder's filter.
    ///
    /// Unsupported extensions are always rejected, even with an explicit
    /// filter naming them.
    pub fn accepts(&self, path: &str) -> bool {
        match classify_extension(path) {
            Classification::Supported(file_type) => {
                self.file_types.is_empty() || self.file_types.contains(file_type.extension())
            }
            Classification::Unsupported => false,
        }
    }
}

/// Lower-cases, strips leading dots and drops blanks.
pub fn normalize_file_types<I, S>(file_types: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    file_types
        .into_iter()
        .map(|t| t.as_ref().trim().trim_start_matches('.').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}
