use std::sync::Arc;

use serde::Serialize;
use tracing::debug_span;

use crate::classifier::sanitize_model_name;
use crate::classifier::translated::TRANSLATED_SUFFIX;
use crate::config::{EngineMode, GlobalDefaults};
use crate::paths::{self, PathCase};
use crate::provenance::ledger::{HistoryLedger, HistoryRecord};
use crate::queue::QueueItem;
use crate::sanitize;

/// Appended to an output path to name its translation cache.
pub const CACHE_SUFFIX: &str = ".cache.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionSource {
    /// The ledger recorded the cache path itself.
    LedgerCachePath,
    LedgerOutputPath,
    LedgerSourcePath,
    /// No ledger match; built from the naming convention.
    Convention,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub path: String,
    pub source: ResolutionSource,
}

/// Finds the cache artifact of a queue item for review.
///
/// A ledger match takes precedence over the naming convention, and an
/// explicit `cachePath` in the record wins over anything derived, even if
/// the output file has since moved.
pub struct ProvenanceResolver {
    ledger: Arc<dyn HistoryLedger>,
    defaults: GlobalDefaults,
    path_case: PathCase,
}

impl std::fmt::Debug for ProvenanceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvenanceResolver")
            .field("path_case", &self.path_case)
            .finish_non_exhaustive()
    }
}

impl ProvenanceResolver {
    pub fn new(ledger: Arc<dyn HistoryLedger>, defaults: GlobalDefaults, path_case: PathCase) -> Self {
        Self {
            ledger,
            defaults,
            path_case,
        }
    }

    pub fn resolve_cache_path(&self, item: &QueueItem) -> String {
        self.resolve(item).path
    }

    /// Never fails; without any history the result may name a file that
    /// does not exist yet.
    pub fn resolve(&self, item: &QueueItem) -> Resolution {
        let _span = debug_span!("resolve_provenance", file = %sanitize::redact_path(&item.path))
            .entered();

        let resolution = match self.find_record(&item.path) {
            Some(record) => from_record(&record, &item.path),
            None => Resolution {
                path: self.convention_cache_path(item),
                source: ResolutionSource::Convention,
            },
        };

        log::debug!(
            "Resolved cache for {} via {:?}",
            sanitize::hash_path(&item.path),
            resolution.source
        );
        resolution
    }

    /// Where the pipeline writes the translation of `item` under the item's
    /// effective configuration.
    pub fn expected_output_path(&self, item: &QueueItem) -> String {
        let effective = item.config.resolve(&self.defaults);

        let file_name = paths::file_name(&item.path);
        let (stem, extension) = paths::split_extension(file_name);
        let suffix = match (effective.engine_mode, effective.model_path.as_deref()) {
            (EngineMode::Standard, Some(model)) if !model.trim().is_empty() => {
                format!("_{}", sanitize_model_name(paths::file_name(model)))
            }
            _ => TRANSLATED_SUFFIX.to_string(),
        };
        let output_name = match extension {
            Some(ext) => format!("{}{}.{}", stem, suffix, ext),
            None => format!("{}{}", stem, suffix),
        };

        let dir = effective
            .output_dir
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .or_else(|| paths::parent(&item.path));
        match dir {
            Some(dir) => paths::join(dir, &output_name),
            None => output_name,
        }
    }

    /// First record whose source path matches; the ledger is newest first.
    fn find_record(&self, path: &str) -> Option<HistoryRecord> {
        let key = paths::normalize_for_compare(path, self.path_case);
        self.ledger.records().into_iter().find(|record| {
            record
                .source_path()
                .is_some_and(|source| paths::normalize_for_compare(source, self.path_case) == key)
        })
    }

    fn convention_cache_path(&self, item: &QueueItem) -> String {
        let output = self.expected_output_path(item);
        let effective = item.config.resolve(&self.defaults);
        cache_for(&output, effective.cache_dir.as_deref())
    }
}

fn from_record(record: &HistoryRecord, item_path: &str) -> Resolution {
    if let Some(cache_path) = record.cache_path() {
        return Resolution {
            path: cache_path.to_string(),
            source: ResolutionSource::LedgerCachePath,
        };
    }
    if let Some(output) = record.output_path() {
        return Resolution {
            path: cache_for(output, record.cache_dir()),
            source: ResolutionSource::LedgerOutputPath,
        };
    }
    let source = record.source_path().unwrap_or(item_path);
    Resolution {
        path: cache_for(source, record.cache_dir()),
        source: ResolutionSource::LedgerSourcePath,
    }
}

/// Cache file for `output`: next to it, or inside `cache_dir` when set.
fn cache_for(output: &str, cache_dir: Option<&str>) -> String {
    match cache_dir.map(str::trim).filter(|d| !d.is_empty()) {
        Some(dir) => paths::join(dir, &format!("{}{}", paths::file_name(output), CACHE_SUFFIX)),
        None => format!("{}{}", output, CACHE_SUFFIX),
    }
}
