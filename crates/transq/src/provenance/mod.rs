//! Locating the translation cache produced for a queued file.

pub mod ledger;
pub mod resolver;

pub use ledger::{HistoryConfig, HistoryLedger, HistoryRecord, JsonFileLedger, StaticLedger};
pub use resolver::{ProvenanceResolver, Resolution, ResolutionSource, CACHE_SUFFIX};
