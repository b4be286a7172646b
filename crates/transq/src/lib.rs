pub mod broadcast;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod paths;
pub mod provenance;
pub mod queue;
pub mod reconciler;
pub mod sanitize;
pub mod storage;
pub mod watch;

pub use broadcast::{Notification, NotificationBroadcaster, NotificationLevel};
pub use classifier::{classify_extension, Classification, FileType, TranslatedOutputDetector, Verdict};
pub use config::{load_settings, ConfigOverlay, EffectiveConfig, EngineMode, GlobalDefaults, Settings};
pub use engine::Engine;
pub use error::{ConfigError, ImportError, Result, StorageError, TransqError, WatchError};
pub use logging::{init_logging, LoggingOptions};
pub use paths::PathCase;
pub use provenance::{HistoryLedger, HistoryRecord, JsonFileLedger, ProvenanceResolver, Resolution};
pub use queue::{IngestFunnel, IngestReport, IngestSource, QueueItem, QueueStatus, QueueStore, Selection};
pub use reconciler::{ImportMode, ImportSummary};
pub use storage::{DocumentRepository, FileStore, KeyValueStore, MemoryStore};
pub use watch::{FileScanner, WatchEvent, WatchFolderConfig, WatchFolderManager, WatchSubsystem};
