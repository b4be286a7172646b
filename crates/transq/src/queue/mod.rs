pub mod ingest;
pub mod item;
pub mod ops;
pub mod selection;
pub mod store;

pub use ingest::{IngestFunnel, IngestReport, IngestSource, KnownNames};
pub use item::{QueueItem, QueueStatus};
pub use selection::Selection;
pub use store::{AppendOutcome, QueueStats, QueueStore};
