//! Queue export and import with merge/replace reconciliation.
//!
//! Import runs in three steps so the caller can show counts before anything
//! changes: [`preview`] parses and classifies the document, [`plan`] compares
//! it with the live queue for the chosen [`ImportMode`], and [`apply`] is the
//! only step that touches the queue.

pub mod document;
pub mod import;

pub use document::{
    export_document, export_to_string, parse_document, read_document, ExportDocument,
    ExportedItem, ImportDocument, ImportedItem, EXPORT_VERSION,
};
pub use import::{apply, plan, preview, ImportMode, ImportPlan, ImportPreview, ImportSummary};
