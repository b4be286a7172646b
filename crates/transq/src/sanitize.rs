//! Helpers for sanitizing data before it enters tracing span attributes.
//!
//! Queue paths point into users' document folders; spans only ever carry
//! the file name or an opaque hash of the full path.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::paths;

/// Returns only the file name component of a path, whatever its separator style.
pub fn redact_path(path: &str) -> String {
    let name = paths::file_name(path);
    if name.is_empty() {
        "<unknown>".to_string()
    } else {
        name.to_string()
    }
}

/// Returns a short deterministic hash of a path for correlating log lines.
pub fn hash_path(path: &str) -> String {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
