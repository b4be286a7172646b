//! File type eligibility and translated-output detection.

pub mod translated;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::paths;

pub use translated::{
    normalize_model_name, sanitize_model_name, RuleOutcome, TranslatedOutputDetector, Verdict,
};

/// The closed set of source formats the translation pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Txt,
    Epub,
    Srt,
    Ass,
    Ssa,
}

impl FileType {
    pub const ALL: [FileType; 5] = [
        FileType::Txt,
        FileType::Epub,
        FileType::Srt,
        FileType::Ass,
        FileType::Ssa,
    ];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" => Some(Self::Txt),
            "epub" => Some(Self::Epub),
            "srt" => Some(Self::Srt),
            "ass" => Some(Self::Ass),
            "ssa" => Some(Self::Ssa),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Epub => "epub",
            Self::Srt => "srt",
            Self::Ass => "ass",
            Self::Ssa => "ssa",
        }
    }

    /// Subtitle formats are translated line by line and share alignment options.
    pub fn is_subtitle(&self) -> bool {
        matches!(self, Self::Srt | Self::Ass | Self::Ssa)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Result of checking a path against the supported set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Supported(FileType),
    Unsupported,
}

impl Classification {
    pub fn file_type(&self) -> Option<FileType> {
        match self {
            Self::Supported(file_type) => Some(*file_type),
            Self::Unsupported => None,
        }
    }
}

/// Maps the suffix after the final dot of `path` onto [`FileType`].
pub fn classify_extension(path: &str) -> Classification {
    let lower = path.to_lowercase();
    match paths::split_extension(paths::file_name(&lower)).1 {
        Some(ext) => FileType::from_extension(ext)
            .map(Classification::Supported)
            .unwrap_or(Classification::Unsupported),
        None => Classification::Unsupported,
    }
}
