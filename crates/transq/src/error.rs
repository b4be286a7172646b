use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransqError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Watch folder error: {0}")]
    Watch(#[from] WatchError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Settings validation failed: {message}")]
    Validation { message: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create storage directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read key '{key}': {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write key '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove key '{key}': {source}")]
    Remove {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode document '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed document '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Watch folder path must not be empty")]
    EmptyPath,

    #[error("Folder is already being watched: {0}")]
    DuplicatePath(String),

    #[error("Watch folder not found: {0}")]
    NotFound(String),

    #[error("Watch subsystem rejected '{operation}': {message}")]
    Subsystem { operation: String, message: String },

    #[error("Directory scan failed for '{path}': {message}")]
    Scan { path: String, message: String },

    #[error("Watcher error: {0}")]
    Watcher(String),
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Import file is empty")]
    EmptyDocument,

    #[error("Failed to parse import file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported import format version: {0}")]
    UnsupportedVersion(u32),

    #[error("Failed to read import file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, TransqError>;
