//! Watch folders: monitored directories that feed new files into the queue.

pub mod folder;
pub mod manager;
pub mod notify_watcher;
pub mod scanner;
pub mod subsystem;

pub use folder::WatchFolderConfig;
pub use manager::WatchFolderManager;
pub use notify_watcher::NotifyWatchSubsystem;
pub use scanner::WalkdirScanner;
pub use subsystem::{FileScanner, SubsystemResponse, WatchEvent, WatchSubsystem};
