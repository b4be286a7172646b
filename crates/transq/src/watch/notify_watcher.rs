//! `WatchSubsystem` backed by a `notify` poll watcher.
//!
//! Registered folders live in a shared map; a background thread drains the
//! debouncer and forwards newly seen files as [`WatchEvent`]s on a tokio
//! channel, which the ingest funnel consumes.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use notify::{Config as NotifyConfig, PollWatcher, RecursiveMode};
use notify_debouncer_mini::{
    new_debouncer_opt, Config as DebouncerConfig, DebounceEventResult, DebouncedEventKind,
    Debouncer,
};
use tokio::sync::mpsc;

use crate::error::WatchError;
use crate::watch::folder::WatchFolderConfig;
use crate::watch::subsystem::{SubsystemResponse, WatchEvent, WatchSubsystem};

const DEBOUNCE_TIMEOUT: Duration = Duration::from_millis(500);

type FolderMap = Arc<RwLock<HashMap<String, WatchFolderConfig>>>;

pub struct NotifyWatchSubsystem {
    debouncer: Mutex<Debouncer<PollWatcher>>,
    folders: FolderMap,
    shutdown: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for NotifyWatchSubsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyWatchSubsystem")
            .field("shutdown", &self.shutdown.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl NotifyWatchSubsystem {
    /// Starts the poll watcher and its event thread. Discovered files are sent
    /// to `events`.
    pub fn new(poll_interval: Duration, events: mpsc::Sender<WatchEvent>) -> Result<Self, WatchError> {
        // Polling works on network shares and container mounts
        let poll_config = NotifyConfig::default().with_poll_interval(poll_interval);
        let debouncer_config = DebouncerConfig::default()
            .with_timeout(DEBOUNCE_TIMEOUT)
            .with_notify_config(poll_config);

        let (tx, rx) = std::sync::mpsc::channel();
        let debouncer = new_debouncer_opt::<_, PollWatcher>(debouncer_config, tx)
            .map_err(|e| WatchError::Watcher(e.to_string()))?;

        let folders: FolderMap = Arc::new(RwLock::new(HashMap::new()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let worker = {
            let folders = Arc::clone(&folders);
            let shutdown = Arc::clone(&shutdown);
            std::thread::Builder::new()
                .name("transq-watch".to_string())
                .spawn(move || event_loop(rx, folders, shutdown, events))
                .map_err(|e| WatchError::Watcher(e.to_string()))?
        };

        Ok(Self {
            debouncer: Mutex::new(debouncer),
            folders,
            shutdown,
            worker: Some(worker),
        })
    }

    /// Convenience constructor that also creates the event channel.
    pub fn with_channel(
        poll_interval: Duration,
        capacity: usize,
    ) -> Result<(Self, mpsc::Receiver<WatchEvent>), WatchError> {
        let (tx, rx) = mpsc::channel(capacity);
        Ok((Self::new(poll_interval, tx)?, rx))
    }

    /// Ids of folders currently registered, enabled or not.
    pub fn registered(&self) -> Vec<String> {
        let mut ids: Vec<String> = read_folders(&self.folders).keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }

    fn lock_debouncer(&self) -> MutexGuard<'_, Debouncer<PollWatcher>> {
        match self.debouncer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Watcher lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn start_watching(&self, config: &WatchFolderConfig) -> Result<(), String> {
        let path = Path::new(&config.path);
        if !path.is_dir() {
            return Err(format!("'{}' is not a directory", config.path));
        }
        let mode = if config.include_subdirs {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        self.lock_debouncer()
            .watcher()
            .watch(path, mode)
            .map_err(|e| e.to_string())?;
        info!("Watching {} (recursive: {})", config.path, config.include_subdirs);
        Ok(())
    }

    fn stop_watching(&self, config: &WatchFolderConfig) {
        if let Err(e) = self
            .lock_debouncer()
            .watcher()
            .unwatch(Path::new(&config.path))
        {
            debug!("Unwatch of {} reported: {}", config.path, e);
        }
    }
}

impl Drop for NotifyWatchSubsystem {
    fn drop(&mut self) {
        self.stop();
    }
}

#[async_trait]
impl WatchSubsystem for NotifyWatchSubsystem {
    async fn add(&self, config: &WatchFolderConfig) -> SubsystemResponse {
        let previous = read_folders(&self.folders).get(&config.id).cloned();
        if let Some(previous) = previous.filter(|p| p.enabled) {
            self.stop_watching(&previous);
        }

        if config.enabled {
            if let Err(message) = self.start_watching(config) {
                warn!("Failed to watch {}: {}", config.path, message);
                return SubsystemResponse::failed(message);
            }
        }

        write_folders(&self.folders).insert(config.id.clone(), config.clone());
        SubsystemResponse::ok()
    }

    async fn toggle(&self, id: &str, enabled: bool) -> SubsystemResponse {
        let Some(mut config) = read_folders(&self.folders).get(id).cloned() else {
            return SubsystemResponse::failed(format!("unknown watch folder '{}'", id));
        };
        if config.enabled == enabled {
            return SubsystemResponse::ok();
        }

        if enabled {
            config.enabled = true;
            if let Err(message) = self.start_watching(&config) {
                warn!("Failed to resume {}: {}", config.path, message);
                return SubsystemResponse::failed(message);
            }
        } else {
            self.stop_watching(&config);
            config.enabled = false;
        }

        write_folders(&self.folders).insert(id.to_string(), config);
        SubsystemResponse::ok()
    }

    async fn remove(&self, id: &str) -> SubsystemResponse {
        let removed = write_folders(&self.folders).remove(id);
        match removed {
            Some(config) => {
                if config.enabled {
                    self.stop_watching(&config);
                }
                SubsystemResponse::ok()
            }
            None => SubsystemResponse::failed(format!("unknown watch folder '{}'", id)),
        }
    }
}

fn read_folders(
    folders: &FolderMap,
) -> std::sync::RwLockReadGuard<'_, HashMap<String, WatchFolderConfig>> {
    match folders.read() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Watch folder map lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

fn write_folders(
    folders: &FolderMap,
) -> std::sync::RwLockWriteGuard<'_, HashMap<String, WatchFolderConfig>> {
    match folders.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Watch folder map lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

fn event_loop(
    rx: std::sync::mpsc::Receiver<DebounceEventResult>,
    folders: FolderMap,
    shutdown: Arc<AtomicBool>,
    events: mpsc::Sender<WatchEvent>,
) {
    let mut seen: HashSet<PathBuf> = HashSet::new();

    loop {
        if shutdown.load(Ordering::Relaxed) {
            info!("Watch loop shutting down");
            break;
        }

        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(Ok(batch)) => {
                for event in batch {
                    if !matches!(event.kind, DebouncedEventKind::Any) {
                        continue;
                    }
                    let path = event.path;

                    if !path.exists() {
                        seen.remove(&path);
                        continue;
                    }
                    if !path.is_file() || seen.contains(&path) {
                        continue;
                    }
                    let Some(path_str) = path.to_str() else {
                        continue;
                    };
                    if !matches_watched_folder(&read_folders(&folders), &path, path_str) {
                        continue;
                    }

                    seen.insert(path.clone());
                    debug!("New file detected: {}", path.display());
                    if events.blocking_send(WatchEvent::now(path_str)).is_err() {
                        info!("Watch event receiver dropped, stopping watch loop");
                        return;
                    }
                }
                prune_seen(&mut seen, &read_folders(&folders));
            }
            Ok(Err(e)) => {
                warn!("Watch error: {:?}", e);
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                continue;
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                error!("Watch channel disconnected");
                break;
            }
        }
    }
}

/// Forgets files that no enabled folder covers any more, so removed or
/// disabled folders do not pin their entries for the life of the loop.
fn prune_seen(seen: &mut HashSet<PathBuf>, folders: &HashMap<String, WatchFolderConfig>) {
    seen.retain(|path| {
        path.to_str()
            .is_some_and(|path_str| matches_watched_folder(folders, path, path_str))
    });
}

/// An enabled folder that contains `path` at an allowed depth and whose
/// filter accepts it.
fn matches_watched_folder(
    folders: &HashMap<String, WatchFolderConfig>,
    path: &Path,
    path_str: &str,
) -> bool {
    folders.values().filter(|f| f.enabled).any(|folder| {
        let Ok(relative) = path.strip_prefix(&folder.path) else {
            return false;
        };
        if !folder.include_subdirs && relative.components().count() > 1 {
            return false;
        }
        folder.accepts(path_str)
    })
}
