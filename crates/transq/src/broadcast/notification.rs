//! User-facing notifications for non-blocking outcomes.
//!
//! The toast UI subscribes to the broadcaster; the queue core only ever
//! sends. Sending with no subscriber is fine.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, title: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Clone)]
pub struct NotificationBroadcaster {
    sender: broadcast::Sender<Notification>,
}

impl std::fmt::Debug for NotificationBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBroadcaster")
            .field("receivers", &self.sender.receiver_count())
            .finish()
    }
}

impl NotificationBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn send(&self, notification: Notification) {
        let _ = self.sender.send(notification);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn info(&self, title: &str, message: impl Into<String>) {
        self.send(Notification::new(NotificationLevel::Info, title, message));
    }

    pub fn success(&self, title: &str, message: impl Into<String>) {
        self.send(Notification::new(NotificationLevel::Success, title, message));
    }

    pub fn warning(&self, title: &str, message: impl Into<String>) {
        self.send(Notification::new(NotificationLevel::Warning, title, message));
    }

    pub fn error(&self, title: &str, message: impl Into<String>) {
        self.send(Notification::new(NotificationLevel::Error, title, message));
    }
}

impl Default for NotificationBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}
