pub mod notification;

pub use notification::{Notification, NotificationBroadcaster, NotificationLevel};
