//! User-facing notifications raised by failed or completed operations.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a notification stays on screen.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Oldest notifications are dropped past this many undelivered entries.
const MAX_PENDING: usize = 64;

/// Severity of a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Informational message.
    Info,
    /// An operation failed.
    Error,
}

/// A message for the user.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Message text.
    pub text: String,
    /// When the notification was raised.
    pub timestamp: Instant,
}

impl Notification {
    /// Creates an informational notification.
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, text)
    }

    /// Creates an error notification.
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, text)
    }

    fn new(level: NotificationLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            timestamp: Instant::now(),
        }
    }

    /// Returns `true` for [`NotificationLevel::Error`].
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }

    /// Returns `true` once the notification has outlived [`NOTIFICATION_TTL`].
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.timestamp.elapsed() > NOTIFICATION_TTL
    }
}

/// Bounded queue of undelivered notifications.
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    pending: VecDeque<Notification>,
}

impl Notifications {
    /// Queues a notification, evicting the oldest one when full.
    pub fn push(&mut self, notification: Notification) {
        if self.pending.len() == MAX_PENDING {
            self.pending.pop_front();
        }
        self.pending.push_back(notification);
    }

    /// Removes and returns all pending notifications, oldest first.
    pub fn drain(&mut self) -> Vec<Notification> {
        self.pending.drain(..).collect()
    }

    /// The most recent notification.
    #[must_use]
    pub fn latest(&self) -> Option<&Notification> {
        self.pending.back()
    }

    /// Iterates over pending notifications, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.pending.iter()
    }

    /// Number of pending notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert!(Notification::error("boom").is_error());
        assert!(!Notification::info("ok").is_error());
        assert!(!Notification::info("fresh").is_expired());
    }

    #[test]
    fn test_drain_in_order() {
        let mut queue = Notifications::default();
        queue.push(Notification::info("first"));
        queue.push(Notification::error("second"));
        assert_eq!(queue.latest().map(|n| n.text.as_str()), Some("second"));

        let texts: Vec<String> = queue.drain().into_iter().map(|n| n.text).collect();
        assert_eq!(texts, ["first", "second"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_bounded() {
        let mut queue = Notifications::default();
        for i in 0..MAX_PENDING + 3 {
            queue.push(Notification::info(i.to_string()));
        }
        assert_eq!(queue.len(), MAX_PENDING);
        assert_eq!(queue.iter().next().map(|n| n.text.as_str()), Some("3"));
    }
}
