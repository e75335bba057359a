//! User-facing notifications (toasts)

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::trace;

/// Message shown when play or a prompt update finds nothing to send
pub const NO_ACTIVE_PROMPTS: &str = "There needs to be one active prompt to play.";

/// Message shown when the session fails
pub const CONNECTION_LOST: &str = "Connection error, please restart audio.";

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Informational
    Info,
    /// Recoverable problem
    Warning,
    /// Fatal to the current session
    Error,
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Text to display
    pub message: String,
}

/// Sending half of the notification channel
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    /// Create a notifier and the receiver the UI reads from
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Show a notification
    ///
    /// Delivery is best effort: nobody listening is not an error.
    pub fn notify(&self, level: NotificationLevel, message: impl Into<String>) {
        let notification = Notification {
            level,
            message: message.into(),
        };
        trace!(?notification, "Notification");
        let _ = self.tx.send(notification);
    }

    /// Informational notification
    pub fn info(&self, message: impl Into<String>) {
        self.notify(NotificationLevel::Info, message);
    }

    /// Warning notification
    pub fn warn(&self, message: impl Into<String>) {
        self.notify(NotificationLevel::Warning, message);
    }

    /// Error notification
    pub fn error(&self, message: impl Into<String>) {
        self.notify(NotificationLevel::Error, message);
    }
}
