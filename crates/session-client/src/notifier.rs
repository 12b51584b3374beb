//! User-visible notifications raised by session operations.

use tracing::{error, info};

/// Severity of a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// The operation completed.
    Success,
    /// The operation failed.
    Failure,
}

/// Short message meant for the person using the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub kind: NotificationKind,
    /// Headline, e.g. `Welcome back!`.
    pub title: String,
    /// Optional explanation, usually the server's message.
    pub detail: Option<String>,
}

impl Notification {
    /// Successful outcome without detail.
    #[must_use]
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: title.into(),
            detail: None,
        }
    }

    /// Failed outcome with an explanation.
    #[must_use]
    pub fn failure(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Failure,
            title: title.into(),
            detail: Some(detail.into()),
        }
    }
}

/// Sink for [`Notification`]s, typically a toast or status line.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Present `notification`.
    fn notify(&self, notification: Notification);
}

/// Notifier that emits each notification as a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let detail = notification.detail.as_deref().unwrap_or_default();
        match notification.kind {
            NotificationKind::Success => info!(title = %notification.title, detail, "notification"),
            NotificationKind::Failure => {
                error!(title = %notification.title, detail, "notification");
            }
        }
    }
}
