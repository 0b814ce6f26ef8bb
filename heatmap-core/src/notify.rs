//! User-facing notifications.
//!
//! Every user-visible outcome (load failures, filter results) is routed
//! through a [`Notifier`](crate::traits::Notifier) as a [`Notification`].

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::constants::{ERROR_DURATION, INFO_DURATION, SUCCESS_DURATION, WARNING_DURATION};
use crate::traits::Notifier;

/// Severity of a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Operation completed
    Success,
    /// Neutral status, e.g. filter results
    Info,
    /// Degraded but usable
    Warning,
    /// Operation failed
    Error,
}

impl NotificationKind {
    /// How long a notification of this kind stays visible.
    pub fn default_duration(self) -> Duration {
        match self {
            NotificationKind::Success => SUCCESS_DURATION,
            NotificationKind::Info => INFO_DURATION,
            NotificationKind::Warning => WARNING_DURATION,
            NotificationKind::Error => ERROR_DURATION,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationKind::Success => "success",
            NotificationKind::Info => "info",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        };
        f.write_str(s)
    }
}

/// A message for the notification surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub kind: NotificationKind,
    /// Text shown to the user
    pub message: String,
    /// Display time; zero means sticky
    pub duration: Duration,
}

impl Notification {
    /// Creates a notification with the kind's default duration.
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            duration: kind.default_duration(),
        }
    }

    /// Success notification.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    /// Info notification.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }

    /// Warning notification.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, message)
    }

    /// Error notification.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }

    /// Overrides the display time.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Notifier that writes to the `tracing` pipeline.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let message = notification.message.as_str();
        match notification.kind {
            NotificationKind::Error => error!(kind = %notification.kind, "{message}"),
            NotificationKind::Warning => warn!(kind = %notification.kind, "{message}"),
            NotificationKind::Success | NotificationKind::Info => {
                info!(kind = %notification.kind, "{message}")
            }
        }
    }
}
