//! Command outcomes and user-facing notifications.

use serde::Serialize;

/// Whether a notification reports success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

/// A transient message shown to the user after a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Why a command did not take effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Failure {
    /// Input was rejected locally; no remote call was made.
    Validation,
    /// The backend call failed.
    Remote,
}

/// Result of dispatching a command: the next view plus what to tell the user.
///
/// Remote failures never escape as errors. They are logged and reported
/// here, and the view is left as it was before the command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome<V> {
    pub view: V,
    pub notification: Option<Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
}

impl<V> Outcome<V> {
    /// A new view with nothing to report.
    pub const fn quiet(view: V) -> Self {
        Self {
            view,
            notification: None,
            failure: None,
        }
    }

    pub fn success(view: V, message: impl Into<String>) -> Self {
        Self {
            view,
            notification: Some(Notification::success(message)),
            failure: None,
        }
    }

    pub fn failed(view: V, failure: Failure, message: impl Into<String>) -> Self {
        Self {
            view,
            notification: Some(Notification::error(message)),
            failure: Some(failure),
        }
    }

    /// A failure that is logged but not shown to the user.
    pub const fn silent_failure(view: V) -> Self {
        Self {
            view,
            notification: None,
            failure: Some(Failure::Remote),
        }
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}
