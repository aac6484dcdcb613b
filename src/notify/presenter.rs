//! Notification presenter with timed auto-dismissal.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::trace;
use uuid::Uuid;

use super::sink::NotificationSink;
use crate::clock::{Clock, SystemClock};
use crate::config::NotificationSettings;
use crate::validation::sanitize;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A banner currently or previously on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub kind: NotificationKind,
    pub shown_at: DateTime<Utc>,
    /// When the banner is removed automatically
    pub dismiss_at: DateTime<Utc>,
}

/// Displays short-lived feedback through a [`NotificationSink`].
///
/// There is no queue: banners shown in quick succession overlap, and each is
/// dismissed on its own deadline by [`sweep`](Self::sweep).
pub struct NotificationPresenter<C: Clock = SystemClock> {
    sink: Arc<dyn NotificationSink>,
    clock: C,
    dismiss_after: Duration,
    max_message_len: usize,
    active: Mutex<Vec<Notification>>,
}

impl NotificationPresenter<SystemClock> {
    /// Create a presenter on the system clock.
    pub fn new(sink: Arc<dyn NotificationSink>, settings: &NotificationSettings) -> Self {
        Self::with_clock(sink, settings, SystemClock::new())
    }
}

impl<C: Clock> NotificationPresenter<C> {
    pub fn with_clock(
        sink: Arc<dyn NotificationSink>,
        settings: &NotificationSettings,
        clock: C,
    ) -> Self {
        Self {
            sink,
            clock,
            dismiss_after: settings.dismiss_after(),
            max_message_len: settings.max_message_len,
            active: Mutex::new(Vec::new()),
        }
    }

    /// Show a message and schedule its dismissal.
    pub fn show(&self, message: &str, kind: NotificationKind) -> Notification {
        let shown_at = self.clock.now();
        // Delays past the representable range never dismiss.
        let dismiss_at = chrono::Duration::from_std(self.dismiss_after)
            .ok()
            .and_then(|delay| shown_at.checked_add_signed(delay))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let notification = Notification {
            id: Uuid::new_v4(),
            message: sanitize(message, self.max_message_len),
            kind,
            shown_at,
            dismiss_at,
        };

        self.sink.render(&notification);
        self.active.lock().push(notification.clone());
        notification
    }

    /// Dismiss every notification whose deadline has passed.
    ///
    /// Returns the number dismissed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let expired: Vec<Notification> = {
            let mut active = self.active.lock();
            let (expired, live): (Vec<_>, Vec<_>) =
                active.drain(..).partition(|n| n.dismiss_at <= now);
            *active = live;
            expired
        };

        for notification in &expired {
            trace!(id = %notification.id, "Dismissing notification");
            self.sink.dismiss(notification);
        }
        expired.len()
    }

    /// Notifications still on screen, oldest first.
    pub fn active(&self) -> Vec<Notification> {
        self.active.lock().clone()
    }

    pub fn dismiss_after(&self) -> Duration {
        self.dismiss_after
    }
}

impl<C: Clock + 'static> NotificationPresenter<C> {
    /// Run [`sweep`](Self::sweep) every `tick` on the tokio runtime.
    pub fn spawn_dismissal(self: &Arc<Self>, tick: Duration) -> JoinHandle<()> {
        let presenter = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick);
            loop {
                ticker.tick().await;
                presenter.sweep();
            }
        })
    }
}
