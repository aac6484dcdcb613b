//! Presentation targets for notifications.

use std::io::Write;

use tracing::{info, warn};

use super::presenter::{Notification, NotificationKind};

/// Where notifications are drawn.
///
/// The presenter owns timing; a sink only draws and removes banners.
pub trait NotificationSink: Send + Sync {
    /// Put a banner on screen.
    fn render(&self, notification: &Notification);

    /// Take a banner off screen.
    fn dismiss(&self, notification: &Notification);
}

/// Emits notifications as structured log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn render(&self, notification: &Notification) {
        match notification.kind {
            NotificationKind::Error => warn!(
                id = %notification.id,
                kind = %notification.kind,
                "{}",
                notification.message
            ),
            _ => info!(
                id = %notification.id,
                kind = %notification.kind,
                "{}",
                notification.message
            ),
        }
    }

    fn dismiss(&self, notification: &Notification) {
        info!(id = %notification.id, "Notification dismissed");
    }
}

/// Writes banners to standard output, for the command line front end.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalSink;

impl NotificationSink for TerminalSink {
    fn render(&self, notification: &Notification) {
        let marker = match notification.kind {
            NotificationKind::Success => "+",
            NotificationKind::Error => "!",
            NotificationKind::Info => "*",
        };
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(
            stdout,
            "[{}] {}: {}",
            marker,
            notification.kind.as_str().to_uppercase(),
            notification.message
        );
    }

    fn dismiss(&self, _notification: &Notification) {}
}

#[cfg(any(test, feature = "test-helpers"))]
pub use recording::RecordingSink;

#[cfg(any(test, feature = "test-helpers"))]
mod recording {
    use super::{Notification, NotificationSink};
    use parking_lot::Mutex;
    use uuid::Uuid;

    /// Keeps every rendered notification and dismissed id for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        shown: Mutex<Vec<Notification>>,
        dismissed: Mutex<Vec<Uuid>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn shown(&self) -> Vec<Notification> {
            self.shown.lock().clone()
        }

        pub fn dismissed(&self) -> Vec<Uuid> {
            self.dismissed.lock().clone()
        }

        /// Message of the most recent notification, if any.
        pub fn last_message(&self) -> Option<String> {
            self.shown.lock().last().map(|n| n.message.clone())
        }
    }

    impl NotificationSink for RecordingSink {
        fn render(&self, notification: &Notification) {
            self.shown.lock().push(notification.clone());
        }

        fn dismiss(&self, notification: &Notification) {
            self.dismissed.lock().push(notification.id);
        }
    }
}
