//! Transient user-facing notifications.

mod presenter;
mod sink;

pub use presenter::{Notification, NotificationKind, NotificationPresenter};
pub use sink::{NotificationSink, TerminalSink, TracingSink};

#[cfg(any(test, feature = "test-helpers"))]
pub use sink::RecordingSink;
