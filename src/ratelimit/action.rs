//! Throttled action kinds.

use serde::{Deserialize, Serialize};

/// The kind of user action being throttled.
///
/// Each kind has its own budget, so posting comments does not consume the
/// review budget of the same client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Comment,
    Review,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Comment => "comment",
            ActionKind::Review => "review",
        }
    }

    /// Limiter key for this action performed by `identity`.
    pub fn key_for(&self, identity: &str) -> String {
        format!("{}_{}", self.as_str(), identity)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
