//! Stored record shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment left on a character page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub character_id: String,
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Submitting user agent, truncated
    #[serde(default)]
    pub user_agent: String,
    /// Digest of the submitter's identity key
    #[serde(default)]
    pub client_hash: String,
}

/// A review of a show or title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub title: String,
    /// Review type, e.g. "anime" or "manga"
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub genre: String,
    pub summary: String,
    #[serde(default)]
    pub review: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub episodes: String,
    pub timestamp: DateTime<Utc>,
}
