//! Raw form input and submission outcomes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw comment form values, as typed by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentForm {
    /// Page the comment belongs to
    pub character_id: String,
    pub name: String,
    pub text: String,
}

/// Raw review form values, as typed by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewForm {
    /// Token the form was issued with
    pub form_token: String,
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub review: Option<String>,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub episodes: Option<String>,
}

/// Why a submission was refused.
///
/// These are outcomes, not failures of the gate itself: each is reported to
/// the user as a notification and returned inside
/// [`SubmissionOutcome::Rejected`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// The identity used up its budget for the current window
    #[error("Too many submissions")]
    RateLimited,

    /// The form token did not match the session's token
    #[error("Form token mismatch")]
    TokenMismatch,

    /// A field failed validation
    #[error("Invalid {field}: {reason}")]
    ValidationFailed { field: &'static str, reason: String },

    /// The record store refused or failed the write
    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),
}

/// Result of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome<T> {
    /// The record was stored; the caller should clear its form
    Accepted(T),
    Rejected(SubmissionError),
}

impl<T> SubmissionOutcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmissionOutcome::Accepted(_))
    }

    /// The stored record, if accepted.
    pub fn accepted(self) -> Option<T> {
        match self {
            SubmissionOutcome::Accepted(record) => Some(record),
            SubmissionOutcome::Rejected(_) => None,
        }
    }

    /// The rejection, if rejected.
    pub fn rejection(&self) -> Option<&SubmissionError> {
        match self {
            SubmissionOutcome::Accepted(_) => None,
            SubmissionOutcome::Rejected(err) => Some(err),
        }
    }
}
