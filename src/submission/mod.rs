//! Orchestration of one comment or review submission.

mod controller;
mod form;

pub use controller::SubmissionController;
pub use form::{CommentForm, ReviewForm, SubmissionError, SubmissionOutcome};
