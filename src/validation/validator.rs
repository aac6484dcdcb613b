//! Field validators for comments and reviews.

use serde::{Deserialize, Serialize};

use super::sanitize::sanitize;
use crate::config::ValidationLimits;

/// Outcome of validating one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ValidationResult {
    /// The sanitized value to store
    Valid { value: String },
    /// A user-facing explanation of why the input was refused
    Invalid { reason: String },
}

impl ValidationResult {
    fn valid(value: String) -> Self {
        ValidationResult::Valid { value }
    }

    fn invalid(reason: impl Into<String>) -> Self {
        ValidationResult::Invalid {
            reason: reason.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid { .. })
    }

    /// The sanitized value, if valid.
    pub fn value(&self) -> Option<&str> {
        match self {
            ValidationResult::Valid { value } => Some(value),
            ValidationResult::Invalid { .. } => None,
        }
    }

    /// The rejection reason, if invalid.
    pub fn reason(&self) -> Option<&str> {
        match self {
            ValidationResult::Valid { .. } => None,
            ValidationResult::Invalid { reason } => Some(reason),
        }
    }

    /// Convert into a `Result`, for chaining validators with `?`.
    pub fn into_result(self) -> Result<String, String> {
        match self {
            ValidationResult::Valid { value } => Ok(value),
            ValidationResult::Invalid { reason } => Err(reason),
        }
    }
}

/// Punctuation accepted in display names, besides ASCII letters, digits and
/// whitespace.
const NAME_PUNCTUATION: &str = "-_.,!?@#$%^&*()+=:;\"'[]{}|\\/<>~`";

/// Stateless validators over user-supplied text.
///
/// Every validator sanitizes first and then applies length bounds, counted
/// in code points on the fully sanitized text. Over-long input is reported
/// as such, never silently cut to fit.
/// Validators never fail or panic on bad input; they return
/// [`ValidationResult::Invalid`].
#[derive(Debug, Clone, Default)]
pub struct SecurityValidator {
    limits: ValidationLimits,
}

impl SecurityValidator {
    /// Create a validator with the default bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator with explicit bounds.
    pub fn with_limits(limits: ValidationLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    /// Validate a commenter's display name.
    pub fn validate_name(&self, name: &str) -> ValidationResult {
        let result = bounded("Name", name, self.limits.name_min, self.limits.name_max);
        match result {
            ValidationResult::Valid { ref value } if !value.chars().all(is_name_char) => {
                ValidationResult::invalid("Name contains invalid characters")
            }
            other => other,
        }
    }

    /// Validate a comment body.
    pub fn validate_comment(&self, text: &str) -> ValidationResult {
        bounded(
            "Comment",
            text,
            self.limits.comment_min,
            self.limits.comment_max,
        )
    }

    pub fn validate_review_title(&self, title: &str) -> ValidationResult {
        bounded(
            "Review title",
            title,
            self.limits.review_title_min,
            self.limits.review_title_max,
        )
    }

    pub fn validate_review_summary(&self, summary: &str) -> ValidationResult {
        bounded(
            "Review summary",
            summary,
            self.limits.review_summary_min,
            self.limits.review_summary_max,
        )
    }

    pub fn validate_review_text(&self, text: &str) -> ValidationResult {
        bounded(
            "Review text",
            text,
            self.limits.review_text_min,
            self.limits.review_text_max,
        )
    }

    /// Sanitize a free-form optional field. Never rejects.
    pub fn sanitize_field(&self, value: &str) -> String {
        sanitize(value, self.limits.field_max)
    }
}

fn bounded(label: &str, input: &str, min: usize, max: usize) -> ValidationResult {
    let value = sanitize(input, usize::MAX);
    let len = value.chars().count();

    if len < min {
        return if min <= 1 {
            ValidationResult::invalid(format!("{} is required", label))
        } else {
            ValidationResult::invalid(format!(
                "{} must be at least {} characters long",
                label, min
            ))
        };
    }

    if len > max {
        return ValidationResult::invalid(format!(
            "{} must be no more than {} characters",
            label, max
        ));
    }

    ValidationResult::valid(value)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace() || NAME_PUNCTUATION.contains(c)
}
