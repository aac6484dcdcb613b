//! Sanitization and validation of free-form user text.
//!
//! The sanitizer is a best-effort denylist. It strips the common markup and
//! script-injection shapes but is not a parser-based sanitizer and does not
//! guarantee that every injection vector is removed. Anything rendered into
//! markup must still go through [`escape_html`].

mod sanitize;
mod validator;

pub use sanitize::{escape_html, sanitize};
pub use validator::{SecurityValidator, ValidationResult};
