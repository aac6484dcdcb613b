//! In-memory sliding window throttling.
//!
//! This is a usability throttle keyed by a spoofable client fingerprint. It
//! slows accidental or casual repeat submissions; it is not a security
//! boundary and offers no protection against a determined client.

mod action;
mod limiter;
mod window;

pub use action::ActionKind;
pub use limiter::RateLimiter;
pub use window::RateWindow;
