//! Gallery Gate - submission gate for fan gallery comments and reviews
//!
//! This crate throttles, sanitizes and validates user-submitted comments and
//! reviews before handing them to a record store, and reports each outcome
//! through short-lived notifications. The throttle is keyed by a spoofable
//! client fingerprint and the sanitizer is a denylist: both reduce casual
//! abuse and accidental markup, neither is a security boundary.

pub mod clock;
pub mod config;
pub mod error;
pub mod identity;
pub mod notify;
pub mod ratelimit;
pub mod storage;
pub mod submission;
pub mod validation;
