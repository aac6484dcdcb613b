//! Client identity keys and form tokens.
//!
//! The identity key is derived from values any client can choose freely
//! (user agent and screen size). It groups repeat submissions from one
//! browser for throttling and nothing more; it must not be treated as
//! authentication or as an abuse control.

use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of a generated form token.
const FORM_TOKEN_LEN: usize = 26;

/// Hex characters kept from the fingerprint digest.
const IDENTITY_KEY_LEN: usize = 16;

/// Browser characteristics used to group submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientFingerprint {
    pub user_agent: String,
    pub screen_width: u32,
    pub screen_height: u32,
}

impl ClientFingerprint {
    pub fn new(user_agent: impl Into<String>, screen_width: u32, screen_height: u32) -> Self {
        Self {
            user_agent: user_agent.into(),
            screen_width,
            screen_height,
        }
    }

    /// Stable 16 character key for this fingerprint: a prefix of the
    /// SHA-256 hex digest of `user_agent + width + height`.
    pub fn identity_key(&self) -> String {
        let raw = format!(
            "{}{}{}",
            self.user_agent, self.screen_width, self.screen_height
        );
        let mut key = format!("{:x}", Sha256::digest(raw.as_bytes()));
        key.truncate(IDENTITY_KEY_LEN);
        key
    }
}

/// Short digest of an identity key, stored with records in place of the key.
///
/// This is the classic `h = h * 31 + unit` hash over UTF-16 code units in
/// wrapping 32-bit arithmetic, rendered as base36 of its magnitude.
pub fn client_hash(value: &str) -> String {
    let hash = value
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)));
    to_base36(u64::from(hash.unsigned_abs()))
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Random per-session token embedded in forms.
///
/// A submission carrying a different token came from a stale or foreign form
/// and is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormToken(String);

impl FormToken {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let token = (0..FORM_TOKEN_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        Self(token)
    }

    /// Whether a submitted token matches this one.
    pub fn matches(&self, candidate: &str) -> bool {
        !candidate.is_empty() && self.0 == candidate
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FormToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
