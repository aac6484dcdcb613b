//! Configuration management for the gallery gate.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::error::{GateError, Result};
use crate::ratelimit::ActionKind;

/// Environment variable prefix, e.g. `GALLERY_GATE__RATE_LIMITS__COMMENTS_PER_MINUTE=5`.
const ENV_PREFIX: &str = "GALLERY_GATE";

/// Main configuration for the gallery gate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateConfig {
    /// Submission throttling
    #[serde(default)]
    pub rate_limits: RateLimitSettings,

    /// Field length bounds
    #[serde(default)]
    pub validation: ValidationLimits,

    /// Notification display
    #[serde(default)]
    pub notifications: NotificationSettings,

    /// Record persistence
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Per-action throttle budgets over a rolling window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Comments accepted per identity per window
    #[serde(default = "default_comments_per_minute")]
    pub comments_per_minute: u32,

    /// Reviews accepted per identity per window
    #[serde(default = "default_reviews_per_minute")]
    pub reviews_per_minute: u32,

    /// Window length in milliseconds
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// How often stale windows are swept, in seconds
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            comments_per_minute: default_comments_per_minute(),
            reviews_per_minute: default_reviews_per_minute(),
            window_ms: default_window_ms(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

impl RateLimitSettings {
    /// The configured budget for an action.
    pub fn limit_for(&self, action: ActionKind) -> u32 {
        match action {
            ActionKind::Comment => self.comments_per_minute,
            ActionKind::Review => self.reviews_per_minute,
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

fn default_comments_per_minute() -> u32 {
    3
}

fn default_reviews_per_minute() -> u32 {
    2
}

fn default_window_ms() -> u64 {
    60_000
}

fn default_cleanup_interval() -> u64 {
    60
}

/// Length bounds, in code points, applied by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    pub name_min: usize,
    pub name_max: usize,
    pub comment_min: usize,
    pub comment_max: usize,
    pub review_title_min: usize,
    pub review_title_max: usize,
    pub review_summary_min: usize,
    pub review_summary_max: usize,
    pub review_text_min: usize,
    pub review_text_max: usize,
    /// Bound for free-form optional fields (genre, status, ...)
    pub field_max: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            name_min: 2,
            name_max: 50,
            comment_min: 10,
            comment_max: 1000,
            review_title_min: 1,
            review_title_max: 100,
            review_summary_min: 10,
            review_summary_max: 500,
            review_text_min: 0,
            review_text_max: 2000,
            field_max: 1000,
        }
    }
}

/// Notification display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Delay before a banner is dismissed automatically
    #[serde(default = "default_dismiss_after")]
    pub dismiss_after_ms: u64,

    /// Messages are sanitized down to this many code points
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            dismiss_after_ms: default_dismiss_after(),
            max_message_len: default_max_message_len(),
        }
    }
}

impl NotificationSettings {
    pub fn dismiss_after(&self) -> Duration {
        Duration::from_millis(self.dismiss_after_ms)
    }
}

fn default_dismiss_after() -> u64 {
    4000
}

fn default_max_message_len() -> usize {
    200
}

/// Record persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// JSON document holding comments and reviews
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("gallery-gate.json")
}

impl GateConfig {
    /// Load configuration from an optional YAML file, overlaid with
    /// `GALLERY_GATE__*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            info!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| GateError::Config(format!("Failed to parse configuration: {}", e)))
    }
}
