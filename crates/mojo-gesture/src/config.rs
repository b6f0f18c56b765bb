#![forbid(unsafe_code)]

//! Tunable thresholds and timeouts for gesture recognition.
//!
//! Captures every constant the recognizer depends on as a single
//! [`GestureConfig`] that can be loaded from TOML or JSON at startup when the
//! `config` feature is enabled.
//!
//! # Loading
//!
//! ```toml
//! # mojo-gesture.toml
//! hold_timeout_ms = 650
//! filter_distance = 16
//! highlight_class = "pressed"
//! ```
//!
//! ```rust,ignore
//! let config = GestureConfig::from_toml_file("mojo-gesture.toml")?;
//! let config = GestureConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! Every field defaults to the documented platform constant, so
//! `GestureConfig::default()` reproduces stock behavior.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};
use web_time::Duration;

/// Default hold timeout.
pub const DEFAULT_HOLD_TIMEOUT_MS: u64 = 500;
/// Default delay before `delayed` feedback highlights.
pub const DEFAULT_HIGHLIGHT_DELAY_MS: u64 = 120;
/// Default length of the `spontaneous` tap flash.
pub const DEFAULT_TAP_FLASH_MS: u64 = 100;
/// Per-axis jitter filter distance in pixels.
pub const DEFAULT_FILTER_DISTANCE: i32 = 12;
/// Velocity magnitude (px/s) on either axis above which release is a flick.
pub const DEFAULT_FLICK_THRESHOLD: f64 = 300.0;
/// Weight of the most recent raw velocity sample.
pub const DEFAULT_VELOCITY_RECENT_WEIGHT: f64 = 0.7;
/// Class applied to the element showing touch feedback.
pub const DEFAULT_HIGHLIGHT_CLASS: &str = "selected";

/// Thresholds and timeouts for gesture recognition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct GestureConfig {
    /// Stationary press duration before `hold` fires (default: 500ms).
    pub hold_timeout_ms: u64,
    /// Delay before `delayed` feedback is shown (default: 120ms).
    pub highlight_delay_ms: u64,
    /// How long a `spontaneous` tap flash stays visible (default: 100ms).
    pub tap_flash_ms: u64,
    /// Distance an axis must exceed before it reports movement (default: 12px).
    pub filter_distance: i32,
    /// Flick velocity threshold in px/s (default: 300).
    pub flick_threshold: f64,
    /// Weight of the newest velocity sample; the previous gets the remainder
    /// (default: 0.7).
    pub velocity_recent_weight: f64,
    /// Class toggled for touch feedback (default: `selected`).
    pub highlight_class: String,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            hold_timeout_ms: DEFAULT_HOLD_TIMEOUT_MS,
            highlight_delay_ms: DEFAULT_HIGHLIGHT_DELAY_MS,
            tap_flash_ms: DEFAULT_TAP_FLASH_MS,
            filter_distance: DEFAULT_FILTER_DISTANCE,
            flick_threshold: DEFAULT_FLICK_THRESHOLD,
            velocity_recent_weight: DEFAULT_VELOCITY_RECENT_WEIGHT,
            highlight_class: DEFAULT_HIGHLIGHT_CLASS.to_owned(),
        }
    }
}

impl GestureConfig {
    /// Hold timeout as a duration.
    #[inline]
    #[must_use]
    pub fn hold_timeout(&self) -> Duration {
        Duration::from_millis(self.hold_timeout_ms)
    }

    /// Highlight delay as a duration.
    #[inline]
    #[must_use]
    pub fn highlight_delay(&self) -> Duration {
        Duration::from_millis(self.highlight_delay_ms)
    }

    /// Tap flash length as a duration.
    #[inline]
    #[must_use]
    pub fn tap_flash(&self) -> Duration {
        Duration::from_millis(self.tap_flash_ms)
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.checked()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.checked()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.hold_timeout_ms == 0 {
            errors.push("hold_timeout_ms must be > 0".into());
        }

        if self.filter_distance < 0 {
            errors.push(format!(
                "filter_distance must be >= 0, got {}",
                self.filter_distance
            ));
        }

        if self.flick_threshold.is_nan() || self.flick_threshold <= 0.0 {
            errors.push(format!(
                "flick_threshold must be > 0, got {}",
                self.flick_threshold
            ));
        }

        // Weight in [0, 1]
        if !(0.0..=1.0).contains(&self.velocity_recent_weight) {
            errors.push(format!(
                "velocity_recent_weight must be in [0, 1], got {}",
                self.velocity_recent_weight
            ));
        }

        if self.highlight_class.trim().is_empty() {
            errors.push("highlight_class must not be empty".into());
        }

        errors
    }

    #[cfg(feature = "config")]
    fn checked(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a gesture configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
