//! Error types for the sw-core crate.
//!
//! This module provides the [`ConfigError`] type for configuration-related errors
//! that can occur across the workspace. Classification outcomes of the capture
//! engine are never errors; only loading and parsing configuration can fail.

use camino::Utf8PathBuf;

/// Errors that can occur during configuration loading and parsing.
///
/// Degenerate numeric values are not errors: they are clamped by
/// [`CaptureConfig::sanitized`](crate::CaptureConfig::sanitized). This type
/// covers the remaining failures: a missing file, unreadable input, malformed
/// JSON, and option values that cannot be interpreted at all.
///
/// # Examples
///
/// ```
/// use sw_core::ConfigError;
/// use camino::Utf8PathBuf;
///
/// let error = ConfigError::NotFound(Utf8PathBuf::from("/etc/scanwedge.json"));
/// assert!(error.to_string().contains("/etc/scanwedge.json"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {0}")]
    NotFound(Utf8PathBuf),

    /// A configuration option has a value that cannot be interpreted.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// An I/O error occurred while reading configuration.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Creates a new [`ConfigError::InvalidOption`] error.
    #[must_use]
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let error = ConfigError::NotFound(Utf8PathBuf::from("/missing/config.json"));
        assert_eq!(
            error.to_string(),
            "configuration file not found: /missing/config.json"
        );
    }

    #[test]
    fn test_invalid_option_display() {
        let error = ConfigError::invalid_option("terminators", "unknown key name 'escape'");
        let msg = error.to_string();
        assert!(msg.contains("terminators"));
        assert!(msg.contains("escape"));
    }

    #[test]
    fn test_parse_error_from_serde() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error = ConfigError::from(err);
        assert!(error.to_string().starts_with("failed to parse configuration"));
    }
}
