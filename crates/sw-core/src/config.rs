//! Configuration structures for scanwedge.
//!
//! This module provides configuration types for all components:
//!
//! - [`CaptureConfig`] - Burst classification thresholds and terminators
//! - [`BroadcastConfig`] - Capacity of the completed-code broadcast channel
//! - [`TuiConfig`] - Console settings (tick rate, colors, log file)
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`] and deserialize with
//! `#[serde(default)]`, so a configuration file only needs the keys it
//! changes. Degenerate values are clamped rather than rejected; see
//! [`CaptureConfig::sanitized`].

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use tracing::warn;

use crate::error::ConfigError;

/// Smallest accepted `min_code_length`.
///
/// Anything lower would let short bursts of fast typing (or a single key)
/// complete as a scan.
pub const MIN_CODE_LENGTH_FLOOR: usize = 4;

/// Smallest accepted idle gap in milliseconds.
pub const IDLE_GAP_MIN_MS: u64 = 10;

/// Largest accepted idle gap in milliseconds.
pub const IDLE_GAP_MAX_MS: u64 = 2_000;

/// Color scheme for the console.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ColorScheme {
    /// Automatically detect based on terminal settings.
    #[default]
    Auto,
    /// Light color scheme (dark text on light background).
    Light,
    /// Dark color scheme (light text on dark background).
    Dark,
}

/// Thresholds that separate scanner bursts from human typing.
///
/// # Examples
///
/// ```
/// use sw_core::CaptureConfig;
///
/// let config = CaptureConfig::default();
/// assert_eq!(config.idle_gap_ms, 100);
/// assert_eq!(config.min_code_length, 6);
/// assert!(config.is_terminator('\n'));
/// assert!(config.numeric_only);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Maximum milliseconds between two characters of the same burst.
    pub idle_gap_ms: u64,

    /// Minimum payload length before a burst is treated as a scan.
    pub min_code_length: usize,

    /// Characters that force-complete a burst immediately.
    pub terminators: SmallVec<[char; 2]>,

    /// Whether the paste fast path only admits all-digit text.
    pub numeric_only: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            idle_gap_ms: 100,
            min_code_length: 6,
            terminators: smallvec!['\n', '\r'],
            numeric_only: true,
        }
    }
}

impl CaptureConfig {
    /// Returns `true` if `ch` force-completes a burst.
    #[inline]
    #[must_use]
    pub fn is_terminator(&self, ch: char) -> bool {
        self.terminators.contains(&ch)
    }

    /// Returns a copy with degenerate values clamped to safe bounds.
    ///
    /// - `min_code_length` is raised to [`MIN_CODE_LENGTH_FLOOR`]
    /// - `idle_gap_ms` is held within [`IDLE_GAP_MIN_MS`]..=[`IDLE_GAP_MAX_MS`]
    ///
    /// Each adjustment is logged as a warning.
    ///
    /// # Examples
    ///
    /// ```
    /// use sw_core::{CaptureConfig, MIN_CODE_LENGTH_FLOOR};
    ///
    /// let config = CaptureConfig { min_code_length: 0, idle_gap_ms: 0, ..Default::default() };
    /// let clamped = config.sanitized();
    /// assert_eq!(clamped.min_code_length, MIN_CODE_LENGTH_FLOOR);
    /// assert_eq!(clamped.idle_gap_ms, 10);
    /// ```
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if self.min_code_length < MIN_CODE_LENGTH_FLOOR {
            warn!(
                requested = self.min_code_length,
                clamped = MIN_CODE_LENGTH_FLOOR,
                "min_code_length below floor; clamping"
            );
            self.min_code_length = MIN_CODE_LENGTH_FLOOR;
        }

        let gap = self.idle_gap_ms.clamp(IDLE_GAP_MIN_MS, IDLE_GAP_MAX_MS);
        if gap != self.idle_gap_ms {
            warn!(
                requested = self.idle_gap_ms,
                clamped = gap,
                "idle_gap_ms out of range; clamping"
            );
            self.idle_gap_ms = gap;
        }

        let mut seen = SmallVec::<[char; 2]>::new();
        self.terminators.retain(|ch| {
            if seen.contains(ch) {
                false
            } else {
                seen.push(*ch);
                true
            }
        });
        self
    }
}

/// Parses a terminator given by name or as a single character.
///
/// Recognized names (case-insensitive): `enter`, `lf`, `cr`, `tab`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidOption`] if `value` is neither a known name
/// nor exactly one character.
///
/// # Examples
///
/// ```
/// use sw_core::config::parse_terminator;
///
/// assert_eq!(parse_terminator("enter").unwrap(), '\n');
/// assert_eq!(parse_terminator("TAB").unwrap(), '\t');
/// assert_eq!(parse_terminator("#").unwrap(), '#');
/// assert!(parse_terminator("escape").is_err());
/// ```
pub fn parse_terminator(value: &str) -> Result<char, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "enter" | "lf" | "newline" => Ok('\n'),
        "cr" | "return" => Ok('\r'),
        "tab" => Ok('\t'),
        _ => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => Ok(ch),
                _ => Err(ConfigError::invalid_option(
                    "terminators",
                    format!("unknown terminator '{value}'"),
                )),
            }
        }
    }
}

/// Configuration for the completed-code broadcast channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Number of codes a slow subscriber may fall behind before it starts
    /// skipping the oldest ones.
    pub channel_capacity: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}

/// Configuration for the terminal console.
///
/// # Examples
///
/// ```
/// use sw_core::{ColorScheme, TuiConfig};
///
/// let config = TuiConfig::default();
/// assert_eq!(config.tick_rate_ms, 250);
/// assert_eq!(config.color_scheme, ColorScheme::Auto);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// UI refresh rate in milliseconds.
    pub tick_rate_ms: u64,

    /// Frames rendered per second.
    pub frame_rate: u32,

    /// Color scheme for the interface.
    pub color_scheme: ColorScheme,

    /// File receiving log output while the console owns the terminal.
    pub log_file: Option<Utf8PathBuf>,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            frame_rate: 30,
            color_scheme: ColorScheme::Auto,
            log_file: None,
        }
    }
}

/// Root configuration for scanwedge.
///
/// # Examples
///
/// ```
/// use sw_core::Config;
///
/// let config = Config::from_json_str(r#"{"capture": {"min_code_length": 8}}"#).unwrap();
/// assert_eq!(config.capture.min_code_length, 8);
/// assert_eq!(config.capture.idle_gap_ms, 100);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Burst classification settings.
    pub capture: CaptureConfig,

    /// Broadcast channel settings.
    pub broadcast: BroadcastConfig,

    /// Console settings.
    pub tui: TuiConfig,
}

impl Config {
    /// Parses a configuration from JSON and clamps degenerate values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the JSON is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Loads a configuration file and clamps degenerate values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file does not exist,
    /// [`ConfigError::Io`] if it cannot be read, and [`ConfigError::Parse`]
    /// if it is not valid JSON.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_owned()));
        }
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Returns a copy with every section clamped to safe bounds.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.capture = self.capture.sanitized();
        if self.broadcast.channel_capacity == 0 {
            warn!("broadcast channel_capacity of 0; using 1");
            self.broadcast.channel_capacity = 1;
        }
        if self.tui.frame_rate == 0 {
            self.tui.frame_rate = TuiConfig::default().frame_rate;
        }
        if self.tui.tick_rate_ms == 0 {
            self.tui.tick_rate_ms = TuiConfig::default().tick_rate_ms;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_config_defaults() {
        let config = CaptureConfig::default();
        assert_eq!(config.idle_gap_ms, 100);
        assert_eq!(config.min_code_length, 6);
        assert_eq!(config.terminators.as_slice(), &['\n', '\r']);
        assert!(config.numeric_only);
    }

    #[test]
    fn test_sanitized_keeps_valid_values() {
        let config = CaptureConfig {
            idle_gap_ms: 150,
            min_code_length: 8,
            ..CaptureConfig::default()
        };
        assert_eq!(config.clone().sanitized(), config);
    }

    #[test]
    fn test_sanitized_clamps_degenerate_values() {
        let config = CaptureConfig {
            idle_gap_ms: 60_000,
            min_code_length: 1,
            terminators: smallvec!['\n', '\n'],
            numeric_only: false,
        }
        .sanitized();
        assert_eq!(config.idle_gap_ms, IDLE_GAP_MAX_MS);
        assert_eq!(config.min_code_length, MIN_CODE_LENGTH_FLOOR);
        assert_eq!(config.terminators.as_slice(), &['\n']);
    }

    #[test]
    fn test_sanitized_drops_scattered_duplicate_terminators() {
        let config = CaptureConfig {
            terminators: smallvec!['\n', '\r', '\n', '\t', '\r'],
            ..CaptureConfig::default()
        }
        .sanitized();
        assert_eq!(config.terminators.as_slice(), &['\n', '\r', '\t']);
    }

    #[test]
    fn test_parse_terminator_names() {
        assert_eq!(parse_terminator("Enter").unwrap(), '\n');
        assert_eq!(parse_terminator("cr").unwrap(), '\r');
        assert_eq!(parse_terminator("tab").unwrap(), '\t');
        assert_eq!(parse_terminator(";").unwrap(), ';');
        assert!(matches!(
            parse_terminator("ab"),
            Err(ConfigError::InvalidOption { .. })
        ));
        assert!(parse_terminator("").is_err());
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = Config::from_json_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"capture": {"idle_gap_ms": 150}}"#;
        let config = Config::from_json_str(json).unwrap();
        assert_eq!(config.capture.idle_gap_ms, 150);
        assert_eq!(config.capture.min_code_length, 6);
        assert_eq!(config.broadcast.channel_capacity, 64);
        assert_eq!(config.tui.tick_rate_ms, 250);
    }

    #[test]
    fn test_config_from_json_clamps() {
        let json = r#"{"capture": {"min_code_length": 0}, "broadcast": {"channel_capacity": 0}}"#;
        let config = Config::from_json_str(json).unwrap();
        assert_eq!(config.capture.min_code_length, MIN_CODE_LENGTH_FLOOR);
        assert_eq!(config.broadcast.channel_capacity, 1);
    }

    #[test]
    fn test_config_terminators_from_json() {
        let json = r#"{"capture": {"terminators": ["\t"]}}"#;
        let config = Config::from_json_str(json).unwrap();
        assert!(config.capture.is_terminator('\t'));
        assert!(!config.capture.is_terminator('\n'));
    }

    #[test]
    fn test_config_load_missing_file() {
        let result = Config::load(Utf8Path::new("/definitely/not/here/scanwedge.json"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("scanwedge.json")).unwrap();
        fs::write(&path, r#"{"capture": {"numeric_only": false}, "tui": {"color_scheme": "dark"}}"#)
            .unwrap();

        let config = Config::load(&path).unwrap();
        assert!(!config.capture.numeric_only);
        assert_eq!(config.tui.color_scheme, ColorScheme::Dark);
    }

    #[test]
    fn test_config_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("broken.json")).unwrap();
        fs::write(&path, "{ capture: ").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_default_capture_snapshot() {
        insta::assert_json_snapshot!(CaptureConfig::default(), @r#"
        {
          "idle_gap_ms": 100,
          "min_code_length": 6,
          "terminators": [
            "\n",
            "\r"
          ],
          "numeric_only": true
        }
        "#);
    }
}
