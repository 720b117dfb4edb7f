//! Core types, configuration, and timing primitives for scanwedge.
//!
//! This crate provides the foundational pieces shared by the capture service,
//! the per-field directives, and the console front end:
//!
//! - [`CaptureConfig`] and the root [`Config`], with clamping of degenerate values
//! - [`ConfigError`] for configuration loading failures
//! - [`Timestamp`], [`Clock`], [`SystemClock`] and [`ManualClock`]
//! - [`IdleTimer`], an explicit arm/disarm debounce deadline
//! - [`BurstBuffer`] and the completion rule shared by every capture scope
//! - Domain types ([`Keystroke`], [`DecodedCode`], [`ElementId`])
//!
//! # Crate Dependencies
//!
//! ```text
//! sw-cli ──► sw-tui ──► sw-field ──► sw-capture ──► sw-core
//! ```
//!
//! # Example
//!
//! ```
//! use sw_core::{BurstBuffer, CaptureConfig, Completion, Timestamp};
//!
//! let config = CaptureConfig::default();
//! let mut buffer = BurstBuffer::new();
//! for (i, ch) in "0123456789".chars().enumerate() {
//!     buffer.push(ch, Timestamp::from_millis(i as u64 * 2));
//! }
//!
//! match buffer.complete(&config) {
//!     Completion::Emitted(code) => assert_eq!(code.as_str(), "0123456789"),
//!     other => panic!("unexpected {other:?}"),
//! }
//! assert!(buffer.is_empty());
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod buffer;
pub mod clock;
pub mod config;
pub mod error;
pub mod timer;
pub mod types;

pub use buffer::{BurstBuffer, Completion};
pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use config::{
    BroadcastConfig, CaptureConfig, ColorScheme, Config, TuiConfig, IDLE_GAP_MAX_MS,
    IDLE_GAP_MIN_MS, MIN_CODE_LENGTH_FLOOR,
};
pub use error::ConfigError;
pub use timer::IdleTimer;
pub use types::{DecodedCode, ElementId, Keystroke};
