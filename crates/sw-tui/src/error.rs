//! Console error types.
//!
//! This module provides the [`TuiError`] type for errors that can occur
//! while the console owns the terminal.

use thiserror::Error;

/// Errors that can occur in the console.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TuiError {
    /// Terminal initialization or operation failed.
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    /// Event channel was closed unexpectedly.
    #[error("event channel closed unexpectedly")]
    ChannelClosed,
}

impl TuiError {
    /// Returns `true` if the terminal itself failed.
    ///
    /// The terminal may be left in raw mode after such an error.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }
}
