//! Event types for the console event loop.
//!
//! This module provides the [`Event`] enum representing everything the
//! console reacts to.
//!
//! # Event Sources
//!
//! - **Terminal**: key presses, bracketed pastes, window resizing
//! - **Timer**: periodic tick and render events from [`Tui`](crate::Tui)
//!
//! Idle-gap deadlines are not events: the run loop sleeps until the
//! dispatcher's next deadline alongside waiting for these.

use crossterm::event::KeyEvent;

/// Events that can be processed by the console.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Event {
    /// A key press event from the terminal.
    Key(KeyEvent),

    /// Text pasted into the terminal (bracketed paste).
    Paste(String),

    /// Terminal window was resized.
    Resize {
        /// New width in columns.
        width: u16,
        /// New height in rows.
        height: u16,
    },

    /// Periodic tick for housekeeping.
    ///
    /// The tick rate is configured via [`TuiConfig::tick_rate_ms`].
    ///
    /// [`TuiConfig::tick_rate_ms`]: sw_core::TuiConfig::tick_rate_ms
    Tick,

    /// Signal to render a new frame.
    Render,

    /// Focus gained by the terminal window.
    FocusGained,

    /// Focus lost by the terminal window.
    FocusLost,
}

impl Event {
    /// Returns `true` if this is a key event.
    #[inline]
    #[must_use]
    pub const fn is_key(&self) -> bool {
        matches!(self, Self::Key(_))
    }

    /// Returns `true` if this is a paste event.
    #[inline]
    #[must_use]
    pub const fn is_paste(&self) -> bool {
        matches!(self, Self::Paste(_))
    }

    /// Returns `true` if this is a tick event.
    #[inline]
    #[must_use]
    pub const fn is_tick(&self) -> bool {
        matches!(self, Self::Tick)
    }

    /// Returns the key event if this is a Key variant.
    #[inline]
    #[must_use]
    pub const fn as_key(&self) -> Option<&KeyEvent> {
        match self {
            Self::Key(key) => Some(key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn test_event_is_key() {
        let key_event = Event::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        assert!(key_event.is_key());
        assert!(!Event::Tick.is_key());
    }

    #[test]
    fn test_event_is_paste() {
        assert!(Event::Paste("4006381333931".to_owned()).is_paste());
        assert!(!Event::Render.is_paste());
    }

    #[test]
    fn test_event_as_key() {
        let event = Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(event.as_key().map(|k| k.code), Some(KeyCode::Enter));
        assert!(Event::Tick.as_key().is_none());
        assert!(Event::Tick.is_tick());
    }
}
