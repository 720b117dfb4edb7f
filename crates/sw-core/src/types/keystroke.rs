//! Observed keystrokes.

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;

/// A single observed character and the instant it was observed.
///
/// Keystrokes are transient: they are appended to whichever
/// [`BurstBuffer`](crate::BurstBuffer) is accumulating and then dropped. Keys
/// that do not produce a character (modifiers, arrows, function keys) are never
/// turned into keystrokes by the host adapters.
///
/// # Examples
///
/// ```
/// use sw_core::{Keystroke, Timestamp};
///
/// let key = Keystroke::new('7', Timestamp::from_millis(12));
/// assert_eq!(key.ch, '7');
/// assert!(!key.is_control());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keystroke {
    /// The character delivered by the keyboard layer.
    pub ch: char,

    /// When the character was observed.
    pub at: Timestamp,
}

impl Keystroke {
    /// Creates a keystroke.
    #[inline]
    #[must_use]
    pub const fn new(ch: char, at: Timestamp) -> Self {
        Self { ch, at }
    }

    /// Returns `true` for control characters such as `\n`, `\r` or `\t`.
    #[inline]
    #[must_use]
    pub fn is_control(&self) -> bool {
        self.ch.is_control()
    }
}
