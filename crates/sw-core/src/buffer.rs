//! Burst buffers and the completion rule.
//!
//! Every capture scope (the global service, and each field directive) owns
//! exactly one [`BurstBuffer`]. The buffer accumulates characters of the
//! current burst and is emptied by [`BurstBuffer::complete`] or
//! [`BurstBuffer::clear`], whichever comes first.
//!
//! # Completion Rule
//!
//! 1. A trailing terminator character is removed.
//! 2. Surrounding whitespace is trimmed.
//! 3. If at least [`CaptureConfig::min_code_length`] characters remain, the
//!    payload is emitted as a [`DecodedCode`]; otherwise it is discarded as
//!    ordinary typing.

use crate::clock::Timestamp;
use crate::config::CaptureConfig;
use crate::types::DecodedCode;

/// Outcome of evaluating a buffer for completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The buffer met the completion predicate.
    Emitted(DecodedCode),

    /// The buffer held too few characters to be a scan.
    Discarded {
        /// Number of payload characters that were dropped.
        chars: usize,
    },

    /// The buffer was already empty.
    Empty,
}

impl Completion {
    /// Returns the emitted code, if any.
    #[inline]
    #[must_use]
    pub fn into_code(self) -> Option<DecodedCode> {
        match self {
            Self::Emitted(code) => Some(code),
            Self::Discarded { .. } | Self::Empty => None,
        }
    }

    /// Returns `true` if a code was emitted.
    #[inline]
    #[must_use]
    pub const fn is_emitted(&self) -> bool {
        matches!(self, Self::Emitted(_))
    }
}

/// Ordered characters of the current burst.
///
/// # Examples
///
/// ```
/// use sw_core::{BurstBuffer, CaptureConfig, Completion, Timestamp};
///
/// let mut buffer = BurstBuffer::new();
/// for ch in "hello".chars() {
///     buffer.push(ch, Timestamp::ZERO);
/// }
/// assert_eq!(buffer.len(), 5);
///
/// // Five characters is below the default minimum of six.
/// assert_eq!(
///     buffer.complete(&CaptureConfig::default()),
///     Completion::Discarded { chars: 5 },
/// );
/// assert!(buffer.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct BurstBuffer {
    /// Accumulated characters.
    text: String,
    /// Character count (`text.len()` counts bytes).
    chars: usize,
    /// Instant of the first append of the current burst.
    first_append: Option<Timestamp>,
    /// Instant of the most recent append.
    last_append: Option<Timestamp>,
}

impl BurstBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a character observed at `at`.
    pub fn push(&mut self, ch: char, at: Timestamp) {
        if self.first_append.is_none() {
            self.first_append = Some(at);
        }
        self.text.push(ch);
        self.chars += 1;
        self.last_append = Some(at);
    }

    /// Returns the number of buffered characters.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.chars
    }

    /// Returns `true` if nothing is buffered.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.chars == 0
    }

    /// Returns the buffered text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the instant of the most recent append.
    #[inline]
    #[must_use]
    pub const fn last_append(&self) -> Option<Timestamp> {
        self.last_append
    }

    /// Returns the time between the first and the latest append.
    #[must_use]
    pub fn span_ms(&self) -> u64 {
        match (self.first_append, self.last_append) {
            (Some(first), Some(last)) => last.millis_since(first),
            _ => 0,
        }
    }

    /// Empties the buffer without evaluating it.
    pub fn clear(&mut self) {
        self.text.clear();
        self.chars = 0;
        self.first_append = None;
        self.last_append = None;
    }

    /// Evaluates the buffer against the completion rule and empties it.
    pub fn complete(&mut self, config: &CaptureConfig) -> Completion {
        if self.is_empty() {
            return Completion::Empty;
        }

        let outcome = {
            let payload = self.text.trim_end_matches(|c| config.is_terminator(c));
            match DecodedCode::new(payload) {
                Some(code) if code.char_len() >= config.min_code_length => {
                    Completion::Emitted(code)
                }
                Some(code) => Completion::Discarded {
                    chars: code.char_len(),
                },
                None => Completion::Discarded { chars: 0 },
            }
        };

        self.clear();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(buffer: &mut BurstBuffer, text: &str, start: u64, gap: u64) {
        let mut at = start;
        for ch in text.chars() {
            buffer.push(ch, Timestamp::from_millis(at));
            at += gap;
        }
    }

    #[test]
    fn test_push_tracks_times() {
        let mut buffer = BurstBuffer::new();
        fill(&mut buffer, "abc", 100, 5);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.as_str(), "abc");
        assert_eq!(buffer.last_append(), Some(Timestamp::from_millis(110)));
        assert_eq!(buffer.span_ms(), 10);
    }

    #[test]
    fn test_complete_emits_trimmed_payload() {
        let mut buffer = BurstBuffer::new();
        fill(&mut buffer, " 0123456789 ", 0, 2);
        let outcome = buffer.complete(&CaptureConfig::default());
        assert_eq!(outcome.into_code().unwrap().as_str(), "0123456789");
        assert!(buffer.is_empty());
        assert_eq!(buffer.last_append(), None);
    }

    #[test]
    fn test_complete_excludes_terminator_from_length() {
        let config = CaptureConfig::default();
        let mut buffer = BurstBuffer::new();
        fill(&mut buffer, "12345\n", 0, 2);
        assert_eq!(buffer.complete(&config), Completion::Discarded { chars: 5 });

        fill(&mut buffer, "123456\r", 0, 2);
        assert!(buffer.complete(&config).is_emitted());
    }

    #[test]
    fn test_complete_strips_non_whitespace_terminator() {
        let config = CaptureConfig {
            terminators: smallvec::smallvec!['#'],
            ..CaptureConfig::default()
        };
        let mut buffer = BurstBuffer::new();
        fill(&mut buffer, "ABC123456#", 0, 2);
        assert_eq!(
            buffer.complete(&config).into_code().unwrap().as_str(),
            "ABC123456"
        );
    }

    #[test]
    fn test_complete_whitespace_only() {
        let mut buffer = BurstBuffer::new();
        fill(&mut buffer, "      \n", 0, 2);
        assert_eq!(
            buffer.complete(&CaptureConfig::default()),
            Completion::Discarded { chars: 0 }
        );
    }

    #[test]
    fn test_complete_empty() {
        let mut buffer = BurstBuffer::new();
        assert_eq!(buffer.complete(&CaptureConfig::default()), Completion::Empty);
    }

    #[test]
    fn test_clear() {
        let mut buffer = BurstBuffer::new();
        fill(&mut buffer, "xyz", 0, 1);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.span_ms(), 0);
    }
}
