//! Completed barcode payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A fully assembled barcode payload.
///
/// The payload is opaque: the engine does not know or care which symbology
/// produced it. A `DecodedCode` is never empty and never carries leading or
/// trailing whitespace. It is cloned to every subscriber.
///
/// # Examples
///
/// ```
/// use sw_core::DecodedCode;
///
/// let code = DecodedCode::new("  4006381333931\n").unwrap();
/// assert_eq!(code.as_str(), "4006381333931");
/// assert_eq!(code.char_len(), 13);
/// assert!(code.is_numeric());
///
/// assert!(DecodedCode::new(" \r\n").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecodedCode(String);

impl DecodedCode {
    /// Creates a code from raw text, trimming surrounding whitespace.
    ///
    /// Returns `None` if nothing remains after trimming.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    /// Returns the payload.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the code, returning the payload.
    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns the number of characters in the payload.
    #[inline]
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    /// Returns `true` if every character is an ASCII digit.
    #[inline]
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.0.chars().all(|c| c.is_ascii_digit())
    }
}

impl fmt::Display for DecodedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DecodedCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_trims() {
        let code = DecodedCode::new("\tABC-123 \r").unwrap();
        assert_eq!(code.as_str(), "ABC-123");
        assert_eq!(code.to_string(), "ABC-123");
    }

    #[test]
    fn test_code_rejects_blank() {
        assert!(DecodedCode::new("").is_none());
        assert!(DecodedCode::new("   ").is_none());
    }

    #[test]
    fn test_code_char_len_counts_chars_not_bytes() {
        let code = DecodedCode::new("ÄÖÜ123").unwrap();
        assert_eq!(code.char_len(), 6);
        assert!(!code.is_numeric());
    }

    #[test]
    fn test_code_serializes_as_string() {
        let code = DecodedCode::new("0123456789").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), r#""0123456789""#);
    }
}
