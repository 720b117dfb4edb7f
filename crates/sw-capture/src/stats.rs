//! Capture statistics.
//!
//! Counters describing how the burst classifier has treated its input so far.
//! Misclassifications are the only failure mode of the engine, so these
//! numbers are what an operator looks at when tuning [`CaptureConfig`].
//!
//! [`CaptureConfig`]: sw_core::CaptureConfig

use serde::{Deserialize, Serialize};

/// Snapshot of capture counters.
///
/// # Examples
///
/// ```
/// use sw_capture::CaptureStats;
///
/// let stats = CaptureStats { codes_emitted: 3, bursts_discarded: 1, ..Default::default() };
/// assert_eq!(stats.completions(), 4);
/// assert!((stats.scan_ratio() - 0.75).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureStats {
    /// Characters observed.
    pub keystrokes: u64,

    /// Bursts that completed as codes.
    pub codes_emitted: u64,

    /// Bursts discarded as ordinary typing.
    pub bursts_discarded: u64,

    /// Bursts completed by a terminator rather than the idle timer.
    pub terminated_bursts: u64,

    /// Codes delivered through manual injection.
    pub injected_codes: u64,
}

impl CaptureStats {
    /// Returns the number of non-empty bursts evaluated.
    #[must_use]
    pub const fn completions(&self) -> u64 {
        self.codes_emitted + self.bursts_discarded
    }

    /// Returns the fraction of evaluated bursts that were scans.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Counters stay far below 2^52
    pub fn scan_ratio(&self) -> f64 {
        let total = self.completions();
        if total == 0 {
            0.0
        } else {
            self.codes_emitted as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats() {
        let stats = CaptureStats::default();
        assert_eq!(stats.completions(), 0);
        assert!(stats.scan_ratio().abs() < f64::EPSILON);
    }

    #[test]
    fn test_stats_snapshot() {
        let stats = CaptureStats {
            keystrokes: 22,
            codes_emitted: 2,
            bursts_discarded: 1,
            terminated_bursts: 1,
            injected_codes: 0,
        };
        insta::assert_json_snapshot!(stats, @r#"
        {
          "keystrokes": 22,
          "codes_emitted": 2,
          "bursts_discarded": 1,
          "terminated_bursts": 1,
          "injected_codes": 0
        }
        "#);
    }
}
