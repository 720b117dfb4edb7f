//! Monotonic timestamps and clock sources.
//!
//! The capture engine never reads a clock on its own. Every keystroke, paste
//! and poll carries the [`Timestamp`] at which the host observed it, which
//! makes the burst classifier fully deterministic: tests and the `simulate`
//! command drive it with a [`ManualClock`], the console with a [`SystemClock`].

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Milliseconds on a monotonic clock.
///
/// The origin is arbitrary (typically the moment the host started); only
/// differences between timestamps carry meaning.
///
/// # Examples
///
/// ```
/// use sw_core::Timestamp;
///
/// let start = Timestamp::from_millis(1_000);
/// let later = start.add_millis(150);
/// assert_eq!(later.millis_since(start), 150);
/// assert_eq!(start.millis_since(later), 0);
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The clock origin.
    pub const ZERO: Self = Self(0);

    /// Creates a timestamp from milliseconds since the clock origin.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the milliseconds since the clock origin.
    #[inline]
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Returns this timestamp shifted forward by `millis`, saturating.
    #[inline]
    #[must_use]
    pub const fn add_millis(self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis))
    }

    /// Returns the milliseconds elapsed since `earlier`, or zero if `earlier`
    /// is in the future.
    #[inline]
    #[must_use]
    pub const fn millis_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// A source of [`Timestamp`]s.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Timestamp;
}

/// Wall-clock backed [`Clock`] measuring from its own creation.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose origin is the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Converts a [`Timestamp`] of this clock back into an [`Instant`].
    ///
    /// Used by async hosts to sleep until a timer deadline.
    #[must_use]
    pub fn instant_at(&self, at: Timestamp) -> Instant {
        self.origin + Duration::from_millis(at.as_millis())
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // Saturate rather than truncate; u64 milliseconds outlive any session.
        let millis = u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX);
        Timestamp::from_millis(millis)
    }
}

/// Virtual [`Clock`] advanced explicitly.
///
/// Clones share the same underlying time, so a test can hand one clone to the
/// code under test and advance another.
///
/// # Examples
///
/// ```
/// use sw_core::{Clock, ManualClock, Timestamp};
///
/// let clock = ManualClock::new();
/// let observer = clock.clone();
///
/// clock.advance(120);
/// assert_eq!(observer.now(), Timestamp::from_millis(120));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    /// Creates a clock at [`Timestamp::ZERO`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock starting at `start`.
    #[must_use]
    pub fn starting_at(start: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Moves the clock forward by `millis` and returns the new instant.
    pub fn advance(&self, millis: u64) -> Timestamp {
        let mut now = self.now.lock();
        *now = now.add_millis(millis);
        *now
    }

    /// Sets the clock to `at`. Moving backwards is ignored.
    pub fn set(&self, at: Timestamp) {
        let mut now = self.now.lock();
        if at > *now {
            *now = at;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}
