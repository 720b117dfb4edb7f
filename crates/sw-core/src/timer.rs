//! Cancellable idle-gap timer.
//!
//! A burst is considered finished once no character has arrived for the
//! configured idle gap. Rather than spawning and cancelling real timers on
//! every keystroke, each capture scope owns an [`IdleTimer`]: a single optional
//! deadline that is re-armed on each qualifying key and polled with the current
//! instant.
//!
//! ```text
//!  key ── arm(t) ──► deadline = t + gap
//!  key ── arm(t') ─► deadline = t' + gap      (previous deadline discarded)
//!  poll(now >= deadline) ──► fires once, timer disarmed
//! ```

use crate::clock::Timestamp;

/// A single re-armable deadline.
///
/// # Examples
///
/// ```
/// use sw_core::{IdleTimer, Timestamp};
///
/// let mut timer = IdleTimer::new(100);
/// timer.arm(Timestamp::from_millis(0));
/// timer.arm(Timestamp::from_millis(40)); // debounce: deadline moves to 140
///
/// assert!(!timer.fire(Timestamp::from_millis(120)));
/// assert!(timer.fire(Timestamp::from_millis(140)));
/// assert!(!timer.is_armed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleTimer {
    /// Idle gap in milliseconds.
    gap_ms: u64,
    /// Pending deadline, if armed.
    deadline: Option<Timestamp>,
}

impl IdleTimer {
    /// Creates a disarmed timer with the given gap.
    #[inline]
    #[must_use]
    pub const fn new(gap_ms: u64) -> Self {
        Self {
            gap_ms,
            deadline: None,
        }
    }

    /// Returns the configured gap in milliseconds.
    #[inline]
    #[must_use]
    pub const fn gap_ms(&self) -> u64 {
        self.gap_ms
    }

    /// Arms (or re-arms) the timer relative to `now` and returns the deadline.
    pub fn arm(&mut self, now: Timestamp) -> Timestamp {
        let deadline = now.add_millis(self.gap_ms);
        self.deadline = Some(deadline);
        deadline
    }

    /// Cancels the pending deadline. Returns `true` if the timer was armed.
    pub fn disarm(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Returns the pending deadline, if armed.
    #[inline]
    #[must_use]
    pub const fn deadline(&self) -> Option<Timestamp> {
        self.deadline
    }

    /// Returns `true` if a deadline is pending.
    #[inline]
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` if the timer is armed and its deadline has been reached.
    #[inline]
    #[must_use]
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Fires the timer if it is due, disarming it. Returns `true` on firing.
    pub fn fire(&mut self, now: Timestamp) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}
