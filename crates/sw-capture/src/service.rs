//! The process-wide capture service.
//!
//! [`GlobalCaptureService`] is the document-level keystroke listener. It sees
//! every character the host observes, groups them into bursts with a single
//! [`BurstBuffer`] and [`IdleTimer`], and publishes each burst that meets the
//! completion rule on its [`CodeHub`].
//!
//! # Algorithm
//!
//! ```text
//!  on_key(ch, at)
//!    │
//!    ├─ timer due at `at`?  ──► complete previous burst first
//!    ├─ disarm timer
//!    ├─ append ch
//!    ├─ ch is terminator?   ──► complete now (timer stays disarmed)
//!    └─ otherwise           ──► arm timer for idle_gap_ms
//!
//!  poll(now)
//!    └─ timer due?          ──► complete
//! ```
//!
//! The service never reads a clock. Hosts pass the instant of each event and
//! call [`GlobalCaptureService::poll`] once [`next_deadline`] has passed.
//!
//! [`next_deadline`]: GlobalCaptureService::next_deadline

use sw_core::{
    BroadcastConfig, BurstBuffer, CaptureConfig, Completion, DecodedCode, IdleTimer, Keystroke,
    Timestamp,
};
use tracing::{debug, trace};

use crate::hub::{CodeHub, CodeSubscription};
use crate::stats::CaptureStats;

/// What caused a burst to be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    IdleGap,
    Terminator,
}

/// Process-wide keystroke burst classifier and code broadcaster.
///
/// # Examples
///
/// ```
/// use sw_capture::GlobalCaptureService;
/// use sw_core::{BroadcastConfig, CaptureConfig, Keystroke, Timestamp};
///
/// let mut service = GlobalCaptureService::new(CaptureConfig::default(), &BroadcastConfig::default());
/// let mut codes = service.subscribe();
///
/// // A scanner types ten digits 2ms apart.
/// for (i, ch) in "0123456789".chars().enumerate() {
///     service.on_key(Keystroke::new(ch, Timestamp::from_millis(i as u64 * 2)));
/// }
///
/// // 150ms of silence lets the idle timer fire.
/// let code = service.poll(Timestamp::from_millis(168)).unwrap();
/// assert_eq!(code.as_str(), "0123456789");
/// assert_eq!(codes.try_next(), Some(code));
/// ```
#[derive(Debug)]
pub struct GlobalCaptureService {
    config: CaptureConfig,
    buffer: BurstBuffer,
    timer: IdleTimer,
    hub: CodeHub,
    stats: CaptureStats,
}

impl GlobalCaptureService {
    /// Creates a service. Degenerate `config` values are clamped.
    #[must_use]
    pub fn new(config: CaptureConfig, broadcast: &BroadcastConfig) -> Self {
        let config = config.sanitized();
        Self {
            timer: IdleTimer::new(config.idle_gap_ms),
            config,
            buffer: BurstBuffer::new(),
            hub: CodeHub::new(broadcast.channel_capacity),
            stats: CaptureStats::default(),
        }
    }

    /// Returns the effective (clamped) configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Returns a live subscription to completed codes.
    ///
    /// Only codes completed after this call are received.
    #[must_use]
    pub fn subscribe(&self) -> CodeSubscription {
        self.hub.subscribe()
    }

    /// Returns a handle to the broadcast hub.
    #[must_use]
    pub fn hub(&self) -> CodeHub {
        self.hub.clone()
    }

    /// Feeds one observed character.
    ///
    /// Returns the code completed by this call, if any. That is either the
    /// previous burst (whose idle deadline had already passed) or the current
    /// burst (completed by a terminator); never both, since a flushed buffer
    /// restarts with a single character and a lone terminator is discarded.
    pub fn on_key(&mut self, key: Keystroke) -> Option<DecodedCode> {
        let flushed = self.poll(key.at);

        self.stats.keystrokes += 1;
        self.timer.disarm();
        self.buffer.push(key.ch, key.at);

        if self.config.is_terminator(key.ch) {
            let completed = self.complete(Trigger::Terminator);
            return flushed.or(completed);
        }

        self.timer.arm(key.at);
        flushed
    }

    /// Fires the idle timer if its deadline has been reached at `now`.
    pub fn poll(&mut self, now: Timestamp) -> Option<DecodedCode> {
        if self.timer.fire(now) {
            self.complete(Trigger::IdleGap)
        } else {
            None
        }
    }

    /// Returns the pending idle deadline, if a burst is in progress.
    #[inline]
    #[must_use]
    pub const fn next_deadline(&self) -> Option<Timestamp> {
        self.timer.deadline()
    }

    /// Publishes `code` immediately, bypassing the timing heuristic.
    ///
    /// The code is trimmed first. Returns `false` (and publishes nothing) if
    /// it is blank or shorter than `min_code_length`.
    pub fn inject_code(&mut self, code: &str) -> bool {
        match DecodedCode::new(code) {
            Some(code) if code.char_len() >= self.config.min_code_length => {
                debug!(code = %code, "Injected code");
                self.stats.injected_codes += 1;
                self.hub.publish(code);
                true
            }
            _ => {
                trace!(len = code.trim().chars().count(), "Injected code rejected");
                false
            }
        }
    }

    /// Returns the text of the burst in progress.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> &str {
        self.buffer.as_str()
    }

    /// Returns a snapshot of the capture counters.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> CaptureStats {
        self.stats
    }

    /// Drops the burst in progress without evaluating it.
    pub fn reset(&mut self) {
        self.timer.disarm();
        self.buffer.clear();
    }

    fn complete(&mut self, trigger: Trigger) -> Option<DecodedCode> {
        let span_ms = self.buffer.span_ms();
        let outcome = self.buffer.complete(&self.config);

        if trigger == Trigger::Terminator && outcome != Completion::Empty {
            self.stats.terminated_bursts += 1;
        }

        match outcome {
            Completion::Emitted(code) => {
                self.stats.codes_emitted += 1;
                let receivers = self.hub.publish(code.clone());
                debug!(code = %code, span_ms, receivers, ?trigger, "Burst completed as code");
                Some(code)
            }
            Completion::Discarded { chars } => {
                self.stats.bursts_discarded += 1;
                trace!(chars, span_ms, ?trigger, "Burst discarded as typing");
                None
            }
            Completion::Empty => None,
        }
    }
}
