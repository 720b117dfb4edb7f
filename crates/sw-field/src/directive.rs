//! Per-field scan directive.
//!
//! A [`FieldScanDirective`] is attached to one input element and decides
//! which codes that element receives. It has three inputs:
//!
//! 1. **Local keystrokes** typed into the element, grouped by its own
//!    [`BurstBuffer`] and [`IdleTimer`].
//! 2. **Pastes** into the element, admitted atomically when they look like a
//!    code (the paste fast path).
//! 3. **Broadcasts** from the global service, admitted only while the
//!    directive's [`FocusScope`] is active.
//!
//! # Linked vs Standalone
//!
//! A *linked* directive subscribes to a [`GlobalCaptureService`], which owns
//! the completion decision for keystrokes. Its local buffer only debounces:
//! timeouts and terminators clear it without emitting. A *standalone*
//! directive has no subscription and completes bursts from its local buffer
//! with the same rule the global service uses.
//!
//! # States
//!
//! ```text
//!            first key              timeout / terminator
//!   Idle ─────────────► Buffering ──────────────────────► Idle (discarded)
//!                           │
//!                           └── threshold met ──► Emitting ──► Idle
//! ```
//!
//! Focus gating is orthogonal to this state machine.

use std::sync::Arc;

use smallvec::SmallVec;
use sw_capture::{CodeSubscription, GlobalCaptureService};
use sw_core::{
    BurstBuffer, CaptureConfig, Completion, DecodedCode, ElementId, IdleTimer, Keystroke, Timestamp,
};
use tracing::{debug, trace};

use crate::focus::{FocusProbe, FocusScope};

/// Buffering state of a directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DirectiveState {
    /// No burst in progress.
    #[default]
    Idle,
    /// A burst is accumulating in the local buffer.
    Buffering,
    /// A code is being emitted. Only observable while an emission is in
    /// flight; the directive returns to `Idle` before its handler returns.
    Emitting,
}

/// Result of offering a paste to a directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteOutcome {
    /// The paste is a code: the default paste action is suppressed.
    Intercepted(DecodedCode),
    /// The paste is ordinary text and should be inserted as usual.
    PassThrough,
}

impl PasteOutcome {
    /// Returns `true` if the paste was intercepted.
    #[inline]
    #[must_use]
    pub const fn is_intercepted(&self) -> bool {
        matches!(self, Self::Intercepted(_))
    }
}

/// Scopes barcode delivery to one input element.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use sw_capture::GlobalCaptureService;
/// use sw_core::{BroadcastConfig, CaptureConfig, ElementId};
/// use sw_field::{FieldScanDirective, FocusScope, FocusTracker};
///
/// let mut service = GlobalCaptureService::new(CaptureConfig::default(), &BroadcastConfig::default());
/// let focus = FocusTracker::new();
/// let mut field = FieldScanDirective::linked(
///     FocusScope::new(ElementId(1)),
///     &service,
///     Arc::new(focus.clone()),
/// );
///
/// focus.focus(ElementId(1), []);
/// assert!(service.inject_code("4006381333931"));
///
/// let codes = field.pump();
/// assert_eq!(codes[0].as_str(), "4006381333931");
/// ```
pub struct FieldScanDirective {
    scope: FocusScope,
    config: CaptureConfig,
    buffer: BurstBuffer,
    timer: IdleTimer,
    subscription: Option<CodeSubscription>,
    linked: bool,
    focus: Arc<dyn FocusProbe>,
    state: DirectiveState,
    torn_down: bool,
}

impl std::fmt::Debug for FieldScanDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldScanDirective")
            .field("scope", &self.scope)
            .field("linked", &self.linked)
            .field("state", &self.state)
            .field("pending", &self.buffer.as_str())
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}

impl FieldScanDirective {
    /// Creates a directive subscribed to `service`.
    ///
    /// The directive adopts the service's effective configuration.
    #[must_use]
    pub fn linked(
        scope: FocusScope,
        service: &GlobalCaptureService,
        focus: Arc<dyn FocusProbe>,
    ) -> Self {
        let mut directive = Self::build(scope, service.config().clone(), focus);
        directive.subscription = Some(service.subscribe());
        directive.linked = true;
        directive
    }

    /// Creates a directive that completes bursts from its own buffer.
    ///
    /// Degenerate `config` values are clamped.
    #[must_use]
    pub fn standalone(scope: FocusScope, config: CaptureConfig, focus: Arc<dyn FocusProbe>) -> Self {
        Self::build(scope, config.sanitized(), focus)
    }

    fn build(scope: FocusScope, config: CaptureConfig, focus: Arc<dyn FocusProbe>) -> Self {
        Self {
            scope,
            timer: IdleTimer::new(config.idle_gap_ms),
            config,
            buffer: BurstBuffer::new(),
            subscription: None,
            linked: false,
            focus,
            state: DirectiveState::Idle,
            torn_down: false,
        }
    }

    /// Returns the directive's focus scope.
    #[inline]
    #[must_use]
    pub const fn scope(&self) -> &FocusScope {
        &self.scope
    }

    /// Extends the scope with a watched container.
    pub fn watch_container(&mut self, container: ElementId) {
        self.scope.watch(container);
    }

    /// Returns the effective configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Returns `true` if the directive is subscribed to a global service.
    #[inline]
    #[must_use]
    pub const fn is_linked(&self) -> bool {
        self.linked
    }

    /// Returns the current buffering state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> DirectiveState {
        self.state
    }

    /// Returns `true` once [`teardown`](Self::teardown) has run.
    #[inline]
    #[must_use]
    pub const fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Returns the text of the local burst in progress.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> &str {
        self.buffer.as_str()
    }

    /// Returns `true` if the directive's scope is the active target.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.focus.is_active(&self.scope)
    }

    /// Handles a keystroke typed into the element.
    ///
    /// Only a standalone directive ever returns a code here.
    pub fn on_key(&mut self, key: Keystroke) -> Option<DecodedCode> {
        if self.torn_down {
            return None;
        }

        let flushed = self.poll(key.at);

        self.timer.disarm();
        self.buffer.push(key.ch, key.at);
        self.state = DirectiveState::Buffering;

        if self.config.is_terminator(key.ch) {
            let completed = self.complete();
            return flushed.or(completed);
        }

        self.timer.arm(key.at);
        flushed
    }

    /// Fires the local idle timer if it is due at `now`.
    pub fn poll(&mut self, now: Timestamp) -> Option<DecodedCode> {
        if self.timer.fire(now) {
            self.complete()
        } else {
            None
        }
    }

    /// Returns the pending local deadline, if any.
    #[inline]
    #[must_use]
    pub const fn next_deadline(&self) -> Option<Timestamp> {
        self.timer.deadline()
    }

    /// Offers pasted text to the fast path.
    ///
    /// The trimmed text is intercepted when it has at least
    /// `min_code_length` characters and, if `numeric_only` is set, consists
    /// of ASCII digits only. Anything else passes through untouched.
    pub fn handle_paste(&mut self, text: &str) -> PasteOutcome {
        if self.torn_down {
            return PasteOutcome::PassThrough;
        }

        let Some(code) = DecodedCode::new(text) else {
            return PasteOutcome::PassThrough;
        };
        if code.char_len() < self.config.min_code_length
            || (self.config.numeric_only && !code.is_numeric())
        {
            trace!(element = %self.scope.element(), len = code.char_len(), "Paste passed through");
            return PasteOutcome::PassThrough;
        }

        debug!(element = %self.scope.element(), code = %code, "Paste intercepted as code");
        PasteOutcome::Intercepted(code)
    }

    /// Drains the global subscription, returning the codes this directive
    /// admits.
    ///
    /// Each code is checked against the focus predicate as it is drained;
    /// callers pump right after every global completion so that the check
    /// reflects focus at the moment of completion.
    pub fn pump(&mut self) -> SmallVec<[DecodedCode; 1]> {
        let mut admitted = SmallVec::new();
        let Some(subscription) = self.subscription.as_mut() else {
            return admitted;
        };

        while let Some(code) = subscription.try_next() {
            if self.focus.is_active(&self.scope) {
                debug!(element = %self.scope.element(), code = %code, "Broadcast admitted");
                admitted.push(code);
            } else {
                trace!(element = %self.scope.element(), "Broadcast dropped; scope not focused");
            }
        }
        admitted
    }

    /// Detaches the directive: cancels the local timer, clears the buffer
    /// and drops the global subscription.
    ///
    /// Every handler is a no-op afterwards. Calling it twice is harmless.
    pub fn teardown(&mut self) {
        self.timer.disarm();
        self.buffer.clear();
        self.subscription = None;
        self.state = DirectiveState::Idle;
        if !self.torn_down {
            self.torn_down = true;
            debug!(element = %self.scope.element(), "Directive torn down");
        }
    }

    fn complete(&mut self) -> Option<DecodedCode> {
        if self.linked {
            // The global service owns the decision for linked directives.
            let chars = self.buffer.len();
            self.buffer.clear();
            self.state = DirectiveState::Idle;
            trace!(element = %self.scope.element(), chars, "Local burst reset");
            return None;
        }

        let outcome = self.buffer.complete(&self.config);
        let admitted = match outcome {
            Completion::Emitted(code) if self.focus.is_active(&self.scope) => {
                self.state = DirectiveState::Emitting;
                debug!(element = %self.scope.element(), code = %code, "Local burst completed as code");
                Some(code)
            }
            Completion::Emitted(_) => {
                trace!(element = %self.scope.element(), "Local code dropped; scope not focused");
                None
            }
            Completion::Discarded { chars } => {
                trace!(element = %self.scope.element(), chars, "Local burst discarded as typing");
                None
            }
            Completion::Empty => None,
        };
        self.state = DirectiveState::Idle;
        admitted
    }
}
