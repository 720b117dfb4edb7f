//! Single-threaded event routing.
//!
//! [`ScanDispatcher`] stands in for the host's event target. It owns the
//! global capture service, the focus tracker, the listener registry and every
//! attached directive, and turns a stream of [`InputEvent`]s into
//! [`ScanDelivery`] values.
//!
//! # Routing
//!
//! ```text
//!  Key(k)      ──► document listener (GlobalCaptureService::on_key)
//!              ──► field listeners of the focused element (on_key)
//!  Paste       ──► field listeners of the focused element (handle_paste)
//!  Tick(now)   ──► every timer (service and directives)
//!  Focus/Blur  ──► every due timer, then the focus tracker
//!
//!  after each step: every directive pumps its subscription
//! ```
//!
//! Pumping right after the step that may have completed a code means the
//! focus predicate is evaluated against the focus at completion time.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use sw_capture::{CaptureStats, CodeSubscription, GlobalCaptureService};
use sw_core::{BroadcastConfig, CaptureConfig, DecodedCode, ElementId, Keystroke, Timestamp};
use tracing::{debug, warn};

use crate::directive::{FieldScanDirective, PasteOutcome};
use crate::focus::{FocusProbe, FocusScope, FocusTracker};
use crate::registry::{ListenerHandle, ListenerKind, ListenerRegistry};

/// Deliveries produced by one event. One is by far the common case.
pub type Deliveries = SmallVec<[ScanDelivery; 2]>;

/// An input observed by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A character was typed.
    Key(Keystroke),

    /// Text was pasted into the focused element.
    Paste {
        /// The pasted text.
        text: String,
        /// When the paste was observed.
        at: Timestamp,
    },

    /// An element gained focus.
    Focus {
        /// The focused element.
        element: ElementId,
        /// Containers enclosing the element, innermost first.
        ancestors: Vec<ElementId>,
        /// When focus moved.
        at: Timestamp,
    },

    /// Focus left every element.
    Blur {
        /// When focus was lost.
        at: Timestamp,
    },

    /// Time passed without input.
    Tick(Timestamp),
}

/// How a delivered code reached its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverySource {
    /// Completed by the global service and admitted by focus.
    Broadcast,
    /// Intercepted by the paste fast path.
    Paste,
    /// Completed by a standalone directive's own buffer.
    Local,
}

/// A code delivered to a field: the `barcode_scanned` signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanDelivery {
    /// The listener that delivered the code.
    pub listener: ListenerHandle,
    /// The element the directive is attached to.
    pub element: ElementId,
    /// The scanned code.
    pub code: DecodedCode,
    /// How the code arrived.
    pub source: DeliverySource,
}

/// Options for [`ScanDispatcher::attach_field`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOptions {
    /// Containers the field also watches; focus inside any of them makes the
    /// field the active target for broadcasts.
    pub watch: SmallVec<[ElementId; 2]>,

    /// Complete bursts from the field's own buffer instead of subscribing to
    /// the global service.
    pub standalone: bool,
}

impl FieldOptions {
    /// Options for a linked field that also watches `container`.
    #[must_use]
    pub fn watching(container: ElementId) -> Self {
        Self {
            watch: smallvec::smallvec![container],
            standalone: false,
        }
    }

    /// Options for a standalone field.
    #[must_use]
    pub fn standalone() -> Self {
        Self {
            watch: SmallVec::new(),
            standalone: true,
        }
    }
}

/// Routes host input to the capture service and attached fields.
///
/// # Examples
///
/// ```
/// use sw_core::{CaptureConfig, BroadcastConfig, ElementId, Keystroke, Timestamp};
/// use sw_field::{FieldOptions, InputEvent, ScanDispatcher};
///
/// let mut dispatcher = ScanDispatcher::new(CaptureConfig::default(), &BroadcastConfig::default());
/// let field = dispatcher.attach_field(ElementId(1), FieldOptions::default());
/// dispatcher.handle(InputEvent::Focus {
///     element: ElementId(1),
///     ancestors: vec![],
///     at: Timestamp::ZERO,
/// });
///
/// for (i, ch) in "0123456789".chars().enumerate() {
///     let at = Timestamp::from_millis(i as u64 * 2);
///     assert!(dispatcher.handle(InputEvent::Key(Keystroke::new(ch, at))).is_empty());
/// }
///
/// let delivered = dispatcher.handle(InputEvent::Tick(Timestamp::from_millis(170)));
/// assert_eq!(delivered.len(), 1);
/// assert_eq!(delivered[0].listener, field);
/// assert_eq!(delivered[0].code.as_str(), "0123456789");
/// ```
#[derive(Debug)]
pub struct ScanDispatcher {
    service: GlobalCaptureService,
    focus: FocusTracker,
    registry: ListenerRegistry,
    document: ListenerHandle,
    directives: FxHashMap<ListenerHandle, FieldScanDirective>,
}

impl ScanDispatcher {
    /// Creates a dispatcher and registers the document listener.
    #[must_use]
    pub fn new(config: CaptureConfig, broadcast: &BroadcastConfig) -> Self {
        let mut registry = ListenerRegistry::new();
        let document = registry.register(ListenerKind::Document);
        Self {
            service: GlobalCaptureService::new(config, broadcast),
            focus: FocusTracker::new(),
            registry,
            document,
            directives: FxHashMap::default(),
        }
    }

    /// Returns the global capture service.
    #[inline]
    #[must_use]
    pub const fn service(&self) -> &GlobalCaptureService {
        &self.service
    }

    /// Returns the shared focus tracker.
    #[inline]
    #[must_use]
    pub const fn focus(&self) -> &FocusTracker {
        &self.focus
    }

    /// Returns the element holding focus, if any.
    #[must_use]
    pub fn focused(&self) -> Option<ElementId> {
        self.focus.focused()
    }

    /// Returns the handle of the document listener.
    #[inline]
    #[must_use]
    pub const fn document_listener(&self) -> ListenerHandle {
        self.document
    }

    /// Returns the listener registry.
    #[inline]
    #[must_use]
    pub const fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    /// Returns the directive registered under `handle`.
    #[must_use]
    pub fn directive(&self, handle: ListenerHandle) -> Option<&FieldScanDirective> {
        self.directives.get(&handle)
    }

    /// Returns the number of attached fields.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.directives.len()
    }

    /// Returns an application-level subscription to every completed code,
    /// regardless of focus.
    #[must_use]
    pub fn subscribe(&self) -> CodeSubscription {
        self.service.subscribe()
    }

    /// Returns the global capture counters.
    #[must_use]
    pub const fn stats(&self) -> CaptureStats {
        self.service.stats()
    }

    /// Attaches a directive to `element` and registers its listener.
    pub fn attach_field(&mut self, element: ElementId, options: FieldOptions) -> ListenerHandle {
        let mut scope = FocusScope::new(element);
        for container in options.watch {
            scope.watch(container);
        }

        let probe: Arc<dyn FocusProbe> = Arc::new(self.focus.clone());
        let directive = if options.standalone {
            FieldScanDirective::standalone(scope, self.service.config().clone(), probe)
        } else {
            FieldScanDirective::linked(scope, &self.service, probe)
        };

        let handle = self.registry.register(ListenerKind::Field(element));
        debug!(%element, %handle, standalone = options.standalone, "Field attached");
        self.directives.insert(handle, directive);
        handle
    }

    /// Tears down the directive registered under `handle` and removes its
    /// listener.
    ///
    /// Returns `false` if `handle` is not a field listener. The document
    /// listener is never removed.
    pub fn detach_field(&mut self, handle: ListenerHandle) -> bool {
        if handle == self.document {
            warn!(%handle, "Refusing to detach the document listener");
            return false;
        }
        let Some(mut directive) = self.directives.remove(&handle) else {
            return false;
        };
        directive.teardown();
        self.registry.deregister(handle);
        debug!(element = %directive.scope().element(), %handle, "Field detached");
        true
    }

    /// Publishes `code` through the global service, bypassing timing, and
    /// returns the resulting deliveries.
    pub fn inject_code(&mut self, code: &str) -> Deliveries {
        let mut out = Deliveries::new();
        if self.service.inject_code(code) {
            self.pump_all(&mut out);
        }
        out
    }

    /// Routes one event and returns the codes delivered as a result.
    pub fn handle(&mut self, event: InputEvent) -> Deliveries {
        let mut out = Deliveries::new();
        match event {
            InputEvent::Key(key) => self.on_key(key, &mut out),
            InputEvent::Paste { text, at } => self.on_paste(&text, at, &mut out),
            InputEvent::Focus {
                element,
                ancestors,
                at,
            } => {
                // A burst that went idle before the move belongs to the old focus.
                self.poll_all(at, &mut out);
                self.focus.focus(element, ancestors);
            }
            InputEvent::Blur { at } => {
                self.poll_all(at, &mut out);
                self.focus.blur();
            }
            InputEvent::Tick(now) => self.poll_all(now, &mut out),
        }
        out
    }

    /// Returns the earliest pending timer deadline across the service and
    /// every directive.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.directives
            .values()
            .filter_map(FieldScanDirective::next_deadline)
            .chain(self.service.next_deadline())
            .min()
    }

    fn on_key(&mut self, key: Keystroke, out: &mut Deliveries) {
        // Fire due timers first so a late keystroke cannot merge bursts.
        self.poll_all(key.at, out);

        self.service.on_key(key);
        self.pump_all(out);

        let Some(focused) = self.focus.focused() else {
            return;
        };
        let targets: SmallVec<[ListenerHandle; 2]> = self.registry.listeners_for(focused).collect();
        for handle in targets {
            let Some(directive) = self.directives.get_mut(&handle) else {
                continue;
            };
            if let Some(code) = directive.on_key(key) {
                out.push(delivery(handle, directive, code, DeliverySource::Local));
            }
        }
    }

    fn on_paste(&mut self, text: &str, at: Timestamp, out: &mut Deliveries) {
        self.poll_all(at, out);

        let Some(focused) = self.focus.focused() else {
            return;
        };
        let targets: SmallVec<[ListenerHandle; 2]> = self.registry.listeners_for(focused).collect();
        for handle in targets {
            let Some(directive) = self.directives.get_mut(&handle) else {
                continue;
            };
            if let PasteOutcome::Intercepted(code) = directive.handle_paste(text) {
                out.push(delivery(handle, directive, code, DeliverySource::Paste));
            }
        }
    }

    fn poll_all(&mut self, now: Timestamp, out: &mut Deliveries) {
        if self.service.poll(now).is_some() {
            self.pump_all(out);
        }

        let handles: SmallVec<[ListenerHandle; 4]> = self.registry.field_listeners().collect();
        for handle in handles {
            let Some(directive) = self.directives.get_mut(&handle) else {
                continue;
            };
            if let Some(code) = directive.poll(now) {
                out.push(delivery(handle, directive, code, DeliverySource::Local));
            }
        }
    }

    fn pump_all(&mut self, out: &mut Deliveries) {
        let handles: SmallVec<[ListenerHandle; 4]> = self.registry.field_listeners().collect();
        for handle in handles {
            if let Some(directive) = self.directives.get_mut(&handle) {
                for code in directive.pump() {
                    out.push(delivery(handle, directive, code, DeliverySource::Broadcast));
                }
            }
        }
    }
}

fn delivery(
    listener: ListenerHandle,
    directive: &FieldScanDirective,
    code: DecodedCode,
    source: DeliverySource,
) -> ScanDelivery {
    ScanDelivery {
        listener,
        element: directive.scope().element(),
        code,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT: ElementId = ElementId(1);
    const BATCH: ElementId = ElementId(2);

    fn dispatcher() -> ScanDispatcher {
        ScanDispatcher::new(CaptureConfig::default(), &BroadcastConfig::default())
    }

    fn focus(dispatcher: &mut ScanDispatcher, element: ElementId) {
        dispatcher.handle(InputEvent::Focus {
            element,
            ancestors: Vec::new(),
            at: Timestamp::ZERO,
        });
    }

    fn burst(dispatcher: &mut ScanDispatcher, text: &str, start: u64) -> Deliveries {
        let mut out = Deliveries::new();
        for (i, ch) in text.chars().enumerate() {
            let at = Timestamp::from_millis(start + i as u64 * 2);
            out.extend(dispatcher.handle(InputEvent::Key(Keystroke::new(ch, at))));
        }
        out
    }

    #[test]
    fn test_document_listener_registered_once() {
        let dispatcher = dispatcher();
        assert_eq!(dispatcher.registry().len(), 1);
        assert_eq!(
            dispatcher.registry().kind(dispatcher.document_listener()),
            Some(ListenerKind::Document)
        );
    }

    #[test]
    fn test_detach_refuses_document_listener() {
        let mut dispatcher = dispatcher();
        let document = dispatcher.document_listener();
        assert!(!dispatcher.detach_field(document));
        assert!(dispatcher.registry().contains(document));
    }

    #[test]
    fn test_terminated_burst_delivered_in_same_event() {
        let mut dispatcher = dispatcher();
        let field = dispatcher.attach_field(PRODUCT, FieldOptions::default());
        focus(&mut dispatcher, PRODUCT);

        assert!(burst(&mut dispatcher, "4006381333931", 0).is_empty());
        let out = dispatcher.handle(InputEvent::Key(Keystroke::new(
            '\n',
            Timestamp::from_millis(30),
        )));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].listener, field);
        assert_eq!(out[0].source, DeliverySource::Broadcast);
    }

    #[test]
    fn test_focus_change_settles_idle_burst_first() {
        let mut dispatcher = dispatcher();
        let product = dispatcher.attach_field(PRODUCT, FieldOptions::default());
        dispatcher.attach_field(BATCH, FieldOptions::default());
        focus(&mut dispatcher, PRODUCT);
        burst(&mut dispatcher, "0123456789", 0);

        let out = dispatcher.handle(InputEvent::Focus {
            element: BATCH,
            ancestors: Vec::new(),
            at: Timestamp::from_millis(500),
        });
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].listener, product);
        assert!(dispatcher.handle(InputEvent::Tick(Timestamp::from_millis(600))).is_empty());
    }

    #[test]
    fn test_blur_settles_idle_burst_first() {
        let mut dispatcher = dispatcher();
        let product = dispatcher.attach_field(PRODUCT, FieldOptions::default());
        focus(&mut dispatcher, PRODUCT);
        burst(&mut dispatcher, "0123456789", 0);

        let out = dispatcher.handle(InputEvent::Blur {
            at: Timestamp::from_millis(500),
        });
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].listener, product);
        assert_eq!(dispatcher.focused(), None);
    }

    #[test]
    fn test_no_delivery_without_focus() {
        let mut dispatcher = dispatcher();
        dispatcher.attach_field(PRODUCT, FieldOptions::default());
        let mut app = dispatcher.subscribe();

        burst(&mut dispatcher, "0123456789", 0);
        let out = dispatcher.handle(InputEvent::Tick(Timestamp::from_millis(200)));
        assert!(out.is_empty());
        assert_eq!(app.try_next().unwrap().as_str(), "0123456789");
    }

    #[test]
    fn test_paste_only_reaches_focused_field() {
        let mut dispatcher = dispatcher();
        dispatcher.attach_field(PRODUCT, FieldOptions::default());
        let batch = dispatcher.attach_field(BATCH, FieldOptions::default());
        focus(&mut dispatcher, BATCH);

        let out = dispatcher.handle(InputEvent::Paste {
            text: "4006381333931".to_owned(),
            at: Timestamp::from_millis(5),
        });
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].listener, batch);
        assert_eq!(out[0].source, DeliverySource::Paste);
        assert_eq!(dispatcher.stats().codes_emitted, 0);
    }

    #[test]
    fn test_standalone_field_delivers_locally() {
        let mut dispatcher = dispatcher();
        let field = dispatcher.attach_field(PRODUCT, FieldOptions::standalone());
        focus(&mut dispatcher, PRODUCT);

        burst(&mut dispatcher, "0123456789", 0);
        let out = dispatcher.handle(InputEvent::Tick(Timestamp::from_millis(200)));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].listener, field);
        assert_eq!(out[0].source, DeliverySource::Local);
    }

    #[test]
    fn test_next_deadline_is_earliest() {
        let mut dispatcher = dispatcher();
        assert_eq!(dispatcher.next_deadline(), None);

        dispatcher.attach_field(PRODUCT, FieldOptions::default());
        focus(&mut dispatcher, PRODUCT);
        dispatcher.handle(InputEvent::Key(Keystroke::new('1', Timestamp::from_millis(40))));
        assert_eq!(dispatcher.next_deadline(), Some(Timestamp::from_millis(140)));
    }

    #[test]
    fn test_delivery_serializes_for_reports() {
        let mut dispatcher = dispatcher();
        dispatcher.attach_field(PRODUCT, FieldOptions::default());
        focus(&mut dispatcher, PRODUCT);
        let out = dispatcher.inject_code("4006381333931");

        insta::assert_json_snapshot!(out[0], @r#"
        {
          "listener": 1,
          "element": 1,
          "code": "4006381333931",
          "source": "broadcast"
        }
        "#);
    }

    #[test]
    fn test_inject_code_routes_by_focus() {
        let mut dispatcher = dispatcher();
        dispatcher.attach_field(PRODUCT, FieldOptions::default());
        let batch = dispatcher.attach_field(BATCH, FieldOptions::default());
        focus(&mut dispatcher, BATCH);

        let out = dispatcher.inject_code("L0T-2024-11");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].listener, batch);
        assert!(dispatcher.inject_code("abc").is_empty());
    }
}
