//! Routing scenarios across several attached fields.

use sw_core::{BroadcastConfig, CaptureConfig, Clock, ElementId, Keystroke, ManualClock};
use sw_field::{DeliverySource, FieldOptions, InputEvent, ScanDelivery, ScanDispatcher};

const PRODUCT: ElementId = ElementId(1);
const BATCH: ElementId = ElementId(2);
const QUANTITY: ElementId = ElementId(3);
const NOTES: ElementId = ElementId(4);
const DISPENSING: ElementId = ElementId(10);

struct Host {
    clock: ManualClock,
    dispatcher: ScanDispatcher,
    delivered: Vec<ScanDelivery>,
}

impl Host {
    fn new() -> Self {
        Self {
            clock: ManualClock::new(),
            dispatcher: ScanDispatcher::new(CaptureConfig::default(), &BroadcastConfig::default()),
            delivered: Vec::new(),
        }
    }

    fn send(&mut self, event: InputEvent) {
        self.delivered.extend(self.dispatcher.handle(event));
    }

    fn focus(&mut self, element: ElementId, ancestors: &[ElementId]) {
        let at = self.clock.now();
        self.send(InputEvent::Focus {
            element,
            ancestors: ancestors.to_vec(),
            at,
        });
    }

    fn blur(&mut self) {
        let at = self.clock.now();
        self.send(InputEvent::Blur { at });
    }

    fn wait(&mut self, millis: u64) {
        let now = self.clock.advance(millis);
        self.send(InputEvent::Tick(now));
    }

    fn scan(&mut self, text: &str) {
        for ch in text.chars() {
            let now = self.clock.now();
            self.send(InputEvent::Key(Keystroke::new(ch, now)));
            self.clock.advance(2);
        }
    }

    fn type_slowly(&mut self, text: &str) {
        for ch in text.chars() {
            let now = self.clock.now();
            self.send(InputEvent::Key(Keystroke::new(ch, now)));
            self.wait(250);
        }
    }

    fn codes_for(&self, element: ElementId) -> Vec<&str> {
        self.delivered
            .iter()
            .filter(|d| d.element == element)
            .map(|d| d.code.as_str())
            .collect()
    }
}

#[test]
fn test_broadcast_reaches_only_focused_field() {
    let mut host = Host::new();
    host.dispatcher.attach_field(PRODUCT, FieldOptions::default());
    host.dispatcher.attach_field(BATCH, FieldOptions::default());

    host.focus(BATCH, &[]);
    host.scan("0123456789");
    host.wait(150);

    assert_eq!(host.codes_for(BATCH), ["0123456789"]);
    assert!(host.codes_for(PRODUCT).is_empty());
}

#[test]
fn test_focus_at_completion_decides() {
    let mut host = Host::new();
    host.dispatcher.attach_field(PRODUCT, FieldOptions::default());
    host.dispatcher.attach_field(BATCH, FieldOptions::default());

    host.focus(PRODUCT, &[]);
    host.scan("0123456789");
    host.focus(BATCH, &[]);
    host.wait(150);

    assert_eq!(host.codes_for(BATCH), ["0123456789"]);
    assert!(host.codes_for(PRODUCT).is_empty());
}

#[test]
fn test_composite_field_receives_through_container() {
    let mut host = Host::new();
    host.dispatcher
        .attach_field(PRODUCT, FieldOptions::watching(DISPENSING));
    host.dispatcher.attach_field(BATCH, FieldOptions::default());

    host.focus(QUANTITY, &[DISPENSING]);
    host.scan("5901234123457\n");

    assert_eq!(host.codes_for(PRODUCT), ["5901234123457"]);
    assert!(host.codes_for(BATCH).is_empty());
}

#[test]
fn test_unscoped_field_gets_nothing() {
    let mut host = Host::new();
    host.dispatcher.attach_field(PRODUCT, FieldOptions::default());
    let mut app = host.dispatcher.subscribe();

    host.focus(NOTES, &[]);
    host.scan("0123456789");
    host.wait(150);

    assert!(host.delivered.is_empty());
    assert_eq!(app.try_next().unwrap().as_str(), "0123456789");
}

#[test]
fn test_human_typing_in_scoped_field() {
    let mut host = Host::new();
    host.dispatcher.attach_field(PRODUCT, FieldOptions::default());
    host.focus(PRODUCT, &[]);

    host.type_slowly("hello");
    host.type_slowly("paracetamol");
    host.wait(1_000);

    assert!(host.delivered.is_empty());
    assert_eq!(host.dispatcher.stats().codes_emitted, 0);
}

#[test]
fn test_burst_continued_before_timeout_is_one_code() {
    let mut host = Host::new();
    host.dispatcher.attach_field(PRODUCT, FieldOptions::default());
    host.focus(PRODUCT, &[]);

    host.scan("0123456789");
    host.wait(40);
    host.scan("ABC");
    host.wait(150);

    assert_eq!(host.codes_for(PRODUCT), ["0123456789ABC"]);
}

#[test]
fn test_paste_fast_path_is_immediate() {
    let mut host = Host::new();
    host.dispatcher.attach_field(PRODUCT, FieldOptions::default());
    host.focus(PRODUCT, &[]);

    let now = host.clock.now();
    let out = host.dispatcher.handle(InputEvent::Paste {
        text: "4006381333931".to_owned(),
        at: now,
    });
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].code.as_str(), "4006381333931");
    assert_eq!(out[0].source, DeliverySource::Paste);
    assert_eq!(host.dispatcher.next_deadline(), None);
}

#[test]
fn test_short_or_alpha_paste_passes_through() {
    let mut host = Host::new();
    host.dispatcher.attach_field(PRODUCT, FieldOptions::default());
    host.focus(PRODUCT, &[]);

    for text in ["1234", "hello world", "ABC123456"] {
        let now = host.clock.now();
        let out = host.dispatcher.handle(InputEvent::Paste {
            text: text.to_owned(),
            at: now,
        });
        assert!(out.is_empty(), "{text} should pass through");
    }
}

#[test]
fn test_detach_stops_delivery_and_keeps_others() {
    let mut host = Host::new();
    let product = host.dispatcher.attach_field(PRODUCT, FieldOptions::default());
    let batch = host.dispatcher.attach_field(BATCH, FieldOptions::default());

    host.focus(PRODUCT, &[]);
    host.scan("0123456");
    assert!(host.dispatcher.detach_field(product));
    assert!(!host.dispatcher.detach_field(product));
    host.wait(150);
    assert!(host.delivered.is_empty());

    host.focus(BATCH, &[]);
    host.scan("7654321");
    host.wait(150);

    assert_eq!(host.dispatcher.field_count(), 1);
    assert!(host.dispatcher.directive(batch).is_some());
    assert!(
        host.dispatcher
            .registry()
            .contains(host.dispatcher.document_listener())
    );
    assert_eq!(host.codes_for(BATCH), ["7654321"]);
    assert_eq!(host.dispatcher.stats().codes_emitted, 2);
}

#[test]
fn test_blur_drops_broadcasts() {
    let mut host = Host::new();
    host.dispatcher.attach_field(PRODUCT, FieldOptions::default());
    host.focus(PRODUCT, &[]);
    host.scan("0123456789");
    host.blur();
    host.wait(150);
    assert!(host.delivered.is_empty());
}

#[test]
fn test_late_focus_change_keeps_completion_focus() {
    let mut host = Host::new();
    host.dispatcher.attach_field(PRODUCT, FieldOptions::default());
    host.dispatcher.attach_field(BATCH, FieldOptions::default());
    host.focus(PRODUCT, &[]);
    host.scan("4006381333931");

    // The burst went idle long ago, but no tick was observed before the move.
    host.clock.advance(500);
    host.focus(BATCH, &[]);
    host.wait(150);

    assert_eq!(host.codes_for(PRODUCT), ["4006381333931"]);
    assert!(host.codes_for(BATCH).is_empty());
}
