//! Focus-scoped barcode delivery for scanwedge.
//!
//! This crate decides which input field receives a completed code:
//!
//! - [`FieldScanDirective`] - attached to one element; local debounce buffer,
//!   paste fast path, and focus-filtered global broadcasts
//! - [`FocusProbe`] / [`FocusTracker`] - the injected "is this scope the
//!   active target" predicate
//! - [`ListenerRegistry`] - additive listener registration on the shared
//!   event target
//! - [`ScanDispatcher`] - routes host [`InputEvent`]s to the global service
//!   and the attached fields, producing [`ScanDelivery`] values
//!
//! # Example
//!
//! ```
//! use sw_core::{BroadcastConfig, CaptureConfig, ElementId, Timestamp};
//! use sw_field::{DeliverySource, FieldOptions, InputEvent, ScanDispatcher};
//!
//! let mut dispatcher = ScanDispatcher::new(CaptureConfig::default(), &BroadcastConfig::default());
//! let product = dispatcher.attach_field(ElementId(1), FieldOptions::default());
//! dispatcher.handle(InputEvent::Focus {
//!     element: ElementId(1),
//!     ancestors: vec![],
//!     at: Timestamp::ZERO,
//! });
//!
//! let delivered = dispatcher.handle(InputEvent::Paste {
//!     text: "4006381333931".into(),
//!     at: Timestamp::ZERO,
//! });
//! assert_eq!(delivered[0].listener, product);
//! assert_eq!(delivered[0].source, DeliverySource::Paste);
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod directive;
pub mod dispatcher;
pub mod focus;
pub mod registry;

pub use directive::{DirectiveState, FieldScanDirective, PasteOutcome};
pub use dispatcher::{
    Deliveries, DeliverySource, FieldOptions, InputEvent, ScanDelivery, ScanDispatcher,
};
pub use focus::{FocusPath, FocusProbe, FocusScope, FocusTracker};
pub use registry::{ListenerHandle, ListenerKind, ListenerRegistry};
