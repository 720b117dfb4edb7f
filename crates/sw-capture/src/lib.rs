//! Process-wide keystroke capture for scanwedge.
//!
//! This crate provides the document-level half of the engine:
//!
//! - [`GlobalCaptureService`] - one burst buffer and idle timer fed by every
//!   observed character
//! - [`CodeHub`] / [`CodeSubscription`] - the multicast channel completed codes
//!   are published on
//! - [`CaptureStats`] - counters describing how input was classified
//!
//! # Architecture
//!
//! ```text
//!   host keystrokes ──► GlobalCaptureService ──► CodeHub (broadcast)
//!                         BurstBuffer               │
//!                         IdleTimer                 ├──► CodeSubscription (field)
//!                                                   ├──► CodeSubscription (field)
//!                                                   └──► CodeSubscription (app)
//! ```
//!
//! Subscribers never see codes published before they subscribed. Deciding
//! which field acts on a code is left to the subscribers (see `sw-field`).

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod hub;
pub mod service;
pub mod stats;

pub use hub::{CodeHub, CodeSubscription};
pub use service::GlobalCaptureService;
pub use stats::CaptureStats;
