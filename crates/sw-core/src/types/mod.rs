//! Domain types for scanwedge.
//!
//! # Module Organization
//!
//! - [`keystroke`] - Observed characters with their timestamps
//! - [`code`] - Completed barcode payloads
//! - [`element`] - Identities of focusable elements and containers
//!
//! All public types are re-exported at this module level and at the crate root:
//!
//! ```
//! use sw_core::{DecodedCode, ElementId, Keystroke};
//! ```

pub mod code;
pub mod element;
pub mod keystroke;

pub use code::DecodedCode;
pub use element::ElementId;
pub use keystroke::Keystroke;
