//! UI components for the console.
//!
//! This module contains the widget implementations for rendering the
//! different parts of the interface.
//!
//! # Component Types
//!
//! - **Widgets** (`Widget` trait): `HeaderBar`, `StatsPanel`, `FieldForm`, `ScanLog`, `StatusBar`
//! - **Overlays**: `HelpPanel`

mod field_form;
mod header;
mod help;
mod scan_log;
mod stats_panel;
mod status_bar;

pub use field_form::FieldForm;
pub use header::HeaderBar;
pub use help::HelpPanel;
pub use scan_log::ScanLog;
pub use stats_panel::StatsPanel;
pub use status_bar::StatusBar;
