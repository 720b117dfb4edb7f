//! Terminal scan console using Ratatui.
//!
//! A demo form with scan-enabled fields, a live scan log and capture
//! statistics, driven by an async event loop on tokio. It is the quickest
//! way to see burst classification and focus scoping work with a real
//! keyboard wedge scanner.
//!
//! # Architecture
//!
//! ```text
//! crates/sw-tui/src/
//!   lib.rs           # Public API exports, run loop
//!   app.rs           # Application state, form, dispatcher wiring
//!   event.rs         # Event types (Key, Paste, Resize, Tick, Render)
//!   tui.rs           # Terminal wrapper with async event streaming
//!   action.rs        # User actions (commands from key bindings)
//!   ui.rs            # Main layout rendering orchestration
//!   theme.rs         # Color scheme and styling constants
//!   error.rs         # Console error types
//!   components/
//!     header.rs      # HeaderBar with thresholds and buffer
//!     stats_panel.rs # StatsPanel with scan ratio gauge
//!     field_form.rs  # FieldForm with the Dispensing group
//!     scan_log.rs    # ScanLog, newest first
//!     status_bar.rs  # StatusBar component
//!     help.rs        # HelpPanel modal overlay
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use sw_core::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sw_tui::TuiError> {
//!     sw_tui::run(Config::default()).await
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod action;
pub mod app;
pub mod components;
pub mod error;
pub mod event;
pub mod theme;
pub mod tui;
pub mod ui;

use sw_core::{Config, SystemClock, Timestamp};
use tracing::{debug, info};

pub use action::Action;
pub use app::{App, AppMode, FormField, ScanLogEntry, StatusMessage};
pub use error::TuiError;
pub use event::Event;
pub use theme::Theme;
pub use tui::Tui;

/// Runs the console until the user quits.
///
/// # Errors
///
/// Returns an error if the terminal cannot be initialized, drawn to or
/// restored, or if the terminal event stream closes unexpectedly.
pub async fn run(config: Config) -> Result<(), TuiError> {
    // tick_rate_ms and frame_rate are small UI timing values, precision loss is acceptable
    #[allow(clippy::cast_precision_loss)]
    let tick_rate = 1000.0 / config.tui.tick_rate_ms.max(1) as f64;
    let frame_rate = f64::from(config.tui.frame_rate.max(1));

    let mut tui = Tui::new(tick_rate)?.with_frame_rate(frame_rate);

    let clock = SystemClock::new();
    let theme = Theme::from_scheme(config.tui.color_scheme);
    let mut app = App::with_clock(config, Box::new(clock));

    tui.enter()?;

    info!("Entering main event loop");
    let result = run_event_loop(&mut tui, &mut app, clock, &theme).await;

    tui.exit()?;
    result
}

/// Runs the main event loop.
async fn run_event_loop(
    tui: &mut Tui,
    app: &mut App,
    clock: SystemClock,
    theme: &Theme,
) -> Result<(), TuiError> {
    loop {
        tui.draw(|frame| ui::render(app, frame, theme))?;

        let deadline = app.next_deadline();
        let event = tokio::select! {
            event = tui.next_event() => {
                Some(event.ok_or(TuiError::ChannelClosed)?)
            }
            () = sleep_until(clock, deadline) => None,
        };

        let action = match event {
            // An idle deadline passed; let the timers fire.
            None => {
                app.tick();
                Action::Render
            }
            Some(Event::Key(key)) => app.handle_key(key),
            Some(Event::Paste(text)) => app.handle_paste(text),
            Some(Event::Resize { width, height }) => {
                app.terminal_size = ratatui::layout::Rect::new(0, 0, width, height);
                Action::Render
            }
            Some(Event::Tick) => {
                app.tick();
                Action::None
            }
            Some(Event::Render) => Action::Render,
            Some(Event::FocusGained | Event::FocusLost) => Action::None,
        };

        app.update(action);

        if app.should_quit {
            info!("Quit requested");
            break;
        }
    }

    Ok(())
}

/// Sleeps until `deadline`, or forever if there is none.
async fn sleep_until(clock: SystemClock, deadline: Option<Timestamp>) {
    match deadline {
        Some(at) => {
            debug!(%at, "Waiting for idle deadline");
            tokio::time::sleep_until(tokio::time::Instant::from_std(clock.instant_at(at))).await;
        }
        None => std::future::pending().await,
    }
}
