//! Application state and lifecycle management.
//!
//! This module provides the core [`App`] struct which owns the scan
//! dispatcher, the demo form, the scan log and the UI state.
//!
//! # Architecture
//!
//! ```text
//! App
//!  ├── dispatcher: ScanDispatcher  # Capture service + field directives
//!  ├── monitor: CodeSubscription   # Every broadcast code (for the log)
//!  ├── fields: Vec<FormField>      # The demo form, focus order
//!  ├── focused: usize              # Index of the focused field
//!  ├── log: VecDeque<ScanLogEntry> # Newest first
//!  ├── mode: AppMode
//!  └── status: Option<StatusMessage>
//! ```
//!
//! # The demo form
//!
//! ```text
//!  Dispensing (container #10)
//!  ├── Product lookup #1   directive, watches Dispensing
//!  └── Quantity #3         no directive
//!  Batch number #2         directive
//!  Notes #4                no directive
//! ```
//!
//! A scan while "Quantity" is focused lands in "Product lookup". A scan
//! while "Notes" is focused reaches no field and is logged as unrouted.

use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use sw_capture::{CaptureStats, CodeSubscription};
use sw_core::{Clock, Config, DecodedCode, ElementId, Keystroke, SystemClock, Timestamp};
use sw_field::{
    Deliveries, DeliverySource, FieldOptions, InputEvent, ListenerHandle, ScanDispatcher,
};
use tracing::{debug, info};

use crate::action::Action;

/// Element id of the "Product lookup" field.
pub const PRODUCT_FIELD: ElementId = ElementId(1);

/// Element id of the "Batch number" field.
pub const BATCH_FIELD: ElementId = ElementId(2);

/// Element id of the "Quantity" field.
pub const QUANTITY_FIELD: ElementId = ElementId(3);

/// Element id of the "Notes" field.
pub const NOTES_FIELD: ElementId = ElementId(4);

/// Element id of the "Dispensing" container.
pub const DISPENSING_CONTAINER: ElementId = ElementId(10);

/// Maximum number of entries kept in the scan log.
pub const MAX_LOG_ENTRIES: usize = 200;

/// How long a status message stays visible, in milliseconds.
const STATUS_DURATION_MS: u64 = 3_000;

/// The current mode of the application UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Typing into the form.
    #[default]
    Normal,

    /// Help panel is displayed.
    Help,
}

/// One input field of the demo form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    /// Element id reported to the dispatcher.
    pub id: ElementId,

    /// Label shown next to the field.
    pub label: &'static str,

    /// Enclosing container, if any.
    pub container: Option<ElementId>,

    /// Current text.
    pub value: String,

    /// Listener of the attached directive, if the field has one.
    pub listener: Option<ListenerHandle>,
}

impl FormField {
    fn new(id: ElementId, label: &'static str) -> Self {
        Self {
            id,
            label,
            container: None,
            value: String::new(),
            listener: None,
        }
    }

    fn inside(mut self, container: ElementId) -> Self {
        self.container = Some(container);
        self
    }

    /// Returns `true` if a directive is attached to this field.
    #[must_use]
    pub const fn has_directive(&self) -> bool {
        self.listener.is_some()
    }
}

/// One completed code, as shown in the scan log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanLogEntry {
    /// When the code was handled.
    pub at: Timestamp,

    /// The code.
    pub code: DecodedCode,

    /// Label of the field that received it; `None` if no field did.
    pub field: Option<&'static str>,

    /// How it arrived; `None` for unrouted broadcasts.
    pub source: Option<DeliverySource>,
}

/// A status message to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    /// The message text.
    pub text: String,

    /// When the message was created.
    pub at: Timestamp,

    /// Whether this is an error message.
    pub is_error: bool,
}

impl StatusMessage {
    /// Creates a new info message.
    #[must_use]
    pub fn info(text: impl Into<String>, at: Timestamp) -> Self {
        Self {
            text: text.into(),
            at,
            is_error: false,
        }
    }

    /// Creates a new error message.
    #[must_use]
    pub fn error(text: impl Into<String>, at: Timestamp) -> Self {
        Self {
            text: text.into(),
            at,
            is_error: true,
        }
    }

    /// Returns `true` if the message has been visible long enough.
    #[must_use]
    pub const fn should_hide(&self, now: Timestamp) -> bool {
        now.millis_since(self.at) >= STATUS_DURATION_MS
    }
}

/// The console application.
pub struct App {
    config: Config,
    clock: Box<dyn Clock>,
    dispatcher: ScanDispatcher,
    monitor: CodeSubscription,
    fields: Vec<FormField>,
    focused: usize,
    log: VecDeque<ScanLogEntry>,

    /// Current UI mode.
    pub mode: AppMode,

    /// Current status message.
    pub status: Option<StatusMessage>,

    /// Whether the application should quit.
    pub should_quit: bool,

    /// Last known terminal size.
    pub terminal_size: Rect,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("dispatcher", &self.dispatcher)
            .field("fields", &self.fields)
            .field("focused", &self.focused)
            .field("log", &self.log.len())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Creates the application on the wall clock.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, Box::new(SystemClock::new()))
    }

    /// Creates the application on an explicit clock.
    #[must_use]
    pub fn with_clock(config: Config, clock: Box<dyn Clock>) -> Self {
        let config = config.sanitized();
        let mut dispatcher = ScanDispatcher::new(config.capture.clone(), &config.broadcast);
        let monitor = dispatcher.subscribe();

        let mut fields = vec![
            FormField::new(PRODUCT_FIELD, "Product lookup").inside(DISPENSING_CONTAINER),
            FormField::new(QUANTITY_FIELD, "Quantity").inside(DISPENSING_CONTAINER),
            FormField::new(BATCH_FIELD, "Batch number"),
            FormField::new(NOTES_FIELD, "Notes"),
        ];
        for field in &mut fields {
            let options = match field.id {
                PRODUCT_FIELD => FieldOptions::watching(DISPENSING_CONTAINER),
                BATCH_FIELD => FieldOptions::default(),
                _ => continue,
            };
            field.listener = Some(dispatcher.attach_field(field.id, options));
        }

        let mut app = Self {
            config,
            clock,
            dispatcher,
            monitor,
            fields,
            focused: 0,
            log: VecDeque::new(),
            mode: AppMode::Normal,
            status: None,
            should_quit: false,
            terminal_size: Rect::default(),
        };
        app.focus_current();
        app
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the form fields in focus order.
    #[must_use]
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Returns the index of the focused field.
    #[must_use]
    pub const fn focused_index(&self) -> usize {
        self.focused
    }

    /// Returns the focused field.
    #[must_use]
    pub fn focused_field(&self) -> Option<&FormField> {
        self.fields.get(self.focused)
    }

    /// Returns the field with element id `id`.
    #[must_use]
    pub fn field(&self, id: ElementId) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Returns the scan log, newest first.
    pub fn log(&self) -> std::collections::vec_deque::Iter<'_, ScanLogEntry> {
        self.log.iter()
    }

    /// Returns the number of scan log entries.
    #[must_use]
    pub fn log_len(&self) -> usize {
        self.log.len()
    }

    /// Returns the capture counters.
    #[must_use]
    pub const fn stats(&self) -> CaptureStats {
        self.dispatcher.stats()
    }

    /// Returns the burst the capture service is currently buffering.
    #[must_use]
    pub fn pending(&self) -> &str {
        self.dispatcher.service().pending()
    }

    /// Returns the idle gap in effect.
    #[must_use]
    pub const fn idle_gap_ms(&self) -> u64 {
        self.dispatcher.service().config().idle_gap_ms
    }

    /// Returns the earliest pending idle deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.dispatcher.next_deadline()
    }

    /// Translates a key press into an action.
    pub fn handle_key(&self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(key.code, KeyCode::Char('c' | 'q')) {
            return Action::Quit;
        }

        match self.mode {
            AppMode::Help => match key.code {
                KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') => Action::HideHelp,
                _ => Action::None,
            },
            AppMode::Normal => match key.code {
                KeyCode::F(1) => Action::ToggleHelp,
                KeyCode::Esc => Action::ClearField,
                KeyCode::Tab | KeyCode::Down => Action::NextField,
                KeyCode::BackTab | KeyCode::Up => Action::PreviousField,
                KeyCode::Backspace => Action::Backspace,
                KeyCode::Enter => Action::Type('\n'),
                KeyCode::Char('l') if ctrl => Action::ClearLog,
                KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                    Action::Type(c)
                }
                _ => Action::None,
            },
        }
    }

    /// Translates bracketed paste text into an action.
    #[must_use]
    pub fn handle_paste(&self, text: String) -> Action {
        match self.mode {
            AppMode::Normal => Action::Paste(text),
            AppMode::Help => Action::None,
        }
    }

    /// Applies an action.
    pub fn update(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,

            Action::NextField => {
                self.focused = (self.focused + 1) % self.fields.len();
                self.focus_current();
            }
            Action::PreviousField => {
                self.focused = self
                    .focused
                    .checked_sub(1)
                    .unwrap_or(self.fields.len() - 1);
                self.focus_current();
            }
            Action::FocusField(index) => {
                if index < self.fields.len() {
                    self.focused = index;
                    self.focus_current();
                }
            }

            Action::Type(ch) => self.type_char(ch),
            Action::Paste(text) => self.paste(text),
            Action::Backspace => {
                if let Some(field) = self.fields.get_mut(self.focused) {
                    field.value.pop();
                }
            }
            Action::ClearField => {
                if let Some(field) = self.fields.get_mut(self.focused) {
                    field.value.clear();
                }
            }

            Action::ClearLog => self.log.clear(),
            Action::ToggleHelp => {
                self.mode = match self.mode {
                    AppMode::Help => AppMode::Normal,
                    AppMode::Normal => AppMode::Help,
                };
            }
            Action::HideHelp => self.mode = AppMode::Normal,
            Action::ShowStatus(text) => {
                self.status = Some(StatusMessage::info(text, self.clock.now()));
            }
            Action::ClearStatus => self.status = None,

            Action::Render | Action::None => {}
        }
    }

    /// Fires due idle timers and expires stale status messages.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        let deliveries = self.dispatcher.handle(InputEvent::Tick(now));
        self.apply(&deliveries, now);

        if self.status.as_ref().is_some_and(|s| s.should_hide(now)) {
            self.status = None;
        }
    }

    fn type_char(&mut self, ch: char) {
        let now = self.clock.now();
        let key = Keystroke::new(ch, now);
        let deliveries = self.dispatcher.handle(InputEvent::Key(key));
        self.apply(&deliveries, now);

        // Terminators and other control characters never reach the text.
        if !key.is_control() {
            if let Some(field) = self.fields.get_mut(self.focused) {
                field.value.push(ch);
            }
        }
    }

    fn paste(&mut self, text: String) {
        let now = self.clock.now();
        let deliveries = self.dispatcher.handle(InputEvent::Paste {
            text: text.clone(),
            at: now,
        });
        let intercepted = deliveries
            .iter()
            .any(|d| d.source == DeliverySource::Paste);
        self.apply(&deliveries, now);

        if !intercepted {
            if let Some(field) = self.fields.get_mut(self.focused) {
                field.value.push_str(&text);
            }
        }
    }

    fn focus_current(&mut self) {
        let now = self.clock.now();
        let Some(field) = self.fields.get(self.focused) else {
            return;
        };
        debug!(element = %field.id, label = field.label, "Focus moved");
        let deliveries = self.dispatcher.handle(InputEvent::Focus {
            element: field.id,
            ancestors: field.container.into_iter().collect(),
            at: now,
        });
        self.apply(&deliveries, now);
    }

    fn apply(&mut self, deliveries: &Deliveries, now: Timestamp) {
        for delivery in deliveries {
            let Some(field) = self.fields.iter_mut().find(|f| f.id == delivery.element) else {
                continue;
            };
            field.value.clear();
            field.value.push_str(delivery.code.as_str());
            info!(code = %delivery.code, field = field.label, source = ?delivery.source, "Code delivered");

            let label = field.label;
            self.status = Some(StatusMessage::info(
                format!("{} → {label}", delivery.code),
                now,
            ));
            self.push_log(ScanLogEntry {
                at: now,
                code: delivery.code.clone(),
                field: Some(label),
                source: Some(delivery.source),
            });
        }

        while let Some(code) = self.monitor.try_next() {
            let routed = deliveries
                .iter()
                .any(|d| d.source == DeliverySource::Broadcast && d.code == code);
            if routed {
                continue;
            }
            info!(code = %code, "Code scanned with no field in scope");
            self.status = Some(StatusMessage::error(
                format!("{code} scanned, no field in scope"),
                now,
            ));
            self.push_log(ScanLogEntry {
                at: now,
                code,
                field: None,
                source: None,
            });
        }
    }

    fn push_log(&mut self, entry: ScanLogEntry) {
        self.log.push_front(entry);
        self.log.truncate(MAX_LOG_ENTRIES);
    }
}
