//! Status bar component.
//!
//! Displays the mode indicator, the focused field, the latest status
//! message and a help hint.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use crate::app::{App, AppMode};
use crate::theme::Theme;

/// Bottom line: mode, focused field, status message and help hint.
pub struct StatusBar<'a> {
    app: &'a App,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    /// Creates a new status bar.
    #[must_use]
    pub const fn new(app: &'a App, theme: &'a Theme) -> Self {
        Self { app, theme }
    }

    fn build_line(&self) -> Line<'a> {
        let mut spans = Vec::new();

        let mode_text = match self.app.mode {
            AppMode::Normal => "INPUT",
            AppMode::Help => "HELP",
        };
        spans.push(Span::styled(
            format!(" {mode_text} "),
            Style::default()
                .fg(Color::Black)
                .bg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" "));

        if let Some(field) = self.app.focused_field() {
            spans.push(Span::styled(field.label, self.theme.accent_style()));
            spans.push(Span::raw(" │ "));
        }

        if let Some(ref status) = self.app.status {
            let style = if status.is_error {
                self.theme.error_style()
            } else {
                self.theme.base_style()
            };
            spans.push(Span::styled(status.text.clone(), style));
            spans.push(Span::raw(" │ "));
        }

        spans.push(Span::styled(
            "Tab next field · Ctrl+Q quit",
            Style::default().fg(Color::DarkGray),
        ));

        Line::from(spans)
    }
}

impl Widget for &StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.build_line())
            .style(self.theme.status_bar_style)
            .render(area, buf);
    }
}
