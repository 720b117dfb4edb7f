//! Header bar component.
//!
//! Displays the application title, the capture thresholds in effect and the
//! burst currently being buffered.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use sw_core::CaptureConfig;

/// The header bar component.
pub struct HeaderBar<'a> {
    /// Capture thresholds in effect.
    capture: &'a CaptureConfig,
    /// Characters buffered by the capture service.
    pending: &'a str,
}

impl<'a> HeaderBar<'a> {
    /// Creates a new header bar.
    #[must_use]
    pub const fn new(capture: &'a CaptureConfig, pending: &'a str) -> Self {
        Self { capture, pending }
    }
}

impl Widget for &HeaderBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let value_style = Style::default().fg(Color::White);
        let pending_style = Style::default().fg(Color::Green);
        let help_style = Style::default().fg(Color::Yellow);

        let charset = if self.capture.numeric_only {
            "digits"
        } else {
            "any"
        };

        let line = Line::from(vec![
            Span::styled("scanwedge", title_style),
            Span::raw(" │ "),
            Span::styled(
                format!(
                    "gap {}ms · min {} · {charset}",
                    self.capture.idle_gap_ms, self.capture.min_code_length
                ),
                value_style,
            ),
            Span::raw(" │ "),
            Span::styled(format!("buffer: {:?}", self.pending), pending_style),
            Span::raw(" │ "),
            Span::styled("F1 for help", help_style),
        ]);

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));

        Paragraph::new(line).block(block).render(area, buf);
    }
}
