//! Statistics panel component.
//!
//! Displays the capture counters and a gauge of how many evaluated bursts
//! were scans.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget};
use sw_capture::CaptureStats;

use crate::theme::Theme;

/// The statistics panel component.
pub struct StatsPanel<'a> {
    /// Counter snapshot.
    stats: CaptureStats,
    /// Theme for styling.
    theme: &'a Theme,
}

impl<'a> StatsPanel<'a> {
    /// Creates a new stats panel.
    #[must_use]
    pub const fn new(stats: CaptureStats, theme: &'a Theme) -> Self {
        Self { stats, theme }
    }

    fn counter(label: &'static str, value: u64, color: Color) -> [Span<'static>; 2] {
        [
            Span::styled(label, Style::default().fg(Color::DarkGray)),
            Span::styled(value.to_string(), Style::default().fg(color)),
        ]
    }
}

impl Widget for &StatsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(30)])
            .split(inner);

        let stats = &self.stats;
        let mut spans = Vec::with_capacity(12);
        spans.extend(StatsPanel::counter("Keys: ", stats.keystrokes, self.theme.fg));
        spans.push(Span::raw(" │ "));
        spans.extend(StatsPanel::counter(
            "Scans: ",
            stats.codes_emitted,
            self.theme.broadcast_fg,
        ));
        spans.push(Span::raw(" │ "));
        spans.extend(StatsPanel::counter(
            "Typed: ",
            stats.bursts_discarded,
            self.theme.dimmed_fg,
        ));
        spans.push(Span::raw(" │ "));
        spans.extend(StatsPanel::counter(
            "Terminated: ",
            stats.terminated_bursts,
            self.theme.accent,
        ));
        Paragraph::new(Line::from(spans)).render(chunks[0], buf);

        // scan_ratio() is within 0.0..=1.0
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = (stats.scan_ratio() * 100.0).round() as u16;

        Gauge::default()
            .gauge_style(
                Style::default()
                    .fg(self.theme.broadcast_fg)
                    .bg(Color::DarkGray),
            )
            .percent(percent)
            .label(format!("{percent}% scans"))
            .render(chunks[1], buf);
    }
}
