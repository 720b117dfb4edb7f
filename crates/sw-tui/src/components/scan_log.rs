//! Scan log component.
//!
//! Lists completed codes, newest first, with the field that received each
//! one.

use std::collections::vec_deque;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Widget};

use crate::app::ScanLogEntry;
use crate::theme::Theme;

/// The scan log component.
pub struct ScanLog<'a> {
    /// Entries, newest first.
    entries: vec_deque::Iter<'a, ScanLogEntry>,
    /// Theme for styling.
    theme: &'a Theme,
}

impl<'a> ScanLog<'a> {
    /// Creates a new scan log view.
    #[must_use]
    pub const fn new(entries: vec_deque::Iter<'a, ScanLogEntry>, theme: &'a Theme) -> Self {
        Self { entries, theme }
    }

    fn item(&self, entry: &'a ScanLogEntry) -> ListItem<'a> {
        let target = entry.field.unwrap_or("no field in scope");
        ListItem::new(Line::from(vec![
            Span::styled(
                format!("{:>8} ", entry.at.to_string()),
                self.theme.dimmed_style(),
            ),
            Span::styled(
                Theme::source_tag(entry.source),
                self.theme.source_style(entry.source),
            ),
            Span::raw(" "),
            Span::styled(entry.code.as_str(), self.theme.base_style()),
            Span::styled(format!(" → {target}"), self.theme.dimmed_style()),
        ]))
    }
}

impl Widget for &ScanLog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style)
            .title(Span::styled(
                format!(" Scan log ({}) ", self.entries.len()),
                self.theme.header_style,
            ));

        let visible = usize::from(block.inner(area).height);
        let items: Vec<ListItem<'_>> = self
            .entries
            .clone()
            .take(visible)
            .map(|entry| self.item(entry))
            .collect();

        List::new(items).block(block).render(area, buf);
    }
}
