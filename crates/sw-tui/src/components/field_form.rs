//! Form component.
//!
//! Renders the demo form: one bordered input per field, grouped under the
//! container the field belongs to.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{DISPENSING_CONTAINER, FormField};
use crate::theme::Theme;

/// Height of one field, borders included.
const FIELD_HEIGHT: u16 = 3;

/// The form component.
pub struct FieldForm<'a> {
    /// Fields in focus order.
    fields: &'a [FormField],
    /// Index of the focused field.
    focused: usize,
    /// Theme for styling.
    theme: &'a Theme,
}

impl<'a> FieldForm<'a> {
    /// Creates a new form view.
    #[must_use]
    pub const fn new(fields: &'a [FormField], focused: usize, theme: &'a Theme) -> Self {
        Self {
            fields,
            focused,
            theme,
        }
    }

    fn render_field(&self, index: usize, field: &FormField, area: Rect, buf: &mut Buffer) {
        let is_focused = index == self.focused;
        let border_style = if is_focused {
            self.theme.focused_border_style
        } else {
            self.theme.border_style
        };

        let mut title = vec![Span::styled(
            format!(" {} ", field.label),
            self.theme.base_style(),
        )];
        if field.has_directive() {
            title.push(Span::styled("[scan] ", self.theme.accent_style()));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Line::from(title));

        // Room for the cursor when focused.
        let width = usize::from(block.inner(area).width).saturating_sub(1);
        let mut text = vec![Span::styled(
            tail_fit(&field.value, width),
            self.theme.base_style(),
        )];
        if is_focused {
            text.push(Span::styled(
                "▏",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::SLOW_BLINK),
            ));
        }

        Paragraph::new(Line::from(text))
            .block(block)
            .render(area, buf);
    }
}

impl Widget for &FieldForm<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let outer = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style)
            .title(Span::styled(" Form ", self.theme.header_style));
        let inner = outer.inner(area);
        outer.render(area, buf);

        let (grouped, loose): (Vec<_>, Vec<_>) = self
            .fields
            .iter()
            .enumerate()
            .partition(|(_, f)| f.container == Some(DISPENSING_CONTAINER));

        // Container border adds two rows around its fields.
        #[allow(clippy::cast_possible_truncation)]
        let group_height = grouped.len() as u16 * FIELD_HEIGHT + 2;
        let mut constraints = vec![Constraint::Length(group_height)];
        constraints.extend(loose.iter().map(|_| Constraint::Length(FIELD_HEIGHT)));
        constraints.push(Constraint::Min(0));

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        let group = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.dimmed_style())
            .title(Span::styled(" Dispensing ", self.theme.dimmed_style()));
        let group_inner = group.inner(rows[0]);
        group.render(rows[0], buf);

        let group_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(grouped.iter().map(|_| Constraint::Length(FIELD_HEIGHT)))
            .split(group_inner);
        for (&(index, field), &row) in grouped.iter().zip(group_rows.iter()) {
            self.render_field(index, field, row, buf);
        }

        for (&(index, field), &row) in loose.iter().zip(rows.iter().skip(1)) {
            self.render_field(index, field, row, buf);
        }
    }
}

/// Returns the longest suffix of `text` that fits in `max_width` columns.
///
/// Input fields scroll, so the end of the text (where typing happens) is
/// what stays visible.
fn tail_fit(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_owned();
    }

    let mut width = 0;
    let start = text
        .char_indices()
        .rev()
        .take_while(|&(_, ch)| {
            width += ch.width().unwrap_or(0);
            width <= max_width
        })
        .last()
        .map_or(text.len(), |(i, _)| i);
    text[start..].to_owned()
}
