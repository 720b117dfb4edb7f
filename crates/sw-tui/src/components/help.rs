//! Help panel component.
//!
//! Displays a modal overlay with key bindings.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Cell, Clear, Row, Table, Widget};

use crate::theme::Theme;

/// Key binding definition for the help panel.
struct KeyBinding {
    key: &'static str,
    description: &'static str,
}

const KEY_BINDINGS: &[KeyBinding] = &[
    KeyBinding {
        key: "Tab / ↓",
        description: "Next field",
    },
    KeyBinding {
        key: "Shift+Tab / ↑",
        description: "Previous field",
    },
    KeyBinding {
        key: "any character",
        description: "Type into the focused field",
    },
    KeyBinding {
        key: "Enter",
        description: "Terminator (completes a scan)",
    },
    KeyBinding {
        key: "Backspace",
        description: "Delete last character",
    },
    KeyBinding {
        key: "Esc",
        description: "Clear field / close help",
    },
    KeyBinding {
        key: "Ctrl+L",
        description: "Clear scan log",
    },
    KeyBinding {
        key: "F1",
        description: "Toggle help panel",
    },
    KeyBinding {
        key: "Ctrl+Q / Ctrl+C",
        description: "Quit",
    },
];

/// Key binding overlay.
pub struct HelpPanel<'a> {
    theme: &'a Theme,
}

impl<'a> HelpPanel<'a> {
    /// Creates a new help panel.
    #[must_use]
    pub const fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    fn build_rows(&self) -> Vec<Row<'static>> {
        KEY_BINDINGS
            .iter()
            .map(|binding| {
                Row::new(vec![
                    Cell::from(Span::styled(
                        binding.key,
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Cell::from(Span::styled(
                        binding.description,
                        self.theme.base_style(),
                    )),
                ])
            })
            .collect()
    }
}

impl Widget for &HelpPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.focused_border_style)
            .title(Span::styled(
                " Help - Key Bindings ",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ))
            .style(Style::default().bg(Color::Rgb(25, 25, 35)));

        let heading = Style::default()
            .fg(self.theme.accent)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        let header = Row::new(vec![
            Cell::from(Span::styled("Key", heading)),
            Cell::from(Span::styled("Action", heading)),
        ])
        .height(1)
        .bottom_margin(1);

        let widths = [Constraint::Length(18), Constraint::Min(25)];

        Table::new(self.build_rows(), widths)
            .block(block)
            .header(header)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings_not_empty() {
        assert!(!KEY_BINDINGS.is_empty());
    }

    #[test]
    fn test_help_panel_lists_bindings() {
        let theme = Theme::dark();
        let area = Rect::new(0, 0, 60, 16);
        let mut buf = Buffer::empty(area);
        (&HelpPanel::new(&theme)).render(area, &mut buf);

        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|pos| buf[pos].symbol().to_owned())
            .collect();
        assert!(text.contains("Terminator"));
        assert!(text.contains("Quit"));
    }
}
