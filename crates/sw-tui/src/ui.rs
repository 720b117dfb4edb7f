//! Main UI layout and rendering orchestration.
//!
//! # Layout Structure
//!
//! ```text
//! +------------------------------------------------------------------+
//! | scanwedge | gap 100ms · min 6 · digits | buffer: "" | F1 for help |
//! +------------------------------------------------------------------+
//! | Keys: 42 | Scans: 3 | Typed: 1 | Terminated: 0   [=====>  ] 75%  |
//! +------------------------------------------------------------------+
//! |  Form                              |  Scan log (3)               |
//! |  ┌ Dispensing ──────────────────┐  |  1200ms [scan] 4006381333931 |
//! |  │ Product lookup [scan]        │  |  ...                        |
//! |  │ Quantity                     │  |                             |
//! |  └──────────────────────────────┘  |                             |
//! |  Batch number [scan]               |                             |
//! |  Notes                             |                             |
//! +------------------------------------------------------------------+
//! | INPUT  Batch number │ 4006381333931 → Batch number │ Tab next ... |
//! +------------------------------------------------------------------+
//! ```

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::app::{App, AppMode};
use crate::components::{FieldForm, HeaderBar, HelpPanel, ScanLog, StatsPanel, StatusBar};
use crate::theme::Theme;

/// Renders the entire UI based on the current application state.
pub fn render(app: &App, frame: &mut Frame, theme: &Theme) {
    let area = frame.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Stats
            Constraint::Min(10),   // Form + log
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let header = HeaderBar::new(&app.config().capture, app.pending());
    frame.render_widget(&header, main_chunks[0]);

    let stats_panel = StatsPanel::new(app.stats(), theme);
    frame.render_widget(&stats_panel, main_chunks[1]);

    render_main_content(app, frame, main_chunks[2], theme);

    let status_bar = StatusBar::new(app, theme);
    frame.render_widget(&status_bar, main_chunks[3]);

    if app.mode == AppMode::Help {
        let help_panel = HelpPanel::new(theme);
        let help_area = centered_rect(60, 70, area);
        frame.render_widget(&help_panel, help_area);
    }
}

/// Renders the form and the scan log side by side.
fn render_main_content(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let form = FieldForm::new(app.fields(), app.focused_index(), theme);
    frame.render_widget(&form, content_chunks[0]);

    let log = ScanLog::new(app.log(), theme);
    frame.render_widget(&log, content_chunks[1]);
}

/// Creates a centered rectangle with the given percentage width and height.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use sw_core::{Config, ManualClock};

    use super::*;
    use crate::action::Action;

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 100);
        let centered = centered_rect(50, 50, area);

        assert!(centered.x > 0);
        assert!(centered.y > 0);
        assert!(centered.width < area.width);
        assert!(centered.height < area.height);
    }

    #[test]
    fn test_render_full_screen() {
        let clock = ManualClock::new();
        let mut app = App::with_clock(Config::default(), Box::new(clock.clone()));
        for ch in "4006381333931".chars() {
            clock.advance(2);
            app.update(Action::Type(ch));
        }
        clock.advance(150);
        app.tick();

        let theme = Theme::dark();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| render(&app, frame, &theme))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = buffer
            .content()
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(ratatui::buffer::Cell::symbol).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n");

        assert!(screen.contains("scanwedge"));
        assert!(screen.contains("Product lookup"));
        assert!(screen.contains("Dispensing"));
        assert!(screen.contains("Scan log (1)"));
        assert!(screen.contains("[scan] 4006381333931 → Product lookup"));
    }
}
