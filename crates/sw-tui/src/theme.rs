//! Console colors, including one color per delivery source.
//!
//! # Example
//!
//! ```
//! use sw_field::DeliverySource;
//! use sw_tui::Theme;
//!
//! let theme = Theme::dark();
//! let style = theme.source_style(Some(DeliverySource::Broadcast));
//! ```

use ratatui::style::{Color, Modifier, Style};
use sw_core::ColorScheme;
use sw_field::DeliverySource;

/// Console colors and styles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Codes delivered from the global broadcast.
    pub broadcast_fg: Color,

    /// Codes delivered through the paste fast path.
    pub paste_fg: Color,

    /// Codes completed by a standalone directive.
    pub local_fg: Color,

    /// Codes broadcast while no field was in scope.
    pub unrouted_fg: Color,

    /// Primary foreground color.
    pub fg: Color,

    /// Primary background color.
    pub bg: Color,

    /// Dimmed/secondary text color.
    pub dimmed_fg: Color,

    /// Accent color for highlights.
    pub accent: Color,

    /// Error/warning color.
    pub error_fg: Color,

    /// Style for normal borders.
    pub border_style: Style,

    /// Style for the focused field's border.
    pub focused_border_style: Style,

    /// Style for the header bar.
    pub header_style: Style,

    /// Style for the status bar.
    pub status_bar_style: Style,
}

impl Theme {
    /// Creates a dark theme (light text on dark background).
    #[must_use]
    pub fn dark() -> Self {
        Self {
            broadcast_fg: Color::Rgb(100, 255, 100),
            paste_fg: Color::Rgb(255, 200, 100),
            local_fg: Color::Rgb(120, 200, 255),
            unrouted_fg: Color::Rgb(128, 128, 128),

            fg: Color::Rgb(220, 220, 220),
            bg: Color::Reset,
            dimmed_fg: Color::Rgb(128, 128, 128),
            accent: Color::Rgb(100, 150, 255),
            error_fg: Color::Rgb(255, 80, 80),

            border_style: Style::default().fg(Color::Rgb(80, 80, 100)),
            focused_border_style: Style::default()
                .fg(Color::Rgb(100, 150, 255))
                .add_modifier(Modifier::BOLD),

            header_style: Style::default()
                .fg(Color::Rgb(100, 150, 255))
                .add_modifier(Modifier::BOLD),
            status_bar_style: Style::default()
                .fg(Color::Rgb(180, 180, 180))
                .bg(Color::Rgb(40, 40, 50)),
        }
    }

    /// Creates a light theme (dark text on light background).
    #[must_use]
    pub fn light() -> Self {
        Self {
            broadcast_fg: Color::Rgb(50, 150, 50),
            paste_fg: Color::Rgb(180, 130, 50),
            local_fg: Color::Rgb(40, 110, 170),
            unrouted_fg: Color::Rgb(100, 100, 100),

            fg: Color::Rgb(30, 30, 30),
            bg: Color::Reset,
            dimmed_fg: Color::Rgb(100, 100, 100),
            accent: Color::Rgb(50, 100, 200),
            error_fg: Color::Rgb(180, 50, 50),

            border_style: Style::default().fg(Color::Rgb(150, 150, 170)),
            focused_border_style: Style::default()
                .fg(Color::Rgb(50, 100, 200))
                .add_modifier(Modifier::BOLD),

            header_style: Style::default()
                .fg(Color::Rgb(50, 100, 200))
                .add_modifier(Modifier::BOLD),
            status_bar_style: Style::default()
                .fg(Color::Rgb(60, 60, 60))
                .bg(Color::Rgb(220, 220, 230)),
        }
    }

    /// Creates a theme from a [`ColorScheme`] configuration.
    ///
    /// [`ColorScheme::Auto`] defaults to the dark theme.
    #[must_use]
    pub fn from_scheme(scheme: ColorScheme) -> Self {
        match scheme {
            ColorScheme::Light => Self::light(),
            ColorScheme::Dark | ColorScheme::Auto | _ => Self::dark(),
        }
    }

    /// Returns the color for a delivery source; `None` means unrouted.
    #[must_use]
    pub const fn source_color(&self, source: Option<DeliverySource>) -> Color {
        match source {
            Some(DeliverySource::Broadcast) => self.broadcast_fg,
            Some(DeliverySource::Paste) => self.paste_fg,
            Some(DeliverySource::Local) => self.local_fg,
            None => self.unrouted_fg,
        }
    }

    /// Returns the style for a delivery source.
    #[must_use]
    pub fn source_style(&self, source: Option<DeliverySource>) -> Style {
        Style::default().fg(self.source_color(source))
    }

    /// Returns the short tag shown in the scan log for a delivery source.
    #[must_use]
    pub const fn source_tag(source: Option<DeliverySource>) -> &'static str {
        match source {
            Some(DeliverySource::Broadcast) => "[scan]",
            Some(DeliverySource::Paste) => "[paste]",
            Some(DeliverySource::Local) => "[local]",
            None => "[----]",
        }
    }

    /// Returns a style with the base foreground color.
    #[must_use]
    pub fn base_style(&self) -> Style {
        Style::default().fg(self.fg)
    }

    /// Returns a style for dimmed/secondary text.
    #[must_use]
    pub fn dimmed_style(&self) -> Style {
        Style::default().fg(self.dimmed_fg)
    }

    /// Returns a style for accent/highlighted text.
    #[must_use]
    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    /// Returns a style for error text.
    #[must_use]
    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error_fg)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_scheme() {
        assert_eq!(Theme::from_scheme(ColorScheme::Dark), Theme::dark());
        assert_eq!(Theme::from_scheme(ColorScheme::Light), Theme::light());
        assert_eq!(Theme::from_scheme(ColorScheme::Auto), Theme::dark());
    }

    #[test]
    fn test_source_color() {
        let theme = Theme::dark();
        assert_eq!(
            theme.source_color(Some(DeliverySource::Broadcast)),
            theme.broadcast_fg
        );
        assert_eq!(theme.source_color(Some(DeliverySource::Paste)), theme.paste_fg);
        assert_eq!(theme.source_color(Some(DeliverySource::Local)), theme.local_fg);
        assert_eq!(theme.source_color(None), theme.unrouted_fg);
    }

    #[test]
    fn test_source_tag() {
        assert_eq!(Theme::source_tag(Some(DeliverySource::Broadcast)), "[scan]");
        assert_eq!(Theme::source_tag(Some(DeliverySource::Paste)), "[paste]");
        assert_eq!(Theme::source_tag(None), "[----]");
    }

    #[test]
    fn test_theme_default() {
        assert_eq!(Theme::default(), Theme::dark());
    }
}
