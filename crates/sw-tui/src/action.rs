//! User actions for the console.
//!
//! Key presses and pastes are translated into [`Action`]s by
//! [`App::handle_key`](crate::App::handle_key) and applied by
//! [`App::update`](crate::App::update).
//!
//! ```text
//! Key/Paste Event → App::handle_* → Action → App::update → ScanDispatcher
//! ```

/// User-initiated actions in the console.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Action {
    // =========================================================================
    // Field Focus
    // =========================================================================
    /// Move focus to the next field.
    NextField,

    /// Move focus to the previous field.
    PreviousField,

    /// Focus a specific field by index.
    FocusField(usize),

    // =========================================================================
    // Input
    // =========================================================================
    /// A character typed into the focused field.
    Type(char),

    /// Delete the last character of the focused field.
    Backspace,

    /// Clear the focused field.
    ClearField,

    /// Text pasted into the focused field.
    Paste(String),

    // =========================================================================
    // UI State
    // =========================================================================
    /// Clear the scan log.
    ClearLog,

    /// Toggle the help panel.
    ToggleHelp,

    /// Hide the help panel.
    HideHelp,

    /// Show a status message.
    ShowStatus(String),

    /// Clear the status message.
    ClearStatus,

    // =========================================================================
    // Application Control
    // =========================================================================
    /// Quit the application.
    Quit,

    /// Render the UI.
    Render,

    /// No operation.
    #[default]
    None,
}

impl Action {
    /// Returns `true` if this action requires a re-render.
    #[must_use]
    pub const fn needs_render(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Returns `true` if this action feeds the scan dispatcher.
    #[must_use]
    pub const fn is_input(&self) -> bool {
        matches!(self, Self::Type(_) | Self::Paste(_))
    }

    /// Returns `true` if this action moves field focus.
    #[must_use]
    pub const fn is_focus_change(&self) -> bool {
        matches!(
            self,
            Self::NextField | Self::PreviousField | Self::FocusField(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_needs_render() {
        assert!(Action::NextField.needs_render());
        assert!(Action::ToggleHelp.needs_render());
        assert!(!Action::None.needs_render());
    }

    #[test]
    fn test_action_is_input() {
        assert!(Action::Type('1').is_input());
        assert!(Action::Paste("123".to_owned()).is_input());
        assert!(!Action::Backspace.is_input());
        assert!(!Action::Quit.is_input());
    }

    #[test]
    fn test_action_is_focus_change() {
        assert!(Action::NextField.is_focus_change());
        assert!(Action::FocusField(2).is_focus_change());
        assert!(!Action::Type('\t').is_focus_change());
    }

    #[test]
    fn test_action_default() {
        assert_eq!(Action::default(), Action::None);
    }
}
