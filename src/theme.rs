//! Centralized theme and styling for the selector screen
//!
//! Single source of truth for the colors and styles the menu uses.

use ratatui::style::{Color, Modifier, Style};

// =============================================================================
// COLOR PALETTE
// =============================================================================

/// Core color palette
pub struct Colors;

impl Colors {
    /// Default foreground text color
    pub const FG_PRIMARY: Color = Color::White;

    /// Disabled/inactive text color
    pub const FG_MUTED: Color = Color::DarkGray;

    /// Primary accent color - used for titles
    pub const PRIMARY: Color = Color::Cyan;

    /// Secondary accent color - used for selected checkboxes
    pub const SECONDARY: Color = Color::Yellow;

    /// Success/positive feedback
    pub const SUCCESS: Color = Color::Green;

    /// Navigation hint color
    pub const NAV_HINT: Color = Color::Gray;
}

// =============================================================================
// PRE-BUILT STYLES
// =============================================================================

/// Pre-built styles for the selector
pub struct Styles;

impl Styles {
    /// Default row text
    pub fn text() -> Style {
        Style::default().fg(Colors::FG_PRIMARY)
    }

    /// Muted text for control rows
    pub fn text_muted() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }

    /// Menu title
    pub fn title() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint line
    pub fn nav_hint() -> Style {
        Style::default().fg(Colors::NAV_HINT)
    }

    /// Checked checkbox
    pub fn checked() -> Style {
        Style::default()
            .fg(Colors::SECONDARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Row under the cursor
    pub fn cursor_row() -> Style {
        Style::default().add_modifier(Modifier::REVERSED)
    }

    /// Installed marker
    pub fn installed() -> Style {
        Style::default().fg(Colors::SUCCESS)
    }
}
