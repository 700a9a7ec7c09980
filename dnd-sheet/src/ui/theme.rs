//! Color theme and styling for the sheet TUI

use ratatui::style::{Color, Modifier, Style};

use dnd_sheet_core::roll::DieColor;

/// Sheet UI color theme
#[derive(Debug, Clone)]
pub struct GameTheme {
    // Base colors
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,
    pub highlight: Color,

    // Roll result colors
    pub crit_success: Color,
    pub crit_failure: Color,
    pub landed_die: Color,
    pub dropped_die: Color,

    // Text colors
    pub system_text: Color,
}

impl Default for GameTheme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Cyan,
            highlight: Color::LightCyan,

            crit_success: Color::Yellow,
            crit_failure: Color::Red,
            landed_die: Color::White,
            dropped_die: Color::DarkGray,

            system_text: Color::DarkGray,
        }
    }
}

impl GameTheme {
    /// Get style for system messages
    pub fn system_style(&self) -> Style {
        Style::default()
            .fg(self.system_text)
            .add_modifier(Modifier::DIM)
    }

    /// Get style for the selected sheet row
    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.highlight)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    }

    /// Get style for dice roll result
    pub fn roll_result_style(&self, is_crit: bool, is_fumble: bool) -> Style {
        if is_crit {
            Style::default()
                .fg(self.crit_success)
                .add_modifier(Modifier::BOLD)
        } else if is_fumble {
            Style::default()
                .fg(self.crit_failure)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(self.foreground)
                .add_modifier(Modifier::BOLD)
        }
    }

    /// Get style for one die face
    pub fn die_style(&self, color: DieColor) -> Style {
        match color {
            DieColor::Red => Style::default().fg(Color::LightRed),
            DieColor::Yellow => Style::default().fg(Color::LightYellow),
            DieColor::Green => Style::default().fg(Color::LightGreen),
            DieColor::Cyan => Style::default().fg(Color::LightCyan),
            DieColor::Blue => Style::default().fg(Color::LightBlue),
            DieColor::Magenta => Style::default().fg(Color::LightMagenta),
            DieColor::Landed => Style::default()
                .fg(self.landed_die)
                .add_modifier(Modifier::BOLD),
            DieColor::Dropped => Style::default()
                .fg(self.dropped_die)
                .add_modifier(Modifier::CROSSED_OUT),
        }
    }

    /// Get border style
    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }

    /// Get title style
    pub fn title_style(&self, focused: bool) -> Style {
        let style = Style::default().fg(if focused {
            self.border_focused
        } else {
            self.foreground
        });

        if focused {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }
}
