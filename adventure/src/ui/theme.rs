//! Color theme and styling for the adventure TUI

use ratatui::style::{Color, Modifier, Style};

/// Adventure UI color theme
#[derive(Debug, Clone)]
pub struct GameTheme {
    // Base colors
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,

    // Moral meter
    pub virtuous: Color,
    pub neutral: Color,
    pub dark: Color,

    // Text colors
    pub story_text: Color,
    pub choice_text: Color,
    pub choice_selected: Color,
    pub summary_text: Color,
    pub system_text: Color,
    pub error_text: Color,

    pub progress: Color,
}

impl Default for GameTheme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Cyan,

            virtuous: Color::LightBlue,
            neutral: Color::Gray,
            dark: Color::LightRed,

            story_text: Color::White,
            choice_text: Color::Yellow,
            choice_selected: Color::LightYellow,
            summary_text: Color::Gray,
            system_text: Color::DarkGray,
            error_text: Color::Red,

            progress: Color::Green,
        }
    }
}

impl GameTheme {
    pub fn story_style(&self) -> Style {
        Style::default().fg(self.story_text)
    }

    /// Style for a choice row; dimmed while choices are disabled.
    pub fn choice_style(&self, selected: bool, enabled: bool) -> Style {
        if !enabled {
            return Style::default()
                .fg(self.system_text)
                .add_modifier(Modifier::DIM);
        }
        if selected {
            Style::default()
                .fg(self.choice_selected)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(self.choice_text)
        }
    }

    pub fn summary_style(&self) -> Style {
        Style::default().fg(self.summary_text)
    }

    pub fn system_style(&self) -> Style {
        Style::default()
            .fg(self.system_text)
            .add_modifier(Modifier::DIM)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error_text)
    }

    /// Meter color for a position, 0.0 = virtuous through 1.0 = dark
    pub fn alignment_color(&self, position: f32) -> Color {
        if position < 0.4 {
            self.virtuous
        } else if position > 0.6 {
            self.dark
        } else {
            self.neutral
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

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.foreground)
            .add_modifier(Modifier::BOLD)
    }
}
