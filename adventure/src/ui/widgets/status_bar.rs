//! Status bar widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use adventure_core::ControllerState;

use crate::ui::theme::GameTheme;

/// Status bar showing the controller state and the current message
pub struct StatusBarWidget<'a> {
    state: ControllerState,
    theme: &'a GameTheme,
    message: Option<&'a str>,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(state: ControllerState, theme: &'a GameTheme) -> Self {
        Self {
            state,
            theme,
            message: None,
        }
    }

    pub fn message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (label, color) = match self.state {
            ControllerState::Configuring => ("SETUP", Color::Blue),
            ControllerState::Loading(_) => ("LOADING", Color::Yellow),
            ControllerState::Playing => ("PLAYING", Color::Green),
            ControllerState::Concluding => ("CONCLUDING", Color::Yellow),
            ControllerState::Ended => ("THE END", Color::Magenta),
        };

        let mut spans = vec![Span::styled(
            format!("-- {label} --"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )];

        if let Some(msg) = self.message {
            let style = if self.state == ControllerState::Loading(adventure_core::LoadPhase::Next) {
                self.theme.system_style()
            } else {
                self.theme.error_style()
            };
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(msg, style));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

/// Hotkey bar widget
pub struct HotkeyBarWidget<'a> {
    state: ControllerState,
    theme: &'a GameTheme,
}

impl<'a> HotkeyBarWidget<'a> {
    pub fn new(state: ControllerState, theme: &'a GameTheme) -> Self {
        Self { state, theme }
    }
}

impl Widget for HotkeyBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let hotkeys: &[(&str, &str)] = match self.state {
            ControllerState::Configuring => &[
                ("←/→", "Length"),
                ("Tab", "Preset/Custom"),
                ("Enter", "Begin"),
                ("?", "Help"),
                ("q", "Quit"),
            ],
            ControllerState::Playing => &[
                ("1-9", "Choose"),
                ("↑/↓", "Select"),
                ("j/k", "Scroll"),
                ("r", "Restart"),
                ("?", "Help"),
                ("q", "Quit"),
            ],
            ControllerState::Ended => &[("r", "Restart"), ("j/k", "Scroll"), ("q", "Quit")],
            ControllerState::Loading(_) | ControllerState::Concluding => &[("Ctrl+C", "Quit")],
        };

        let key_style = Style::default()
            .fg(self.theme.border_focused)
            .add_modifier(Modifier::BOLD);

        let mut spans = Vec::new();
        for (i, (key, action)) in hotkeys.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(*key, key_style));
            spans.push(Span::styled(format!(" {action}"), self.theme.system_style()));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}
