//! Choice list and restart button

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::ui::theme::GameTheme;

pub const RESTART_LABEL: &str = "[r] Restart your adventure";

pub struct ChoicesWidget<'a> {
    choices: &'a [String],
    selected: usize,
    enabled: bool,
    restart: bool,
    theme: &'a GameTheme,
}

impl<'a> ChoicesWidget<'a> {
    pub fn new(choices: &'a [String], theme: &'a GameTheme) -> Self {
        Self {
            choices,
            selected: 0,
            enabled: true,
            restart: false,
            theme,
        }
    }

    pub fn selected(mut self, selected: usize) -> Self {
        self.selected = selected;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn restart_button(mut self, restart: bool) -> Self {
        self.restart = restart;
        self
    }

    /// Rows needed to show everything.
    pub fn rows(choices: usize, restart: bool) -> u16 {
        (choices + usize::from(restart)) as u16
    }
}

impl Widget for ChoicesWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.enabled && !self.choices.is_empty() {
            " What will you do? [1-9 / ↑↓ Enter] "
        } else {
            " What will you do? "
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.enabled));

        let mut lines: Vec<Line> = self
            .choices
            .iter()
            .enumerate()
            .map(|(i, choice)| {
                let style = self.theme.choice_style(i == self.selected, self.enabled);
                Line::from(Span::styled(format!(" {}. {choice} ", i + 1), style))
            })
            .collect();

        if self.restart {
            lines.push(Line::from(Span::styled(
                RESTART_LABEL,
                Style::default()
                    .fg(self.theme.border_focused)
                    .add_modifier(Modifier::BOLD),
            )));
        }

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
