//! Setup screen for choosing the adventure length

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use adventure_core::ChapterLimit;

use crate::app::{SetupMode, SetupState};
use crate::ui::theme::GameTheme;

pub struct SetupWidget<'a> {
    setup: &'a SetupState,
    status: Option<&'a str>,
    theme: &'a GameTheme,
}

impl<'a> SetupWidget<'a> {
    pub fn new(setup: &'a SetupState, theme: &'a GameTheme) -> Self {
        Self {
            setup,
            status: None,
            theme,
        }
    }

    pub fn status(mut self, status: Option<&'a str>) -> Self {
        self.status = status;
        self
    }

    fn mode_line(&self) -> Line<'static> {
        let tab = |label: &'static str, active: bool| {
            let style = if active {
                Style::default()
                    .fg(self.theme.border_focused)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                self.theme.system_style()
            };
            Span::styled(format!(" {label} "), style)
        };
        Line::from(vec![
            tab("Preset", self.setup.mode == SetupMode::Preset),
            Span::raw("  "),
            tab("Custom", self.setup.mode == SetupMode::Custom),
            Span::styled("   (Tab to switch)", self.theme.system_style()),
        ])
    }

    fn value_line(&self) -> Line<'static> {
        match self.setup.mode {
            SetupMode::Preset => Line::from(vec![
                Span::styled("◀ ", self.theme.system_style()),
                Span::styled(
                    format!("{} chapters", self.setup.preset),
                    self.theme.title_style(),
                ),
                Span::styled(
                    format!(" ▶    ({}-{})", ChapterLimit::MIN, ChapterLimit::PRESET_MAX),
                    self.theme.system_style(),
                ),
            ]),
            SetupMode::Custom => Line::from(vec![
                Span::raw("Chapters: "),
                Span::styled(
                    format!("{}▌", self.setup.custom_input),
                    self.theme.title_style(),
                ),
                Span::styled(
                    format!("    ({}-{})", ChapterLimit::MIN, ChapterLimit::MAX),
                    self.theme.system_style(),
                ),
            ]),
        }
    }
}

impl Widget for SetupWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Begin Your Adventure ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(true));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Prompt
                Constraint::Length(2), // Mode tabs
                Constraint::Length(2), // Value
                Constraint::Length(3), // Tier description
                Constraint::Min(0),    // Errors / status
            ])
            .split(inner);

        Paragraph::new("How many chapters should your story last?")
            .render(chunks[0], buf);
        Paragraph::new(self.mode_line()).render(chunks[1], buf);
        Paragraph::new(self.value_line()).render(chunks[2], buf);

        if let Some(limit) = self.setup.preview() {
            Paragraph::new(Span::styled(
                limit.tier().description(),
                self.theme.summary_style(),
            ))
            .wrap(Wrap { trim: true })
            .render(chunks[3], buf);
        }

        let mut lines = Vec::new();
        if let Some(error) = self.setup.error.as_deref().or(self.status) {
            lines.push(Line::from(Span::styled(error.to_string(), self.theme.error_style())));
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            "Press Enter to begin, ? for help, q to quit",
            self.theme.system_style(),
        )));
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(chunks[4], buf);
    }
}
