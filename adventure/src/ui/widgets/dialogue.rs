//! Dialogue box showing the current chapter, loading text or the ending

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::ui::theme::GameTheme;

const SPINNER: [&str; 4] = ["⠋", "⠙", "⠸", "⠴"];

pub struct DialogueWidget<'a> {
    text: &'a str,
    title: String,
    scroll: u16,
    loading: bool,
    frame: u8,
    theme: &'a GameTheme,
}

impl<'a> DialogueWidget<'a> {
    pub fn new(text: &'a str, theme: &'a GameTheme) -> Self {
        Self {
            text,
            title: " Story ".to_string(),
            scroll: 0,
            loading: false,
            frame: 0,
            theme,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn loading(mut self, loading: bool, frame: u8) -> Self {
        self.loading = loading;
        self.frame = frame;
        self
    }
}

impl Widget for DialogueWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title.as_str())
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(!self.loading));

        let lines: Vec<Line> = if self.loading {
            let spinner = SPINNER[self.frame as usize % SPINNER.len()];
            vec![Line::from(vec![
                Span::styled(format!("{spinner} "), self.theme.system_style()),
                Span::styled(
                    self.text,
                    self.theme.story_style().add_modifier(Modifier::ITALIC),
                ),
            ])]
        } else {
            self.text
                .lines()
                .map(|line| Line::from(Span::styled(line, self.theme.story_style())))
                .collect()
        };

        // Clamp so scrolling past the end leaves the last line visible
        let max_scroll = (lines.len() as u16).saturating_sub(1);

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll.min(max_scroll), 0))
            .render(area, buf);
    }
}
