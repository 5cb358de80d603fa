//! Sidebar: moral meter, chapter progress and the journey so far

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use adventure_core::{JourneyEntry, MoralAlignment, Progress};

use crate::ui::theme::GameTheme;

/// Horizontal meter from "Virtuous" to "Dark" with a marker at the
/// alignment's position.
pub struct MoralMeterWidget<'a> {
    alignment: &'a MoralAlignment,
    theme: &'a GameTheme,
}

impl<'a> MoralMeterWidget<'a> {
    pub fn new(alignment: &'a MoralAlignment, theme: &'a GameTheme) -> Self {
        Self { alignment, theme }
    }

    /// Meter track of `width` cells with the marker placed for `position`.
    fn track(width: usize, position: f32) -> String {
        if width == 0 {
            return String::new();
        }
        let marker = ((width - 1) as f32 * position.clamp(0.0, 1.0)).round() as usize;
        (0..width)
            .map(|i| if i == marker { '◆' } else { '─' })
            .collect()
    }
}

impl Widget for MoralMeterWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let position = self.alignment.meter_position();
        let color = self.theme.alignment_color(position);

        let ends = Line::from(vec![
            Span::styled("Virtuous", Style::default().fg(self.theme.virtuous)),
            Span::raw(" ".repeat((area.width as usize).saturating_sub(12))),
            Span::styled("Dark", Style::default().fg(self.theme.dark)),
        ]);
        let track = Line::from(Span::styled(
            Self::track(area.width as usize, position),
            Style::default().fg(color),
        ));
        let name = Line::from(Span::styled(
            self.alignment.display_name().to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));

        Paragraph::new(vec![ends, track, name]).render(area, buf);
    }
}

/// Complete sidebar panel
pub struct SidebarWidget<'a> {
    alignment: &'a MoralAlignment,
    progress: Progress,
    journey: &'a [JourneyEntry],
    theme: &'a GameTheme,
}

impl<'a> SidebarWidget<'a> {
    pub fn new(
        alignment: &'a MoralAlignment,
        progress: Progress,
        journey: &'a [JourneyEntry],
        theme: &'a GameTheme,
    ) -> Self {
        Self {
            alignment,
            progress,
            journey,
            theme,
        }
    }
}

impl Widget for SidebarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Your Journey ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // "Character Path"
                Constraint::Length(3), // Meter
                Constraint::Length(1), // Progress gauge
                Constraint::Length(1), // Spacer
                Constraint::Min(0),    // Journey list
            ])
            .split(inner);

        Paragraph::new(Line::from(Span::styled(
            "Character Path",
            Style::default().add_modifier(Modifier::UNDERLINED),
        )))
        .render(chunks[0], buf);

        MoralMeterWidget::new(self.alignment, self.theme).render(chunks[1], buf);

        Gauge::default()
            .gauge_style(Style::default().fg(self.theme.progress))
            .ratio(self.progress.ratio())
            .label(self.progress.label())
            .render(chunks[2], buf);

        let mut lines = Vec::new();
        for entry in self.journey {
            lines.push(Line::from(Span::styled(
                format!("Chapter {}", entry.number),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            let text = entry.summary.as_deref().unwrap_or(&entry.excerpt);
            lines.push(Line::from(Span::styled(
                text.to_string(),
                self.theme.summary_style(),
            )));
            if let (None, Some(choice)) = (&entry.summary, &entry.choice) {
                lines.push(Line::from(Span::styled(
                    format!("→ {choice}"),
                    Style::default().fg(self.theme.choice_text),
                )));
            }
            lines.push(Line::from(""));
        }

        // Keep the latest chapters in view
        let visible = chunks[4].height as usize;
        let skip = lines.len().saturating_sub(visible * 2);
        Paragraph::new(lines.split_off(skip))
            .wrap(Wrap { trim: true })
            .render(chunks[4], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_marker_position() {
        assert_eq!(MoralMeterWidget::track(5, 0.0), "◆────");
        assert_eq!(MoralMeterWidget::track(5, 0.5), "──◆──");
        assert_eq!(MoralMeterWidget::track(5, 1.0), "────◆");
        assert_eq!(MoralMeterWidget::track(0, 0.5), "");
    }

    fn rendered(journey: &[JourneyEntry]) -> String {
        let theme = GameTheme::default();
        let alignment = MoralAlignment::Neutral;
        let progress = Progress { current: 2, limit: 5 };
        let area = Rect::new(0, 0, 40, 24);
        let mut buf = Buffer::empty(area);
        SidebarWidget::new(&alignment, progress, journey, &theme).render(area, &mut buf);

        let mut text = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                text.push_str(buf[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_journey_choice_only_without_summary() {
        let journey = vec![
            JourneyEntry {
                number: 1,
                summary: Some("Crossed the bridge".to_string()),
                excerpt: "The bridge creaks".to_string(),
                choice: Some("Cross".to_string()),
            },
            JourneyEntry {
                number: 2,
                summary: None,
                excerpt: "A dark cave".to_string(),
                choice: Some("Enter".to_string()),
            },
        ];
        let text = rendered(&journey);

        assert!(text.contains("Crossed the bridge"));
        assert!(!text.contains("The bridge creaks"));
        assert!(!text.contains("→ Cross"));
        assert!(text.contains("A dark cave"));
        assert!(text.contains("→ Enter"));
    }
}
