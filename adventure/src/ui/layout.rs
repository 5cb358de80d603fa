//! Layout calculations for the adventure TUI

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Game screen areas
pub struct AppLayout {
    pub title_area: Rect,
    pub dialogue_area: Rect,
    pub choices_area: Rect,
    pub sidebar_area: Rect,
    pub status_bar: Rect,
    pub hotkey_bar: Rect,
}

impl AppLayout {
    /// Calculate layout based on terminal size and the number of choice rows
    pub fn calculate(area: Rect, choice_rows: u16) -> Self {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title bar
                Constraint::Min(8),    // Main content
                Constraint::Length(1), // Status bar
                Constraint::Length(1), // Hotkey bar
            ])
            .split(area);

        // Content area: story column + sidebar
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(main_chunks[1]);

        let story_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(choice_rows.max(1) + 2),
            ])
            .split(content_chunks[0]);

        Self {
            title_area: main_chunks[0],
            dialogue_area: story_chunks[0],
            choices_area: story_chunks[1],
            sidebar_area: content_chunks[1],
            status_bar: main_chunks[2],
            hotkey_bar: main_chunks[3],
        }
    }
}

/// Calculate fixed-size centered popup
pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
