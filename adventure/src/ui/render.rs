//! Render orchestration for the adventure TUI

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use adventure_core::{ControllerState, StoryService};

use crate::app::App;
use crate::ui::layout::{centered_rect_fixed, AppLayout};
use crate::ui::widgets::{
    ChoicesWidget, DialogueWidget, HotkeyBarWidget, SetupWidget, SidebarWidget, StatusBarWidget,
};

/// Main render function
pub fn render<S: StoryService + 'static>(frame: &mut Frame, app: &App<S>) {
    let area = frame.area();

    match app.state() {
        ControllerState::Configuring => render_setup(frame, app, area),
        _ => render_game(frame, app, area),
    }

    if app.has_overlay() {
        render_help_overlay(frame, app, area);
    }
}

/// Render the setup screen
fn render_setup<S: StoryService + 'static>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(area);

    render_title_bar(frame, app, chunks[0]);

    let panel = centered_rect_fixed(64, 16, chunks[1]);
    let setup = SetupWidget::new(&app.setup, &app.theme).status(app.status_message());
    frame.render_widget(setup, panel);

    frame.render_widget(HotkeyBarWidget::new(app.state(), &app.theme), chunks[2]);
}

/// Render the game screen (70/30 split)
fn render_game<S: StoryService + 'static>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let controller = &app.controller;
    let choices: &[String] = if controller.is_ended() {
        &[]
    } else {
        controller.current_choices()
    };
    let restart = app.restart_offered();
    let layout = AppLayout::calculate(area, ChoicesWidget::rows(choices.len(), restart));

    render_title_bar(frame, app, layout.title_area);

    let title = match app.state() {
        ControllerState::Ended => " The End ".to_string(),
        _ => format!(" {} ", controller.progress().label()),
    };
    let dialogue = DialogueWidget::new(app.dialogue_text(), &app.theme)
        .title(title)
        .scroll(app.story_scroll)
        .loading(controller.is_loading(), app.animation_frame);
    frame.render_widget(dialogue, layout.dialogue_area);

    let choices_widget = ChoicesWidget::new(choices, &app.theme)
        .selected(app.selected_choice)
        .enabled(controller.choices_enabled())
        .restart_button(restart);
    frame.render_widget(choices_widget, layout.choices_area);

    let journey = controller.journey();
    let sidebar = SidebarWidget::new(
        controller.alignment(),
        controller.progress(),
        &journey,
        &app.theme,
    );
    frame.render_widget(sidebar, layout.sidebar_area);

    let status = StatusBarWidget::new(app.state(), &app.theme).message(app.status_message());
    frame.render_widget(status, layout.status_bar);

    frame.render_widget(HotkeyBarWidget::new(app.state(), &app.theme), layout.hotkey_bar);
}

/// Render the title bar
fn render_title_bar<S: StoryService + 'static>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let mut title = String::from(" Choose Your Path ");
    if app.state() != ControllerState::Configuring {
        title.push_str(&format!("| {} chapters ", app.controller.chapter_limit()));
    }
    let line = Line::from(Span::styled(title, app.theme.title_style()));
    frame.render_widget(Paragraph::new(line), area);
}

/// Render help overlay
fn render_help_overlay<S: StoryService + 'static>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let popup_area = centered_rect_fixed(50, 20, area);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default().add_modifier(Modifier::UNDERLINED),
        ))
    };

    let help_text = vec![
        Line::from(Span::styled(
            " Choose Your Path - Help ",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        heading("Setup:"),
        Line::from("  ←/→            Shorter/longer (preset)"),
        Line::from("  Tab            Switch preset/custom"),
        Line::from("  0-9            Type a length (custom)"),
        Line::from("  Enter          Begin"),
        Line::from(""),
        heading("Story:"),
        Line::from("  1-9            Take that choice"),
        Line::from("  ↑/↓ + Enter    Select and take a choice"),
        Line::from("  j/k            Scroll the story"),
        Line::from("  r              Restart"),
        Line::from(""),
        heading("Anywhere:"),
        Line::from("  ?              Toggle this help"),
        Line::from("  q / Ctrl+C     Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or q to close",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, popup_area);
}
