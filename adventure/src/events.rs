//! Event handling for the adventure TUI

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

use adventure_core::{ControllerState, StoryService};

use crate::app::{App, SetupMode};

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
}

/// Handle a terminal event
pub fn handle_event<S: StoryService + 'static>(app: &mut App<S>, event: Event) -> EventResult {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key_event(app, key),
        Event::Mouse(mouse) => handle_mouse_event(app, mouse),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

fn handle_mouse_event<S: StoryService + 'static>(app: &mut App<S>, mouse: MouseEvent) -> EventResult {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            app.scroll_up(3);
            EventResult::NeedsRedraw
        }
        MouseEventKind::ScrollDown => {
            app.scroll_down(3);
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

fn handle_key_event<S: StoryService + 'static>(app: &mut App<S>, key: KeyEvent) -> EventResult {
    // Global shortcuts (always work)
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    if app.has_overlay() {
        return handle_overlay_key(app, key);
    }

    match app.state() {
        ControllerState::Configuring => handle_setup_key(app, key),
        _ => handle_game_key(app, key),
    }
}

fn handle_overlay_key<S: StoryService + 'static>(app: &mut App<S>, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Enter => {
            app.close_help();
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

fn handle_setup_key<S: StoryService + 'static>(app: &mut App<S>, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Tab => app.setup.toggle_mode(),
        KeyCode::Enter => app.begin_adventure(),
        KeyCode::Char('?') | KeyCode::F(1) => app.toggle_help(),
        KeyCode::Esc | KeyCode::Char('q') => return EventResult::Quit,

        KeyCode::Left | KeyCode::Char('h') if app.setup.mode == SetupMode::Preset => app.setup.step(-1),
        KeyCode::Right | KeyCode::Char('l') if app.setup.mode == SetupMode::Preset => app.setup.step(1),
        KeyCode::Down if app.setup.mode == SetupMode::Preset => app.setup.step(-5),
        KeyCode::Up if app.setup.mode == SetupMode::Preset => app.setup.step(5),

        KeyCode::Char(c) if app.setup.mode == SetupMode::Custom && c.is_ascii_digit() => {
            app.setup.push_digit(c)
        }
        KeyCode::Backspace if app.setup.mode == SetupMode::Custom => app.setup.pop_digit(),

        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

fn handle_game_key<S: StoryService + 'static>(app: &mut App<S>, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('q') => return EventResult::Quit,
        KeyCode::Char('?') | KeyCode::F(1) => app.toggle_help(),
        KeyCode::Char('r') => app.request_restart(),

        // Choices (1-based number keys, or arrows + Enter)
        KeyCode::Char(c @ '1'..='9') => {
            let index = c.to_digit(10).map(|d| d as usize).unwrap_or(0);
            app.choose(index);
        }
        KeyCode::Up => app.select_previous(),
        KeyCode::Down | KeyCode::Tab => app.select_next(),
        KeyCode::Enter if app.restart_offered() => app.request_restart(),
        KeyCode::Enter => app.confirm_selection(),

        // Story scrolling
        KeyCode::Char('j') => app.scroll_down(1),
        KeyCode::Char('k') => app.scroll_up(1),
        KeyCode::PageDown => app.scroll_down(10),
        KeyCode::PageUp => app.scroll_up(10),

        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::PendingAction;
    use adventure_core::{Controller, ControllerConfig, MockStoryService};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app(mock: MockStoryService) -> App<MockStoryService> {
        App::new(Controller::new(mock, ControllerConfig::new()))
    }

    #[test]
    fn test_setup_keys() {
        let mut app = app(MockStoryService::new());
        handle_event(&mut app, key(KeyCode::Right));
        handle_event(&mut app, key(KeyCode::Right));
        assert_eq!(app.setup.preset.get(), 12);

        handle_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.setup.mode, SetupMode::Custom);
        handle_event(&mut app, key(KeyCode::Backspace));
        handle_event(&mut app, key(KeyCode::Backspace));
        handle_event(&mut app, key(KeyCode::Char('3')));
        handle_event(&mut app, key(KeyCode::Char('0')));
        handle_event(&mut app, key(KeyCode::Enter));

        assert_eq!(app.pending, Some(PendingAction::Start));
        assert_eq!(app.controller.chapter_limit().get(), 30);
    }

    #[test]
    fn test_ctrl_c_quits_everywhere() {
        let mut app = app(MockStoryService::new());
        app.toggle_help();
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(handle_event(&mut app, ctrl_c), EventResult::Quit);
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let mut app = app(MockStoryService::new());
        handle_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.has_overlay());

        handle_event(&mut app, key(KeyCode::Enter));
        assert!(!app.has_overlay());
        assert!(app.pending.is_none());
    }

    #[tokio::test]
    async fn test_number_keys_pick_choices() {
        let mock = MockStoryService::new().with_opening("A", &["L", "R"], Some("S1"));
        let mut app = app(mock);
        app.controller.start_session().await.unwrap();

        handle_event(&mut app, key(KeyCode::Char('7')));
        assert!(app.pending.is_none());

        handle_event(&mut app, key(KeyCode::Char('2')));
        assert_eq!(app.pending, Some(PendingAction::Choice(2)));
    }

    #[tokio::test]
    async fn test_keys_ignored_while_loading() {
        let mock = MockStoryService::new().with_opening("A", &["L", "R"], Some("S1"));
        let mut app = app(mock);
        app.controller.start_session().await.unwrap();
        let _pending = app.controller.begin_choice(1).unwrap();

        handle_event(&mut app, key(KeyCode::Char('2')));
        handle_event(&mut app, key(KeyCode::Char('r')));
        assert!(app.pending.is_none());
    }
}
