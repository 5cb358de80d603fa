//! Main application state and logic

use adventure_core::{
    ChapterLimit, ConfigError, Controller, ControllerState, LoadPhase, StoryService,
};

use crate::ui::theme::GameTheme;

/// How the chapter limit is being entered on the setup screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetupMode {
    /// Left/right steps through the preset range.
    #[default]
    Preset,
    /// Free-form digits, validated on Enter.
    Custom,
}

/// Setup screen state
#[derive(Debug, Clone)]
pub struct SetupState {
    pub mode: SetupMode,
    pub preset: ChapterLimit,
    pub custom_input: String,
    pub error: Option<String>,
}

impl SetupState {
    pub fn new(initial: ChapterLimit) -> Self {
        let mode = if initial.is_preset() {
            SetupMode::Preset
        } else {
            SetupMode::Custom
        };
        Self {
            mode,
            preset: initial.step_preset(0),
            custom_input: initial.to_string(),
            error: None,
        }
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            SetupMode::Preset => SetupMode::Custom,
            SetupMode::Custom => SetupMode::Preset,
        };
        self.error = None;
    }

    pub fn step(&mut self, delta: i32) {
        self.preset = self.preset.step_preset(delta);
    }

    pub fn push_digit(&mut self, c: char) {
        if c.is_ascii_digit() && self.custom_input.len() < 3 {
            self.custom_input.push(c);
            self.error = None;
        }
    }

    pub fn pop_digit(&mut self) {
        self.custom_input.pop();
        self.error = None;
    }

    /// The limit the current inputs describe.
    pub fn limit(&self) -> Result<ChapterLimit, ConfigError> {
        match self.mode {
            SetupMode::Preset => Ok(self.preset),
            SetupMode::Custom => ChapterLimit::parse(&self.custom_input),
        }
    }

    /// Limit to describe in the tier blurb, even while custom input is invalid.
    pub fn preview(&self) -> Option<ChapterLimit> {
        self.limit().ok()
    }
}

/// Work the run loop has to await on behalf of a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Start,
    Choice(usize),
    Restart,
}

/// Main application state
pub struct App<S> {
    pub controller: Controller<S>,

    // UI state
    pub theme: GameTheme,
    pub setup: SetupState,
    pub selected_choice: usize,
    pub story_scroll: u16,
    show_help: bool,

    pub pending: Option<PendingAction>,
    pub should_quit: bool,

    // Animation
    pub animation_frame: u8,
}

impl<S: StoryService + 'static> App<S> {
    pub fn new(controller: Controller<S>) -> Self {
        let setup = SetupState::new(controller.chapter_limit());
        Self {
            controller,
            theme: GameTheme::default(),
            setup,
            selected_choice: 0,
            story_scroll: 0,
            show_help: false,
            pending: None,
            should_quit: false,
            animation_frame: 0,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.controller.state()
    }

    pub fn is_configuring(&self) -> bool {
        self.state() == ControllerState::Configuring
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// Apply the setup inputs and queue the opening request.
    pub fn begin_adventure(&mut self) {
        let limit = match self.setup.limit() {
            Ok(limit) => limit,
            Err(err) => {
                self.setup.error = Some(err.to_string());
                return;
            }
        };
        match self.controller.set_chapter_limit(limit) {
            Ok(_) => {
                self.setup.error = None;
                self.pending = Some(PendingAction::Start);
            }
            Err(err) => self.setup.error = Some(err.to_string()),
        }
    }

    // =========================================================================
    // Choices
    // =========================================================================

    pub fn select_next(&mut self) {
        let count = self.controller.current_choices().len();
        if count > 0 {
            self.selected_choice = (self.selected_choice + 1) % count;
        }
    }

    pub fn select_previous(&mut self) {
        let count = self.controller.current_choices().len();
        if count > 0 {
            self.selected_choice = (self.selected_choice + count - 1) % count;
        }
    }

    /// Queue the highlighted choice.
    pub fn confirm_selection(&mut self) {
        self.choose(self.selected_choice + 1);
    }

    /// Queue a 1-based choice if choices are currently accepted.
    pub fn choose(&mut self, index: usize) {
        if !self.controller.choices_enabled() {
            return;
        }
        if index == 0 || index > self.controller.current_choices().len() {
            return;
        }
        self.pending = Some(PendingAction::Choice(index));
    }

    /// Reset view state after the controller put a new chapter on screen.
    pub fn on_new_chapter(&mut self) {
        self.selected_choice = 0;
        self.story_scroll = 0;
    }

    // =========================================================================
    // Restart
    // =========================================================================

    pub fn request_restart(&mut self) {
        if self.controller.is_loading() || self.is_configuring() {
            return;
        }
        self.pending = Some(PendingAction::Restart);
    }

    /// Whether the restart button should be offered.
    pub fn restart_offered(&self) -> bool {
        match self.state() {
            ControllerState::Ended => true,
            ControllerState::Playing => self.controller.current_choices().is_empty(),
            _ => false,
        }
    }

    /// Refresh the setup inputs after a restart returned to configuring.
    pub fn on_restart(&mut self) {
        self.setup = SetupState::new(self.controller.chapter_limit());
        self.on_new_chapter();
    }

    // =========================================================================
    // View helpers
    // =========================================================================

    /// Text for the dialogue box.
    pub fn dialogue_text(&self) -> &str {
        match self.state() {
            ControllerState::Loading(LoadPhase::Initial)
            | ControllerState::Loading(LoadPhase::Next)
            | ControllerState::Concluding => "Loading your adventure...",
            ControllerState::Ended => self.controller.conclusion().unwrap_or_default(),
            _ => self.controller.current_story().unwrap_or_default(),
        }
    }

    pub fn status_message(&self) -> Option<&str> {
        self.controller.status_message()
    }

    pub fn scroll_down(&mut self, amount: u16) {
        self.story_scroll = self.story_scroll.saturating_add(amount);
    }

    pub fn scroll_up(&mut self, amount: u16) {
        self.story_scroll = self.story_scroll.saturating_sub(amount);
    }

    // =========================================================================
    // Overlays
    // =========================================================================

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }

    pub fn has_overlay(&self) -> bool {
        self.show_help
    }

    /// Advance animation frame
    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adventure_core::{ControllerConfig, MockStoryService};

    fn app(mock: MockStoryService) -> App<MockStoryService> {
        App::new(Controller::new(mock, ControllerConfig::new()))
    }

    #[test]
    fn test_setup_preset_and_custom() {
        let mut setup = SetupState::new(ChapterLimit::DEFAULT);
        assert_eq!(setup.mode, SetupMode::Preset);
        setup.step(50);
        assert_eq!(setup.limit().unwrap().get(), 20);

        setup.toggle_mode();
        setup.pop_digit();
        setup.pop_digit();
        for c in "45x6".chars() {
            setup.push_digit(c);
        }
        assert_eq!(setup.custom_input, "456");
        assert!(setup.limit().is_err());
        setup.pop_digit();
        assert_eq!(setup.limit().unwrap().get(), 45);
    }

    #[test]
    fn test_setup_starts_in_custom_for_long_limits() {
        let setup = SetupState::new(ChapterLimit::new(40).unwrap());
        assert_eq!(setup.mode, SetupMode::Custom);
        assert_eq!(setup.custom_input, "40");
        assert_eq!(setup.preset.get(), 20);
    }

    #[test]
    fn test_begin_with_invalid_custom_limit() {
        let mut app = app(MockStoryService::new());
        app.setup.toggle_mode();
        app.setup.custom_input = "2".to_string();
        app.begin_adventure();

        assert!(app.pending.is_none());
        assert!(app.setup.error.as_deref().unwrap().contains("between 3 and 50"));
    }

    #[tokio::test]
    async fn test_choices_queue_only_when_enabled() {
        let mock = MockStoryService::new().with_opening("A", &["L", "R"], Some("S1"));
        let mut app = app(mock);

        app.choose(1);
        assert!(app.pending.is_none());

        app.begin_adventure();
        assert_eq!(app.pending.take(), Some(PendingAction::Start));
        app.controller.start_session().await.unwrap();

        app.select_previous();
        assert_eq!(app.selected_choice, 1);
        app.confirm_selection();
        assert_eq!(app.pending, Some(PendingAction::Choice(2)));

        app.pending = None;
        app.choose(3);
        assert!(app.pending.is_none());
    }

    #[tokio::test]
    async fn test_restart_offered_when_no_choices_remain() {
        let mock = MockStoryService::new().with_opening("A", &[], Some("S1"));
        let mut app = app(mock);
        assert!(!app.restart_offered());

        app.controller.start_session().await.unwrap();
        assert!(app.restart_offered());
        app.request_restart();
        assert_eq!(app.pending, Some(PendingAction::Restart));
    }

    #[test]
    fn test_dialogue_while_loading() {
        let mut app = app(MockStoryService::new());
        app.controller.begin_start().unwrap();
        assert_eq!(app.dialogue_text(), "Loading your adventure...");
    }
}
