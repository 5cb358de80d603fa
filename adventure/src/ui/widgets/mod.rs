//! TUI widgets for the adventure

pub mod choices;
pub mod dialogue;
pub mod setup;
pub mod sidebar;
pub mod status_bar;

pub use choices::ChoicesWidget;
pub use dialogue::DialogueWidget;
pub use setup::SetupWidget;
pub use sidebar::SidebarWidget;
pub use status_bar::{HotkeyBarWidget, StatusBarWidget};
