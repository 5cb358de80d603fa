//! UI module for the adventure TUI

pub mod layout;
pub mod render;
pub mod theme;
pub mod widgets;
