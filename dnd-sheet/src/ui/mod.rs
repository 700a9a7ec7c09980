//! UI module for the sheet TUI

pub mod render;
pub mod theme;
pub mod widgets;
