//! TUI widgets for the character sheet

pub mod character_panel;
pub mod dice_roll;
pub mod history;

pub use character_panel::CharacterPanelWidget;
pub use dice_roll::DiceRollWidget;
pub use history::HistoryWidget;
