//! Event handling for the sheet TUI

use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use dnd_sheet_core::roll::{EngineInput, EngineState};
use dnd_sheet_core::RollMode;

use crate::app::App;

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event, now: Instant) -> EventResult {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key_event(app, key, now),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

/// Handle a key event
fn handle_key_event(app: &mut App, key: KeyEvent, now: Instant) -> EventResult {
    // Global shortcuts (always work)
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    // A live roll session owns the keyboard
    if app.engine.is_session_active() {
        let input = engine_input(app.engine.state(), key);
        app.engine_input(input, now);
        return EventResult::NeedsRedraw;
    }

    handle_sheet_key(app, key, now)
}

/// Translate a key into input for the roll session in `state`.
pub fn engine_input(state: EngineState, key: KeyEvent) -> EngineInput {
    match key.code {
        KeyCode::Char('n') => EngineInput::ChooseMode(RollMode::Normal),
        KeyCode::Char('a') => EngineInput::ChooseMode(RollMode::Advantage),
        KeyCode::Char('d') => EngineInput::ChooseMode(RollMode::Disadvantage),
        KeyCode::Char('+') | KeyCode::Char('=') => EngineInput::AdjustQuantity(1),
        KeyCode::Char('-') | KeyCode::Char('_') => EngineInput::AdjustQuantity(-1),
        KeyCode::Char('>') | KeyCode::Char('.') | KeyCode::Right | KeyCode::Up => {
            EngineInput::CycleDieSize(1)
        }
        KeyCode::Char('<') | KeyCode::Char(',') | KeyCode::Left | KeyCode::Down => {
            EngineInput::CycleDieSize(-1)
        }
        KeyCode::Enter if state == EngineState::CustomRollConfig => EngineInput::Confirm,
        KeyCode::Enter => EngineInput::Continue,
        KeyCode::Char('s') => EngineInput::Skip,
        KeyCode::Esc => EngineInput::Cancel,
        _ => EngineInput::Dismiss,
    }
}

/// Handle keys on the character sheet
fn handle_sheet_key(app: &mut App, key: KeyEvent, now: Instant) -> EventResult {
    match key.code {
        KeyCode::Char('q') => EventResult::Quit,

        // Navigation
        KeyCode::Tab => {
            app.next_section();
            EventResult::NeedsRedraw
        }
        KeyCode::BackTab => {
            app.prev_section();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.select_next();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.select_prev();
            EventResult::NeedsRedraw
        }

        // Rolls
        KeyCode::Enter => {
            app.roll_selected(now);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('c') => {
            app.open_custom_roll(now);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('i') => {
            app.roll_initiative(now);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('H') => {
            app.roll_hit_dice(now);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('l') => {
            app.roll_luck(now);
            EventResult::NeedsRedraw
        }

        // History
        KeyCode::Char('h') => {
            app.toggle_history();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('X') => {
            app.clear_history();
            EventResult::NeedsRedraw
        }

        KeyCode::Char('w') => {
            app.request_save();
            EventResult::NeedsRedraw
        }

        _ => EventResult::Continue,
    }
}
