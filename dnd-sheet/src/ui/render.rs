//! Render orchestration for the sheet TUI

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::widgets::{CharacterPanelWidget, DiceRollWidget, HistoryWidget};

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Min(10),   // Sheet and history
            Constraint::Length(3), // Status
            Constraint::Length(1), // Hotkeys
        ])
        .split(area);

    render_title_bar(frame, app, rows[0]);

    let main = if app.engine.history().is_visible() {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[1]);
        frame.render_widget(
            HistoryWidget::new(app.engine.history(), &app.theme),
            columns[1],
        );
        columns[0]
    } else {
        rows[1]
    };

    let sheet_rows = app.rows();
    let sheet = CharacterPanelWidget::new(&app.character, &sheet_rows, &app.theme)
        .section(app.section)
        .selected(app.selected)
        .focused(!app.engine.is_session_active());
    frame.render_widget(sheet, main);

    render_status_bar(frame, app, rows[2]);
    render_hotkey_bar(frame, app, rows[3]);

    if app.engine.is_session_active() {
        render_dice_overlay(frame, app, area);
    }
}

/// Render the title bar
fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(
        " {} | Level {} {} ",
        app.character.name, app.character.level, app.character.class_name
    );

    let line = Line::from(Span::styled(
        title,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.status_message() {
        Some(message) => Line::from(message.to_string()),
        None => Line::from(""),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(false));

    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Render the hotkey bar
fn render_hotkey_bar(frame: &mut Frame, app: &App, area: Rect) {
    let text = if app.engine.is_session_active() {
        " Roll in progress: see the dice window for keys "
    } else {
        " Tab section  j/k move  Enter roll  c custom  i init  H hit die  l luck  h history  X clear  w save  q quit "
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(text, app.theme.system_style()))),
        area,
    );
}

/// Render dice roll overlay
fn render_dice_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_fixed(48, 13, area);

    // Clear the background
    frame.render_widget(Clear, popup_area);
    frame.render_widget(
        DiceRollWidget::new(app.engine.session(), &app.theme),
        popup_area,
    );
}

/// Rectangle of a fixed size centered in `area`, shrunk to fit
pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnd_sheet_core::roll::EngineConfig;
    use dnd_sheet_core::{Character, CharacterStore};
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Instant;

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn app() -> App {
        App::new(
            Character::sample_fighter("Brom"),
            CharacterStore::new("unused"),
            EngineConfig::default().with_seed(9),
        )
    }

    #[test]
    fn test_centered_rect_fits_small_area() {
        let area = Rect::new(0, 0, 20, 5);
        assert_eq!(centered_rect_fixed(48, 13, area), Rect::new(0, 0, 20, 5));
        let area = Rect::new(0, 0, 100, 30);
        assert_eq!(centered_rect_fixed(48, 13, area), Rect::new(26, 8, 48, 13));
    }

    #[test]
    fn test_sheet_renders() {
        let app = app();
        let text = draw(&app);
        assert!(text.contains("Brom"));
        assert!(text.contains("Athletics"));
    }

    #[test]
    fn test_overlay_and_history() {
        let mut app = app();
        app.toggle_history();
        assert!(draw(&app).contains("No rolls yet"));

        app.roll_initiative(Instant::now());
        assert!(draw(&app).contains("Disadvantage"));
    }
}
