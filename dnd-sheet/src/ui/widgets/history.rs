//! Roll history panel

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use dnd_sheet_core::roll::RollHistory;

use crate::ui::theme::GameTheme;

/// Most recent rolls, newest first
pub struct HistoryWidget<'a> {
    history: &'a RollHistory,
    theme: &'a GameTheme,
}

impl<'a> HistoryWidget<'a> {
    pub fn new(history: &'a RollHistory, theme: &'a GameTheme) -> Self {
        Self { history, theme }
    }
}

impl Widget for HistoryWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" History ({}) ", self.history.len()))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false));

        let inner = block.inner(area);
        block.render(area, buf);

        if self.history.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "No rolls yet",
                self.theme.system_style(),
            )))
            .render(inner, buf);
            return;
        }

        let lines: Vec<Line> = self
            .history
            .entries()
            .take(inner.height as usize)
            .map(|entry| {
                let style = if entry.critical_success || entry.critical_failure {
                    self.theme
                        .roll_result_style(entry.critical_success, entry.critical_failure)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::styled(
                        entry.timestamp.format("%H:%M ").to_string(),
                        Style::default().add_modifier(Modifier::DIM),
                    ),
                    Span::styled(entry.summary(), style),
                ])
            })
            .collect();

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
