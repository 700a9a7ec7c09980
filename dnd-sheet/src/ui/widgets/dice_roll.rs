//! Animated dice roll display widget

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use dnd_sheet_core::roll::{EngineSession, EngineState};
use dnd_sheet_core::RollMode;

use crate::ui::theme::GameTheme;

/// Widget drawing the live roll session
pub struct DiceRollWidget<'a> {
    session: &'a EngineSession,
    theme: &'a GameTheme,
}

impl<'a> DiceRollWidget<'a> {
    pub fn new(session: &'a EngineSession, theme: &'a GameTheme) -> Self {
        Self { session, theme }
    }

    fn title(&self) -> String {
        match (&self.session.request, self.session.state) {
            (_, EngineState::CustomRollConfig) => " Custom Roll ".to_string(),
            (Some(request), _) => format!(" {} ", request.label),
            (None, _) => " Dice Roll ".to_string(),
        }
    }

    fn dice_line(&self) -> Line<'a> {
        let mut spans = Vec::new();
        let values = self.session.display_values();
        let colors = self.session.display_colors();
        for (i, (value, color)) in values.iter().zip(colors).enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(format!("[{value:>2}]"), self.theme.die_style(*color)));
        }
        Line::from(spans)
    }

    fn hint(text: &'a str) -> Line<'a> {
        Line::from(Span::styled(
            text,
            Style::default().add_modifier(Modifier::DIM),
        ))
    }

    fn prompt_lines(&self) -> Vec<Line<'a>> {
        let notation = self
            .session
            .request
            .as_ref()
            .map(|r| r.notation())
            .unwrap_or_default();

        vec![
            Line::from(notation),
            Line::from(""),
            Line::from(vec![
                Span::styled("[n]", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" Normal  "),
                Span::styled("[a]", Style::default().fg(self.theme.crit_success)),
                Span::raw(" Advantage  "),
                Span::styled("[d]", Style::default().fg(self.theme.crit_failure)),
                Span::raw(" Disadvantage"),
            ]),
            Line::from(""),
            Self::hint("[Esc] Cancel"),
        ]
    }

    fn custom_lines(&self) -> Vec<Line<'a>> {
        let Some(custom) = self.session.custom else {
            return Vec::new();
        };

        vec![
            Line::from(vec![
                Span::raw("< "),
                Span::styled(
                    format!("{}", custom.die),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(" >   x "),
                Span::styled(
                    custom.quantity.to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
            Line::from(format!("= {}", custom.expression())),
            Line::from(""),
            Self::hint("[</>] Die  [+/-] Quantity"),
            Self::hint("[Enter] Roll  [Esc] Cancel"),
        ]
    }

    fn animating_lines(&self) -> Vec<Line<'a>> {
        let mut lines = Vec::new();
        if self.session.mode != RollMode::Normal {
            lines.push(Line::from(self.session.mode.name()));
        }
        lines.push(Line::from(""));
        lines.push(self.dice_line());
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(
                "Rolling... {}/{}",
                self.session.frame(),
                self.session.total_frames()
            ),
            Style::default().add_modifier(Modifier::DIM),
        )));
        lines.push(Self::hint("[Esc] Cancel"));
        lines
    }

    fn showing_lines(&self) -> Vec<Line<'a>> {
        let Some(entry) = &self.session.entry else {
            return Vec::new();
        };
        let style = self
            .theme
            .roll_result_style(entry.critical_success, entry.critical_failure);

        let mut lines = Vec::new();
        if self.session.mode != RollMode::Normal {
            lines.push(Line::from(self.session.mode.name()));
        }
        lines.push(self.dice_line());
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Total: {}", entry.total),
            style,
        )));

        if entry.critical_success {
            lines.push(Line::from(Span::styled("NAT 20! CRITICAL!", style)));
        } else if entry.critical_failure {
            lines.push(Line::from(Span::styled("NAT 1! FUMBLE!", style)));
        }

        lines.push(Line::from(Span::styled(
            entry.summary(),
            Style::default().add_modifier(Modifier::DIM),
        )));
        lines.push(Line::from(""));

        match &self.session.follow_up {
            Some(next) => lines.push(Line::from(vec![
                Span::styled(
                    format!("[Enter] Roll {}", next.label),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled("[s] Skip", Style::default().add_modifier(Modifier::DIM)),
            ])),
            None => lines.push(Self::hint("Press any key")),
        }
        lines
    }
}

impl Widget for DiceRollWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title())
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(true));

        let inner = block.inner(area);
        block.render(area, buf);

        let lines = match self.session.state {
            EngineState::Idle => return,
            EngineState::AdvantagePrompt => self.prompt_lines(),
            EngineState::CustomRollConfig => self.custom_lines(),
            EngineState::Animating => self.animating_lines(),
            EngineState::Showing => self.showing_lines(),
        };

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
