//! Character sheet widget

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Widget},
};

use dnd_sheet_core::character::{signed, Ability, Character};

use crate::app::{SheetRow, SheetSection};
use crate::ui::theme::GameTheme;

/// Full character sheet: header, ability scores and one rollable section
pub struct CharacterPanelWidget<'a> {
    character: &'a Character,
    section: SheetSection,
    rows: &'a [SheetRow],
    selected: usize,
    theme: &'a GameTheme,
    focused: bool,
}

impl<'a> CharacterPanelWidget<'a> {
    pub fn new(character: &'a Character, rows: &'a [SheetRow], theme: &'a GameTheme) -> Self {
        Self {
            character,
            section: SheetSection::default(),
            rows,
            selected: 0,
            theme,
            focused: false,
        }
    }

    pub fn section(mut self, section: SheetSection) -> Self {
        self.section = section;
        self
    }

    pub fn selected(mut self, selected: usize) -> Self {
        self.selected = selected;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn header_lines(&self) -> Vec<Line<'static>> {
        let c = self.character;
        let mut stats = vec![
            Span::raw("AC "),
            Span::styled(
                c.armor_class().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  Init "),
            Span::raw(signed(c.initiative_modifier())),
            Span::raw("  Prof "),
            Span::raw(signed(c.proficiency_bonus())),
        ];
        if let Some(dc) = c.spell_save_dc() {
            stats.push(Span::raw(format!("  Spell DC {dc}")));
        }
        if let Some(bonus) = c.spell_attack_bonus() {
            stats.push(Span::raw(format!("  Spell Atk {}", signed(bonus))));
        }

        vec![
            Line::from(Span::styled(
                format!("Level {} {}", c.level, c.class_name),
                Style::default().add_modifier(Modifier::DIM),
            )),
            Line::from(stats),
            Line::from(format!(
                "Hit Dice {}/{} (d{})",
                c.hit_dice_remaining, c.level, c.hit_die
            )),
        ]
    }

    fn row_lines(&self, height: usize) -> Vec<Line<'static>> {
        // Keep the selection on screen
        let start = if height == 0 {
            0
        } else {
            self.selected.saturating_sub(height.saturating_sub(1))
        };

        self.rows
            .iter()
            .enumerate()
            .skip(start)
            .take(height)
            .map(|(i, row)| {
                let text = format!("{} {:<24} {}", row.marker, row.label, row.bonus);
                if i == self.selected {
                    Line::from(Span::styled(text, self.theme.selected_style()))
                } else {
                    Line::from(text)
                }
            })
            .collect()
    }
}

impl Widget for CharacterPanelWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", self.character.name),
                self.theme.title_style(self.focused),
            ))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused));

        let inner = block.inner(area);
        block.render(area, buf);

        // Split into sections
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Class, stats, hit dice
                Constraint::Length(2), // Ability scores
                Constraint::Length(1), // Section tabs
                Constraint::Min(0),    // Rows
            ])
            .split(inner);

        Paragraph::new(self.header_lines()).render(chunks[0], buf);
        Paragraph::new(render_ability_scores(self.character)).render(chunks[1], buf);

        let selected_tab = SheetSection::ALL
            .iter()
            .position(|s| *s == self.section)
            .unwrap_or(0);
        Tabs::new(SheetSection::ALL.iter().map(|s| s.title()))
            .select(selected_tab)
            .highlight_style(self.theme.title_style(true))
            .render(chunks[2], buf);

        let rows = self.row_lines(chunks[3].height as usize);
        Paragraph::new(rows).render(chunks[3], buf);
    }
}

fn render_ability_scores(character: &Character) -> Vec<Line<'static>> {
    let abilities = Ability::all();
    let (top, bottom) = abilities.split_at(3);
    [top, bottom]
        .iter()
        .map(|abilities| {
            let cells: Vec<String> = abilities
                .iter()
                .map(|ability| {
                    let score = character.ability_scores.get(*ability);
                    let modifier = character.ability_scores.modifier(*ability);
                    format!("{}: {score:2} ({})", ability.abbreviation(), signed(modifier))
                })
                .collect();
            Line::from(cells.join("   "))
        })
        .collect()
}
