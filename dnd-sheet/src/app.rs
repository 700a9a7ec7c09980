//! Main application state and logic

use std::time::Instant;

use dnd_sheet_core::character::{signed, Ability, Character, Skill};
use dnd_sheet_core::roll::{EngineConfig, EngineEffect, EngineInput, RollEngine, RollRequest};
use dnd_sheet_core::CharacterStore;
use tracing::{debug, info};

use crate::scheduler::TickScheduler;
use crate::ui::theme::GameTheme;

/// Which list the sheet cursor is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetSection {
    #[default]
    Skills,
    Saves,
    Attacks,
}

impl SheetSection {
    pub const ALL: [SheetSection; 3] = [
        SheetSection::Skills,
        SheetSection::Saves,
        SheetSection::Attacks,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SheetSection::Skills => "Skills",
            SheetSection::Saves => "Saving Throws",
            SheetSection::Attacks => "Attacks",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SheetSection::Skills => SheetSection::Saves,
            SheetSection::Saves => SheetSection::Attacks,
            SheetSection::Attacks => SheetSection::Skills,
        }
    }

    pub fn prev(self) -> Self {
        self.next().next()
    }
}

/// One rollable line in the current section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    /// Proficiency marker column
    pub marker: &'static str,
    pub label: String,
    /// Bonus shown next to the label, e.g. `+5` or `+5 / 1d8+3`
    pub bonus: String,
}

/// Main application state
pub struct App {
    pub engine: RollEngine,
    pub character: Character,
    pub store: CharacterStore,
    pub scheduler: TickScheduler,

    // UI state
    pub theme: GameTheme,
    pub section: SheetSection,
    pub selected: usize,

    // Status
    status_message: Option<String>,
    pub pending_save: bool,
    /// A hit die was spent on the roll in flight and comes back if it is cancelled
    hit_die_in_flight: bool,
}

impl App {
    pub fn new(character: Character, store: CharacterStore, engine: EngineConfig) -> Self {
        let mut app = Self {
            engine: RollEngine::new(engine),
            character,
            store,
            scheduler: TickScheduler::new(),
            theme: GameTheme::default(),
            section: SheetSection::default(),
            selected: 0,
            status_message: None,
            pending_save: false,
            hit_die_in_flight: false,
        };
        app.set_status("Enter rolls the selected row, c for a custom roll, q to quit");
        app
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    // =========================================================================
    // Sheet navigation
    // =========================================================================

    /// Rows of the current section
    pub fn rows(&self) -> Vec<SheetRow> {
        let c = &self.character;
        match self.section {
            SheetSection::Skills => Skill::all()
                .into_iter()
                .map(|skill| SheetRow {
                    marker: c.skill_proficiency(skill).marker(),
                    label: format!("{} ({})", skill.name(), skill.ability().abbreviation()),
                    bonus: signed(c.skill_modifier(skill)),
                })
                .collect(),
            SheetSection::Saves => Ability::all()
                .into_iter()
                .map(|ability| SheetRow {
                    marker: if c.is_proficient_save(ability) { "●" } else { " " },
                    label: ability.name().to_string(),
                    bonus: signed(c.saving_throw_modifier(ability)),
                })
                .collect(),
            SheetSection::Attacks => c
                .attacks
                .iter()
                .map(|attack| {
                    let damage = c.damage_bonus(attack);
                    let damage = if damage == 0 {
                        attack.damage_dice.clone()
                    } else {
                        format!("{}{}", attack.damage_dice, signed(damage))
                    };
                    SheetRow {
                        marker: if attack.proficient { "●" } else { " " },
                        label: attack.name.clone(),
                        bonus: format!("{} / {}", signed(c.attack_bonus(attack)), damage),
                    }
                })
                .collect(),
        }
    }

    fn row_count(&self) -> usize {
        match self.section {
            SheetSection::Skills => Skill::all().len(),
            SheetSection::Saves => Ability::all().len(),
            SheetSection::Attacks => self.character.attacks.len(),
        }
    }

    pub fn next_section(&mut self) {
        self.section = self.section.next();
        self.selected = 0;
    }

    pub fn prev_section(&mut self) {
        self.section = self.section.prev();
        self.selected = 0;
    }

    pub fn select_next(&mut self) {
        let count = self.row_count();
        if count > 0 {
            self.selected = (self.selected + 1) % count;
        }
    }

    pub fn select_prev(&mut self) {
        let count = self.row_count();
        if count > 0 {
            self.selected = (self.selected + count - 1) % count;
        }
    }

    // =========================================================================
    // Rolling
    // =========================================================================

    /// Roll whatever the cursor is on.
    pub fn roll_selected(&mut self, now: Instant) {
        let request = match self.section {
            SheetSection::Skills => Skill::all()
                .get(self.selected)
                .map(|skill| self.character.skill_check_request(*skill)),
            SheetSection::Saves => Ability::all()
                .get(self.selected)
                .map(|ability| self.character.saving_throw_request(*ability)),
            SheetSection::Attacks => self
                .character
                .attacks
                .get(self.selected)
                .map(|attack| self.character.attack_request(attack)),
        };

        match request {
            Some(request) => self.submit(request, now),
            None => self.set_status("Nothing to roll here"),
        }
    }

    pub fn roll_initiative(&mut self, now: Instant) {
        let request = self.character.initiative_request();
        self.submit(request, now);
    }

    pub fn roll_luck(&mut self, now: Instant) {
        let request = self.character.luck_request();
        self.submit(request, now);
    }

    /// Spend a hit die, if any remain.
    pub fn roll_hit_dice(&mut self, now: Instant) {
        if self.engine.is_session_active() {
            return;
        }
        if self.character.hit_dice_remaining == 0 {
            self.set_status("No hit dice remaining");
            return;
        }

        let request = self.character.hit_dice_request();
        self.submit(request, now);
        if self.engine.is_session_active() {
            self.character.hit_dice_remaining -= 1;
            self.hit_die_in_flight = true;
            debug!(remaining = self.character.hit_dice_remaining, "hit die spent");
        }
    }

    /// Give back a hit die whose roll ended without being recorded.
    fn refund_cancelled_hit_die(&mut self) {
        if self.hit_die_in_flight && !self.engine.is_session_active() {
            self.hit_die_in_flight = false;
            self.character.hit_dice_remaining += 1;
            debug!(remaining = self.character.hit_dice_remaining, "hit die refunded");
            self.set_status("Hit die roll cancelled");
        }
    }

    pub fn open_custom_roll(&mut self, now: Instant) {
        let effects = self.engine.open_custom_roll();
        self.apply_effects(effects, now);
    }

    pub fn submit(&mut self, request: RollRequest, now: Instant) {
        let effects = self.engine.submit(request);
        self.apply_effects(effects, now);
    }

    /// Route a key to the live roll session.
    pub fn engine_input(&mut self, input: EngineInput, now: Instant) {
        let effects = self.engine.handle_input(input);
        self.apply_effects(effects, now);
        self.refund_cancelled_hit_die();
    }

    /// Deliver every tick whose deadline has passed.
    pub fn fire_due_ticks(&mut self, now: Instant) {
        for _ in 0..self.scheduler.take_due(now) {
            let effects = self.engine.tick();
            self.apply_effects(effects, now);
        }
        self.refund_cancelled_hit_die();
    }

    /// Carry out the work the engine asked for.
    pub fn apply_effects(&mut self, effects: Vec<EngineEffect>, now: Instant) {
        for effect in effects {
            match effect {
                EngineEffect::ScheduleTick(delay) => self.scheduler.schedule(now, delay),
                EngineEffect::Completed(entry) => {
                    self.hit_die_in_flight = false;
                    info!(character = %self.character.name, roll = %entry.summary(), "roll recorded");
                    self.set_status(entry.summary());
                }
                EngineEffect::Chained(request) => {
                    debug!(label = %request.label, "follow-up roll started");
                }
            }
        }
    }

    // =========================================================================
    // History and persistence
    // =========================================================================

    pub fn toggle_history(&mut self) {
        self.engine.history_mut().toggle_visibility();
    }

    pub fn clear_history(&mut self) {
        self.engine.history_mut().clear();
        self.set_status("Roll history cleared");
    }

    /// Ask the event loop to save the character.
    pub fn request_save(&mut self) {
        self.pending_save = true;
        self.set_status("Saving...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnd_sheet_core::roll::EngineState;
    use dnd_sheet_core::RollMode;
    use std::time::Duration;

    fn app() -> App {
        App::new(
            Character::sample_fighter("Brom"),
            CharacterStore::new("unused"),
            EngineConfig::default().with_seed(3),
        )
    }

    /// Run the event loop's tick delivery until the animation finishes.
    fn run_ticks(app: &mut App, mut now: Instant) -> Instant {
        while let Some(at) = app.scheduler.next_deadline() {
            now = now.max(at);
            app.fire_due_ticks(now);
        }
        now
    }

    #[test]
    fn test_section_cycling_resets_selection() {
        let mut app = app();
        app.select_next();
        app.select_next();
        assert_eq!(app.selected, 2);

        app.next_section();
        assert_eq!(app.section, SheetSection::Saves);
        assert_eq!(app.selected, 0);
        app.prev_section();
        app.prev_section();
        assert_eq!(app.section, SheetSection::Attacks);
    }

    #[test]
    fn test_selection_wraps() {
        let mut app = app();
        app.section = SheetSection::Attacks;
        app.select_prev();
        assert_eq!(app.selected, app.character.attacks.len() - 1);
        app.select_next();
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_rows_show_bonuses() {
        let mut app = app();
        app.section = SheetSection::Attacks;
        let rows = app.rows();
        assert_eq!(rows[0].label, "Longsword");
        assert_eq!(rows[0].bonus, "+5 / 1d8+3");

        app.section = SheetSection::Saves;
        let rows = app.rows();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].marker, "●");
    }

    #[test]
    fn test_roll_schedules_ticks_and_records() {
        let mut app = app();
        let now = Instant::now();
        app.section = SheetSection::Saves;
        app.roll_selected(now);
        assert_eq!(app.engine.state(), EngineState::AdvantagePrompt);
        assert_eq!(app.scheduler.pending(), 0);

        app.engine_input(EngineInput::ChooseMode(RollMode::Normal), now);
        assert_eq!(app.scheduler.pending(), 1);

        run_ticks(&mut app, now);
        assert_eq!(app.engine.state(), EngineState::Showing);

        app.engine_input(EngineInput::Dismiss, now);
        assert!(!app.engine.is_session_active());
        assert_eq!(app.engine.history().len(), 1);
        assert!(app.status_message().unwrap().starts_with("Strength Save"));
    }

    #[test]
    fn test_ticks_wait_for_their_deadline() {
        let mut app = app();
        let now = Instant::now();
        app.roll_hit_dice(now);
        let frame = app.engine.session().frame();

        app.fire_due_ticks(now);
        assert_eq!(app.engine.session().frame(), frame);
        app.fire_due_ticks(now + Duration::from_secs(1));
        assert_eq!(app.engine.session().frame(), frame + 1);
    }

    #[test]
    fn test_hit_dice_spent_once_per_roll() {
        let mut app = app();
        let now = Instant::now();
        app.character.hit_dice_remaining = 1;

        app.roll_hit_dice(now);
        assert_eq!(app.character.hit_dice_remaining, 0);

        let now = run_ticks(&mut app, now);
        app.engine_input(EngineInput::Dismiss, now);
        app.roll_hit_dice(now);
        assert_eq!(app.status_message(), Some("No hit dice remaining"));
        assert!(!app.engine.is_session_active());
    }

    #[test]
    fn test_cancelled_hit_die_roll_refunds() {
        let mut app = app();
        let now = Instant::now();
        app.character.hit_dice_remaining = 2;

        app.roll_hit_dice(now);
        assert_eq!(app.character.hit_dice_remaining, 1);
        app.fire_due_ticks(now + Duration::from_secs(1));
        assert_eq!(app.engine.state(), EngineState::Animating);

        app.engine_input(EngineInput::Cancel, now);
        assert!(!app.engine.is_session_active());
        assert_eq!(app.character.hit_dice_remaining, 2);
        assert!(app.engine.history().is_empty());

        // Ticks scheduled before the cancel change nothing
        run_ticks(&mut app, now);
        assert_eq!(app.character.hit_dice_remaining, 2);
        assert!(!app.engine.is_session_active());
    }

    #[test]
    fn test_completed_hit_die_roll_is_not_refunded() {
        let mut app = app();
        let now = Instant::now();
        app.character.hit_dice_remaining = 2;

        app.roll_hit_dice(now);
        let now = run_ticks(&mut app, now);
        app.engine_input(EngineInput::Dismiss, now);
        app.engine_input(EngineInput::Cancel, now);
        assert_eq!(app.character.hit_dice_remaining, 1);
        assert_eq!(app.engine.history().len(), 1);
    }

    #[test]
    fn test_attack_chains_damage() {
        let mut app = app();
        let now = Instant::now();
        app.section = SheetSection::Attacks;
        app.roll_selected(now);
        app.engine_input(EngineInput::ChooseMode(RollMode::Advantage), now);
        let now = run_ticks(&mut app, now);

        app.engine_input(EngineInput::Continue, now);
        assert_eq!(app.engine.session().label(), Some("Longsword Damage"));
        assert_eq!(app.scheduler.pending(), 1);
        assert_eq!(app.engine.history().len(), 1);
    }

    #[test]
    fn test_clear_history() {
        let mut app = app();
        let now = Instant::now();
        app.roll_luck(now);
        app.engine_input(EngineInput::ChooseMode(RollMode::Normal), now);
        let now = run_ticks(&mut app, now);
        app.engine_input(EngineInput::Dismiss, now);
        app.toggle_history();
        assert!(app.engine.history().is_visible());

        app.clear_history();
        assert!(app.engine.history().is_empty());
        assert!(!app.engine.history().is_visible());
    }
}
