//! The roll engine state machine.
//!
//! `Idle` is both the initial and terminal state of every session:
//!
//! ```text
//! Idle --submit(prompt)--> AdvantagePrompt --ChooseMode--> Animating
//! Idle --submit--> Animating --tick x FRAME_COUNT--> Showing --input--> Idle
//! Idle --open_custom_roll--> CustomRollConfig --Confirm--> Animating
//! AdvantagePrompt | CustomRollConfig | Animating --Cancel--> Idle
//! ```
//!
//! At most one session is live. Requests that arrive while a session is in
//! flight are dropped, and ticks that arrive outside `Animating` are ignored,
//! so the host never has to cancel a scheduled tick, even when the roll it
//! belonged to was cancelled mid-animation.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::animation::{DiceAnimation, DieColor};
use super::history::{HistoryEntry, RollHistory};
use super::render;
use super::request::{RollCategory, RollRequest};
use crate::dice::{
    DiceError, DiceEvaluator, DiceExpression, DieType, Evaluator, RollMode, RollOutcome,
};

/// Smallest and largest quantity for a custom roll.
pub const CUSTOM_QUANTITY_RANGE: (u32, u32) = (1, 100);

/// Where the current session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Idle,
    AdvantagePrompt,
    CustomRollConfig,
    Animating,
    Showing,
}

/// Die size and quantity chosen in the custom roll configurator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomRoll {
    pub die: DieType,
    pub quantity: u32,
}

impl Default for CustomRoll {
    fn default() -> Self {
        Self {
            die: DieType::ALL[0],
            quantity: 1,
        }
    }
}

impl CustomRoll {
    pub fn expression(&self) -> String {
        format!("{}d{}", self.quantity, self.die.sides())
    }

    fn adjust_quantity(&mut self, delta: i32) {
        let (min, max) = CUSTOM_QUANTITY_RANGE;
        let next = (self.quantity as i64 + delta as i64).clamp(min as i64, max as i64);
        self.quantity = next as u32;
    }
}

/// Raw input routed to the engine while a session is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineInput {
    /// Answer the advantage prompt.
    ChooseMode(RollMode),
    AdjustQuantity(i32),
    CycleDieSize(i32),
    Confirm,
    /// Run the follow-up roll.
    Continue,
    /// Finish without the follow-up roll.
    Skip,
    Cancel,
    /// Any other key.
    Dismiss,
}

/// Work the host must do after a stimulus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEffect {
    /// Call [`RollEngine::tick`] after roughly this long.
    ScheduleTick(Duration),
    /// A roll session finished; the entry is already in the history log.
    Completed(HistoryEntry),
    /// The follow-up was re-submitted as a new top-level request.
    Chained(RollRequest),
}

/// Engine tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Delay before the first animation frame.
    pub tick_base: Duration,
    /// Extra delay added per frame, so the dice visibly slow down.
    pub tick_step: Duration,
    /// Seed for the tumbling display values; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_base: Duration::from_millis(35),
            tick_step: Duration::from_millis(15),
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Delay before the tick that follows `frame`. Saturates rather than overflowing.
    pub fn tick_delay(&self, frame: u32) -> Duration {
        self.tick_base.saturating_add(self.tick_step.saturating_mul(frame))
    }
}

/// Live state of the one roll in progress.
#[derive(Debug, Clone, Default)]
pub struct EngineSession {
    pub state: EngineState,
    pub request: Option<RollRequest>,
    pub follow_up: Option<RollRequest>,
    pub mode: RollMode,
    pub animation: DiceAnimation,
    pub outcome: Option<RollOutcome>,
    /// Set once the session reaches `Showing`.
    pub entry: Option<HistoryEntry>,
    /// Only present while configuring a custom roll.
    pub custom: Option<CustomRoll>,
}

impl EngineSession {
    pub fn label(&self) -> Option<&str> {
        self.request.as_ref().map(|r| r.label.as_str())
    }

    pub fn frame(&self) -> u32 {
        self.animation.frame
    }

    pub fn total_frames(&self) -> u32 {
        self.animation.total_frames
    }

    pub fn display_values(&self) -> &[u32] {
        &self.animation.display_values
    }

    pub fn display_colors(&self) -> &[DieColor] {
        &self.animation.display_colors
    }
}

/// Drives roll sessions and owns the roll history.
pub struct RollEngine<E: Evaluator = DiceEvaluator> {
    session: EngineSession,
    history: RollHistory,
    evaluator: E,
    config: EngineConfig,
    churn: StdRng,
}

impl RollEngine<DiceEvaluator> {
    pub fn new(config: EngineConfig) -> Self {
        let evaluator = match config.seed {
            Some(seed) => DiceEvaluator::seeded(seed),
            None => DiceEvaluator::new(),
        };
        Self::with_evaluator(evaluator, config)
    }
}

impl<E: Evaluator> RollEngine<E> {
    pub fn with_evaluator(evaluator: E, config: EngineConfig) -> Self {
        let churn = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };

        Self {
            session: EngineSession::default(),
            history: RollHistory::new(),
            evaluator,
            config,
            churn,
        }
    }

    pub fn state(&self) -> EngineState {
        self.session.state
    }

    pub fn session(&self) -> &EngineSession {
        &self.session
    }

    pub fn history(&self) -> &RollHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut RollHistory {
        &mut self.history
    }

    /// Whether raw input should be routed here instead of the calling view.
    pub fn is_session_active(&self) -> bool {
        self.session.state != EngineState::Idle
    }

    /// Text rendering of the current session; empty when idle.
    pub fn render(&self, width: usize, height: usize) -> String {
        render::render_session(&self.session, width, height)
    }

    /// Start a roll session. Dropped if one is already in flight.
    pub fn submit(&mut self, mut request: RollRequest) -> Vec<EngineEffect> {
        if self.is_session_active() {
            debug!(
                label = %request.label,
                state = ?self.session.state,
                "roll request dropped, session in flight"
            );
            return Vec::new();
        }

        let follow_up = request.follow_up.take().map(|f| *f);
        let needs_prompt = request.needs_prompt;

        self.session = EngineSession {
            request: Some(request),
            follow_up,
            ..EngineSession::default()
        };

        if needs_prompt {
            self.session.state = EngineState::AdvantagePrompt;
            debug!(label = ?self.session.label(), "awaiting advantage choice");
            Vec::new()
        } else {
            self.execute(RollMode::Normal)
        }
    }

    /// Open the free-form roll configurator. Ignored unless idle.
    pub fn open_custom_roll(&mut self) -> Vec<EngineEffect> {
        if self.is_session_active() {
            return Vec::new();
        }

        self.session = EngineSession {
            state: EngineState::CustomRollConfig,
            custom: Some(CustomRoll::default()),
            ..EngineSession::default()
        };
        Vec::new()
    }

    /// Feed a raw input event to the current state.
    pub fn handle_input(&mut self, input: EngineInput) -> Vec<EngineEffect> {
        match self.session.state {
            EngineState::Idle => Vec::new(),
            EngineState::Animating => {
                if input == EngineInput::Cancel {
                    debug!(label = ?self.session.label(), "roll cancelled mid-animation");
                    self.reset();
                }
                Vec::new()
            }
            EngineState::AdvantagePrompt => self.handle_prompt_input(input),
            EngineState::CustomRollConfig => self.handle_custom_input(input),
            EngineState::Showing => self.handle_showing_input(input),
        }
    }

    /// Advance the animation one frame. A no-op outside `Animating`.
    pub fn tick(&mut self) -> Vec<EngineEffect> {
        if self.session.state != EngineState::Animating {
            return Vec::new();
        }

        let finished = self.session.animation.advance(&mut self.churn);
        if !finished {
            let delay = self.config.tick_delay(self.session.animation.frame);
            return vec![EngineEffect::ScheduleTick(delay)];
        }

        let (Some(request), Some(outcome)) = (&self.session.request, &self.session.outcome) else {
            // A finished animation without a roll would be an engine bug; drop it
            warn!("animation finished without an outcome, aborting session");
            self.reset();
            return Vec::new();
        };

        let entry = HistoryEntry::from_outcome(request, self.session.mode, outcome);
        debug!(label = %entry.label, total = entry.total, "roll landed");
        self.session.entry = Some(entry);
        self.session.state = EngineState::Showing;
        Vec::new()
    }

    fn handle_prompt_input(&mut self, input: EngineInput) -> Vec<EngineEffect> {
        match input {
            EngineInput::ChooseMode(mode) => self.execute(mode),
            EngineInput::Cancel => {
                debug!(label = ?self.session.label(), "advantage prompt cancelled");
                self.reset();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_custom_input(&mut self, input: EngineInput) -> Vec<EngineEffect> {
        let Some(custom) = self.session.custom.as_mut() else {
            self.reset();
            return Vec::new();
        };

        match input {
            EngineInput::AdjustQuantity(delta) => {
                custom.adjust_quantity(delta);
                Vec::new()
            }
            EngineInput::CycleDieSize(steps) => {
                custom.die = custom.die.cycle(steps);
                Vec::new()
            }
            EngineInput::Confirm => {
                let expression = custom.expression();
                self.session.custom = None;
                self.session.request = Some(
                    RollRequest::new("Custom Roll", expression)
                        .with_category(RollCategory::Custom),
                );
                self.execute(RollMode::Normal)
            }
            EngineInput::Cancel => {
                self.reset();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_showing_input(&mut self, input: EngineInput) -> Vec<EngineEffect> {
        // With a follow-up pending, only an explicit continue/skip/escape ends the session
        if self.session.follow_up.is_some()
            && !matches!(
                input,
                EngineInput::Continue | EngineInput::Skip | EngineInput::Cancel
            )
        {
            return Vec::new();
        }

        let follow_up = self.session.follow_up.take();
        let Some(entry) = self.session.entry.take() else {
            self.reset();
            return Vec::new();
        };

        info!(roll = %entry.summary(), "roll completed");
        self.history.append(entry.clone());
        self.reset();

        let mut effects = vec![EngineEffect::Completed(entry)];
        if let (EngineInput::Continue, Some(next)) = (input, follow_up) {
            debug!(label = %next.label, "chaining follow-up roll");
            effects.push(EngineEffect::Chained(next.clone()));
            effects.extend(self.submit(next));
        }
        effects
    }

    /// Roll the pending request and start animating it.
    fn execute(&mut self, mode: RollMode) -> Vec<EngineEffect> {
        let Some(request) = self.session.request.as_ref() else {
            self.reset();
            return Vec::new();
        };

        let outcome = match Self::evaluate(&mut self.evaluator, request, mode) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    label = %request.label,
                    expression = %request.expression,
                    error = %e,
                    "malformed roll expression, aborting session"
                );
                self.reset();
                return Vec::new();
            }
        };

        let dice = outcome.dice_count();
        let sides = (0..dice).map(|i| outcome.sides_at(i)).collect();
        let dropped_from = if outcome.is_keep_draw() {
            outcome.kept.len()
        } else {
            dice
        };

        self.session.animation =
            DiceAnimation::start(outcome.display_values(), sides, dropped_from, &mut self.churn);
        self.session.mode = mode;
        self.session.outcome = Some(outcome);
        self.session.state = EngineState::Animating;

        debug!(label = ?self.session.label(), ?mode, dice, "animating roll");
        vec![EngineEffect::ScheduleTick(self.config.tick_delay(0))]
    }

    fn evaluate(
        evaluator: &mut E,
        request: &RollRequest,
        mode: RollMode,
    ) -> Result<RollOutcome, DiceError> {
        match mode {
            RollMode::Normal => evaluator.evaluate(&request.expression, request.modifier),
            RollMode::Advantage | RollMode::Disadvantage => {
                // The draw is always two d20s; only the expression's flat bonus carries over
                let flat = DiceExpression::parse(&request.expression)?.modifier;
                let modifier = request
                    .modifier
                    .checked_add(flat)
                    .ok_or(DiceError::ModifierOverflow)?;
                if mode == RollMode::Advantage {
                    evaluator.evaluate_advantage(modifier)
                } else {
                    evaluator.evaluate_disadvantage(modifier)
                }
            }
        }
    }

    fn reset(&mut self) {
        self.session = EngineSession::default();
    }
}
