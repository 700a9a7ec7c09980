//! D&D 5e character sheet core.
//!
//! This crate provides:
//! - Character records with 5e rule arithmetic
//! - A file-based character store
//! - A dice expression evaluator
//! - The roll engine: a single-session state machine that prompts for
//!   advantage, animates dice, keeps a roll history and chains follow-up rolls
//!
//! # Quick Start
//!
//! ```
//! use dnd_sheet_core::roll::{EngineConfig, EngineEffect, EngineState, RollEngine, RollRequest};
//!
//! let mut engine = RollEngine::new(EngineConfig::default().with_seed(1));
//! let mut effects = engine.submit(RollRequest::new("Stealth", "1d20+4"));
//!
//! // The host runs each scheduled tick after its delay
//! while let Some(EngineEffect::ScheduleTick(_delay)) = effects.pop() {
//!     effects = engine.tick();
//! }
//! assert_eq!(engine.state(), EngineState::Showing);
//! ```

pub mod character;
pub mod dice;
pub mod roll;
pub mod store;
pub mod testing;

// Primary public API
pub use character::{Ability, Character, Skill};
pub use dice::{DiceError, DiceEvaluator, Evaluator, RollMode, RollOutcome};
pub use roll::{
    EngineConfig, EngineEffect, EngineInput, EngineState, HistoryEntry, RollCategory, RollEngine,
    RollHistory, RollRequest,
};
pub use store::{CharacterStore, StoreError};
pub use testing::ScriptedEvaluator;
