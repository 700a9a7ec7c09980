//! Animated dice roll sessions.
//!
//! A view builds a [`RollRequest`] and hands it to the [`RollEngine`]. The
//! engine may prompt for advantage, evaluates the dice, plays a short
//! tumble-and-land animation driven by host timer ticks, records a
//! [`HistoryEntry`] and optionally chains a follow-up roll.
//!
//! The engine is a plain reducer: every stimulus returns the
//! [`EngineEffect`]s the host must carry out, so no threads or async runtime
//! are involved.

pub mod animation;
pub mod engine;
pub mod history;
pub mod render;
pub mod request;

pub use animation::{DieColor, FRAME_COUNT};
pub use engine::{
    CustomRoll, EngineConfig, EngineEffect, EngineInput, EngineSession, EngineState, RollEngine,
};
pub use history::{HistoryEntry, RollHistory, HISTORY_CAPACITY};
pub use request::{RollCategory, RollRequest};
