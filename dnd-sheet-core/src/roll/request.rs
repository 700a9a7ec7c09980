//! Roll requests submitted by views.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of roll is being made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RollCategory {
    Attack,
    Damage,
    SkillCheck,
    SavingThrow,
    HitDice,
    Luck,
    #[default]
    Custom,
}

impl RollCategory {
    pub fn name(&self) -> &'static str {
        match self {
            RollCategory::Attack => "Attack",
            RollCategory::Damage => "Damage",
            RollCategory::SkillCheck => "Check",
            RollCategory::SavingThrow => "Save",
            RollCategory::HitDice => "Hit Dice",
            RollCategory::Luck => "Luck",
            RollCategory::Custom => "Custom",
        }
    }
}

impl fmt::Display for RollCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A caller's ask to roll something.
///
/// Once submitted the engine owns the request until the session ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRequest {
    pub label: String,
    pub expression: String,
    pub modifier: i32,
    pub category: RollCategory,
    /// Ask Normal/Advantage/Disadvantage before rolling.
    pub needs_prompt: bool,
    /// Offered automatically once this roll is showing (damage after an attack).
    pub follow_up: Option<Box<RollRequest>>,
}

impl RollRequest {
    pub fn new(label: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            expression: expression.into(),
            modifier: 0,
            category: RollCategory::default(),
            needs_prompt: false,
            follow_up: None,
        }
    }

    pub fn with_modifier(mut self, modifier: i32) -> Self {
        self.modifier = modifier;
        self
    }

    pub fn with_category(mut self, category: RollCategory) -> Self {
        self.category = category;
        self
    }

    pub fn prompt_for_advantage(mut self) -> Self {
        self.needs_prompt = true;
        self
    }

    pub fn with_follow_up(mut self, follow_up: RollRequest) -> Self {
        self.follow_up = Some(Box::new(follow_up));
        self
    }

    /// Expression plus modifier as shown to the player, e.g. `1d20+5`.
    pub fn notation(&self) -> String {
        match self.modifier {
            0 => self.expression.clone(),
            m if m > 0 => format!("{}+{m}", self.expression),
            m => format!("{}{m}", self.expression),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let request = RollRequest::new("Longsword", "1d20")
            .with_modifier(5)
            .with_category(RollCategory::Attack)
            .prompt_for_advantage()
            .with_follow_up(
                RollRequest::new("Longsword Damage", "1d8")
                    .with_modifier(3)
                    .with_category(RollCategory::Damage),
            );

        assert!(request.needs_prompt);
        assert_eq!(request.category, RollCategory::Attack);
        let follow_up = request.follow_up.as_deref().unwrap();
        assert_eq!(follow_up.label, "Longsword Damage");
        assert!(follow_up.follow_up.is_none());
    }

    #[test]
    fn test_notation() {
        assert_eq!(RollRequest::new("a", "1d20").notation(), "1d20");
        assert_eq!(
            RollRequest::new("a", "1d20").with_modifier(3).notation(),
            "1d20+3"
        );
        assert_eq!(
            RollRequest::new("a", "2d6").with_modifier(-1).notation(),
            "2d6-1"
        );
    }
}
