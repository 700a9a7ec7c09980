//! D&D dice expression evaluator.
//!
//! Supports standard dice notation (`XdY+Z`, several components summed) and
//! the advantage/disadvantage draw of two d20s.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Upper bound on the dice in a single component (`100d6` is fine, `101d6` is not).
pub const MAX_DICE_PER_COMPONENT: u32 = 100;

/// Error type for dice parsing and rolling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid die size: {0}")]
    InvalidDieSize(u32),
    #[error("No dice specified")]
    NoDice,
    #[error("Too many dice: {count} (at most 100 per component)")]
    TooManyDice { count: u32 },
    #[error("Modifier out of range")]
    ModifierOverflow,
}

/// `dice + modifier`, failing instead of wrapping or panicking.
pub(crate) fn checked_total(dice: i64, modifier: i32) -> Result<i32, DiceError> {
    dice.checked_add(modifier as i64)
        .and_then(|total| i32::try_from(total).ok())
        .ok_or(DiceError::ModifierOverflow)
}

/// How a d20 roll is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RollMode {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

impl RollMode {
    pub fn name(&self) -> &'static str {
        match self {
            RollMode::Normal => "Normal",
            RollMode::Advantage => "Advantage",
            RollMode::Disadvantage => "Disadvantage",
        }
    }
}

/// Standard D&D die types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DieType {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
    D100,
}

impl DieType {
    /// Every die type, smallest first. Custom rolls cycle through this order.
    pub const ALL: [DieType; 7] = [
        DieType::D4,
        DieType::D6,
        DieType::D8,
        DieType::D10,
        DieType::D12,
        DieType::D20,
        DieType::D100,
    ];

    pub fn sides(&self) -> u32 {
        match self {
            DieType::D4 => 4,
            DieType::D6 => 6,
            DieType::D8 => 8,
            DieType::D10 => 10,
            DieType::D12 => 12,
            DieType::D20 => 20,
            DieType::D100 => 100,
        }
    }

    pub fn from_sides(sides: u32) -> Option<DieType> {
        Self::ALL.into_iter().find(|d| d.sides() == sides)
    }

    /// Step `steps` positions through [`DieType::ALL`], wrapping at both ends.
    pub fn cycle(self, steps: i32) -> DieType {
        let len = Self::ALL.len() as i32;
        let index = Self::ALL.iter().position(|d| *d == self).unwrap_or(0) as i32;
        Self::ALL[(index + steps).rem_euclid(len) as usize]
    }
}

impl fmt::Display for DieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// A single die component of a dice expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceComponent {
    pub count: u32,
    pub die_type: DieType,
}

/// A complete dice expression (e.g., 2d6+3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceExpression {
    pub components: Vec<DiceComponent>,
    pub modifier: i32,
    pub original: String,
}

impl DiceExpression {
    /// Parse a dice notation string.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let notation = notation.trim().to_lowercase();
        if notation.is_empty() {
            return Err(DiceError::NoDice);
        }

        let mut components = Vec::new();
        let mut modifier: i32 = 0;
        let mut current = String::new();
        let mut sign: i32 = 1;

        for ch in notation.chars() {
            match ch {
                '+' | '-' => {
                    if !current.is_empty() {
                        Self::parse_component(&current, sign, &mut components, &mut modifier)?;
                        current.clear();
                    }
                    sign = if ch == '+' { 1 } else { -1 };
                }
                ' ' => continue,
                _ => current.push(ch),
            }
        }

        if !current.is_empty() {
            Self::parse_component(&current, sign, &mut components, &mut modifier)?;
        }

        if components.is_empty() {
            return Err(DiceError::NoDice);
        }

        Ok(DiceExpression {
            components,
            modifier,
            original: notation.replace(' ', ""),
        })
    }

    fn parse_component(
        s: &str,
        sign: i32,
        components: &mut Vec<DiceComponent>,
        modifier: &mut i32,
    ) -> Result<(), DiceError> {
        let Some(d_pos) = s.find('d') else {
            let value: i32 = s
                .parse()
                .map_err(|_| DiceError::InvalidNotation(s.to_string()))?;
            *modifier = modifier
                .checked_add(sign * value)
                .ok_or(DiceError::ModifierOverflow)?;
            return Ok(());
        };

        // Subtracting dice is not a thing at the table
        if sign < 0 {
            return Err(DiceError::InvalidNotation(format!("-{s}")));
        }

        let count_str = &s[..d_pos];
        let sides_str = &s[d_pos + 1..];

        let count: u32 = if count_str.is_empty() {
            1
        } else {
            count_str
                .parse()
                .map_err(|_| DiceError::InvalidNotation(s.to_string()))?
        };
        if count == 0 {
            return Err(DiceError::NoDice);
        }
        if count > MAX_DICE_PER_COMPONENT {
            return Err(DiceError::TooManyDice { count });
        }

        let sides: u32 = sides_str
            .parse()
            .map_err(|_| DiceError::InvalidNotation(s.to_string()))?;
        let die_type = DieType::from_sides(sides).ok_or(DiceError::InvalidDieSize(sides))?;

        components.push(DiceComponent { count, die_type });
        Ok(())
    }

    /// Total number of dice across all components.
    pub fn dice_count(&self) -> u32 {
        self.components.iter().map(|c| c.count).sum()
    }

    /// Roll the expression, adding `extra_modifier` on top of its flat part.
    pub fn roll_with_rng<R: Rng>(
        &self,
        extra_modifier: i32,
        rng: &mut R,
    ) -> Result<RollOutcome, DiceError> {
        let modifier = self
            .modifier
            .checked_add(extra_modifier)
            .ok_or(DiceError::ModifierOverflow)?;

        let mut rolls = Vec::with_capacity(self.dice_count() as usize);
        let mut die_sides = Vec::with_capacity(rolls.capacity());

        for component in &self.components {
            let sides = component.die_type.sides();
            for _ in 0..component.count {
                rolls.push(rng.gen_range(1..=sides));
                die_sides.push(sides);
            }
        }

        let dice_total: i64 = rolls.iter().map(|r| *r as i64).sum();
        let total = checked_total(dice_total, modifier)?;

        Ok(RollOutcome {
            expression: self.original.clone(),
            rolls,
            die_sides,
            kept: Vec::new(),
            dropped: Vec::new(),
            modifier,
            total,
            sides: self
                .components
                .first()
                .map(|c| c.die_type.sides())
                .unwrap_or(20),
        })
    }
}

impl FromStr for DiceExpression {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiceExpression::parse(s)
    }
}

impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

/// Structured result of evaluating a roll.
///
/// `kept` and `dropped` are only populated for advantage/disadvantage draws,
/// where together they hold both d20s. For every other roll they are empty and
/// `total == sum(rolls) + modifier`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollOutcome {
    pub expression: String,
    pub rolls: Vec<u32>,
    /// Side count of each entry in `rolls`.
    pub die_sides: Vec<u32>,
    pub kept: Vec<u32>,
    pub dropped: Vec<u32>,
    pub modifier: i32,
    pub total: i32,
    /// Size of the primary die.
    pub sides: u32,
}

impl RollOutcome {
    /// Whether this came from a two-d20 keep-one draw.
    pub fn is_keep_draw(&self) -> bool {
        !self.kept.is_empty() || !self.dropped.is_empty()
    }

    /// Final die values in display order: kept then dropped, or raw order.
    pub fn display_values(&self) -> Vec<u32> {
        if self.is_keep_draw() {
            self.kept.iter().chain(self.dropped.iter()).copied().collect()
        } else {
            self.rolls.clone()
        }
    }

    /// Number of dice shown, matching [`RollOutcome::display_values`].
    pub fn dice_count(&self) -> usize {
        if self.is_keep_draw() {
            self.kept.len() + self.dropped.len()
        } else {
            self.rolls.len()
        }
    }

    /// Side count for the die at display position `index`.
    pub fn sides_at(&self, index: usize) -> u32 {
        if self.is_keep_draw() {
            20
        } else {
            self.die_sides.get(index).copied().unwrap_or(self.sides)
        }
    }

    /// The value of the single d20 that decides the roll, if there is one.
    ///
    /// A normal roll qualifies only when it is exactly one d20; a keep draw
    /// qualifies through its single kept die.
    pub fn deciding_d20(&self) -> Option<u32> {
        if self.is_keep_draw() {
            match self.kept.as_slice() {
                [value] if self.die_sides.iter().all(|s| *s == 20) => Some(*value),
                _ => None,
            }
        } else {
            match (self.rolls.as_slice(), self.die_sides.as_slice()) {
                ([value], [20]) => Some(*value),
                _ => None,
            }
        }
    }

    /// Format the individual dice results for display, dropped dice in parentheses.
    pub fn dice_display(&self) -> String {
        let dice_str = if self.is_keep_draw() {
            let shown: Vec<String> = self
                .kept
                .iter()
                .map(|r| r.to_string())
                .chain(self.dropped.iter().map(|r| format!("({r})")))
                .collect();
            format!("[{}]", shown.join(", "))
        } else {
            format!(
                "[{}]",
                self.rolls
                    .iter()
                    .map(|r| r.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        };

        match self.modifier {
            0 => dice_str,
            m if m > 0 => format!("{dice_str} + {m}"),
            m => format!("{dice_str} - {}", m.abs()),
        }
    }
}

impl fmt::Display for RollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.dice_display(), self.total)
    }
}

/// Contract between the roll engine and whatever produces dice values.
pub trait Evaluator {
    /// Evaluate `expression` literally, adding `modifier` to its flat part.
    fn evaluate(&mut self, expression: &str, modifier: i32) -> Result<RollOutcome, DiceError>;

    /// Roll two d20s and keep the higher.
    fn evaluate_advantage(&mut self, modifier: i32) -> Result<RollOutcome, DiceError>;

    /// Roll two d20s and keep the lower.
    fn evaluate_disadvantage(&mut self, modifier: i32) -> Result<RollOutcome, DiceError>;
}

/// Random evaluator backed by `rand`.
#[derive(Debug, Clone)]
pub struct DiceEvaluator {
    rng: StdRng,
}

impl DiceEvaluator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// A reproducible evaluator (useful for testing).
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn keep_draw(&mut self, mode: RollMode, modifier: i32) -> Result<RollOutcome, DiceError> {
        let roll1 = self.rng.gen_range(1..=20u32);
        let roll2 = self.rng.gen_range(1..=20u32);
        let (chosen, other) = match mode {
            RollMode::Disadvantage => (roll1.min(roll2), roll1.max(roll2)),
            _ => (roll1.max(roll2), roll1.min(roll2)),
        };

        Ok(RollOutcome {
            expression: "2d20".to_string(),
            rolls: vec![roll1, roll2],
            die_sides: vec![20, 20],
            kept: vec![chosen],
            dropped: vec![other],
            modifier,
            total: checked_total(chosen as i64, modifier)?,
            sides: 20,
        })
    }
}

impl Default for DiceEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for DiceEvaluator {
    fn evaluate(&mut self, expression: &str, modifier: i32) -> Result<RollOutcome, DiceError> {
        let expr = DiceExpression::parse(expression)?;
        expr.roll_with_rng(modifier, &mut self.rng)
    }

    fn evaluate_advantage(&mut self, modifier: i32) -> Result<RollOutcome, DiceError> {
        self.keep_draw(RollMode::Advantage, modifier)
    }

    fn evaluate_disadvantage(&mut self, modifier: i32) -> Result<RollOutcome, DiceError> {
        self.keep_draw(RollMode::Disadvantage, modifier)
    }
}

/// Convenience function to roll dice from a notation string.
pub fn roll(notation: &str) -> Result<RollOutcome, DiceError> {
    let expr = DiceExpression::parse(notation)?;
    expr.roll_with_rng(0, &mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let expr = DiceExpression::parse("1d20").unwrap();
        assert_eq!(expr.components.len(), 1);
        assert_eq!(expr.components[0].count, 1);
        assert_eq!(expr.components[0].die_type, DieType::D20);
        assert_eq!(expr.modifier, 0);
    }

    #[test]
    fn test_parse_with_modifier() {
        let expr = DiceExpression::parse("1d20+5").unwrap();
        assert_eq!(expr.modifier, 5);

        let expr = DiceExpression::parse("2d6 - 2").unwrap();
        assert_eq!(expr.modifier, -2);
        assert_eq!(expr.original, "2d6-2");
    }

    #[test]
    fn test_parse_multiple_dice() {
        let expr = DiceExpression::parse("2d6+1d4+3").unwrap();
        assert_eq!(expr.components.len(), 2);
        assert_eq!(expr.dice_count(), 3);
        assert_eq!(expr.modifier, 3);
    }

    #[test]
    fn test_parse_implicit_count() {
        let expr = DiceExpression::parse("D8").unwrap();
        assert_eq!(expr.components[0].count, 1);
        assert_eq!(expr.components[0].die_type, DieType::D8);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(DiceExpression::parse(""), Err(DiceError::NoDice));
        assert_eq!(DiceExpression::parse("5"), Err(DiceError::NoDice));
        assert_eq!(DiceExpression::parse("0d6"), Err(DiceError::NoDice));
        assert_eq!(
            DiceExpression::parse("1d7"),
            Err(DiceError::InvalidDieSize(7))
        );
        assert_eq!(
            DiceExpression::parse("101d6"),
            Err(DiceError::TooManyDice { count: 101 })
        );
        assert!(matches!(
            DiceExpression::parse("xd6"),
            Err(DiceError::InvalidNotation(_))
        ));
        assert!(matches!(
            DiceExpression::parse("1d20-1d4"),
            Err(DiceError::InvalidNotation(_))
        ));
    }

    #[test]
    fn test_roll_total_is_sum_plus_modifier() {
        let mut evaluator = DiceEvaluator::seeded(7);
        for _ in 0..100 {
            let outcome = evaluator.evaluate("3d6+2", 1).unwrap();
            assert_eq!(outcome.rolls.len(), 3);
            assert!(outcome.kept.is_empty() && outcome.dropped.is_empty());
            assert_eq!(outcome.modifier, 3);
            let sum: i32 = outcome.rolls.iter().map(|r| *r as i32).sum();
            assert_eq!(outcome.total, sum + 3);
            assert!(outcome.rolls.iter().all(|r| (1..=6).contains(r)));
        }
    }

    #[test]
    fn test_mixed_components_track_sides() {
        let mut evaluator = DiceEvaluator::seeded(3);
        let outcome = evaluator.evaluate("1d4+2d10", 0).unwrap();
        assert_eq!(outcome.die_sides, vec![4, 10, 10]);
        assert_eq!(outcome.sides, 4);
        assert_eq!(outcome.sides_at(2), 10);
    }

    #[test]
    fn test_advantage_keeps_max() {
        let mut evaluator = DiceEvaluator::seeded(11);
        for _ in 0..200 {
            let outcome = evaluator.evaluate_advantage(4).unwrap();
            assert_eq!(outcome.rolls.len(), 2);
            assert_eq!(outcome.kept.len(), 1);
            assert_eq!(outcome.dropped.len(), 1);
            assert_eq!(outcome.kept[0], *outcome.rolls.iter().max().unwrap());
            assert_eq!(outcome.total, outcome.kept[0] as i32 + 4);
        }
    }

    #[test]
    fn test_disadvantage_keeps_min() {
        let mut evaluator = DiceEvaluator::seeded(12);
        for _ in 0..200 {
            let outcome = evaluator.evaluate_disadvantage(0).unwrap();
            assert_eq!(outcome.kept[0], *outcome.rolls.iter().min().unwrap());
            assert!(outcome.kept[0] <= outcome.dropped[0]);
        }
    }

    #[test]
    fn test_seeded_evaluators_agree() {
        let mut a = DiceEvaluator::seeded(99);
        let mut b = DiceEvaluator::seeded(99);
        assert_eq!(
            a.evaluate("8d6", 0).unwrap(),
            b.evaluate("8d6", 0).unwrap()
        );
    }

    #[test]
    fn test_deciding_d20() {
        let mut evaluator = DiceEvaluator::seeded(5);
        let single = evaluator.evaluate("1d20+3", 0).unwrap();
        assert_eq!(single.deciding_d20(), Some(single.rolls[0]));

        let two = evaluator.evaluate("2d20", 0).unwrap();
        assert_eq!(two.deciding_d20(), None);

        let damage = evaluator.evaluate("1d8", 0).unwrap();
        assert_eq!(damage.deciding_d20(), None);

        let adv = evaluator.evaluate_advantage(0).unwrap();
        assert_eq!(adv.deciding_d20(), Some(adv.kept[0]));
    }

    #[test]
    fn test_dice_display() {
        let outcome = RollOutcome {
            expression: "2d20".to_string(),
            rolls: vec![4, 17],
            die_sides: vec![20, 20],
            kept: vec![17],
            dropped: vec![4],
            modifier: -1,
            total: 16,
            sides: 20,
        };
        assert_eq!(outcome.dice_display(), "[17, (4)] - 1");
        assert_eq!(outcome.to_string(), "[17, (4)] - 1 = 16");
    }

    #[test]
    fn test_modifier_overflow_is_an_error() {
        assert_eq!(
            DiceExpression::parse("1d4+2147483647+1"),
            Err(DiceError::ModifierOverflow)
        );

        let mut evaluator = DiceEvaluator::seeded(1);
        assert_eq!(
            evaluator.evaluate("1d4+2147483647", 1),
            Err(DiceError::ModifierOverflow)
        );
        assert_eq!(
            evaluator.evaluate("1d4", i32::MAX),
            Err(DiceError::ModifierOverflow)
        );
        assert_eq!(
            evaluator.evaluate_advantage(i32::MAX),
            Err(DiceError::ModifierOverflow)
        );
        assert!(evaluator.evaluate("1d4", i32::MIN + 1).is_ok());
    }

    #[test]
    fn test_die_cycle_wraps() {
        assert_eq!(DieType::D4.cycle(1), DieType::D6);
        assert_eq!(DieType::D4.cycle(-1), DieType::D100);
        assert_eq!(DieType::D100.cycle(1), DieType::D4);
        assert_eq!(DieType::D6.cycle(2), DieType::D10);
    }

    #[test]
    fn test_roll_range() {
        for _ in 0..100 {
            let result = roll("1d20").unwrap();
            assert!(result.total >= 1 && result.total <= 20);
        }
    }
}
