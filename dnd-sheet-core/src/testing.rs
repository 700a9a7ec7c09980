//! Testing utilities for roll sessions.
//!
//! `ScriptedEvaluator` replaces the random evaluator with queued results so
//! engine tests can assert exact totals and critical flags.

use std::collections::VecDeque;

use crate::dice::{
    checked_total, DiceError, DiceEvaluator, DiceExpression, Evaluator, RollOutcome,
};

/// A scripted step: what the next evaluation returns.
#[derive(Debug, Clone)]
enum Scripted {
    /// Raw die faces for a normal roll; the expression supplies sides and bonus.
    Faces(Vec<u32>),
    /// Kept and dropped d20 for an advantage/disadvantage draw.
    KeepDraw { kept: u32, dropped: u32 },
    Error(DiceError),
}

/// An evaluator that returns scripted dice, falling back to a seeded
/// [`DiceEvaluator`] once the script runs out.
#[derive(Debug, Clone)]
pub struct ScriptedEvaluator {
    script: VecDeque<Scripted>,
    fallback: DiceEvaluator,
    /// Every expression passed to `evaluate`, in order.
    pub evaluated: Vec<String>,
}

impl ScriptedEvaluator {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            fallback: DiceEvaluator::seeded(0),
            evaluated: Vec::new(),
        }
    }

    /// Queue the faces the next normal roll shows.
    pub fn push_faces(mut self, faces: impl Into<Vec<u32>>) -> Self {
        self.script.push_back(Scripted::Faces(faces.into()));
        self
    }

    /// Queue the next advantage/disadvantage draw.
    pub fn push_keep_draw(mut self, kept: u32, dropped: u32) -> Self {
        self.script.push_back(Scripted::KeepDraw { kept, dropped });
        self
    }

    /// Queue an evaluation failure.
    pub fn push_error(mut self, error: DiceError) -> Self {
        self.script.push_back(Scripted::Error(error));
        self
    }

    fn keep_draw(&mut self, modifier: i32, advantage: bool) -> Result<RollOutcome, DiceError> {
        match self.script.front() {
            Some(Scripted::KeepDraw { .. } | Scripted::Error(_)) => {}
            Some(Scripted::Faces(faces)) => {
                // The step stays queued
                return Err(DiceError::InvalidNotation(format!(
                    "scripted faces {faces:?} queued, keep draw requested"
                )));
            }
            None if advantage => return self.fallback.evaluate_advantage(modifier),
            None => return self.fallback.evaluate_disadvantage(modifier),
        }

        match self.script.pop_front() {
            Some(Scripted::KeepDraw { kept, dropped }) => Ok(RollOutcome {
                expression: "2d20".to_string(),
                rolls: vec![kept, dropped],
                die_sides: vec![20, 20],
                kept: vec![kept],
                dropped: vec![dropped],
                modifier,
                total: checked_total(kept as i64, modifier)?,
                sides: 20,
            }),
            Some(Scripted::Error(error)) => Err(error),
            _ => Err(DiceError::InvalidNotation("empty script".to_string())),
        }
    }
}

impl Default for ScriptedEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for ScriptedEvaluator {
    fn evaluate(&mut self, expression: &str, modifier: i32) -> Result<RollOutcome, DiceError> {
        self.evaluated.push(expression.to_string());

        if let Some(Scripted::KeepDraw { kept, dropped }) = self.script.front() {
            return Err(DiceError::InvalidNotation(format!(
                "scripted keep draw {kept}/{dropped} queued, {expression} requested"
            )));
        }

        match self.script.pop_front() {
            Some(Scripted::Error(error)) => Err(error),
            Some(Scripted::Faces(faces)) => {
                let expr = DiceExpression::parse(expression)?;
                let mut die_sides = Vec::with_capacity(faces.len());
                for component in &expr.components {
                    for _ in 0..component.count {
                        die_sides.push(component.die_type.sides());
                    }
                }
                die_sides.resize(faces.len(), expr.components[0].die_type.sides());

                let modifier = expr
                    .modifier
                    .checked_add(modifier)
                    .ok_or(DiceError::ModifierOverflow)?;
                let sum: i64 = faces.iter().map(|f| *f as i64).sum();
                let total = checked_total(sum, modifier)?;
                Ok(RollOutcome {
                    expression: expr.original.clone(),
                    sides: expr.components[0].die_type.sides(),
                    rolls: faces,
                    die_sides,
                    kept: Vec::new(),
                    dropped: Vec::new(),
                    modifier,
                    total,
                })
            }
            _ => self.fallback.evaluate(expression, modifier),
        }
    }

    fn evaluate_advantage(&mut self, modifier: i32) -> Result<RollOutcome, DiceError> {
        self.keep_draw(modifier, true)
    }

    fn evaluate_disadvantage(&mut self, modifier: i32) -> Result<RollOutcome, DiceError> {
        self.keep_draw(modifier, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_faces() {
        let mut evaluator = ScriptedEvaluator::new().push_faces([20]);
        let outcome = evaluator.evaluate("1d20+2", 1).unwrap();
        assert_eq!(outcome.rolls, vec![20]);
        assert_eq!(outcome.total, 23);
        assert_eq!(evaluator.evaluated, vec!["1d20+2"]);
    }

    #[test]
    fn test_scripted_error_then_fallback() {
        let mut evaluator = ScriptedEvaluator::new().push_error(DiceError::NoDice);
        assert_eq!(evaluator.evaluate("1d6", 0), Err(DiceError::NoDice));
        let outcome = evaluator.evaluate("1d6", 0).unwrap();
        assert!((1..=6).contains(&outcome.total));
    }

    #[test]
    fn test_scripted_keep_draw() {
        let mut evaluator = ScriptedEvaluator::new().push_keep_draw(3, 12);
        let outcome = evaluator.evaluate_disadvantage(2).unwrap();
        assert_eq!(outcome.kept, vec![3]);
        assert_eq!(outcome.dropped, vec![12]);
        assert_eq!(outcome.total, 5);
    }

    #[test]
    fn test_out_of_order_script_is_not_skipped() {
        let mut evaluator = ScriptedEvaluator::new().push_faces([6]).push_keep_draw(18, 2);

        assert!(matches!(
            evaluator.evaluate_advantage(0),
            Err(DiceError::InvalidNotation(_))
        ));
        // Both steps are still queued, in order
        assert_eq!(evaluator.evaluate("1d6", 0).unwrap().rolls, vec![6]);
        assert_eq!(evaluator.evaluate_advantage(0).unwrap().kept, vec![18]);
    }

    #[test]
    fn test_keep_draw_ahead_of_faces_is_not_skipped() {
        let mut evaluator = ScriptedEvaluator::new().push_keep_draw(18, 2);

        assert!(evaluator.evaluate("1d6", 0).is_err());
        assert_eq!(evaluator.evaluate_disadvantage(1).unwrap().total, 19);
    }

    #[test]
    fn test_scripted_error_reaches_keep_draw() {
        let mut evaluator = ScriptedEvaluator::new().push_error(DiceError::NoDice);
        assert_eq!(evaluator.evaluate_advantage(0), Err(DiceError::NoDice));
        assert!(evaluator.evaluate_advantage(0).is_ok());
    }
}
