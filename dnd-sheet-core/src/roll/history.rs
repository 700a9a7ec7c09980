//! Bounded log of completed rolls, newest first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::request::{RollCategory, RollRequest};
use crate::dice::{RollMode, RollOutcome};

/// Maximum number of entries kept in the log.
pub const HISTORY_CAPACITY: usize = 50;

/// Durable record of one completed roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub label: String,
    pub category: RollCategory,
    pub expression: String,
    pub rolls: Vec<u32>,
    pub kept: Vec<u32>,
    pub dropped: Vec<u32>,
    pub modifier: i32,
    pub total: i32,
    pub advantage: bool,
    pub disadvantage: bool,
    pub critical_success: bool,
    pub critical_failure: bool,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Build the entry for a finished roll.
    ///
    /// Critical flags only apply when a single d20 decides the roll, so
    /// `8d6` damage never reports a critical even if a die shows 1.
    pub fn from_outcome(request: &RollRequest, mode: RollMode, outcome: &RollOutcome) -> Self {
        let deciding = outcome.deciding_d20();

        Self {
            label: request.label.clone(),
            category: request.category,
            expression: request.expression.clone(),
            rolls: outcome.rolls.clone(),
            kept: outcome.kept.clone(),
            dropped: outcome.dropped.clone(),
            modifier: outcome.modifier,
            total: outcome.total,
            advantage: mode == RollMode::Advantage,
            disadvantage: mode == RollMode::Disadvantage,
            critical_success: deciding == Some(20),
            critical_failure: deciding == Some(1),
            timestamp: Utc::now(),
        }
    }

    /// One-line summary, e.g. `Longsword (Attack): [17, (4)] + 5 = 22`.
    pub fn summary(&self) -> String {
        let dice = if self.kept.is_empty() && self.dropped.is_empty() {
            join_values(&self.rolls)
        } else {
            let dropped: Vec<String> = self.dropped.iter().map(|d| format!("({d})")).collect();
            let mut parts: Vec<String> = self.kept.iter().map(|k| k.to_string()).collect();
            parts.extend(dropped);
            parts.join(", ")
        };

        let modifier = match self.modifier {
            0 => String::new(),
            m if m > 0 => format!(" + {m}"),
            m => format!(" - {}", m.abs()),
        };

        let flag = if self.critical_success {
            " CRIT!"
        } else if self.critical_failure {
            " FUMBLE"
        } else {
            ""
        };

        format!(
            "{} ({}): [{}]{} = {}{}",
            self.label, self.category, dice, modifier, self.total, flag
        )
    }
}

fn join_values(values: &[u32]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Newest-first roll log capped at [`HISTORY_CAPACITY`].
#[derive(Debug, Clone, Default)]
pub struct RollHistory {
    entries: VecDeque<HistoryEntry>,
    visible: bool,
}

impl RollHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the front, evicting the oldest entry past capacity.
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    /// Empty the log and hide it.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.visible = false;
    }

    pub fn toggle_visibility(&mut self) {
        self.visible = !self.visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(label: &str, total: i32) -> HistoryEntry {
        HistoryEntry {
            label: label.to_string(),
            category: RollCategory::Custom,
            expression: "1d6".to_string(),
            rolls: vec![total as u32],
            kept: Vec::new(),
            dropped: Vec::new(),
            modifier: 0,
            total,
            advantage: false,
            disadvantage: false,
            critical_success: false,
            critical_failure: false,
            timestamp: Utc::now(),
        }
    }

    fn outcome(rolls: Vec<u32>, die_sides: Vec<u32>, kept: Vec<u32>, dropped: Vec<u32>) -> RollOutcome {
        let deciding: u32 = if kept.is_empty() {
            rolls.iter().sum()
        } else {
            kept.iter().sum()
        };
        RollOutcome {
            expression: "test".to_string(),
            sides: die_sides[0],
            rolls,
            die_sides,
            kept,
            dropped,
            modifier: 0,
            total: deciding as i32,
        }
    }

    #[test]
    fn test_append_is_newest_first() {
        let mut history = RollHistory::new();
        history.append(entry("first", 1));
        history.append(entry("second", 2));

        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().label, "second");
        assert_eq!(history.get(1).unwrap().label, "first");
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = RollHistory::new();
        for i in 0..HISTORY_CAPACITY {
            history.append(entry(&format!("roll {i}"), i as i32));
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);

        history.append(entry("newest", 99));

        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.get(0).unwrap().label, "newest");
        assert!(history.entries().all(|e| e.label != "roll 0"));
        assert_eq!(history.get(HISTORY_CAPACITY - 1).unwrap().label, "roll 1");
    }

    #[test]
    fn test_clear_hides() {
        let mut history = RollHistory::new();
        history.append(entry("a", 1));
        history.toggle_visibility();
        assert!(history.is_visible());

        history.clear();
        assert!(history.is_empty());
        assert!(!history.is_visible());
    }

    #[test]
    fn test_toggle_keeps_contents() {
        let mut history = RollHistory::new();
        history.append(entry("a", 1));
        history.toggle_visibility();
        history.toggle_visibility();
        assert!(!history.is_visible());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_critical_only_for_single_d20() {
        let request = RollRequest::new("Attack", "1d20");

        let nat20 = outcome(vec![20], vec![20], vec![], vec![]);
        let e = HistoryEntry::from_outcome(&request, RollMode::Normal, &nat20);
        assert!(e.critical_success && !e.critical_failure);

        let nat1 = outcome(vec![1], vec![20], vec![], vec![]);
        let e = HistoryEntry::from_outcome(&request, RollMode::Normal, &nat1);
        assert!(e.critical_failure && !e.critical_success);

        let damage = outcome(vec![1, 6, 6], vec![6, 6, 6], vec![], vec![]);
        let e = HistoryEntry::from_outcome(&request, RollMode::Normal, &damage);
        assert!(!e.critical_success && !e.critical_failure);

        let two_d20 = outcome(vec![20, 20], vec![20, 20], vec![], vec![]);
        let e = HistoryEntry::from_outcome(&request, RollMode::Normal, &two_d20);
        assert!(!e.critical_success);
    }

    #[test]
    fn test_critical_uses_kept_die() {
        let request = RollRequest::new("Attack", "1d20");

        let adv = outcome(vec![1, 20], vec![20, 20], vec![20], vec![1]);
        let e = HistoryEntry::from_outcome(&request, RollMode::Advantage, &adv);
        assert!(e.advantage && !e.disadvantage);
        assert!(e.critical_success && !e.critical_failure);

        let dis = outcome(vec![1, 20], vec![20, 20], vec![1], vec![20]);
        let e = HistoryEntry::from_outcome(&request, RollMode::Disadvantage, &dis);
        assert!(e.disadvantage);
        assert!(e.critical_failure && !e.critical_success);
    }

    #[test]
    fn test_summary() {
        let request = RollRequest::new("Stealth", "1d20").with_category(RollCategory::SkillCheck);
        let mut o = outcome(vec![4, 17], vec![20, 20], vec![17], vec![4]);
        o.modifier = 3;
        o.total = 20;
        let e = HistoryEntry::from_outcome(&request, RollMode::Advantage, &o);
        assert_eq!(e.summary(), "Stealth (Check): [17, (4)] + 3 = 20");
    }
}
