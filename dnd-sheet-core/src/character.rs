//! D&D 5e character records and rule arithmetic.
//!
//! The sheet only knows enough of the rules to build roll requests:
//! ability modifiers, proficiency, armor class and spellcasting numbers.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

use crate::roll::{RollCategory, RollRequest};

/// Unique identifier for a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Ability Scores
// ============================================================================

/// The six ability scores, in sheet order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

/// Abbreviation and full name, indexed by `Ability as usize`.
const ABILITY_NAMES: [(&str, &str); 6] = [
    ("STR", "Strength"),
    ("DEX", "Dexterity"),
    ("CON", "Constitution"),
    ("INT", "Intelligence"),
    ("WIS", "Wisdom"),
    ("CHA", "Charisma"),
];

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Strength,
        Ability::Dexterity,
        Ability::Constitution,
        Ability::Intelligence,
        Ability::Wisdom,
        Ability::Charisma,
    ];

    pub fn all() -> [Ability; 6] {
        Self::ALL
    }

    fn index(self) -> usize {
        self as usize
    }

    pub fn abbreviation(&self) -> &'static str {
        ABILITY_NAMES[self.index()].0
    }

    pub fn name(&self) -> &'static str {
        ABILITY_NAMES[self.index()].1
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Raw scores in [`Ability::ALL`] order; stored as a six-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityScores([u8; 6]);

impl AbilityScores {
    /// Scores in STR, DEX, CON, INT, WIS, CHA order.
    pub fn new(str: u8, dex: u8, con: u8, int: u8, wis: u8, cha: u8) -> Self {
        Self([str, dex, con, int, wis, cha])
    }

    pub fn get(&self, ability: Ability) -> u8 {
        self.0[ability.index()]
    }

    pub fn set(&mut self, ability: Ability, value: u8) {
        self.0[ability.index()] = value;
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        ability_modifier(self.get(ability))
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self([10; 6])
    }
}

/// Modifier for a raw score: 8-9 is -1, 10-11 is 0, 12-13 is +1 and so on.
pub fn ability_modifier(score: u8) -> i32 {
    (score as i32 - 10).div_euclid(2)
}

/// Proficiency bonus by character level (2 at 1-4 up to 6 at 17+).
pub fn proficiency_bonus(level: u8) -> i32 {
    match level {
        0..=4 => 2,
        5..=8 => 3,
        9..=12 => 4,
        13..=16 => 5,
        _ => 6,
    }
}

/// Format a modifier with its sign, e.g. `+3` or `-1`.
pub fn signed(value: i32) -> String {
    if value >= 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

// ============================================================================
// Skills
// ============================================================================

/// D&D 5e skills, declared alphabetically to match the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skill {
    Acrobatics,
    AnimalHandling,
    Arcana,
    Athletics,
    Deception,
    History,
    Insight,
    Intimidation,
    Investigation,
    Medicine,
    Nature,
    Perception,
    Performance,
    Persuasion,
    Religion,
    SleightOfHand,
    Stealth,
    Survival,
}

/// Display name and governing ability, indexed by `Skill as usize`.
const SKILL_TABLE: [(&str, Ability); 18] = [
    ("Acrobatics", Ability::Dexterity),
    ("Animal Handling", Ability::Wisdom),
    ("Arcana", Ability::Intelligence),
    ("Athletics", Ability::Strength),
    ("Deception", Ability::Charisma),
    ("History", Ability::Intelligence),
    ("Insight", Ability::Wisdom),
    ("Intimidation", Ability::Charisma),
    ("Investigation", Ability::Intelligence),
    ("Medicine", Ability::Wisdom),
    ("Nature", Ability::Intelligence),
    ("Perception", Ability::Wisdom),
    ("Performance", Ability::Charisma),
    ("Persuasion", Ability::Charisma),
    ("Religion", Ability::Intelligence),
    ("Sleight of Hand", Ability::Dexterity),
    ("Stealth", Ability::Dexterity),
    ("Survival", Ability::Wisdom),
];

impl Skill {
    pub const ALL: [Skill; 18] = [
        Skill::Acrobatics,
        Skill::AnimalHandling,
        Skill::Arcana,
        Skill::Athletics,
        Skill::Deception,
        Skill::History,
        Skill::Insight,
        Skill::Intimidation,
        Skill::Investigation,
        Skill::Medicine,
        Skill::Nature,
        Skill::Perception,
        Skill::Performance,
        Skill::Persuasion,
        Skill::Religion,
        Skill::SleightOfHand,
        Skill::Stealth,
        Skill::Survival,
    ];

    pub fn all() -> [Skill; 18] {
        Self::ALL
    }

    pub fn ability(&self) -> Ability {
        SKILL_TABLE[*self as usize].1
    }

    pub fn name(&self) -> &'static str {
        SKILL_TABLE[*self as usize].0
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Proficiency level for skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProficiencyLevel {
    #[default]
    None,
    Half,
    Proficient,
    Expertise,
}

impl ProficiencyLevel {
    pub fn bonus(&self, proficiency_bonus: i32) -> i32 {
        match self {
            ProficiencyLevel::None => 0,
            ProficiencyLevel::Half => proficiency_bonus / 2,
            ProficiencyLevel::Proficient => proficiency_bonus,
            ProficiencyLevel::Expertise => proficiency_bonus * 2,
        }
    }

    /// Sheet marker: blank, half, filled or double.
    pub fn marker(&self) -> &'static str {
        match self {
            ProficiencyLevel::None => " ",
            ProficiencyLevel::Half => "½",
            ProficiencyLevel::Proficient => "●",
            ProficiencyLevel::Expertise => "◆",
        }
    }
}

// ============================================================================
// Equipment
// ============================================================================

/// Armor weight class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmorKind {
    Light,
    Medium,
    Heavy,
}

/// Worn armor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Armor {
    pub name: String,
    pub base_ac: u8,
    pub kind: ArmorKind,
}

impl Armor {
    pub fn new(name: impl Into<String>, base_ac: u8, kind: ArmorKind) -> Self {
        Self {
            name: name.into(),
            base_ac,
            kind,
        }
    }
}

/// A weapon or spell attack listed on the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attack {
    pub name: String,
    pub ability: Ability,
    pub proficient: bool,
    /// Damage dice without the ability bonus, e.g. `1d8`.
    pub damage_dice: String,
    /// Add the ability modifier to damage.
    #[serde(default = "default_true")]
    pub add_ability_to_damage: bool,
    #[serde(default)]
    pub damage_type: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Attack {
    pub fn new(name: impl Into<String>, ability: Ability, damage_dice: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ability,
            proficient: true,
            damage_dice: damage_dice.into(),
            add_ability_to_damage: true,
            damage_type: None,
        }
    }

    pub fn with_damage_type(mut self, damage_type: impl Into<String>) -> Self {
        self.damage_type = Some(damage_type.into());
        self
    }
}

// ============================================================================
// Character
// ============================================================================

/// A character record as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub class_name: String,
    pub level: u8,
    pub ability_scores: AbilityScores,

    /// Hit die size (d6 for wizards up to d12 for barbarians).
    pub hit_die: u32,
    pub hit_dice_remaining: u8,

    #[serde(default)]
    pub skill_proficiencies: HashMap<Skill, ProficiencyLevel>,
    #[serde(default)]
    pub saving_throw_proficiencies: HashSet<Ability>,

    #[serde(default)]
    pub armor: Option<Armor>,
    #[serde(default)]
    pub shield: bool,

    #[serde(default)]
    pub spellcasting_ability: Option<Ability>,
    #[serde(default)]
    pub attacks: Vec<Attack>,

    #[serde(default)]
    pub notes: String,
}

impl Character {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            class_name: "Adventurer".to_string(),
            level: 1,
            ability_scores: AbilityScores::default(),
            hit_die: 8,
            hit_dice_remaining: 1,
            skill_proficiencies: HashMap::new(),
            saving_throw_proficiencies: HashSet::new(),
            armor: None,
            shield: false,
            spellcasting_ability: None,
            attacks: Vec::new(),
            notes: String::new(),
        }
    }

    /// A level 3 human fighter, handy for first runs and tests.
    pub fn sample_fighter(name: impl Into<String>) -> Self {
        let mut character = Self::new(name);
        character.class_name = "Fighter".to_string();
        character.level = 3;
        character.ability_scores = AbilityScores::new(16, 14, 15, 10, 12, 8);
        character.hit_die = 10;
        character.hit_dice_remaining = 3;
        character
            .saving_throw_proficiencies
            .extend([Ability::Strength, Ability::Constitution]);
        for skill in [Skill::Athletics, Skill::Perception, Skill::Intimidation] {
            character
                .skill_proficiencies
                .insert(skill, ProficiencyLevel::Proficient);
        }
        character.armor = Some(Armor::new("Chain Mail", 16, ArmorKind::Heavy));
        character.shield = true;
        character.attacks = vec![
            Attack::new("Longsword", Ability::Strength, "1d8").with_damage_type("slashing"),
            Attack::new("Handaxe", Ability::Strength, "1d6").with_damage_type("slashing"),
            Attack::new("Light Crossbow", Ability::Dexterity, "1d8").with_damage_type("piercing"),
        ];
        character
    }

    pub fn proficiency_bonus(&self) -> i32 {
        proficiency_bonus(self.level)
    }

    pub fn ability_modifier(&self, ability: Ability) -> i32 {
        self.ability_scores.modifier(ability)
    }

    pub fn skill_proficiency(&self, skill: Skill) -> ProficiencyLevel {
        self.skill_proficiencies
            .get(&skill)
            .copied()
            .unwrap_or_default()
    }

    pub fn skill_modifier(&self, skill: Skill) -> i32 {
        self.ability_modifier(skill.ability())
            + self
                .skill_proficiency(skill)
                .bonus(self.proficiency_bonus())
    }

    pub fn is_proficient_save(&self, ability: Ability) -> bool {
        self.saving_throw_proficiencies.contains(&ability)
    }

    pub fn saving_throw_modifier(&self, ability: Ability) -> i32 {
        let ability_mod = self.ability_modifier(ability);
        if self.is_proficient_save(ability) {
            ability_mod + self.proficiency_bonus()
        } else {
            ability_mod
        }
    }

    pub fn initiative_modifier(&self) -> i32 {
        self.ability_modifier(Ability::Dexterity)
    }

    /// Armor class from worn armor and shield; unarmored is 10 + DEX.
    pub fn armor_class(&self) -> i32 {
        let dex_mod = self.ability_modifier(Ability::Dexterity);
        let base = match &self.armor {
            None => 10 + dex_mod,
            Some(armor) => match armor.kind {
                ArmorKind::Light => armor.base_ac as i32 + dex_mod,
                ArmorKind::Medium => armor.base_ac as i32 + dex_mod.min(2),
                ArmorKind::Heavy => armor.base_ac as i32,
            },
        };
        let shield = if self.shield { 2 } else { 0 };
        (base + shield).max(1)
    }

    /// 8 + proficiency + spellcasting modifier, if the character casts spells.
    pub fn spell_save_dc(&self) -> Option<i32> {
        self.spellcasting_ability
            .map(|ability| 8 + self.proficiency_bonus() + self.ability_modifier(ability))
    }

    pub fn spell_attack_bonus(&self) -> Option<i32> {
        self.spellcasting_ability
            .map(|ability| self.proficiency_bonus() + self.ability_modifier(ability))
    }

    pub fn attack_bonus(&self, attack: &Attack) -> i32 {
        let proficiency = if attack.proficient {
            self.proficiency_bonus()
        } else {
            0
        };
        self.ability_modifier(attack.ability) + proficiency
    }

    pub fn damage_bonus(&self, attack: &Attack) -> i32 {
        if attack.add_ability_to_damage {
            self.ability_modifier(attack.ability)
        } else {
            0
        }
    }

    // ------------------------------------------------------------------------
    // Roll requests
    // ------------------------------------------------------------------------

    pub fn skill_check_request(&self, skill: Skill) -> RollRequest {
        RollRequest::new(skill.name(), "1d20")
            .with_modifier(self.skill_modifier(skill))
            .with_category(RollCategory::SkillCheck)
            .prompt_for_advantage()
    }

    pub fn ability_check_request(&self, ability: Ability) -> RollRequest {
        RollRequest::new(format!("{} Check", ability.name()), "1d20")
            .with_modifier(self.ability_modifier(ability))
            .with_category(RollCategory::SkillCheck)
            .prompt_for_advantage()
    }

    pub fn saving_throw_request(&self, ability: Ability) -> RollRequest {
        RollRequest::new(format!("{} Save", ability.name()), "1d20")
            .with_modifier(self.saving_throw_modifier(ability))
            .with_category(RollCategory::SavingThrow)
            .prompt_for_advantage()
    }

    pub fn initiative_request(&self) -> RollRequest {
        RollRequest::new("Initiative", "1d20")
            .with_modifier(self.initiative_modifier())
            .with_category(RollCategory::SkillCheck)
            .prompt_for_advantage()
    }

    pub fn damage_request(&self, attack: &Attack) -> RollRequest {
        RollRequest::new(format!("{} Damage", attack.name), attack.damage_dice.clone())
            .with_modifier(self.damage_bonus(attack))
            .with_category(RollCategory::Damage)
    }

    /// Attack roll that offers the damage roll as a follow-up.
    pub fn attack_request(&self, attack: &Attack) -> RollRequest {
        RollRequest::new(attack.name.clone(), "1d20")
            .with_modifier(self.attack_bonus(attack))
            .with_category(RollCategory::Attack)
            .prompt_for_advantage()
            .with_follow_up(self.damage_request(attack))
    }

    /// Spend a hit die: `1d<hit die>` + CON.
    pub fn hit_dice_request(&self) -> RollRequest {
        RollRequest::new("Hit Dice", format!("1d{}", self.hit_die))
            .with_modifier(self.ability_modifier(Ability::Constitution))
            .with_category(RollCategory::HitDice)
    }

    pub fn luck_request(&self) -> RollRequest {
        RollRequest::new("Luck", "1d20")
            .with_category(RollCategory::Luck)
            .prompt_for_advantage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::DiceExpression;

    #[test]
    fn test_ability_modifier() {
        assert_eq!(ability_modifier(1), -5);
        assert_eq!(ability_modifier(8), -1);
        assert_eq!(ability_modifier(9), -1);
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(11), 0);
        assert_eq!(ability_modifier(15), 2);
        assert_eq!(ability_modifier(20), 5);
    }

    #[test]
    fn test_tables_line_up_with_enums() {
        for (i, skill) in Skill::ALL.iter().enumerate() {
            assert_eq!(*skill as usize, i);
        }
        assert_eq!(Skill::Athletics.ability(), Ability::Strength);
        assert_eq!(Skill::SleightOfHand.name(), "Sleight of Hand");

        let names: Vec<&str> = Skill::ALL.iter().map(|s| s.name()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);

        assert_eq!(Ability::Wisdom.abbreviation(), "WIS");
        let mut scores = AbilityScores::default();
        scores.set(Ability::Charisma, 18);
        assert_eq!(scores.get(Ability::Charisma), 18);
        assert_eq!(scores.modifier(Ability::Charisma), 4);
    }

    #[test]
    fn test_proficiency_bonus() {
        assert_eq!(proficiency_bonus(1), 2);
        assert_eq!(proficiency_bonus(4), 2);
        assert_eq!(proficiency_bonus(5), 3);
        assert_eq!(proficiency_bonus(12), 4);
        assert_eq!(proficiency_bonus(13), 5);
        assert_eq!(proficiency_bonus(17), 6);
        assert_eq!(proficiency_bonus(20), 6);
    }

    #[test]
    fn test_armor_class() {
        let mut c = Character::new("Test");
        c.ability_scores.set(Ability::Dexterity, 16);
        assert_eq!(c.armor_class(), 13);

        c.armor = Some(Armor::new("Leather", 11, ArmorKind::Light));
        assert_eq!(c.armor_class(), 14);

        c.armor = Some(Armor::new("Scale Mail", 14, ArmorKind::Medium));
        assert_eq!(c.armor_class(), 16);

        c.armor = Some(Armor::new("Plate", 18, ArmorKind::Heavy));
        c.shield = true;
        assert_eq!(c.armor_class(), 20);
    }

    #[test]
    fn test_spell_save_dc() {
        let mut c = Character::new("Wizard");
        assert_eq!(c.spell_save_dc(), None);

        c.level = 5;
        c.ability_scores.set(Ability::Intelligence, 18);
        c.spellcasting_ability = Some(Ability::Intelligence);
        assert_eq!(c.spell_save_dc(), Some(15));
        assert_eq!(c.spell_attack_bonus(), Some(7));
    }

    #[test]
    fn test_skill_and_save_modifiers() {
        let fighter = Character::sample_fighter("Brom");
        // STR 16 (+3) + proficiency 2
        assert_eq!(fighter.skill_modifier(Skill::Athletics), 5);
        // DEX 14 (+2), not proficient
        assert_eq!(fighter.skill_modifier(Skill::Stealth), 2);
        assert_eq!(fighter.saving_throw_modifier(Ability::Constitution), 4);
        assert_eq!(fighter.saving_throw_modifier(Ability::Wisdom), 1);
        assert_eq!(fighter.armor_class(), 18);
    }

    #[test]
    fn test_expertise_doubles() {
        let mut c = Character::new("Rogue");
        c.skill_proficiencies
            .insert(Skill::Stealth, ProficiencyLevel::Expertise);
        assert_eq!(c.skill_modifier(Skill::Stealth), 4);
    }

    #[test]
    fn test_attack_request_chains_damage() {
        let fighter = Character::sample_fighter("Brom");
        let request = fighter.attack_request(&fighter.attacks[0]);

        assert_eq!(request.category, RollCategory::Attack);
        assert_eq!(request.modifier, 5);
        assert!(request.needs_prompt);

        let damage = request.follow_up.as_deref().unwrap();
        assert_eq!(damage.label, "Longsword Damage");
        assert_eq!(damage.expression, "1d8");
        assert_eq!(damage.modifier, 3);
        assert!(!damage.needs_prompt);
    }

    #[test]
    fn test_generated_expressions_parse() {
        let fighter = Character::sample_fighter("Brom");
        let mut requests = vec![
            fighter.hit_dice_request(),
            fighter.luck_request(),
            fighter.initiative_request(),
        ];
        requests.extend(fighter.attacks.iter().map(|a| fighter.attack_request(a)));
        requests.extend(Skill::all().iter().map(|s| fighter.skill_check_request(*s)));

        for request in requests {
            assert!(
                DiceExpression::parse(&request.expression).is_ok(),
                "{} has bad expression {}",
                request.label,
                request.expression
            );
        }
    }

    #[test]
    fn test_serde_round_trip_keeps_proficiencies() {
        let fighter = Character::sample_fighter("Brom");
        let json = serde_json::to_string(&fighter).unwrap();
        let back: Character = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fighter);
    }
}
