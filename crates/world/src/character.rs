//! # Characters
//!
//! Mobiles and players share one record; `npc` tells them apart.

use crate::constants::{self, GENDERS, NUM_WEARS, POSITION_TYPES, STANCE_TYPES};
use fiery_core::{Uid, Vnum};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sex {
    #[default]
    Neuter,
    Male,
    Female,
}

impl Sex {
    pub fn name(self) -> &'static str {
        GENDERS[self as usize]
    }

    /// Possessive pronoun
    pub fn his_her(self) -> &'static str {
        match self {
            Sex::Male => "his",
            Sex::Female => "her",
            Sex::Neuter => "its",
        }
    }

    /// Objective pronoun
    pub fn him_her(self) -> &'static str {
        match self {
            Sex::Male => "him",
            Sex::Female => "her",
            Sex::Neuter => "it",
        }
    }

    /// Nominative pronoun
    pub fn he_she(self) -> &'static str {
        match self {
            Sex::Male => "he",
            Sex::Female => "she",
            Sex::Neuter => "it",
        }
    }
}

/// Consciousness level, ordered from dead to fighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Stance {
    Dead,
    MortallyWounded,
    Incapacitated,
    Stunned,
    Sleeping,
    Resting,
    #[default]
    Alert,
    Fighting,
}

impl Stance {
    pub fn name(self) -> &'static str {
        STANCE_TYPES[self as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Position {
    Prone,
    Sitting,
    Kneeling,
    #[default]
    Standing,
    Flying,
}

impl Position {
    pub fn name(self) -> &'static str {
        POSITION_TYPES[self as usize]
    }
}

/// The six ability scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abilities {
    pub str: i32,
    pub int: i32,
    pub wis: i32,
    pub dex: i32,
    pub con: i32,
    pub cha: i32,
}

impl Default for Abilities {
    fn default() -> Self {
        Self {
            str: 50,
            int: 50,
            wis: 50,
            dex: 50,
            con: 50,
            cha: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestStatus {
    InProgress(i32),
    Completed,
    Failed,
}

/// A mobile or player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    /// Own handle, assigned when the character enters the world
    pub uid: Option<Uid>,

    /// Prototype vnum, -1 for players
    pub vnum: Vnum,
    pub npc: bool,

    /// Keyword list (mobiles) or name (players)
    pub alias: String,
    pub short_descr: Option<String>,
    pub title: Option<String>,

    pub sex: Sex,
    pub class: String,
    pub race: String,
    pub level: i32,
    pub weight: i32,
    pub height: i32,

    /// Unmodified scores
    pub real_abilities: Abilities,
    /// Scores after effects
    pub abilities: Abilities,

    pub hit: i32,
    pub max_hit: i32,
    pub moves: i32,
    pub max_moves: i32,
    pub armor: i32,
    pub hitroll: i32,
    pub damroll: i32,
    pub exp: i64,
    pub alignment: i32,
    /// Platinum, gold, silver, copper
    pub coins: [i32; 4],

    pub mob_flags: u64,
    pub player_flags: u64,
    pub pref_flags: u64,
    pub effect_flags: u64,
    /// Active spell names
    pub spells: Vec<String>,

    pub stance: Stance,
    pub position: Position,
    pub casting: bool,

    pub room: Option<Uid>,
    pub fighting: Option<Uid>,
    pub hunting: Option<Uid>,
    pub riding: Option<Uid>,
    pub ridden_by: Option<Uid>,
    pub consented: Option<Uid>,
    pub master: Option<Uid>,
    pub group_leader: Option<Uid>,
    /// Followers when this character leads a group
    pub group_members: Vec<Uid>,

    /// Carried objects, most recently received first
    pub inventory: Vec<Uid>,
    pub equipment: [Option<Uid>; NUM_WEARS],

    pub skills: HashMap<String, i32>,
    pub clan: Option<String>,
    pub clan_rank: i32,
    pub invis_level: i32,
    pub quests: HashMap<String, QuestStatus>,

    /// Trigger vnums instantiated when this character is created from its prototype
    pub triggers: Vec<Vnum>,
}

impl Character {
    /// Create a mobile prototype
    ///
    /// # Arguments
    /// * `vnum` - Prototype number
    /// * `alias` - Keywords used for name lookups
    /// * `short_descr` - Name shown in messages
    pub fn mobile(vnum: Vnum, alias: &str, short_descr: &str) -> Self {
        let mut ch = Self::blank(vnum, alias);
        ch.npc = true;
        ch.short_descr = Some(short_descr.to_string());
        constants::set_flag(&mut ch.mob_flags, 3);
        ch
    }

    /// Create a player character
    pub fn player(name: &str) -> Self {
        let mut ch = Self::blank(-1, name);
        ch.title = Some(String::new());
        ch
    }

    fn blank(vnum: Vnum, alias: &str) -> Self {
        Self {
            uid: None,
            vnum,
            npc: false,
            alias: alias.to_string(),
            short_descr: None,
            title: None,
            sex: Sex::Neuter,
            class: "warrior".to_string(),
            race: "human".to_string(),
            level: 1,
            weight: 150,
            height: 70,
            real_abilities: Abilities::default(),
            abilities: Abilities::default(),
            hit: 20,
            max_hit: 20,
            moves: 100,
            max_moves: 100,
            armor: 100,
            hitroll: 0,
            damroll: 0,
            exp: 0,
            alignment: 0,
            coins: [0; 4],
            mob_flags: 0,
            player_flags: 0,
            pref_flags: 0,
            effect_flags: 0,
            spells: Vec::new(),
            stance: Stance::Alert,
            position: Position::Standing,
            casting: false,
            room: None,
            fighting: None,
            hunting: None,
            riding: None,
            ridden_by: None,
            consented: None,
            master: None,
            group_leader: None,
            group_members: Vec::new(),
            inventory: Vec::new(),
            equipment: [None; NUM_WEARS],
            skills: HashMap::new(),
            clan: None,
            clan_rank: 0,
            invis_level: 0,
            quests: HashMap::new(),
            triggers: Vec::new(),
        }
    }

    /// Name shown in messages: short description if set, else the alias
    pub fn name(&self) -> &str {
        self.short_descr.as_deref().unwrap_or(&self.alias)
    }

    /// Able to act (above sleeping)
    #[inline]
    pub fn awake(&self) -> bool {
        self.stance > Stance::Sleeping
    }

    #[inline]
    pub fn mob_flagged(&self, flag: usize) -> bool {
        constants::is_set(self.mob_flags, flag)
    }

    #[inline]
    pub fn eff_flagged(&self, flag: usize) -> bool {
        constants::is_set(self.effect_flags, flag)
    }

    /// True if any keyword in the alias list starts with `name`
    pub fn matches_name(&self, name: &str) -> bool {
        isname(name, &self.alias)
    }

    pub fn is_grouped(&self) -> bool {
        self.group_leader.is_some() || !self.group_members.is_empty()
    }
}

/// Keyword match used by every name lookup: `name` abbreviates one of the
/// whitespace separated words in `namelist`, case-insensitively.
pub fn isname(name: &str, namelist: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    let name = name.to_ascii_lowercase();
    namelist
        .split_whitespace()
        .any(|word| word.to_ascii_lowercase().starts_with(&name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mobile_name_uses_short_descr() {
        let mob = Character::mobile(3001, "priest old", "the old priest");
        assert!(mob.npc);
        assert_eq!(mob.name(), "the old priest");
        assert!(mob.matches_name("pri"));
        assert!(!mob.matches_name("guard"));
    }

    #[test]
    fn test_awake() {
        let mut ch = Character::player("Ayla");
        assert!(ch.awake());
        ch.stance = Stance::Sleeping;
        assert!(!ch.awake());
        ch.stance = Stance::Resting;
        assert!(ch.awake());
    }

    #[test]
    fn test_pronouns() {
        assert_eq!(Sex::Female.his_her(), "her");
        assert_eq!(Sex::Male.he_she(), "he");
        assert_eq!(Sex::Neuter.him_her(), "it");
    }

    #[test]
    fn test_character_serializes() {
        let ch = Character::mobile(1, "rat", "a rat");
        let json = serde_json::to_string(&ch).unwrap();
        let back: Character = serde_json::from_str(&json).unwrap();
        assert_eq!(back.alias, "rat");
    }
}
