//! # Objects

use crate::character::isname;
use crate::constants::{self, ITEM_TYPES};
use fiery_core::{Uid, Vnum};
use serde::{Deserialize, Serialize};

/// Where an object currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObjLocation {
    /// Not placed anywhere (fresh from a prototype)
    #[default]
    Nowhere,
    Room(Uid),
    Carried(Uid),
    Worn { by: Uid, position: usize },
    Inside(Uid),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Object {
    pub uid: Option<Uid>,
    pub vnum: Vnum,
    /// Keyword list
    pub name: String,
    pub short_description: String,
    /// Text shown when lying in a room
    pub description: String,
    /// Index into [`ITEM_TYPES`]
    pub item_type: usize,
    pub weight: f32,
    pub cost: i32,
    pub level: i32,
    pub values: [i32; 4],
    pub timer: i32,
    pub decomp: i32,
    pub extra_flags: u64,
    pub effect_flags: u64,
    pub location: ObjLocation,
    /// Objects inside this one, most recently added first
    pub contents: Vec<Uid>,
    pub triggers: Vec<Vnum>,
}

impl Object {
    pub fn new(vnum: Vnum, name: &str, short_description: &str) -> Self {
        Self {
            uid: None,
            vnum,
            name: name.to_string(),
            short_description: short_description.to_string(),
            description: format!("{} lies here.", short_description),
            item_type: 12,
            weight: 1.0,
            cost: 0,
            level: 0,
            values: [0; 4],
            timer: 0,
            decomp: 0,
            extra_flags: 0,
            effect_flags: 0,
            location: ObjLocation::Nowhere,
            contents: Vec::new(),
            triggers: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        constants::sprinttype(self.item_type, ITEM_TYPES)
    }

    pub fn matches_name(&self, name: &str) -> bool {
        isname(name, &self.name)
    }

    pub fn flagged(&self, flag: usize) -> bool {
        constants::is_set(self.extra_flags, flag)
    }

    pub fn carried_by(&self) -> Option<Uid> {
        match self.location {
            ObjLocation::Carried(ch) => Some(ch),
            _ => None,
        }
    }

    pub fn worn_by(&self) -> Option<Uid> {
        match self.location {
            ObjLocation::Worn { by, .. } => Some(by),
            _ => None,
        }
    }
}
