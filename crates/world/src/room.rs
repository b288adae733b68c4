//! # Rooms

use crate::constants::{self, SECTORS};
use fiery_core::{Uid, Vnum};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exit {
    /// Destination, `None` for an exit that leads nowhere
    pub to_room: Option<Uid>,
    /// Key object vnum, -1 for none
    pub key: Vnum,
    pub flags: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub uid: Option<Uid>,
    pub vnum: Vnum,
    pub name: String,
    pub zone: i32,
    /// Index into [`SECTORS`]
    pub sector: usize,
    pub light: i32,
    pub flags: u64,
    pub effects: u64,
    /// Occupants, most recent arrival first
    pub people: Vec<Uid>,
    /// Objects on the floor, most recently dropped first
    pub contents: Vec<Uid>,
    pub exits: [Option<Exit>; 6],
    pub triggers: Vec<Vnum>,
}

impl Room {
    pub fn new(vnum: Vnum, name: &str, zone: i32) -> Self {
        Self {
            uid: None,
            vnum,
            name: name.to_string(),
            zone,
            sector: 0,
            light: 0,
            flags: 0,
            effects: 0,
            people: Vec::new(),
            contents: Vec::new(),
            exits: [None; 6],
            triggers: Vec::new(),
        }
    }

    pub fn sector_name(&self) -> &'static str {
        constants::sprinttype(self.sector, SECTORS)
    }

    pub fn flagged(&self, flag: usize) -> bool {
        constants::is_set(self.flags, flag)
    }
}
