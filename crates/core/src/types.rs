//! Core type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker character that introduces an entity reference inside script text
pub const UID_CHAR: char = '\u{5}';

/// Virtual number of a prototype (mobile, object, room or trigger)
pub type Vnum = i32;

/// Vnum used for "no room"
pub const NOWHERE: Vnum = -1;

const GENERATION_BITS: u32 = 30;
const GENERATION_MASK: u64 = (1 << GENERATION_BITS) - 1;
const KIND_SHIFT: u32 = 62;

/// Kind of entity a [`Uid`] points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Mobile or player character
    Character,

    /// Item
    Object,

    /// Room
    Room,
}

impl EntityKind {
    fn tag(self) -> u64 {
        match self {
            EntityKind::Character => 1,
            EntityKind::Object => 2,
            EntityKind::Room => 3,
        }
    }

    fn from_tag(tag: u64) -> Option<Self> {
        match tag {
            1 => Some(EntityKind::Character),
            2 => Some(EntityKind::Object),
            3 => Some(EntityKind::Room),
            _ => None,
        }
    }

    /// Lowercase name used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Character => "character",
            EntityKind::Object => "object",
            EntityKind::Room => "room",
        }
    }
}

/// Typed generational handle to a world entity
///
/// A `Uid` is never dereferenced directly. Every access goes back through the
/// world, which checks the generation so a handle to a destroyed entity simply
/// stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Uid {
    kind: EntityKind,
    index: u32,
    generation: u32,
}

impl Uid {
    pub const fn new(kind: EntityKind, index: u32, generation: u32) -> Self {
        Self {
            kind,
            index,
            generation,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Packed numeric form: kind in the top two bits, then generation, then slot index.
    /// Never zero, so `0` stays free to mean "no entity" in script text.
    pub fn raw(&self) -> u64 {
        (self.kind.tag() << KIND_SHIFT)
            | ((self.generation as u64 & GENERATION_MASK) << 32)
            | self.index as u64
    }

    pub fn from_raw(raw: u64) -> Option<Self> {
        let kind = EntityKind::from_tag(raw >> KIND_SHIFT)?;
        Some(Self {
            kind,
            index: (raw & u32::MAX as u64) as u32,
            generation: ((raw >> 32) & GENERATION_MASK) as u32,
        })
    }

    /// Script text form (`UID_CHAR` followed by the raw number)
    pub fn to_var(&self) -> String {
        format!("{}{}", UID_CHAR, self.raw())
    }

    /// Parse the script text form produced by [`Uid::to_var`]
    pub fn parse(text: &str) -> Option<Self> {
        let digits = text.strip_prefix(UID_CHAR)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Self::from_raw(digits.parse().ok()?)
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", UID_CHAR, self.raw())
    }
}

/// Script text for an optional entity: its uid, or `0` when there is none
pub fn uid_var(uid: Option<Uid>) -> String {
    match uid {
        Some(uid) => uid.to_var(),
        None => "0".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_text_form() {
        let uid = Uid::new(EntityKind::Object, 42, 7);
        let text = uid.to_var();
        assert!(text.starts_with(UID_CHAR));
        assert_eq!(Uid::parse(&text), Some(uid));
        assert_eq!(uid.to_string(), text);
    }

    #[test]
    fn test_uid_rejects_plain_text() {
        assert_eq!(Uid::parse("12345"), None);
        assert_eq!(Uid::parse("\u{5}"), None);
        assert_eq!(Uid::parse("\u{5}12x"), None);
        assert_eq!(Uid::parse("\u{5}5"), None);
    }

    #[test]
    fn test_uid_raw_distinguishes_kinds() {
        let ch = Uid::new(EntityKind::Character, 1, 0);
        let room = Uid::new(EntityKind::Room, 1, 0);
        assert_ne!(ch.raw(), room.raw());
        assert_ne!(ch.raw(), 0);
        assert_eq!(Uid::from_raw(room.raw()), Some(room));
    }

    #[test]
    fn test_uid_var_none() {
        assert_eq!(uid_var(None), "0");
    }

    #[test]
    fn test_uid_serializes_with_kind() {
        let uid = Uid::new(EntityKind::Room, 9, 3);
        let json = serde_json::to_string(&uid).unwrap();
        assert!(json.contains("Room"));
        let back: Uid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uid);
        assert_eq!(back.kind(), EntityKind::Room);
    }
}
