//! Trigger templates
//!
//! A template is the immutable, shared form of a trigger: its header plus a
//! [`Program`] of pre-classified instructions. Every attached instance points
//! at the same `Arc<Program>`; per-instance state lives in
//! [`crate::context::Frame`].

use fiery_core::{EntityKind, Vnum};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// Mobile trigger categories
pub const MTRIG_GLOBAL: u64 = 1 << 0;
pub const MTRIG_RANDOM: u64 = 1 << 1;
pub const MTRIG_COMMAND: u64 = 1 << 2;
pub const MTRIG_SPEECH: u64 = 1 << 3;
pub const MTRIG_ACT: u64 = 1 << 4;
pub const MTRIG_DEATH: u64 = 1 << 5;
pub const MTRIG_GREET: u64 = 1 << 6;
pub const MTRIG_GREET_ALL: u64 = 1 << 7;
pub const MTRIG_ENTRY: u64 = 1 << 8;
pub const MTRIG_RECEIVE: u64 = 1 << 9;
pub const MTRIG_FIGHT: u64 = 1 << 10;
pub const MTRIG_HITPRCNT: u64 = 1 << 11;
pub const MTRIG_BRIBE: u64 = 1 << 12;
pub const MTRIG_SPEECHTO: u64 = 1 << 13;
pub const MTRIG_LOAD: u64 = 1 << 14;
pub const MTRIG_CAST: u64 = 1 << 15;
pub const MTRIG_LEAVE: u64 = 1 << 16;
pub const MTRIG_DOOR: u64 = 1 << 17;
pub const MTRIG_LOOK: u64 = 1 << 18;
pub const MTRIG_TIME: u64 = 1 << 19;

// Object trigger categories
pub const OTRIG_GLOBAL: u64 = 1 << 0;
pub const OTRIG_RANDOM: u64 = 1 << 1;
pub const OTRIG_COMMAND: u64 = 1 << 2;
pub const OTRIG_ATTACK: u64 = 1 << 3;
pub const OTRIG_DEFEND: u64 = 1 << 4;
pub const OTRIG_TIMER: u64 = 1 << 5;
pub const OTRIG_GET: u64 = 1 << 6;
pub const OTRIG_DROP: u64 = 1 << 7;
pub const OTRIG_GIVE: u64 = 1 << 8;
pub const OTRIG_WEAR: u64 = 1 << 9;
pub const OTRIG_DEATH: u64 = 1 << 10;
pub const OTRIG_REMOVE: u64 = 1 << 11;
pub const OTRIG_LOOK: u64 = 1 << 12;
pub const OTRIG_LOAD: u64 = 1 << 14;
pub const OTRIG_CAST: u64 = 1 << 15;
pub const OTRIG_LEAVE: u64 = 1 << 16;
pub const OTRIG_CONSUME: u64 = 1 << 18;
pub const OTRIG_TIME: u64 = 1 << 19;

// Room trigger categories
pub const WTRIG_GLOBAL: u64 = 1 << 0;
pub const WTRIG_RANDOM: u64 = 1 << 1;
pub const WTRIG_COMMAND: u64 = 1 << 2;
pub const WTRIG_SPEECH: u64 = 1 << 3;
pub const WTRIG_RESET: u64 = 1 << 5;
pub const WTRIG_PREENTRY: u64 = 1 << 6;
pub const WTRIG_DROP: u64 = 1 << 7;
pub const WTRIG_POSTENTRY: u64 = 1 << 8;
pub const WTRIG_CAST: u64 = 1 << 15;
pub const WTRIG_LEAVE: u64 = 1 << 16;
pub const WTRIG_DOOR: u64 = 1 << 17;
pub const WTRIG_TIME: u64 = 1 << 19;

// Where an object command trigger listens (bits of its numeric argument)
pub const OCMD_EQUIP: i32 = 1 << 0;
pub const OCMD_INVEN: i32 = 1 << 1;
pub const OCMD_ROOM: i32 = 1 << 2;

pub const MTRIG_TYPES: &[&str] = &[
    "Global", "Random", "Command", "Speech", "Act", "Death", "Greet", "Greet-All", "Entry",
    "Receive", "Fight", "HitPrcnt", "Bribe", "SpeechTo*", "Load", "Cast", "Leave", "Door",
    "Look", "Time",
];

pub const OTRIG_TYPES: &[&str] = &[
    "Global", "Random", "Command", "Attack", "Defense", "Timer", "Get", "Drop", "Give", "Wear",
    "DEATH", "Remove", "Look", "Use", "Load", "Cast", "Leave", "UNUSED", "Consume", "Time",
];

pub const WTRIG_TYPES: &[&str] = &[
    "Global", "Random", "Command", "Speech", "UNUSED", "Reset", "Preentry", "Drop", "Postentry",
    "UNUSED", "UNUSED", "UNUSED", "UNUSED", "UNUSED", "UNUSED", "Cast", "Leave", "Door", "UNUSED",
    "Time",
];

/// Which kind of entity a template may be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachType {
    Mobile,
    Object,
    Room,
}

impl AttachType {
    /// Attach type from its numeric code in trigger files
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(AttachType::Mobile),
            1 => Some(AttachType::Object),
            2 => Some(AttachType::Room),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            AttachType::Mobile => 0,
            AttachType::Object => 1,
            AttachType::Room => 2,
        }
    }

    pub fn entity_kind(self) -> EntityKind {
        match self {
            AttachType::Mobile => EntityKind::Character,
            AttachType::Object => EntityKind::Object,
            AttachType::Room => EntityKind::Room,
        }
    }

    /// Category names for this attach type, indexed by bit
    pub fn type_names(self) -> &'static [&'static str] {
        match self {
            AttachType::Mobile => MTRIG_TYPES,
            AttachType::Object => OTRIG_TYPES,
            AttachType::Room => WTRIG_TYPES,
        }
    }
}

/// Control keyword a line starts with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keyword {
    If,
    ElseIf,
    Else,
    End,
    While,
    Switch,
    Case,
    Default,
    Break,
    Done,
    Comment,
    Blank,
    /// Ordinary line: variable command or host command
    Other,
}

impl Keyword {
    /// Classify a trimmed line by its first word
    pub fn classify(line: &str) -> Self {
        if line.is_empty() {
            return Keyword::Blank;
        }
        if line.starts_with('*') {
            return Keyword::Comment;
        }
        let word = line.split_whitespace().next().unwrap_or("");
        match word.to_ascii_lowercase().as_str() {
            "if" => Keyword::If,
            "elseif" => Keyword::ElseIf,
            "else" => Keyword::Else,
            "end" => Keyword::End,
            "while" => Keyword::While,
            "switch" => Keyword::Switch,
            "case" => Keyword::Case,
            "default" => Keyword::Default,
            "break" => Keyword::Break,
            "done" => Keyword::Done,
            _ => Keyword::Other,
        }
    }
}

/// One line of a program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub keyword: Keyword,
    /// Line text with surrounding whitespace removed
    pub text: String,
}

impl Instruction {
    pub fn new(line: &str) -> Self {
        let text = line.trim().to_string();
        Self {
            keyword: Keyword::classify(&text),
            text,
        }
    }

    /// Text after the leading keyword, with leading spaces skipped
    pub fn argument(&self) -> &str {
        match self.text.find(char::is_whitespace) {
            Some(pos) => self.text[pos..].trim_start(),
            None => "",
        }
    }
}

/// Immutable instruction sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    lines: Vec<Instruction>,
}

impl Program {
    /// Build a program from source lines. Empty lines are dropped.
    pub fn parse(source: &str) -> Self {
        let lines = source
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(Instruction::new)
            .collect();
        Self { lines }
    }

    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let lines = lines
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .map(Instruction::new)
            .collect();
        Self { lines }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.lines.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.lines.iter()
    }
}

/// A loaded trigger
#[derive(Debug, Clone)]
pub struct TriggerTemplate {
    pub vnum: Vnum,
    pub name: String,
    pub attach_type: AttachType,
    /// Category bitmask (`MTRIG_*`, `OTRIG_*` or `WTRIG_*`)
    pub trigger_type: u64,
    pub narg: i32,
    pub arglist: String,
    pub program: Arc<Program>,
}

impl TriggerTemplate {
    pub fn new(vnum: Vnum, name: &str, attach_type: AttachType, trigger_type: u64, source: &str) -> Self {
        Self {
            vnum,
            name: name.to_string(),
            attach_type,
            trigger_type,
            narg: 0,
            arglist: String::new(),
            program: Arc::new(Program::parse(source)),
        }
    }

    /// Builder-style numeric argument
    pub fn with_narg(mut self, narg: i32) -> Self {
        self.narg = narg;
        self
    }

    /// Builder-style text argument
    pub fn with_arglist(mut self, arglist: &str) -> Self {
        self.arglist = arglist.to_string();
        self
    }

    /// Category names of this template, space separated
    pub fn type_names(&self) -> String {
        let names = self.attach_type.type_names();
        let set: Vec<&str> = (0..64)
            .filter(|bit| self.trigger_type & (1 << bit) != 0)
            .map(|bit| names.get(bit).copied().unwrap_or("UNDEFINED"))
            .collect();
        if set.is_empty() {
            "NO FLAGS".to_string()
        } else {
            set.join(" ")
        }
    }
}

/// Parse a category flag word: a decimal bitmask, or letters where `a`..`z`
/// are bits 0..25 and `A`..`Z` bits 26..51
pub fn parse_flags(word: &str) -> u64 {
    if !word.is_empty() && word.bytes().all(|b| b.is_ascii_digit()) {
        return word.parse().unwrap_or(0);
    }
    word.bytes().fold(0, |flags, b| match b {
        b'a'..=b'z' => flags | 1 << (b - b'a'),
        b'A'..=b'Z' => flags | 1 << (26 + (b - b'A')),
        _ => flags,
    })
}
