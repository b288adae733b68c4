//! Flag and name tables
//!
//! Bit `n` of a flag set is named by entry `n` of the matching table.

/// Exit directions
pub const DIRS: [&str; 6] = ["north", "east", "south", "west", "up", "down"];

/// Index of the opposite direction for each entry of [`DIRS`]
pub const REV_DIR: [usize; 6] = [2, 3, 0, 1, 5, 4];

pub const NUM_WEARS: usize = 27;

pub const WEAR_POSITIONS: [&str; NUM_WEARS] = [
    "light", "rfinger", "lfinger", "neck1", "neck2", "body", "head", "legs", "feet", "hands",
    "arms", "shield", "aboutbody", "waist", "rwrist", "lwrist", "wield", "wield2", "held",
    "held2", "2hwield", "eyes", "face", "lear", "rear", "badge", "belt",
];

pub const EXIT_BITS: &[&str] = &["DOOR", "CLOSED", "LOCKED", "PICKPROOF", "HIDDEN", "DESCRIPT"];

pub const GENDERS: [&str; 3] = ["Neuter", "Male", "Female"];

pub const STANCE_TYPES: [&str; 8] = [
    "dead",
    "mortally wounded",
    "incapacitated",
    "stunned",
    "sleeping",
    "resting",
    "alert",
    "fighting",
];

pub const POSITION_TYPES: [&str; 5] = ["prone", "sitting", "kneeling", "standing", "flying"];

pub const PLAYER_BITS: &[&str] = &[
    "KILLER", "THIEF", "FROZEN", "DONTSET", "WRITING", "MAILING", "AUTOSAVE", "SITEOK",
    "NOSHOUT", "NOTITLE", "DELETED", "LOADRM", "!WIZL", "!DEL", "INVST", "CRYO", "MEDITATING",
    "CASTING", "BOUND", "SCRIBE", "TEACHING", "NAMENEEDSAPPROVE", "RENAME", "REMOVING",
    "SAVING", "GOTSTARS",
];

pub const ACTION_BITS: &[&str] = &[
    "SPEC", "SENTINEL", "SCAVENGER", "ISNPC", "AWARE", "AGGR", "STAY_ZONE", "WIMPY",
    "AGGR_EVIL", "AGGR_GOOD", "AGGR_NEUTRAL", "MEMORY", "HELPER", "!CHARM", "!SUMMN",
    "!SLEEP", "!BASH", "!BLIND", "MOUNTABLE", "NO_EQ_RESTRICT", "FAST_TRACK", "SLOW_TRACK",
    "CASTINGDONTUSE", "SUMMONED_MOUNT", "AQUATIC", "AGGR_EVIL_RACE", "AGGR_GOOD_RACE",
    "!SILENCE", "NOVICIOUS", "TEACHER", "ANIMATED", "PEACEFUL", "!POISON", "ILLUSORY",
    "PLAYER_PHANTASM", "!CLASS_AI", "!SCRIPT", "PEACEKEEPER", "PROTECTOR",
];

/// Mobile flag bit that keeps triggers from ever being attached
pub const MOB_NOSCRIPT: usize = 36;

pub const PREFERENCE_BITS: &[&str] = &[
    "BRIEF", "COMPACT", "DEAF", "!TELL", "OLCCOMM", "LINENUMS", "AUTOLOOT", "AUTOEXIT",
    "!HASSLE", "QUEST", "SUMMON", "!REPEAT", "LIGHT", "COLOR1", "COLOR2", "!WIZNET", "LOG1",
    "LOG2", "!AUCTION", "!GOSSIP", "!HINTS", "ROOMFLAG", "!PETITION", "AUTOSPLIT",
    "!CLANCOMM", "ANON", "VNUMS", "NICEAREA", "VICIOUS", "PASSIVE", "ROOMVIS", "!FOLLOW",
    "AUTOTREAS", "STK_OBJ", "STK_MOB", "SACRIFICIAL",
];

pub const EFFECT_FLAGS: &[&str] = &[
    "BLIND", "INVIS", "DET_ALIGN", "DET_INVIS", "DET_MAGIC", "SENSE_LIFE", "WATWALK", "SANCT",
    "CONFUSION", "CURSE", "INFRA", "POISON", "PROT_EVIL", "PROT_GOOD", "SLEEP", "!TRACK",
    "TAMED", "BERSERK", "SNEAK", "STEALTH", "FLY", "CHARM", "STONE_SKIN", "FARSEE", "HASTE",
    "BLUR", "VITALITY", "GLORY", "MAJOR_PARALYSIS", "FAMILIARITY", "MESMERIZED",
    "IMMOBILIZED", "LIGHT", "MAJOR_GROUP", "MINOR_PARALYSIS", "HURT_THROAT", "LEVITATE",
    "WATERBREATH", "SOULSHIELD", "SILENCE",
];

pub const EFF_BLIND: usize = 0;
pub const EFF_INVISIBLE: usize = 1;
pub const EFF_DETECT_INVIS: usize = 3;

pub const EXTRA_BITS: &[&str] = &[
    "GLOW", "HUM", "!RENT", "!DONATE", "!INVIS", "INVISIBLE", "MAGIC", "!DROP", "PERMANENT",
    "!GOOD", "!EVIL", "!NEUTRAL", "!SORCERER", "!CLERIC", "!ROGUE", "!WARRIOR", "!SELL",
    "!PALADIN", "!ANTI_PALADIN", "!RANGER", "!DRUID", "!SHAMAN", "!ASSASSIN", "!MERCENARY",
    "!NECROMANCER", "!CONJURER", "!BURN", "!LOCATE", "DECOMPOSING", "FLOAT", "!FALL",
    "DISARMED",
];

pub const ITEM_TYPES: &[&str] = &[
    "UNDEFINED", "LIGHT", "SCROLL", "WAND", "STAFF", "WEAPON", "FIREWEAPON", "MISSILE",
    "TREASURE", "ARMOR", "POTION", "WORN", "OTHER", "TRASH", "TRAP", "CONTAINER", "NOTE",
    "LIQCONTAINER", "KEY", "FOOD", "MONEY", "PEN", "BOAT", "FOUNTAIN", "PORTAL", "ROPE",
    "SPELLBOOK", "WALL", "TOUCHSTONE", "BOARD",
];

pub const ROOM_BITS: &[&str] = &[
    "DARK", "DEATH", "!MOB", "INDOORS", "PEACEFUL", "SOUNDPROOF", "!TRACK", "!MAGIC", "TUNNEL",
    "PRIVATE", "GODROOM", "HOUSE", "HCRSH", "ATRIUM", "OLC", "*BFS_MARK*", "NOWELL",
    "NORECALL", "UNDERDARK", "!SUMMON", "NOSHIFT", "GUILDHALL", "!SCAN", "ALT_EXIT", "MAP",
    "ALWAYSLIT", "ARENA", "OBSERVATORY",
];

pub const ROOM_DARK: usize = 0;
pub const ROOM_DEATH: usize = 1;
pub const ROOM_PRIVATE: usize = 9;
pub const ROOM_GODROOM: usize = 10;

pub const ROOM_EFFECTS: &[&str] = &[
    "FOG",
    "DARKNESS",
    "CONT_LIGHT",
    "FOREST",
    "CIRCLE_FIRE",
    "ISOLATION",
];

pub const SECTORS: &[&str] = &[
    "Structure", "City", "Field", "Forest", "Mountains", "Shallows", "Water", "Underwater",
    "Air", "Road", "Grasslands", "Cave", "Ruins", "Swamp", "Beach", "Underdark", "Astraplane",
    "Airplane", "Fireplane", "Earthplane", "Etherealplane", "Avernus",
];

pub const COIN_NAMES: [&str; 4] = ["platinum", "gold", "silver", "copper"];

#[inline]
pub fn is_set(bits: u64, flag: usize) -> bool {
    flag < 64 && bits & (1 << flag) != 0
}

#[inline]
pub fn set_flag(bits: &mut u64, flag: usize) {
    if flag < 64 {
        *bits |= 1 << flag;
    }
}

/// Names of every set flag, space separated, or `NO FLAGS`
pub fn sprintflag(bits: u64, names: &[&str]) -> String {
    let set: Vec<&str> = (0..64)
        .filter(|flag| is_set(bits, *flag))
        .map(|flag| names.get(flag).copied().unwrap_or("UNDEFINED"))
        .collect();
    if set.is_empty() {
        "NO FLAGS".to_string()
    } else {
        set.join(" ")
    }
}

/// Bit names each followed by a space, or `NO BITS`
pub fn sprintbit(bits: u64, names: &[&str]) -> String {
    let mut out = String::new();
    for flag in (0..64).filter(|flag| is_set(bits, *flag)) {
        out.push_str(names.get(flag).copied().unwrap_or("UNDEFINED"));
        out.push(' ');
    }
    if out.is_empty() {
        "NO BITS".to_string()
    } else {
        out
    }
}

/// Table entry by index, or `UNDEFINED`
pub fn sprinttype<'a>(index: usize, names: &[&'a str]) -> &'a str {
    names.get(index).copied().unwrap_or("UNDEFINED")
}

/// Find `arg` in a name table. Exact lookups compare whole names, otherwise
/// `arg` may abbreviate an entry. Case-insensitive either way.
pub fn search_block(arg: &str, names: &[&str], exact: bool) -> Option<usize> {
    if arg.is_empty() {
        return None;
    }
    names.iter().position(|name| {
        if exact {
            name.eq_ignore_ascii_case(arg)
        } else {
            name.len() >= arg.len() && name[..arg.len()].eq_ignore_ascii_case(arg)
        }
    })
}
