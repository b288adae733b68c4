//! Variable resolution
//!
//! Turns a `%name.field[arg]%` reference into text. Lookup order: the running
//! instance's locals, the context's globals, `self`, then the static
//! namespaces (`time`, `random`, `get`, `string`). Entity references are
//! re-resolved against the world on every access.

use crate::fields;
use crate::log::{DiagnosticKind, ScriptLog, TriggerTag};
use crate::vars::{VarList, VarValue};
use fiery_core::{uid_var, EntityKind, Uid, UID_CHAR};
use fiery_world::constants::{search_block, DIRS, REV_DIR};
use fiery_world::World;
use rand::rngs::StdRng;
use rand::Rng;

/// Everything a substitution can see
pub(crate) struct Scope<'a> {
    pub world: &'a World,
    pub owner: Uid,
    pub locals: &'a VarList,
    pub globals: Option<&'a VarList>,
    pub rng: &'a mut StdRng,
    pub log: &'a mut ScriptLog,
    pub tag: TriggerTag<'a>,
    pub legacy_string_ge: bool,
}

impl Scope<'_> {
    /// Local first, then global
    pub fn lookup(&self, name: &str) -> Option<&VarValue> {
        self.locals
            .get(name)
            .or_else(|| self.globals.and_then(|globals| globals.get(name)))
    }

    pub fn structural(&mut self, message: impl Into<String>) {
        self.log.record(DiagnosticKind::Structural, self.tag, message);
    }

    pub fn reference(&mut self, message: impl Into<String>) {
        self.log.record(DiagnosticKind::Reference, self.tag, message);
    }

    /// Uniform roll in `low..=high`
    pub fn number(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }
}

/// Resolve one reference
///
/// # Arguments
/// * `var` - Variable or namespace name
/// * `field` - Text after the `.`, empty if none
/// * `arg` - Already substituted text inside `[...]`, empty if none
pub(crate) fn find_replacement(scope: &mut Scope<'_>, var: &str, field: &str, arg: &str) -> String {
    let stored = scope.lookup(var).cloned();

    if field.is_empty() {
        return match stored {
            Some(value) => value.to_string(),
            None if var.eq_ignore_ascii_case("self") => scope.owner.to_var(),
            None => String::new(),
        };
    }

    let target = match &stored {
        Some(VarValue::Entity(uid)) => scope.world.exists(*uid).then_some(*uid),
        Some(VarValue::Text(text)) if !text.is_empty() => scope.world.find_around(scope.owner, text),
        Some(VarValue::Text(_)) => None,
        None if var.eq_ignore_ascii_case("self") => Some(scope.owner),
        None => return static_namespace(scope, var, field, arg),
    };

    match target {
        Some(uid) => match uid.kind() {
            EntityKind::Character => fields::character::field(scope, uid, var, field, arg),
            EntityKind::Object => fields::object::field(scope, uid, var, field, arg),
            EntityKind::Room => fields::room::field(scope, uid, var, field, arg),
        },
        None => {
            let what = match &stored {
                Some(VarValue::Entity(_)) => "previously extracted UID",
                Some(value) if value.is_empty() => "empty",
                Some(VarValue::Text(text)) if text.starts_with(UID_CHAR) => "previously extracted UID",
                _ => "non-UID",
            };
            scope.reference(format!(
                "attempt to access field '{}' on {} variable '{}'",
                field, what, var
            ));
            String::new()
        }
    }
}

fn static_namespace(scope: &mut Scope<'_>, var: &str, field: &str, arg: &str) -> String {
    match var.to_ascii_lowercase().as_str() {
        "time" => time_field(scope, field),
        "random" => random_field(scope, field),
        "get" => get_field(scope, field, arg),
        "string" => string_field(scope, field, arg),
        _ => {
            scope.structural(format!("unknown variable '{}' in '%{}.{}%'", var, var, field));
            String::new()
        }
    }
}

fn time_field(scope: &mut Scope<'_>, field: &str) -> String {
    let time = scope.world.time;
    match field.to_ascii_lowercase().as_str() {
        "hour" => time.hours.to_string(),
        "day" => time.day.to_string(),
        "month" => time.month.to_string(),
        "year" => time.year.to_string(),
        "stamp" => time.stamp().to_string(),
        _ => {
            scope.structural(format!("Unknown time field '{}'", field));
            String::new()
        }
    }
}

fn random_field(scope: &mut Scope<'_>, field: &str) -> String {
    match field.to_ascii_lowercase().as_str() {
        "char" => uid_var(random_char_around(scope)),
        "room" => {
            let world = scope.world;
            let pick = scope.rng.gen::<usize>();
            world
                .random_room(None, |len| pick % len)
                .and_then(|room| world.room(room))
                .map(|room| room.vnum.to_string())
                .unwrap_or_else(|| "-1".to_string())
        }
        "room_in_zone" => {
            let world = scope.world;
            let zone = world
                .entity_room(scope.owner)
                .and_then(|room| world.room(room))
                .map(|room| room.zone);
            let pick = scope.rng.gen::<usize>();
            zone.and_then(|zone| world.random_room(Some(zone), |len| pick % len))
                .and_then(|room| world.room(room))
                .map(|room| room.vnum.to_string())
                .unwrap_or_else(|| "-1".to_string())
        }
        _ => {
            let max = atoi(field);
            if max > 0 {
                scope.number(1, max).to_string()
            } else {
                "0".to_string()
            }
        }
    }
}

/// Random visible occupant of the owner's room, never the owner itself
fn random_char_around(scope: &mut Scope<'_>) -> Option<Uid> {
    let world = scope.world;
    let owner = scope.owner;
    let room = world.entity_room(owner).and_then(|room| world.room(room))?;
    let candidates: Vec<Uid> = room
        .people
        .iter()
        .copied()
        .filter(|uid| *uid != owner)
        .filter(|uid| world.character(*uid).map(|ch| ch.invis_level == 0).unwrap_or(false))
        .filter(|uid| owner.kind() != EntityKind::Character || world.can_see(owner, *uid))
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let pick = scope.number(0, candidates.len() as i32 - 1) as usize;
    candidates.get(pick).copied()
}

fn get_field(scope: &mut Scope<'_>, field: &str, arg: &str) -> String {
    let world = scope.world;
    let vnum = || is_positive_integer(arg).then(|| atoi(arg));
    match field.to_ascii_lowercase().as_str() {
        "obj_shortdesc" => vnum()
            .and_then(|v| world.obj_proto(v))
            .map(|proto| proto.short_description.clone())
            .unwrap_or_else(|| format!("[no description for object {}]", arg)),
        "obj_noadesc" => vnum()
            .and_then(|v| world.obj_proto(v))
            .map(|proto| without_article(&proto.short_description).to_string())
            .unwrap_or_else(|| format!("[no description for object {}]", arg)),
        "mob_shortdesc" => vnum()
            .and_then(|v| world.mob_proto(v))
            .map(|proto| proto.name().to_string())
            .unwrap_or_else(|| format!("[no description for mobile {}]", arg)),
        "obj_count" => {
            let v = atoi(arg);
            match world.obj_proto(v) {
                Some(_) => world.count_objs(v).to_string(),
                None => "0".to_string(),
            }
        }
        "mob_count" => {
            let v = atoi(arg);
            match world.mob_proto(v) {
                Some(_) => world.count_mobs(v).to_string(),
                None => "0".to_string(),
            }
        }
        "room" => uid_var(world.room_by_vnum(atoi(arg))),
        "people" => {
            let room = vnum().and_then(|v| world.room_by_vnum(v)).and_then(|r| world.room(r));
            match room {
                Some(room) => room
                    .people
                    .iter()
                    .filter_map(|uid| world.character(*uid))
                    .filter(|ch| ch.invis_level == 0)
                    .count()
                    .to_string(),
                None => {
                    scope.structural(format!("get.people[{}]: room '{}' does not exist", arg, arg));
                    String::new()
                }
            }
        }
        "opposite_dir" => match search_block(arg, &DIRS, false) {
            Some(dir) => DIRS[REV_DIR[dir]].to_string(),
            None => arg.chars().rev().collect(),
        },
        "uidchar" => UID_CHAR.to_string(),
        _ => {
            scope.structural(format!("Unknown get field: '{}'", field));
            String::new()
        }
    }
}

fn string_field(scope: &mut Scope<'_>, field: &str, arg: &str) -> String {
    match field.to_ascii_lowercase().as_str() {
        "reverse" => arg.chars().rev().collect(),
        "length" => arg.chars().count().to_string(),
        "tolower" => arg.to_ascii_lowercase(),
        "toupper" => arg.to_ascii_uppercase(),
        "cap" | "capitalize" => capitalize(arg),
        "firstword" => arg.split_whitespace().next().unwrap_or("").to_string(),
        _ => {
            scope.structural(format!("Unknown string field: '{}'", field));
            arg.to_string()
        }
    }
}

/// Uppercase the first character
pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn without_article(text: &str) -> &str {
    for article in ["a ", "an ", "the ", "some "] {
        let matches = text
            .get(..article.len())
            .map(|prefix| prefix.eq_ignore_ascii_case(article))
            .unwrap_or(false);
        if matches && text.len() > article.len() {
            return &text[article.len()..];
        }
    }
    text
}

/// C `atoi`: optional leading space and sign, then digits; anything else is 0
pub fn atoi(text: &str) -> i32 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, b| (acc * 10 + (b - b'0') as i64).min(i32::MAX as i64 + 1));
    let value = if negative { -value } else { value };
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Digits only, no sign
pub(crate) fn is_positive_integer(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fiery_core::GameTime;
    use fiery_world::{Character, Object, Room};
    use rand::SeedableRng;

    fn namespace(world: &World, owner: Uid, var: &str, field: &str, arg: &str) -> (String, ScriptLog) {
        let locals = VarList::new();
        let mut rng = StdRng::seed_from_u64(11);
        let mut log = ScriptLog::new(16);
        let out = {
            let mut scope = Scope {
                world,
                owner,
                locals: &locals,
                globals: None,
                rng: &mut rng,
                log: &mut log,
                tag: TriggerTag::NONE,
                legacy_string_ge: true,
            };
            find_replacement(&mut scope, var, field, arg)
        };
        (out, log)
    }

    fn temple() -> (World, Uid, Uid) {
        let mut world = World::new();
        let room = world.create_room(Room::new(3001, "The Temple", 30));
        world.add_mob_proto(Character::mobile(3060, "guard cityguard", "the cityguard"));
        world.add_obj_proto(Object::new(3022, "sword long", "a long sword"));
        let guard = world.spawn_mob(3060, room).unwrap();
        (world, room, guard)
    }

    #[test]
    fn test_time_namespace() {
        let (mut world, _, guard) = temple();
        world.time = GameTime::new(14, 3, 2, 650);
        let get = |field: &str| namespace(&world, guard, "time", field, "").0;
        assert_eq!(get("hour"), "14");
        assert_eq!(get("day"), "3");
        assert_eq!(get("month"), "2");
        assert_eq!(get("year"), "650");
        assert_eq!(get("stamp"), world.time.stamp().to_string());

        let (out, log) = namespace(&world, guard, "time", "season", "");
        assert_eq!(out, "");
        assert!(log.contains("Unknown time field 'season'"));
    }

    #[test]
    fn test_random_namespace() {
        let (mut world, room, guard) = temple();
        for _ in 0..20 {
            let roll = atoi(&namespace(&world, guard, "random", "6", "").0);
            assert!((1..=6).contains(&roll));
        }
        assert_eq!(namespace(&world, guard, "random", "0", "").0, "0");
        assert_eq!(namespace(&world, guard, "random", "room", "").0, "3001");
        assert_eq!(namespace(&world, guard, "random", "room_in_zone", "").0, "3001");

        // only the owner is present
        assert_eq!(namespace(&world, guard, "random", "char", "").0, "0");
        let hero = world.create_character(Character::player("Aldric"));
        world.char_to_room(hero, room).unwrap();
        assert_eq!(namespace(&world, guard, "random", "char", "").0, hero.to_var());
    }

    #[test]
    fn test_get_namespace() {
        let (mut world, room, guard) = temple();
        let sword = world.spawn_obj(3022).unwrap();
        world.obj_to_room(sword, room).unwrap();

        let get = |world: &World, field: &str, arg: &str| namespace(world, guard, "get", field, arg).0;
        assert_eq!(get(&world, "obj_shortdesc", "3022"), "a long sword");
        assert_eq!(get(&world, "obj_noadesc", "3022"), "long sword");
        assert_eq!(get(&world, "obj_shortdesc", "9"), "[no description for object 9]");
        assert_eq!(get(&world, "mob_shortdesc", "3060"), "the cityguard");
        assert_eq!(get(&world, "obj_count", "3022"), "1");
        assert_eq!(get(&world, "mob_count", "3060"), "1");
        assert_eq!(get(&world, "mob_count", "9"), "0");
        assert_eq!(get(&world, "room", "3001"), room.to_var());
        assert_eq!(get(&world, "room", "9"), "0");
        assert_eq!(get(&world, "people", "3001"), "1");
        assert_eq!(get(&world, "opposite_dir", "north"), "south");
        assert_eq!(get(&world, "opposite_dir", "up"), "down");
        assert_eq!(get(&world, "uidchar", ""), UID_CHAR.to_string());

        let (out, log) = namespace(&world, guard, "get", "people", "9");
        assert_eq!(out, "");
        assert!(log.contains("room '9' does not exist"));
    }

    #[test]
    fn test_string_length_counts_characters() {
        let (world, _, guard) = temple();
        assert_eq!(namespace(&world, guard, "string", "length", "naïve café").0, "10");
        assert_eq!(namespace(&world, guard, "string", "reverse", "añb").0, "bña");
        assert_eq!(namespace(&world, guard, "string", "firstword", "hello there").0, "hello");
    }

    #[test]
    fn test_atoi() {
        assert_eq!(atoi("42"), 42);
        assert_eq!(atoi("  -7abc"), -7);
        assert_eq!(atoi("+3"), 3);
        assert_eq!(atoi("abc"), 0);
        assert_eq!(atoi(""), 0);
        assert_eq!(atoi("99999999999"), i32::MAX);
        assert_eq!(atoi("-99999999999"), i32::MIN);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("hello world"), "Hello world");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_without_article() {
        assert_eq!(without_article("a long sword"), "long sword");
        assert_eq!(without_article("The Crown"), "Crown");
        assert_eq!(without_article("bread"), "bread");
    }
}
