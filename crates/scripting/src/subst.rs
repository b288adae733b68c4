//! `%...%` substitution
//!
//! A reference is `%name%`, `%name.field%` or `%name.field[arg]%`. The
//! argument is itself substituted first, so references nest inside `[...]`.
//! `%%` is a literal percent sign.

use crate::resolve::{find_replacement, Scope};

/// Replace every variable reference in `line`
pub(crate) fn substitute(scope: &mut Scope<'_>, line: &str) -> String {
    if !line.contains('%') {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 1..];

        if let Some(after) = rest.strip_prefix('%') {
            out.push('%');
            rest = after;
            continue;
        }

        let end = rest.find(|c: char| c == '%' || c == '.').unwrap_or(rest.len());
        let var = &rest[..end];
        rest = &rest[end..];

        let mut field = "";
        let mut arg = String::new();
        if let Some(after) = rest.strip_prefix('.') {
            let end = after.find(|c: char| c == '%' || c == '[').unwrap_or(after.len());
            field = &after[..end];
            rest = &after[end..];

            if let Some(after) = rest.strip_prefix('[') {
                let end = after.find(']').unwrap_or(after.len());
                arg = substitute(scope, &after[..end]);
                rest = after.get(end + 1..).unwrap_or("");
            }
        }
        rest = rest.strip_prefix('%').unwrap_or(rest);

        if var.is_empty() && field.is_empty() {
            continue;
        }
        out.push_str(&find_replacement(scope, var, field, &arg));
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::{ScriptLog, TriggerTag};
    use crate::vars::VarList;
    use fiery_world::{Character, Room, World};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run(world: &World, owner: fiery_core::Uid, locals: &VarList, line: &str) -> (String, ScriptLog) {
        let mut rng = StdRng::seed_from_u64(7);
        let mut log = ScriptLog::new(16);
        let out = {
            let mut scope = Scope {
                world,
                owner,
                locals,
                globals: None,
                rng: &mut rng,
                log: &mut log,
                tag: TriggerTag::NONE,
                legacy_string_ge: true,
            };
            substitute(&mut scope, line)
        };
        (out, log)
    }

    fn world_with_guard() -> (World, fiery_core::Uid) {
        let mut world = World::new();
        let room = world.create_room(Room::new(3001, "The Temple", 30));
        let guard = world.create_character(Character::mobile(3060, "guard cityguard", "the cityguard"));
        world.char_to_room(guard, room).unwrap();
        (world, guard)
    }

    #[test]
    fn test_plain_text_untouched() {
        let (world, guard) = world_with_guard();
        let (out, log) = run(&world, guard, &VarList::new(), "say hello there");
        assert_eq!(out, "say hello there");
        assert!(log.is_empty());
    }

    #[test]
    fn test_escape_and_locals() {
        let (world, guard) = world_with_guard();
        let mut locals = VarList::new();
        locals.set("x", "5");
        let (out, _) = run(&world, guard, &locals, "say %x%%% done");
        assert_eq!(out, "say 5% done");
    }

    #[test]
    fn test_self_fields_and_nested_arg() {
        let (world, guard) = world_with_guard();
        let locals = VarList::new();
        let (out, _) = run(&world, guard, &locals, "say I am %self.name% in %self.room%");
        assert_eq!(out, "say I am the cityguard in 3001");

        let (out, _) = run(&world, guard, &locals, "%string.toupper[%self.alias%]%");
        assert_eq!(out, "GUARD CITYGUARD");
    }

    #[test]
    fn test_unknown_variable_is_empty() {
        let (world, guard) = world_with_guard();
        let (out, log) = run(&world, guard, &VarList::new(), "say [%nobody%] [%nobody.name%]");
        assert_eq!(out, "say [] []");
        assert!(log.contains("unknown variable 'nobody'"));
    }

    #[test]
    fn test_trailing_percent_dropped() {
        let (world, guard) = world_with_guard();
        let (out, _) = run(&world, guard, &VarList::new(), "say 100%");
        assert_eq!(out, "say 100");
    }
}
