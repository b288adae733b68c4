//! Room fields

use super::{flag, list_query};
use crate::resolve::{atoi, Scope};
use fiery_core::{uid_var, Uid};
use fiery_world::constants::{
    is_set, search_block, sprintbit, sprintflag, DIRS, EXIT_BITS, ROOM_BITS, ROOM_DARK,
    ROOM_EFFECTS,
};
use fiery_world::Room;

pub(crate) fn field(scope: &mut Scope<'_>, uid: Uid, var: &str, field: &str, arg: &str) -> String {
    let world = scope.world;
    let Some(r) = world.room(uid) else {
        return String::new();
    };

    if let Some(dir) = search_block(field, &DIRS, true) {
        return exit_field(scope, r, dir, arg);
    }

    match field.to_ascii_lowercase().as_str() {
        "name" => r.name.clone(),
        "vnum" => r.vnum.to_string(),
        "id" => uid.raw().to_string(),
        "sector" => r.sector_name().to_string(),
        "is_dark" => flag(r.flagged(ROOM_DARK) && r.light <= 0),
        "flags" => sprintflag(r.flags, ROOM_BITS),
        "flagged" => match search_block(arg, ROOM_BITS, false) {
            Some(bit) => flag(r.flagged(bit)),
            None => {
                scope.structural(format!("unrecognized room flag '{}' to %{}.flagged[]%", arg, var));
                "0".to_string()
            }
        },
        "effects" | "affects" => sprintflag(r.effects, ROOM_EFFECTS),
        "has_effect" | "has_affect" => match search_block(arg, ROOM_EFFECTS, false) {
            Some(bit) => flag(is_set(r.effects, bit)),
            None => {
                scope.structural(format!(
                    "unrecognized room effect '{}' to %{}.has_effect[]%",
                    arg, var
                ));
                "0".to_string()
            }
        },
        "objects" => list_query(&r.contents, arg, |obj| world.object(obj).map(|o| o.vnum)),
        "people" => people(scope, r, arg),
        _ => {
            scope.structural(format!("unknown room field: '{}'", field));
            String::new()
        }
    }
}

/// `count` of visible occupants, the first with a vnum, or the first visible one
fn people(scope: &Scope<'_>, r: &Room, arg: &str) -> String {
    let world = scope.world;
    let visible = || {
        r.people
            .iter()
            .copied()
            .filter(|uid| world.character(*uid).map(|ch| ch.invis_level == 0).unwrap_or(false))
    };
    if arg.eq_ignore_ascii_case("count") {
        visible().count().to_string()
    } else if !arg.is_empty() {
        let vnum = atoi(arg);
        let found = r
            .people
            .iter()
            .copied()
            .find(|uid| world.character(*uid).map(|ch| ch.npc && ch.vnum == vnum).unwrap_or(false));
        uid_var(found)
    } else {
        uid_var(visible().next())
    }
}

/// `%room.north%` and friends
fn exit_field(scope: &Scope<'_>, r: &Room, dir: usize, arg: &str) -> String {
    let world = scope.world;
    let Some(exit) = r.exits[dir] else {
        return "-1".to_string();
    };
    match arg.to_ascii_lowercase().as_str() {
        "" => exit
            .to_room
            .and_then(|to| world.room(to))
            .map(|to| to.vnum.to_string())
            .unwrap_or_else(|| "-1".to_string()),
        "room" => uid_var(exit.to_room.filter(|to| world.exists(*to))),
        "key" => exit.key.to_string(),
        "bits" => sprintbit(exit.flags, EXIT_BITS),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use crate::fields::read;
    use fiery_core::Uid;
    use fiery_world::constants::{set_flag, ROOM_DARK};
    use fiery_world::{Character, Object, Room, World};

    fn temple() -> (World, Uid, Uid, Uid) {
        let mut world = World::new();
        let mut temple = Room::new(3001, "The Temple", 30);
        set_flag(&mut temple.flags, ROOM_DARK);
        let temple = world.create_room(temple);
        let square = world.create_room(Room::new(3002, "Market Square", 30));
        world.link_exit(temple, 0, Some(square)).unwrap();
        let guard = world.create_character(Character::mobile(3060, "guard cityguard", "the cityguard"));
        world.char_to_room(guard, temple).unwrap();
        (world, temple, square, guard)
    }

    #[test]
    fn test_is_dark_needs_flag_and_no_light() {
        let (mut world, temple, square, guard) = temple();
        assert_eq!(read(&world, guard, temple, "is_dark", "").0, "1");
        assert_eq!(read(&world, guard, square, "is_dark", "").0, "0");
        world.room_mut(temple).unwrap().light = 1;
        assert_eq!(read(&world, guard, temple, "is_dark", "").0, "0");
        assert_eq!(read(&world, guard, temple, "flags", "").0, "DARK");
        assert_eq!(read(&world, guard, temple, "flagged", "dark").0, "1");
    }

    #[test]
    fn test_exit_fields() {
        let (mut world, temple, square, guard) = temple();
        let get = |world: &World, field: &str, arg: &str| read(world, guard, temple, field, arg).0;
        assert_eq!(get(&world, "north", ""), "3002");
        assert_eq!(get(&world, "north", "room"), square.to_var());
        assert_eq!(get(&world, "north", "key"), "-1");
        assert_eq!(get(&world, "north", "bits"), "NO BITS");
        assert_eq!(get(&world, "south", ""), "-1");

        world.room_mut(temple).unwrap().exits[0].as_mut().unwrap().flags = 0b11;
        assert_eq!(get(&world, "north", "bits"), "DOOR CLOSED ");

        world.link_exit(temple, 4, None).unwrap();
        assert_eq!(get(&world, "up", ""), "-1");
        assert_eq!(get(&world, "up", "room"), "0");
    }

    #[test]
    fn test_people_skips_wizard_invisible() {
        let (mut world, temple, _, guard) = temple();
        let mut wizard = Character::player("Wizard");
        wizard.invis_level = 51;
        let wizard = world.create_character(wizard);
        world.char_to_room(wizard, temple).unwrap();

        assert_eq!(read(&world, guard, temple, "people", "count").0, "1");
        assert_eq!(read(&world, guard, temple, "people", "").0, guard.to_var());
        assert_eq!(read(&world, guard, temple, "people", "3060").0, guard.to_var());
        assert_eq!(read(&world, guard, temple, "people", "9999").0, "0");
    }

    #[test]
    fn test_objects_on_the_floor() {
        let (mut world, temple, _, guard) = temple();
        assert_eq!(read(&world, guard, temple, "objects", "").0, "0");
        let fountain = world.create_object(Object::new(3135, "fountain", "a fountain"));
        world.obj_to_room(fountain, temple).unwrap();
        let bread = world.create_object(Object::new(3010, "bread", "some bread"));
        world.obj_to_room(bread, temple).unwrap();

        assert_eq!(read(&world, guard, temple, "objects", "count").0, "2");
        assert_eq!(read(&world, guard, temple, "objects", "3135").0, fountain.to_var());
        assert_eq!(read(&world, guard, temple, "objects", "").0, bread.to_var());
    }

    #[test]
    fn test_unknown_room_effect_logs() {
        let (world, temple, _, guard) = temple();
        assert_eq!(read(&world, guard, temple, "has_effect", "fog").0, "0");
        let (out, log) = read(&world, guard, temple, "has_effect", "glitter");
        assert_eq!(out, "0");
        assert!(log.contains("unrecognized room effect 'glitter'"));
        assert_eq!(read(&world, guard, temple, "sector", "").0, "Structure");
    }
}
