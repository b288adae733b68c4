//! Object fields

use super::{flag, list_query};
use crate::resolve::Scope;
use fiery_core::{uid_var, Uid};
use fiery_world::constants::{search_block, sprintflag, EFFECT_FLAGS, EXTRA_BITS, WEAR_POSITIONS};
use fiery_world::ObjLocation;

pub(crate) fn field(scope: &mut Scope<'_>, uid: Uid, var: &str, field: &str, arg: &str) -> String {
    let world = scope.world;
    let Some(o) = world.object(uid) else {
        return String::new();
    };

    match field.to_ascii_lowercase().as_str() {
        "name" => o.name.clone(),
        "shortdesc" => o.short_description.clone(),
        "description" => o.description.clone(),
        "vnum" => o.vnum.to_string(),
        "type" => o.type_name().to_string(),
        "id" => uid.raw().to_string(),
        "weight" => format!("{:.2}", o.weight),
        "cost" => o.cost.to_string(),
        "cost_per_day" | "rent" => "0".to_string(),
        "level" => o.level.to_string(),
        "val0" => o.values[0].to_string(),
        "val1" => o.values[1].to_string(),
        "val2" => o.values[2].to_string(),
        "val3" => o.values[3].to_string(),
        "timer" => o.timer.to_string(),
        "decomp" => o.decomp.to_string(),

        "flags" => sprintflag(o.extra_flags, EXTRA_BITS),
        "flagged" => match search_block(arg, EXTRA_BITS, false) {
            Some(bit) => flag(o.flagged(bit)),
            None => {
                scope.structural(format!(
                    "unrecognized object extra bit '{}' to %{}.flagged[]%",
                    arg, var
                ));
                "0".to_string()
            }
        },
        "spells" => sprintflag(o.effect_flags, EFFECT_FLAGS),
        "has_spell" => match search_block(arg, EFFECT_FLAGS, false) {
            Some(bit) => flag(fiery_world::constants::is_set(o.effect_flags, bit)),
            None => {
                scope.structural(format!(
                    "unrecognized effect flag '{}' to %{}.has_spell[]%",
                    arg, var
                ));
                "0".to_string()
            }
        },

        "room" => world
            .obj_room(uid)
            .and_then(|room| world.room(room))
            .map(|room| room.vnum.to_string())
            .unwrap_or_else(|| "-1".to_string()),
        "carried_by" => uid_var(o.carried_by().filter(|ch| world.exists(*ch))),
        "worn_by" => uid_var(o.worn_by().filter(|ch| world.exists(*ch))),
        "worn_on" => match o.location {
            ObjLocation::Worn { position, .. } => WEAR_POSITIONS
                .get(position)
                .map(|name| name.to_string())
                .unwrap_or_default(),
            _ => String::new(),
        },
        "contents" => list_query(&o.contents, arg, |inner| world.object(inner).map(|i| i.vnum)),
        "next_in_list" => uid_var(next_in_list(scope, uid, o.location)),

        _ => {
            scope.structural(format!("unknown object field: '{}'", field));
            String::new()
        }
    }
}

/// Next object in whatever list holds this one. Worn objects are not in a list.
fn next_in_list(scope: &Scope<'_>, uid: Uid, location: ObjLocation) -> Option<Uid> {
    let world = scope.world;
    let list: &[Uid] = match location {
        ObjLocation::Room(room) => &world.room(room)?.contents,
        ObjLocation::Carried(ch) => &world.character(ch)?.inventory,
        ObjLocation::Inside(container) => &world.object(container)?.contents,
        ObjLocation::Worn { .. } | ObjLocation::Nowhere => return None,
    };
    let pos = list.iter().position(|other| *other == uid)?;
    list.get(pos + 1).copied()
}

#[cfg(test)]
mod tests {
    use crate::fields::read;
    use crate::log::DiagnosticKind;
    use fiery_core::Uid;
    use fiery_world::{Character, ObjLocation, Object, Room, World};

    struct Fixture {
        world: World,
        guard: Uid,
        sword: Uid,
        helm: Uid,
        bag: Uid,
        coin: Uid,
    }

    fn fixture() -> Fixture {
        let mut world = World::new();
        let room = world.create_room(Room::new(3001, "The Temple", 30));
        let guard = world.create_character(Character::mobile(3060, "guard cityguard", "the cityguard"));
        world.char_to_room(guard, room).unwrap();

        let mut sword = Object::new(3022, "sword long", "a long sword");
        sword.item_type = 5;
        sword.weight = 12.5;
        sword.values = [0, 3, 8, 3];
        let sword = world.create_object(sword);
        world.obj_to_char(sword, guard).unwrap();

        let helm = world.create_object(Object::new(3040, "helm iron", "an iron helm"));
        world.equip(guard, helm, 6).unwrap();

        let bag = world.create_object(Object::new(3032, "bag", "a small bag"));
        world.obj_to_room(bag, room).unwrap();
        let coin = world.create_object(Object::new(3033, "coin", "a copper coin"));
        world.obj_to_obj(coin, bag).unwrap();

        Fixture { world, guard, sword, helm, bag, coin }
    }

    #[test]
    fn test_object_identity_fields() {
        let f = fixture();
        let get = |field: &str, arg: &str| read(&f.world, f.guard, f.sword, field, arg).0;
        assert_eq!(get("name", ""), "sword long");
        assert_eq!(get("shortdesc", ""), "a long sword");
        assert_eq!(get("vnum", ""), "3022");
        assert_eq!(get("type", ""), "WEAPON");
        assert_eq!(get("weight", ""), "12.50");
        assert_eq!(get("val2", ""), "8");
        assert_eq!(get("id", ""), f.sword.raw().to_string());
        assert_eq!(get("flags", ""), "NO FLAGS");
    }

    #[test]
    fn test_object_location_fields() {
        let f = fixture();
        let sword = |field: &str| read(&f.world, f.guard, f.sword, field, "").0;
        assert_eq!(sword("room"), "3001");
        assert_eq!(sword("carried_by"), f.guard.to_var());
        assert_eq!(sword("worn_by"), "0");

        let helm = |field: &str| read(&f.world, f.guard, f.helm, field, "").0;
        assert_eq!(helm("worn_by"), f.guard.to_var());
        assert_eq!(helm("worn_on"), "head");
        assert_eq!(helm("carried_by"), "0");
        assert_eq!(helm("next_in_list"), "0");

        assert_eq!(read(&f.world, f.guard, f.bag, "contents", "count").0, "1");
        assert_eq!(read(&f.world, f.guard, f.bag, "contents", "3033").0, f.coin.to_var());
        assert_eq!(read(&f.world, f.guard, f.coin, "room", "").0, "3001");
    }

    #[test]
    fn test_holder_gone_reads_as_none() {
        let mut f = fixture();
        let ghost = f.world.create_character(Character::player("Ghost"));
        f.world.extract(ghost);
        f.world.object_mut(f.sword).unwrap().location = ObjLocation::Carried(ghost);
        f.world.object_mut(f.helm).unwrap().location = ObjLocation::Worn { by: ghost, position: 6 };

        assert_eq!(read(&f.world, f.guard, f.sword, "carried_by", "").0, "0");
        assert_eq!(read(&f.world, f.guard, f.helm, "worn_by", "").0, "0");
        assert_eq!(read(&f.world, f.guard, f.sword, "room", "").0, "-1");
    }

    #[test]
    fn test_extracted_object_is_a_reference_error() {
        let mut f = fixture();
        f.world.extract(f.sword);
        let (out, log) = read(&f.world, f.guard, f.sword, "name", "");
        assert_eq!(out, "");
        let entry = log.entries().next().unwrap();
        assert_eq!(entry.kind, DiagnosticKind::Reference);
        assert!(entry.message.contains("previously extracted UID"));
    }

    #[test]
    fn test_unknown_object_bits_log() {
        let f = fixture();
        let (out, log) = read(&f.world, f.guard, f.sword, "flagged", "sparkly");
        assert_eq!(out, "0");
        assert!(log.contains("unrecognized object extra bit 'sparkly'"));

        let (out, log) = read(&f.world, f.guard, f.sword, "sharpness", "");
        assert_eq!(out, "");
        assert_eq!(log.entries().next().unwrap().kind, DiagnosticKind::Structural);
    }
}
