//! Character fields

use super::{flag, list_query};
use crate::resolve::{atoi, capitalize, is_positive_integer, Scope};
use fiery_core::{uid_var, EntityKind, Uid};
use fiery_world::constants::{
    search_block, sprintflag, ACTION_BITS, COIN_NAMES, EFFECT_FLAGS, NUM_WEARS, PLAYER_BITS,
    PREFERENCE_BITS, WEAR_POSITIONS,
};
use fiery_world::{Character, QuestStatus};

/// Quest stage reported for a completed quest
const QUEST_COMPLETED_STAGE: i32 = 255;

pub(crate) fn field(scope: &mut Scope<'_>, uid: Uid, var: &str, field: &str, arg: &str) -> String {
    let world = scope.world;
    let Some(c) = world.character(uid) else {
        return String::new();
    };
    let key = field.to_ascii_lowercase();

    match key.as_str() {
        // identity
        "name" => c.name().to_string(),
        "alias" => c.alias.clone(),
        "title" => c.title.clone().unwrap_or_default(),
        "p" | "hisher" => c.sex.his_her().to_string(),
        "o" | "himher" => c.sex.him_her().to_string(),
        "n" | "heshe" => c.sex.he_she().to_string(),
        "vnum" => c.vnum.to_string(),
        "id" => uid.raw().to_string(),

        // attributes
        "sex" | "gender" => c.sex.name().to_string(),
        "class" => capitalize(&c.class),
        "race" => c.race.clone(),
        "level" => c.level.to_string(),
        "weight" => c.weight.to_string(),
        "height" => c.height.to_string(),
        "str" => c.abilities.str.to_string(),
        "int" => c.abilities.int.to_string(),
        "wis" => c.abilities.wis.to_string(),
        "dex" => c.abilities.dex.to_string(),
        "con" => c.abilities.con.to_string(),
        "cha" => c.abilities.cha.to_string(),
        "real_str" => c.real_abilities.str.to_string(),
        "real_int" => c.real_abilities.int.to_string(),
        "real_wis" => c.real_abilities.wis.to_string(),
        "real_dex" => c.real_abilities.dex.to_string(),
        "real_con" => c.real_abilities.con.to_string(),
        "real_cha" => c.real_abilities.cha.to_string(),
        "hit" => c.hit.to_string(),
        "maxhit" => c.max_hit.to_string(),
        "move" => c.moves.to_string(),
        "maxmove" => c.max_moves.to_string(),
        "armor" => c.armor.to_string(),
        "hitroll" => c.hitroll.to_string(),
        "damroll" => c.damroll.to_string(),
        "exp" => c.exp.to_string(),
        "align" | "alignment" => c.alignment.to_string(),

        // flags
        "flags" => flags(c),
        "flagged" => flagged(scope, c, var, arg),
        "eff_flags" | "aff_flags" => sprintflag(c.effect_flags, EFFECT_FLAGS),
        "eff_flagged" | "aff_flagged" => match search_block(arg, EFFECT_FLAGS, false) {
            Some(bit) => flag(c.eff_flagged(bit)),
            None => {
                scope.structural(format!(
                    "unrecognized effect flag '{}' to %{}.eff_flagged[]%",
                    arg, var
                ));
                "0".to_string()
            }
        },
        "spells" => c.spells.iter().map(|spell| format!("{} ", spell)).collect(),
        "has_spell" => {
            if arg.is_empty() {
                scope.structural(format!("unrecognized spell '' to %{}.has_spell[]%", var));
                return "0".to_string();
            }
            flag(c.spells.iter().any(|spell| spell.eq_ignore_ascii_case(arg)))
        }

        // relations
        "fighting" => uid_var(live(scope, c.fighting)),
        "hunting" => uid_var(live(scope, c.hunting)),
        "riding" => uid_var(live(scope, c.riding)),
        "ridden_by" => uid_var(live(scope, c.ridden_by)),
        "consented" => uid_var(live(scope, c.consented)),
        "master" => uid_var(live(scope, c.master)),
        "next_in_room" => uid_var(next_in_room(scope, uid, c)),
        "group_size" => world.group_size(uid).to_string(),
        "group_member" => uid_var(group_member(scope, uid, c, atoi(arg))),

        // objects
        "inventory" => list_query(&c.inventory, arg, |obj| world.object(obj).map(|o| o.vnum)),
        "worn" => {
            if arg.eq_ignore_ascii_case("count") {
                c.equipment.iter().flatten().count().to_string()
            } else {
                match search_block(arg, &WEAR_POSITIONS, true) {
                    Some(pos) => uid_var(c.equipment[pos]),
                    None => "0".to_string(),
                }
            }
        }
        "wearing" => {
            if !is_positive_integer(arg) {
                return "0".to_string();
            }
            let vnum = atoi(arg);
            let found = (0..NUM_WEARS)
                .filter_map(|pos| c.equipment[pos])
                .find(|obj| world.object(*obj).map(|o| o.vnum) == Some(vnum));
            uid_var(found)
        }

        // state
        "position" => c.position.name().to_string(),
        "stance" => c.stance.name().to_string(),
        "room" => c
            .room
            .and_then(|room| world.room(room))
            .map(|room| room.vnum.to_string())
            .unwrap_or_else(|| "-1".to_string()),
        "skill" | "talent" => c
            .skills
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(arg))
            .map(|(_, value)| value.to_string())
            .unwrap_or_else(|| "0".to_string()),
        "clan" => match (&c.clan, c.npc) {
            (Some(clan), false) => clan.clone(),
            _ => String::new(),
        },
        "clan_rank" => (if c.npc { 0 } else { c.clan_rank }).to_string(),
        "can_be_seen" => {
            let owner = scope.owner;
            flag(owner.kind() != EntityKind::Character || world.can_see(owner, uid))
        }

        // quests
        "quest_stage" => match quest(scope, c, field, arg) {
            Some(Some(QuestStatus::InProgress(stage))) => stage.to_string(),
            Some(Some(QuestStatus::Completed)) => QUEST_COMPLETED_STAGE.to_string(),
            _ => "0".to_string(),
        },
        "has_completed" => flag(matches!(quest(scope, c, field, arg), Some(Some(QuestStatus::Completed)))),
        "has_failed" => flag(matches!(quest(scope, c, field, arg), Some(Some(QuestStatus::Failed)))),

        _ => match COIN_NAMES.iter().position(|coin| coin.eq_ignore_ascii_case(field)) {
            Some(coin) => c.coins[coin].to_string(),
            None => {
                scope.structural(format!("Unknown char field: '{}'", field));
                String::new()
            }
        },
    }
}

/// Action bits for mobiles; player bits then preference bits for players
fn flags(c: &Character) -> String {
    if c.npc {
        return sprintflag(c.mob_flags, ACTION_BITS);
    }
    let mut out = String::new();
    if c.player_flags != 0 || c.pref_flags == 0 {
        out.push_str(&sprintflag(c.player_flags, PLAYER_BITS));
    }
    if c.pref_flags != 0 {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&sprintflag(c.pref_flags, PREFERENCE_BITS));
    }
    out
}

fn flagged(scope: &mut Scope<'_>, c: &Character, var: &str, arg: &str) -> String {
    if c.npc {
        return match search_block(arg, ACTION_BITS, false) {
            Some(bit) => flag(c.mob_flagged(bit)),
            None => {
                scope.structural(format!("unrecognized NPC flag '{}' to %{}.flagged[]%", arg, var));
                "0".to_string()
            }
        };
    }
    if let Some(bit) = search_block(arg, PLAYER_BITS, false) {
        return flag(fiery_world::constants::is_set(c.player_flags, bit));
    }
    if let Some(bit) = search_block(arg, PREFERENCE_BITS, false) {
        return flag(fiery_world::constants::is_set(c.pref_flags, bit));
    }
    scope.structural(format!(
        "unrecognized player or preference flag '{}' to %{}.flagged[]%",
        arg, var
    ));
    "0".to_string()
}

/// A relation target, if it still exists
fn live(scope: &Scope<'_>, uid: Option<Uid>) -> Option<Uid> {
    uid.filter(|uid| scope.world.exists(*uid))
}

/// Next occupant after `c` in its room, skipping wizard-invisible ones
fn next_in_room(scope: &Scope<'_>, uid: Uid, c: &Character) -> Option<Uid> {
    let world = scope.world;
    let room = c.room.and_then(|room| world.room(room))?;
    let pos = room.people.iter().position(|other| *other == uid)?;
    room.people[pos + 1..]
        .iter()
        .copied()
        .find(|other| world.character(*other).map(|o| o.invis_level == 0).unwrap_or(false))
}

/// `1` is the leader, `2..` the followers in order. Anything else (or an
/// ungrouped character) gives the character itself; past the end gives none.
fn group_member(scope: &Scope<'_>, uid: Uid, c: &Character, n: i32) -> Option<Uid> {
    let world = scope.world;
    let leader_uid = c.group_leader.unwrap_or(uid);
    let leader = world.character(leader_uid)?;
    if !leader.is_grouped() || n <= 0 {
        return Some(uid);
    }
    if n == 1 {
        return Some(leader_uid);
    }
    leader.group_members.get(n as usize - 2).copied()
}

/// Quest record for a player. `None` if the call is malformed (logged),
/// `Some(None)` if the character has no such quest or is a mobile.
fn quest<'c>(scope: &mut Scope<'_>, c: &'c Character, field: &str, arg: &str) -> Option<Option<&'c QuestStatus>> {
    if arg.is_empty() {
        scope.structural(format!("{} called without specifying a quest", field));
        return None;
    }
    if c.npc {
        return Some(None);
    }
    Some(
        c.quests
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(arg))
            .map(|(_, status)| status),
    )
}
