//! Event dispatch
//!
//! Hooks the game calls when something happens in the world. Each one finds
//! the idle instances listening for that event, seeds their locals (`actor`,
//! `cmd`, `speech` ...) and runs them. Hooks that gate an action return the
//! script's result: 0 means "stop".

use crate::context::InstanceId;
use crate::engine::{RunMode, ScriptEngine};
use crate::host::ScriptHost;
use crate::trigger::*;
use crate::vars::VarValue;
use fiery_core::{EntityKind, Uid, Vnum};
use fiery_world::character::isname;
use fiery_world::constants::{COIN_NAMES, DIRS, MOB_NOSCRIPT, NUM_WEARS, REV_DIR};
use fiery_world::{ObjLocation, World};
use rand::Rng;

/// Characters hidden from the game's own scripts
fn susceptible(world: &World, ch: Uid) -> bool {
    world.character(ch).map_or(false, |c| c.invis_level == 0)
}

/// Mobs flagged NOSCRIPT keep their triggers but never fire them
fn performs_scripts(world: &World, mob: Uid) -> bool {
    world.character(mob).map_or(false, |c| !c.mob_flagged(MOB_NOSCRIPT))
}

fn room_people(world: &World, room: Option<Uid>) -> Vec<Uid> {
    room.and_then(|room| world.room(room))
        .map(|r| r.people.clone())
        .unwrap_or_default()
}

/// Direction an arrival came from, `none` if unknown
fn arrival_direction(dir: Option<usize>) -> &'static str {
    dir.and_then(|d| REV_DIR.get(d))
        .and_then(|&d| DIRS.get(d))
        .copied()
        .unwrap_or("none")
}

/// Mob that notices what `actor` does in its room
fn watching(world: &World, mob: Uid, actor: Uid) -> bool {
    mob != actor
        && performs_scripts(world, mob)
        && world.character(mob).map_or(false, |c| c.awake() && c.fighting.is_none())
        && world.can_see(mob, actor)
}

/// Direction of travel, `none` if unknown
fn direction_name(dir: Option<usize>) -> &'static str {
    dir.and_then(|d| DIRS.get(d)).copied().unwrap_or("none")
}

/// Pick the mobile, object or room flavour of a category
fn per_kind(owner: Uid, mobile: u64, object: u64, room: u64) -> u64 {
    match owner.kind() {
        EntityKind::Character => mobile,
        EntityKind::Object => object,
        EntityKind::Room => room,
    }
}

/// Object `ch` wears at `position`
fn worn_at(world: &World, ch: Uid, position: usize) -> Option<Uid> {
    world.character(ch).and_then(|c| c.equipment.get(position).copied().flatten())
}

/// Opponent of a fighting mob as `actor`, `nobody` once it is gone
fn opponent(world: &World, fighting: Option<Uid>) -> VarValue {
    match fighting.filter(|uid| world.exists(*uid)) {
        Some(uid) => VarValue::Entity(uid),
        None => VarValue::Text("nobody".to_string()),
    }
}

/// Door command seen by door triggers as `cmd`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorAction {
    Open,
    Close,
    Unlock,
    Lock,
    Pick,
}

impl DoorAction {
    pub fn name(self) -> &'static str {
        match self {
            DoorAction::Open => "open",
            DoorAction::Close => "close",
            DoorAction::Unlock => "unlock",
            DoorAction::Lock => "lock",
            DoorAction::Pick => "pick",
        }
    }
}

/// How an object is consumed, seen by consume triggers as `command`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consumption {
    Eat,
    Drink,
    Quaff,
}

impl Consumption {
    pub fn name(self) -> &'static str {
        match self {
            Consumption::Eat => "eat",
            Consumption::Drink => "drink",
            Consumption::Quaff => "quaff",
        }
    }
}

/// Spell being cast: `spellnum` and `spell` in cast triggers
#[derive(Debug, Clone, Copy)]
pub struct Spell<'a> {
    pub number: i32,
    pub name: &'a str,
}

impl Spell<'_> {
    fn vars(&self) -> [(&'static str, VarValue); 2] {
        [
            ("spellnum", VarValue::Text(self.number.to_string())),
            ("spell", VarValue::Text(self.name.to_string())),
        ]
    }
}

/// Everything named in an act message. Only the parts present become locals.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActParties<'a> {
    pub actor: Option<Uid>,
    pub victim: Option<Uid>,
    pub object: Option<Uid>,
    pub target: Option<Uid>,
    pub arg: Option<&'a str>,
    pub arg2: Option<&'a str>,
}

/// Whole-word, case-insensitive occurrence of `sub` in `text`
pub fn is_substring(sub: &str, text: &str) -> bool {
    if sub.is_empty() {
        return false;
    }
    let haystack = text.to_ascii_lowercase();
    let needle = sub.to_ascii_lowercase();
    let bytes = haystack.as_bytes();
    let boundary = |b: u8| b.is_ascii_whitespace() || b.is_ascii_punctuation();

    haystack.match_indices(&needle).any(|(start, _)| {
        let end = start + needle.len();
        let front = start == 0 || boundary(bytes[start - 1]);
        let back = end == bytes.len() || boundary(bytes[end]);
        front && back
    })
}

/// True if `text` contains one of the words or `"quoted phrases"` of
/// `wordlist`. A list starting with `*` matches everything.
pub fn word_check(text: &str, wordlist: &str) -> bool {
    if wordlist.starts_with('*') {
        return true;
    }
    let mut rest = wordlist.trim_start();
    while !rest.is_empty() {
        let (phrase, tail) = match rest.strip_prefix('"') {
            Some(quoted) => quoted.split_once('"').unwrap_or((quoted, "")),
            None => rest.split_once(char::is_whitespace).unwrap_or((rest, "")),
        };
        if is_substring(phrase, text) {
            return true;
        }
        rest = tail.trim_start();
    }
    false
}

/// `cmd` abbreviates the trigger's command word, or the trigger takes `*`
fn command_matches(arglist: &str, cmd: &str) -> bool {
    if cmd.is_empty() {
        return false;
    }
    arglist.starts_with('*')
        || arglist
            .get(..cmd.len())
            .map_or(false, |prefix| prefix.eq_ignore_ascii_case(cmd))
}

impl ScriptEngine {
    /// Percent roll against a trigger's numeric argument
    fn chance(&mut self, narg: i32) -> bool {
        self.rng.gen_range(1..=100) <= narg
    }

    /// Still attached and idle after earlier triggers ran
    fn still_ready(&self, owner: Uid, id: InstanceId) -> bool {
        self.instance(owner, id).map_or(false, |t| t.is_idle())
    }

    /// Seed locals and start an instance
    fn fire<H: ScriptHost + ?Sized>(
        &mut self,
        host: &mut H,
        owner: Uid,
        id: InstanceId,
        vars: &[(&str, VarValue)],
    ) -> i32 {
        for (name, value) in vars {
            self.set_local(owner, id, name, value.clone());
        }
        self.run(host, owner, id, RunMode::New)
    }

    /// First ready instance of `owner` for `category` that wins its roll
    fn first_by_chance(&mut self, owner: Uid, category: u64) -> Option<InstanceId> {
        let ready = self.ready(owner, category);
        ready
            .into_iter()
            .find(|(_, narg, _)| self.chance(*narg))
            .map(|(id, _, _)| id)
    }

    // ---- sweeps ------------------------------------------------------------

    /// Random sweep over every entity with scripts
    ///
    /// Each instance's numeric argument is its percent chance; at most one
    /// random trigger runs per entity. Mobs and rooms only fire while a player
    /// is in their zone, unless they carry a global trigger.
    pub fn random_triggers<H: ScriptHost + ?Sized>(&mut self, host: &mut H) {
        for owner in self.sweep_order() {
            let category = per_kind(owner, MTRIG_RANDOM, OTRIG_RANDOM, WTRIG_RANDOM);
            if !self.sweep_gate(host.world(), owner, category) {
                continue;
            }
            if let Some(id) = self.first_by_chance(owner, category) {
                self.fire(host, owner, id, &[]);
            }
        }
    }

    /// Time sweep: fire time triggers whose numeric argument is the current
    /// game hour, setting `time`
    pub fn time_triggers<H: ScriptHost + ?Sized>(&mut self, host: &mut H) {
        let hour = host.world().time.hours;
        for owner in self.sweep_order() {
            let category = per_kind(owner, MTRIG_TIME, OTRIG_TIME, WTRIG_TIME);
            if !self.sweep_gate(host.world(), owner, category) {
                continue;
            }
            let found = self
                .ready(owner, category)
                .into_iter()
                .find(|(_, narg, _)| *narg == hour);
            if let Some((id, _, _)) = found {
                self.fire(host, owner, id, &[("time", VarValue::Text(hour.to_string()))]);
            }
        }
    }

    /// Characters, then objects, then rooms
    fn sweep_order(&self) -> Vec<Uid> {
        let mut owners = self.owners();
        owners.sort_by_key(|uid| {
            let rank = match uid.kind() {
                EntityKind::Character => 0,
                EntityKind::Object => 1,
                EntityKind::Room => 2,
            };
            (rank, uid.raw())
        });
        owners
    }

    /// Whether `owner` takes part in a sweep for `category`
    fn sweep_gate(&self, world: &World, owner: Uid, category: u64) -> bool {
        let Some(ctx) = self.context(owner) else {
            return false;
        };
        if !ctx.has_type(category) {
            return false;
        }
        let global = ctx.has_type(per_kind(owner, MTRIG_GLOBAL, OTRIG_GLOBAL, WTRIG_GLOBAL));
        let zone_active = |room: Option<Uid>| {
            global
                || room
                    .and_then(|room| world.room(room))
                    .map_or(false, |r| world.zone_has_players(r.zone))
        };
        match owner.kind() {
            EntityKind::Character => {
                performs_scripts(world, owner)
                    && susceptible(world, owner)
                    && zone_active(world.character(owner).and_then(|c| c.room))
            }
            EntityKind::Object => world.exists(owner),
            EntityKind::Room => zone_active(Some(owner)),
        }
    }

    // ---- mobile hooks ------------------------------------------------------

    /// `actor` typed `cmd arg`
    ///
    /// Checked in order: the room, mobs in the room, then the actor's
    /// equipment, inventory and the objects on the floor. The first matching
    /// trigger runs.
    ///
    /// # Returns
    /// Non-zero if the command was handled and the game should not run it
    pub fn command_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, actor: Uid, cmd: &str, arg: &str) -> i32 {
        if !susceptible(host.world(), actor) {
            return 0;
        }
        let cmd = cmd.trim_start();
        let arg = arg.trim_start();
        let vars = [
            ("actor", VarValue::Entity(actor)),
            ("arg", VarValue::from_text(arg)),
            ("cmd", VarValue::from_text(cmd)),
        ];
        let room = host.world().character(actor).and_then(|c| c.room);

        if let Some(room) = room {
            if let Some(id) = self.command_match(room, WTRIG_COMMAND, cmd, None) {
                let ret = self.fire(host, room, id, &vars);
                if ret != 0 {
                    return ret;
                }
            }
        }

        for mob in room_people(host.world(), room) {
            if !performs_scripts(host.world(), mob) {
                continue;
            }
            if let Some(id) = self.command_match(mob, MTRIG_COMMAND, cmd, None) {
                let ret = self.fire(host, mob, id, &vars);
                if ret != 0 {
                    return ret;
                }
                break;
            }
        }

        let Some(ch) = host.world().character(actor) else {
            return 0;
        };
        let mut objects: Vec<(Uid, i32)> = ch.equipment.iter().flatten().map(|&obj| (obj, OCMD_EQUIP)).collect();
        objects.extend(ch.inventory.iter().map(|&obj| (obj, OCMD_INVEN)));
        if let Some(r) = room.and_then(|room| host.world().room(room)) {
            objects.extend(r.contents.iter().map(|&obj| (obj, OCMD_ROOM)));
        }

        for (obj, place) in objects {
            if let Some(id) = self.command_match(obj, OTRIG_COMMAND, cmd, Some(place)) {
                if self.fire(host, obj, id, &vars) != 0 {
                    return 1;
                }
            }
        }
        0
    }

    fn command_match(&self, owner: Uid, category: u64, cmd: &str, place: Option<i32>) -> Option<InstanceId> {
        for (id, narg, arglist) in self.ready(owner, category) {
            if place.map_or(false, |bit| narg & bit == 0) {
                continue;
            }
            if arglist.is_empty() {
                let vnum = self.instance(owner, id).map_or(-1, |t| t.vnum());
                tracing::warn!("Command Trigger #{} has no text argument!", vnum);
                continue;
            }
            if command_matches(&arglist, cmd) {
                return Some(id);
            }
        }
        None
    }

    /// `actor` said `speech`. Mobs in the room hear it first, then the room.
    ///
    /// A trigger with a non-zero numeric argument matches any word or quoted
    /// phrase of its list; otherwise its whole text must appear as a phrase.
    pub fn speech_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, actor: Uid, speech: &str) {
        if !susceptible(host.world(), actor) {
            return;
        }
        let vars = [
            ("actor", VarValue::Entity(actor)),
            ("speech", VarValue::Text(speech.to_string())),
        ];
        let room = host.world().character(actor).and_then(|c| c.room);

        for mob in room_people(host.world(), room) {
            let listening = mob != actor
                && performs_scripts(host.world(), mob)
                && host.world().character(mob).map_or(false, |c| c.awake());
            if !listening {
                continue;
            }
            if let Some(id) = self.text_match(mob, MTRIG_SPEECH, speech, "Speech") {
                self.fire(host, mob, id, &vars);
            }
        }

        if let Some(room) = room {
            if let Some(id) = self.text_match(room, WTRIG_SPEECH, speech, "Speech") {
                self.fire(host, room, id, &vars);
            }
        }
    }

    /// First instance whose word list (non-zero numeric argument) or phrase
    /// appears in `text`
    fn text_match(&self, owner: Uid, category: u64, text: &str, label: &str) -> Option<InstanceId> {
        for (id, narg, arglist) in self.ready(owner, category) {
            if arglist.is_empty() {
                let vnum = self.instance(owner, id).map_or(-1, |t| t.vnum());
                tracing::warn!("{} Trigger #{} has no text argument!", label, vnum);
                continue;
            }
            let heard = if narg != 0 {
                word_check(text, &arglist)
            } else {
                is_substring(&arglist, text)
            };
            if heard {
                return Some(id);
            }
        }
        None
    }

    /// `actor` arrived in a room, from `dir` if known
    ///
    /// Every awake, idle mob in the room gets a chance; `GREET` needs the mob
    /// to see the actor, `GREET_ALL` does not.
    ///
    /// # Returns
    /// 0 if any greet trigger refused the entry, or the actor died
    pub fn greet_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, actor: Uid, dir: Option<usize>) -> i32 {
        if !susceptible(host.world(), actor) {
            return 1;
        }
        let mut ret = 1;
        let room = host.world().character(actor).and_then(|c| c.room);

        for mob in room_people(host.world(), room) {
            let world = host.world();
            let attentive = mob != actor
                && performs_scripts(world, mob)
                && world.character(mob).map_or(false, |c| c.awake() && c.fighting.is_none());
            if !attentive {
                continue;
            }
            let sees = world.can_see(mob, actor);

            for (id, narg, _) in self.ready(mob, MTRIG_GREET | MTRIG_GREET_ALL) {
                let trigger_type = self.instance(mob, id).map_or(0, |t| t.trigger_type);
                let noticed = (trigger_type & MTRIG_GREET != 0 && sees) || trigger_type & MTRIG_GREET_ALL != 0;
                if !noticed || !self.still_ready(mob, id) || !self.chance(narg) {
                    continue;
                }
                let vars = [
                    ("direction", VarValue::Text(arrival_direction(dir).to_string())),
                    ("actor", VarValue::Entity(actor)),
                ];
                if self.fire(host, mob, id, &vars) == 0 {
                    ret = 0;
                }
                if !host.world().exists(mob) || !host.world().exists(actor) {
                    return 0;
                }
            }
        }
        ret
    }

    /// `mob` is about to enter the room with vnum `destination`
    ///
    /// # Returns
    /// 0 if the move should not happen
    pub fn entry_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, mob: Uid, destination: Vnum) -> i32 {
        if !performs_scripts(host.world(), mob) || !susceptible(host.world(), mob) {
            return 1;
        }
        for (id, narg, _) in self.ready(mob, MTRIG_ENTRY) {
            if !self.still_ready(mob, id) || !self.chance(narg) {
                continue;
            }
            let vars = [("destination", VarValue::Text(destination.to_string()))];
            if self.fire(host, mob, id, &vars) == 0 || !host.world().exists(mob) {
                return 0;
            }
        }
        1
    }

    /// `ch` is dying, killed by `killer` if anyone
    ///
    /// Death triggers run even though their owner can no longer act.
    ///
    /// # Returns
    /// Result of the last death trigger run, 1 if none ran
    pub fn death_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, ch: Uid, killer: Option<Uid>) -> i32 {
        let world = host.world();
        if !performs_scripts(world, ch)
            || !susceptible(world, ch)
            || killer.map_or(false, |k| !susceptible(world, k))
        {
            return 1;
        }
        let mut ret = 1;
        for (id, _, _) in self.ready(ch, MTRIG_DEATH) {
            if !self.still_ready(ch, id) {
                continue;
            }
            let vars: Vec<(&str, VarValue)> = killer.map(|k| ("actor", VarValue::Entity(k))).into_iter().collect();
            ret = self.fire(host, ch, id, &vars);
        }
        ret
    }

    /// `actor` spoke to `mob` directly (ask, whisper, tell). Speech triggers
    /// hear it as well as speech-to triggers.
    pub fn speech_to_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, actor: Uid, mob: Uid, speech: &str) {
        let world = host.world();
        let listening = actor != mob
            && susceptible(world, actor)
            && susceptible(world, mob)
            && performs_scripts(world, mob)
            && world.character(mob).map_or(false, |c| c.awake());
        if !listening {
            return;
        }
        if let Some(id) = self.text_match(mob, MTRIG_SPEECHTO | MTRIG_SPEECH, speech, "Speech-to") {
            let vars = [
                ("actor", VarValue::Entity(actor)),
                ("speech", VarValue::Text(speech.to_string())),
            ];
            self.fire(host, mob, id, &vars);
        }
    }

    /// `mob` saw the act message `text`
    pub fn act_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, mob: Uid, text: &str, parties: &ActParties<'_>) {
        let world = host.world();
        if parties.actor.map_or(false, |actor| !susceptible(world, actor)) || !performs_scripts(world, mob) {
            return;
        }
        let Some(id) = self.text_match(mob, MTRIG_ACT, text, "Act") else {
            return;
        };
        let mut vars = Vec::new();
        let people = [
            ("actor", parties.actor),
            ("victim", parties.victim),
            ("object", parties.object),
            ("target", parties.target),
        ];
        for (name, uid) in people {
            if let Some(uid) = uid {
                vars.push((name, VarValue::Entity(uid)));
            }
        }
        for (name, arg) in [("arg", parties.arg), ("arg2", parties.arg2)] {
            if let Some(arg) = arg {
                vars.push((name, VarValue::from_text(arg.trim_start())));
            }
        }
        vars.push(("act", VarValue::Text(text.to_string())));
        self.fire(host, mob, id, &vars);
    }

    /// `actor` handed coins (platinum, gold, silver, copper) to `mob`
    ///
    /// The first bribe trigger whose numeric argument the total copper value
    /// reaches runs, with `value` and one local per coin type.
    pub fn bribe_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, mob: Uid, actor: Uid, coins: [i32; 4]) {
        let world = host.world();
        if !performs_scripts(world, mob) || !susceptible(world, actor) || !susceptible(world, mob) {
            return;
        }
        let value = 1000 * coins[0] + 100 * coins[1] + 10 * coins[2] + coins[3];
        let found = self
            .ready(mob, MTRIG_BRIBE)
            .into_iter()
            .find(|(_, narg, _)| value >= *narg);
        let Some((id, _, _)) = found else {
            return;
        };
        let mut vars = vec![("value", VarValue::Text(value.to_string()))];
        vars.extend(
            COIN_NAMES
                .iter()
                .zip(coins)
                .map(|(name, count)| (*name, VarValue::Text(count.to_string()))),
        );
        vars.push(("actor", VarValue::Entity(actor)));
        self.fire(host, mob, id, &vars);
    }

    /// One combat round for `mob`
    pub fn fight_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, mob: Uid) {
        let world = host.world();
        let Some(fighting) = world.character(mob).and_then(|c| c.fighting) else {
            return;
        };
        if !performs_scripts(world, mob) {
            return;
        }
        let actor = opponent(world, Some(fighting));
        if let Some(id) = self.first_by_chance(mob, MTRIG_FIGHT) {
            self.fire(host, mob, id, &[("actor", actor)]);
        }
    }

    /// `mob` took damage in combat. Fires the first trigger whose numeric
    /// argument is at least the mob's remaining hit point percentage.
    pub fn hitprcnt_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, mob: Uid) {
        let world = host.world();
        let Some(c) = world.character(mob) else {
            return;
        };
        if c.fighting.is_none() || c.max_hit == 0 || !performs_scripts(world, mob) {
            return;
        }
        let percent = c.hit * 100 / c.max_hit;
        let actor = opponent(world, c.fighting);
        let found = self
            .ready(mob, MTRIG_HITPRCNT)
            .into_iter()
            .find(|(_, narg, _)| percent <= *narg);
        if let Some((id, _, _)) = found {
            self.fire(host, mob, id, &[("actor", actor)]);
        }
    }

    /// `actor` is giving `obj` to `mob`
    ///
    /// # Returns
    /// 0 if the mob refuses, including while one of its receive triggers is
    /// still running or waiting
    pub fn receive_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, mob: Uid, actor: Uid, obj: Uid) -> i32 {
        let world = host.world();
        if !performs_scripts(world, mob) || !susceptible(world, actor) || !susceptible(world, mob) {
            return 1;
        }
        let listeners: Vec<(InstanceId, i32, bool)> = self
            .context(mob)
            .map(|ctx| {
                ctx.instances()
                    .filter(|t| t.trigger_type & MTRIG_RECEIVE != 0)
                    .map(|t| (t.id, t.narg, t.is_idle()))
                    .collect()
            })
            .unwrap_or_default();

        for (id, narg, idle) in listeners {
            if !idle {
                tracing::debug!("{} isn't ready to accept {}", mob, obj);
                return 0;
            }
            if self.chance(narg) {
                let vars = [
                    ("actor", VarValue::Entity(actor)),
                    ("object", VarValue::Entity(obj)),
                ];
                return self.fire(host, mob, id, &vars);
            }
        }
        1
    }

    /// `actor` is leaving its room towards `dir`. Awake mobs that are not
    /// fighting and can see the actor get a chance to react.
    ///
    /// # Returns
    /// Result of the first leave trigger run, 1 if none ran
    pub fn leave_mob_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, actor: Uid, dir: Option<usize>) -> i32 {
        if !susceptible(host.world(), actor) {
            return 1;
        }
        let room = host.world().character(actor).and_then(|c| c.room);
        for mob in room_people(host.world(), room) {
            if !watching(host.world(), mob, actor) {
                continue;
            }
            if let Some(id) = self.first_by_chance(mob, MTRIG_LEAVE) {
                let vars = [
                    ("direction", VarValue::Text(direction_name(dir).to_string())),
                    ("actor", VarValue::Entity(actor)),
                ];
                return self.fire(host, mob, id, &vars);
            }
        }
        1
    }

    /// `actor` works a door in direction `dir`
    ///
    /// # Returns
    /// Result of the first door trigger run, 1 if none ran
    pub fn door_mob_trigger<H: ScriptHost + ?Sized>(
        &mut self,
        host: &mut H,
        actor: Uid,
        action: DoorAction,
        dir: usize,
    ) -> i32 {
        if !susceptible(host.world(), actor) {
            return 1;
        }
        let room = host.world().character(actor).and_then(|c| c.room);
        for mob in room_people(host.world(), room) {
            if !watching(host.world(), mob, actor) {
                continue;
            }
            if let Some(id) = self.first_by_chance(mob, MTRIG_DOOR) {
                let vars = door_vars(actor, action, dir);
                return self.fire(host, mob, id, &vars);
            }
        }
        1
    }

    /// `actor` looked at `mob`, with `arg` as typed
    ///
    /// # Returns
    /// 0 if the look should not be shown, including when the mob was purged
    pub fn look_mob_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, mob: Uid, actor: Uid, arg: &str) -> i32 {
        let world = host.world();
        if !performs_scripts(world, mob) || !susceptible(world, actor) || !susceptible(world, mob) {
            return 1;
        }
        let mut ret = 1;
        for (id, narg, _) in self.ready(mob, MTRIG_LOOK) {
            if !self.still_ready(mob, id) || !self.chance(narg) {
                continue;
            }
            let vars = [
                ("actor", VarValue::Entity(actor)),
                ("arg", VarValue::from_text(arg)),
            ];
            let result = self.fire(host, mob, id, &vars);
            ret = i32::from(result != 0 && host.world().exists(mob));
        }
        ret
    }

    // ---- shared hooks ------------------------------------------------------

    /// A mob or object was just created
    pub fn load_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, owner: Uid) {
        let category = match owner.kind() {
            EntityKind::Character => {
                if !susceptible(host.world(), owner) {
                    return;
                }
                MTRIG_LOAD
            }
            EntityKind::Object => OTRIG_LOAD,
            EntityKind::Room => return,
        };
        if let Some(id) = self.first_by_chance(owner, category) {
            self.fire(host, owner, id, &[]);
        }
    }

    /// `actor` cast `spell` at a mob or an object
    ///
    /// # Returns
    /// 0 if the spell should fizzle
    pub fn cast_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, actor: Uid, target: Uid, spell: Spell<'_>) -> i32 {
        let world = host.world();
        if !susceptible(world, actor) {
            return 1;
        }
        let category = match target.kind() {
            EntityKind::Character => {
                if !performs_scripts(world, target) || !susceptible(world, target) {
                    return 1;
                }
                MTRIG_CAST
            }
            EntityKind::Object => OTRIG_CAST,
            EntityKind::Room => return self.cast_room_trigger(host, actor, None, None, spell),
        };
        let Some(id) = self.first_by_chance(target, category) else {
            return 1;
        };
        let mut vars = vec![("actor", VarValue::Entity(actor))];
        vars.extend(spell.vars());
        self.fire(host, target, id, &vars)
    }

    // ---- object hooks ------------------------------------------------------

    /// `actor` tries to pick up `obj`
    ///
    /// # Returns
    /// 0 if the pickup should not happen, including when the script purged
    /// the object
    pub fn get_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, obj: Uid, actor: Uid) -> i32 {
        if !susceptible(host.world(), actor) {
            return 1;
        }
        let Some(id) = self.first_by_chance(obj, OTRIG_GET) else {
            return 1;
        };
        let ret = self.fire(host, obj, id, &[("actor", VarValue::Entity(actor))]);
        if host.world().exists(obj) {
            ret
        } else {
            0
        }
    }

    /// `actor` tries to drop `obj`. The object's own triggers run first, then
    /// the room's, which also see the object as `object`.
    ///
    /// # Returns
    /// 0 if the drop should not happen
    pub fn drop_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, obj: Uid, actor: Uid) -> i32 {
        if !susceptible(host.world(), actor) {
            return 1;
        }

        if let Some(id) = self.first_by_chance(obj, OTRIG_DROP) {
            let ret = self.fire(host, obj, id, &[("actor", VarValue::Entity(actor))]);
            if ret == 0 || !host.world().exists(obj) {
                return 0;
            }
        }

        let Some(room) = host.world().character(actor).and_then(|c| c.room) else {
            return 1;
        };
        let Some(id) = self.first_by_chance(room, WTRIG_DROP) else {
            return 1;
        };
        let vars = [
            ("actor", VarValue::Entity(actor)),
            ("object", VarValue::Entity(obj)),
        ];
        let ret = self.fire(host, room, id, &vars);
        let still_carried = host
            .world()
            .object(obj)
            .map_or(false, |o| o.location == ObjLocation::Carried(actor));
        if still_carried {
            ret
        } else {
            0
        }
    }

    /// An object's decay timer ran out
    pub fn timer_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, obj: Uid) -> i32 {
        match self.first_by_chance(obj, OTRIG_TIMER) {
            Some(id) => self.fire(host, obj, id, &[]),
            None => 1,
        }
    }

    /// `actor` hit `victim` for `damage`. Each wear slot in turn: the
    /// attacker's item may run an attack trigger, the victim's a defend trigger.
    pub fn attack_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, actor: Uid, victim: Uid, damage: i32) {
        if !susceptible(host.world(), actor) {
            return;
        }
        let vars = [
            ("damage", VarValue::Text(damage.to_string())),
            ("actor", VarValue::Entity(actor)),
            ("victim", VarValue::Entity(victim)),
        ];
        for position in 0..NUM_WEARS {
            for (holder, category) in [(actor, OTRIG_ATTACK), (victim, OTRIG_DEFEND)] {
                let Some(obj) = worn_at(host.world(), holder, position) else {
                    continue;
                };
                if let Some(id) = self.first_by_chance(obj, category) {
                    self.fire(host, obj, id, &vars);
                }
            }
        }
    }

    /// `actor` puts `obj` on at wear `position`. The first wear trigger
    /// always runs.
    ///
    /// # Returns
    /// 0 if the object should not be worn, including when it was purged
    pub fn wear_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, obj: Uid, actor: Uid, position: usize) -> i32 {
        if !susceptible(host.world(), actor) {
            return 1;
        }
        let Some((id, _, _)) = self.ready(obj, OTRIG_WEAR).into_iter().next() else {
            return 1;
        };
        let vars = [
            ("position", VarValue::Text(position.to_string())),
            ("actor", VarValue::Entity(actor)),
        ];
        let ret = self.fire(host, obj, id, &vars);
        i32::from(ret != 0 && host.world().exists(obj))
    }

    /// `actor` takes `obj` off
    ///
    /// # Returns
    /// 0 if the object should stay on
    pub fn remove_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, obj: Uid, actor: Uid) -> i32 {
        if !susceptible(host.world(), actor) {
            return 1;
        }
        let Some(id) = self.first_by_chance(obj, OTRIG_REMOVE) else {
            return 1;
        };
        let ret = self.fire(host, obj, id, &[("actor", VarValue::Entity(actor))]);
        i32::from(ret != 0 && host.world().exists(obj))
    }

    /// `actor` tries to give `obj` to `victim`
    ///
    /// # Returns
    /// 0 if the give should not happen, or the script moved the object out of
    /// the actor's hands
    pub fn give_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, obj: Uid, actor: Uid, victim: Uid) -> i32 {
        if !susceptible(host.world(), actor) {
            return 1;
        }
        let Some(id) = self.first_by_chance(obj, OTRIG_GIVE) else {
            return 1;
        };
        let vars = [
            ("actor", VarValue::Entity(actor)),
            ("victim", VarValue::Entity(victim)),
        ];
        let ret = self.fire(host, obj, id, &vars);
        let still_carried = host.world().object(obj).map_or(false, |o| o.carried_by() == Some(actor));
        i32::from(ret != 0 && still_carried)
    }

    /// `actor` eats, drinks or quaffs `obj`. The first consume trigger always
    /// runs.
    ///
    /// # Returns
    /// 0 if the object should not be consumed
    pub fn consume_trigger<H: ScriptHost + ?Sized>(
        &mut self,
        host: &mut H,
        obj: Uid,
        actor: Uid,
        how: Consumption,
    ) -> i32 {
        if !susceptible(host.world(), actor) {
            return 1;
        }
        let Some((id, _, _)) = self.ready(obj, OTRIG_CONSUME).into_iter().next() else {
            return 1;
        };
        let vars = [
            ("actor", VarValue::Entity(actor)),
            ("command", VarValue::Text(how.name().to_string())),
        ];
        let ret = self.fire(host, obj, id, &vars);
        i32::from(ret != 0 && host.world().exists(obj))
    }

    /// `actor` is dying; the first worn item with a death trigger runs it
    ///
    /// # Returns
    /// Result of that trigger, 1 if none ran
    pub fn death_obj_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, actor: Uid) -> i32 {
        for position in 0..NUM_WEARS {
            let Some(obj) = worn_at(host.world(), actor, position) else {
                continue;
            };
            if let Some((id, _, _)) = self.ready(obj, OTRIG_DEATH).into_iter().next() {
                return self.fire(host, obj, id, &[("actor", VarValue::Entity(actor))]);
            }
        }
        1
    }

    /// `actor` is leaving `room` towards `dir`; objects on the floor react
    ///
    /// # Returns
    /// 0 if any object's leave trigger ran
    pub fn leave_obj_trigger<H: ScriptHost + ?Sized>(
        &mut self,
        host: &mut H,
        room: Uid,
        actor: Uid,
        dir: Option<usize>,
    ) -> i32 {
        if !susceptible(host.world(), actor) {
            return 1;
        }
        let contents = host.world().room(room).map(|r| r.contents.clone()).unwrap_or_default();
        let mut ret = 1;
        for obj in contents {
            for (id, narg, _) in self.ready(obj, OTRIG_LEAVE) {
                if !self.still_ready(obj, id) || !self.chance(narg) {
                    continue;
                }
                let vars = [
                    ("direction", VarValue::Text(direction_name(dir).to_string())),
                    ("actor", VarValue::Entity(actor)),
                ];
                self.fire(host, obj, id, &vars);
                ret = 0;
            }
        }
        ret
    }

    /// `actor` looked at `obj` by `name` (an `N.` prefix is ignored)
    ///
    /// A trigger with a word list runs when `name` is in it; one without
    /// runs when `name` is one of the object's keywords.
    ///
    /// # Returns
    /// 0 if the look should not be shown, including when the object was purged
    pub fn look_obj_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, obj: Uid, actor: Uid, name: &str) -> i32 {
        if !susceptible(host.world(), actor) {
            return 1;
        }
        let name = name.split_once('.').map_or(name, |(_, rest)| rest);
        let keywords = host.world().object(obj).map(|o| o.name.clone()).unwrap_or_default();
        let mut ret = 1;
        for (id, narg, arglist) in self.ready(obj, OTRIG_LOOK) {
            let named = if arglist.is_empty() {
                isname(name, &keywords)
            } else {
                word_check(name, &arglist)
            };
            if !named || !self.still_ready(obj, id) || !self.chance(narg) {
                continue;
            }
            let vars = [
                ("actor", VarValue::Entity(actor)),
                ("arg", VarValue::from_text(name)),
            ];
            let result = self.fire(host, obj, id, &vars);
            ret = i32::from(result != 0 && host.world().exists(obj));
        }
        ret
    }

    // ---- room hooks --------------------------------------------------------

    /// The zone holding `room` was reset
    pub fn reset_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, room: Uid) {
        if let Some(id) = self.first_by_chance(room, WTRIG_RESET) {
            self.fire(host, room, id, &[]);
        }
    }

    /// `actor` is about to enter `room`, coming from `dir`
    ///
    /// # Returns
    /// 0 if the move should not happen
    pub fn preentry_trigger<H: ScriptHost + ?Sized>(
        &mut self,
        host: &mut H,
        room: Uid,
        actor: Uid,
        dir: Option<usize>,
    ) -> i32 {
        if !susceptible(host.world(), actor) {
            return 1;
        }
        self.entry_room_trigger(host, room, actor, dir, WTRIG_PREENTRY)
    }

    /// `actor` has just entered its current room, coming from `dir`
    pub fn postentry_trigger<H: ScriptHost + ?Sized>(&mut self, host: &mut H, actor: Uid, dir: Option<usize>) -> i32 {
        if !susceptible(host.world(), actor) {
            return 1;
        }
        let Some(room) = host.world().character(actor).and_then(|c| c.room) else {
            return 1;
        };
        self.entry_room_trigger(host, room, actor, dir, WTRIG_POSTENTRY)
    }

    /// `actor` cast `spell` in its room, at `victim` or `obj` if either
    ///
    /// # Returns
    /// 0 if the spell should fizzle
    pub fn cast_room_trigger<H: ScriptHost + ?Sized>(
        &mut self,
        host: &mut H,
        actor: Uid,
        victim: Option<Uid>,
        obj: Option<Uid>,
        spell: Spell<'_>,
    ) -> i32 {
        if !susceptible(host.world(), actor) {
            return 1;
        }
        let Some(room) = host.world().character(actor).and_then(|c| c.room) else {
            return 1;
        };
        let Some(id) = self.first_by_chance(room, WTRIG_CAST) else {
            return 1;
        };
        let mut vars = vec![("actor", VarValue::Entity(actor))];
        if let Some(victim) = victim {
            vars.push(("victim", VarValue::Entity(victim)));
        }
        if let Some(obj) = obj {
            vars.push(("object", VarValue::Entity(obj)));
        }
        vars.extend(spell.vars());
        self.fire(host, room, id, &vars)
    }

    /// `actor` is leaving `room` towards `dir`
    ///
    /// # Returns
    /// 0 if the actor should stay
    pub fn leave_room_trigger<H: ScriptHost + ?Sized>(
        &mut self,
        host: &mut H,
        room: Uid,
        actor: Uid,
        dir: Option<usize>,
    ) -> i32 {
        if !susceptible(host.world(), actor) {
            return 1;
        }
        let Some(id) = self.first_by_chance(room, WTRIG_LEAVE) else {
            return 1;
        };
        let vars = [
            ("direction", VarValue::Text(direction_name(dir).to_string())),
            ("actor", VarValue::Entity(actor)),
        ];
        self.fire(host, room, id, &vars)
    }

    /// `actor` works a door of its room in direction `dir`
    ///
    /// # Returns
    /// 0 if the door command should not happen
    pub fn door_room_trigger<H: ScriptHost + ?Sized>(
        &mut self,
        host: &mut H,
        actor: Uid,
        action: DoorAction,
        dir: usize,
    ) -> i32 {
        if !susceptible(host.world(), actor) {
            return 1;
        }
        let Some(room) = host.world().character(actor).and_then(|c| c.room) else {
            return 1;
        };
        let Some(id) = self.first_by_chance(room, WTRIG_DOOR) else {
            return 1;
        };
        let vars = door_vars(actor, action, dir);
        self.fire(host, room, id, &vars)
    }

    fn entry_room_trigger<H: ScriptHost + ?Sized>(
        &mut self,
        host: &mut H,
        room: Uid,
        actor: Uid,
        dir: Option<usize>,
        category: u64,
    ) -> i32 {
        let Some(id) = self.first_by_chance(room, category) else {
            return 1;
        };
        let vars = [
            ("direction", VarValue::Text(arrival_direction(dir).to_string())),
            ("actor", VarValue::Entity(actor)),
        ];
        self.fire(host, room, id, &vars)
    }
}

fn door_vars(actor: Uid, action: DoorAction, dir: usize) -> [(&'static str, VarValue); 3] {
    [
        ("cmd", VarValue::Text(action.name().to_string())),
        ("direction", VarValue::Text(direction_name(Some(dir)).to_string())),
        ("actor", VarValue::Entity(actor)),
    ]
}
