//! # World
//!
//! Owns every live character, object and room, plus the prototypes new ones
//! are built from. Entities are addressed only by [`Uid`]; a lookup with a
//! handle to something that has been extracted simply returns `None`.

use crate::character::{isname, Character};
use crate::constants::{
    EFF_BLIND, EFF_DETECT_INVIS, EFF_INVISIBLE, NUM_WEARS, ROOM_DEATH, ROOM_GODROOM, ROOM_PRIVATE,
};
use crate::error::{Result, WorldError};
use crate::object::{ObjLocation, Object};
use crate::room::{Exit, Room};
use fiery_core::{Arena, EntityKind, GameTime, Uid, Vnum};
use std::collections::HashMap;

/// Containers deeper than this are treated as unplaced when walking up to a room
const MAX_NESTING: usize = 64;

/// The game world
///
/// # Purpose
/// Single owner of all entity state. Scripts read it through field accessors
/// and change it only by issuing commands.
pub struct World {
    /// Current game date
    pub time: GameTime,

    characters: Arena<Character>,
    objects: Arena<Object>,
    rooms: Arena<Room>,

    /// Key: room vnum, Value: room handle
    room_index: HashMap<Vnum, Uid>,
    mob_protos: HashMap<Vnum, Character>,
    obj_protos: HashMap<Vnum, Object>,
}

impl World {
    /// Create an empty world
    #[inline]
    pub fn new() -> Self {
        tracing::debug!("Creating World");

        Self {
            time: GameTime::default(),
            characters: Arena::new(EntityKind::Character),
            objects: Arena::new(EntityKind::Object),
            rooms: Arena::new(EntityKind::Room),
            room_index: HashMap::new(),
            mob_protos: HashMap::new(),
            obj_protos: HashMap::new(),
        }
    }

    // ---- rooms -------------------------------------------------------------

    /// Add a room
    ///
    /// # Returns
    /// The room's handle; its vnum becomes addressable through [`World::room_by_vnum`]
    pub fn create_room(&mut self, mut room: Room) -> Uid {
        let vnum = room.vnum;
        let uid = self.rooms.insert_with(|uid| {
            room.uid = Some(uid);
            room
        });
        self.room_index.insert(vnum, uid);
        uid
    }

    pub fn room(&self, uid: Uid) -> Option<&Room> {
        self.rooms.get(uid)
    }

    pub fn room_mut(&mut self, uid: Uid) -> Option<&mut Room> {
        self.rooms.get_mut(uid)
    }

    pub fn room_by_vnum(&self, vnum: Vnum) -> Option<Uid> {
        self.room_index.get(&vnum).copied()
    }

    pub fn rooms(&self) -> impl Iterator<Item = (Uid, &Room)> {
        self.rooms.iter()
    }

    pub fn rooms_in_zone(&self, zone: i32) -> Vec<Uid> {
        self.rooms
            .iter()
            .filter(|(_, room)| room.zone == zone)
            .map(|(uid, _)| uid)
            .collect()
    }

    /// Set (or clear, with `to = None`) one exit of a room
    pub fn link_exit(&mut self, from: Uid, dir: usize, to: Option<Uid>) -> Result<()> {
        if dir >= 6 {
            return Err(WorldError::InvalidPlacement(format!("no direction {}", dir)));
        }
        let room = self.rooms.get_mut(from).ok_or(WorldError::NoSuchEntity(from))?;
        room.exits[dir] = Some(Exit {
            to_room: to,
            key: -1,
            flags: 0,
        });
        Ok(())
    }

    /// Pick a room open to random placement (not private, death or god rooms)
    ///
    /// # Arguments
    /// * `zone` - Restrict the choice to one zone
    /// * `pick` - Given the number of candidates, returns the index to take
    pub fn random_room(&self, zone: Option<i32>, pick: impl FnOnce(usize) -> usize) -> Option<Uid> {
        let candidates: Vec<Uid> = self
            .rooms
            .iter()
            .filter(|(_, room)| zone.map_or(true, |zone| room.zone == zone))
            .filter(|(_, room)| {
                !room.flagged(ROOM_PRIVATE) && !room.flagged(ROOM_DEATH) && !room.flagged(ROOM_GODROOM)
            })
            .map(|(uid, _)| uid)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        candidates.get(pick(candidates.len()) % candidates.len()).copied()
    }

    /// True if any player stands in a room of this zone
    pub fn zone_has_players(&self, zone: i32) -> bool {
        self.rooms
            .iter()
            .filter(|(_, room)| room.zone == zone)
            .flat_map(|(_, room)| room.people.iter())
            .filter_map(|uid| self.characters.get(*uid))
            .any(|ch| !ch.npc)
    }

    // ---- prototypes --------------------------------------------------------

    pub fn add_mob_proto(&mut self, proto: Character) {
        tracing::debug!("Adding mobile prototype {}", proto.vnum);
        self.mob_protos.insert(proto.vnum, proto);
    }

    pub fn add_obj_proto(&mut self, proto: Object) {
        tracing::debug!("Adding object prototype {}", proto.vnum);
        self.obj_protos.insert(proto.vnum, proto);
    }

    pub fn mob_proto(&self, vnum: Vnum) -> Option<&Character> {
        self.mob_protos.get(&vnum)
    }

    pub fn obj_proto(&self, vnum: Vnum) -> Option<&Object> {
        self.obj_protos.get(&vnum)
    }

    // ---- creation ----------------------------------------------------------

    /// Insert a character that is not yet in any room
    pub fn create_character(&mut self, mut ch: Character) -> Uid {
        ch.room = None;
        self.characters.insert_with(|uid| {
            ch.uid = Some(uid);
            ch
        })
    }

    /// Insert an object that is not yet placed anywhere
    pub fn create_object(&mut self, mut obj: Object) -> Uid {
        obj.location = ObjLocation::Nowhere;
        obj.contents.clear();
        self.objects.insert_with(|uid| {
            obj.uid = Some(uid);
            obj
        })
    }

    /// Load a mobile from its prototype into a room
    ///
    /// # Arguments
    /// * `vnum` - Mobile prototype number
    /// * `room` - Room to place it in
    pub fn spawn_mob(&mut self, vnum: Vnum, room: Uid) -> Result<Uid> {
        let proto = self
            .mob_protos
            .get(&vnum)
            .cloned()
            .ok_or(WorldError::NoSuchMobile(vnum))?;
        let uid = self.create_character(proto);
        self.char_to_room(uid, room)?;
        Ok(uid)
    }

    /// Load an object from its prototype; it starts unplaced
    pub fn spawn_obj(&mut self, vnum: Vnum) -> Result<Uid> {
        let proto = self
            .obj_protos
            .get(&vnum)
            .cloned()
            .ok_or(WorldError::NoSuchObject(vnum))?;
        Ok(self.create_object(proto))
    }

    // ---- lookup ------------------------------------------------------------

    pub fn character(&self, uid: Uid) -> Option<&Character> {
        self.characters.get(uid)
    }

    pub fn character_mut(&mut self, uid: Uid) -> Option<&mut Character> {
        self.characters.get_mut(uid)
    }

    pub fn object(&self, uid: Uid) -> Option<&Object> {
        self.objects.get(uid)
    }

    pub fn object_mut(&mut self, uid: Uid) -> Option<&mut Object> {
        self.objects.get_mut(uid)
    }

    pub fn characters(&self) -> impl Iterator<Item = (Uid, &Character)> {
        self.characters.iter()
    }

    pub fn objects(&self) -> impl Iterator<Item = (Uid, &Object)> {
        self.objects.iter()
    }

    /// True if the handle still refers to a live entity
    pub fn exists(&self, uid: Uid) -> bool {
        match uid.kind() {
            EntityKind::Character => self.characters.contains(uid),
            EntityKind::Object => self.objects.contains(uid),
            EntityKind::Room => self.rooms.contains(uid),
        }
    }

    /// Live mobiles loaded from a prototype
    pub fn count_mobs(&self, vnum: Vnum) -> usize {
        self.characters
            .iter()
            .filter(|(_, ch)| ch.npc && ch.vnum == vnum)
            .count()
    }

    /// Live objects loaded from a prototype
    pub fn count_objs(&self, vnum: Vnum) -> usize {
        self.objects.iter().filter(|(_, obj)| obj.vnum == vnum).count()
    }

    /// Members of `ch`'s group, counting the leader
    pub fn group_size(&self, ch: Uid) -> usize {
        let Some(c) = self.characters.get(ch) else {
            return 0;
        };
        let leader = c.group_leader.unwrap_or(ch);
        match self.characters.get(leader) {
            Some(lead) if lead.is_grouped() => 1 + lead.group_members.len(),
            _ => 1,
        }
    }

    /// Whether `viewer` can perceive `target`
    pub fn can_see(&self, viewer: Uid, target: Uid) -> bool {
        let (Some(viewer), Some(target)) = (self.characters.get(viewer), self.characters.get(target))
        else {
            return false;
        };
        if viewer.eff_flagged(EFF_BLIND) {
            return false;
        }
        if target.invis_level > viewer.level {
            return false;
        }
        !target.eff_flagged(EFF_INVISIBLE) || viewer.eff_flagged(EFF_DETECT_INVIS)
    }

    // ---- placement ---------------------------------------------------------

    /// Move a character into a room, leaving its previous one
    pub fn char_to_room(&mut self, ch: Uid, room: Uid) -> Result<()> {
        if !self.rooms.contains(room) {
            return Err(WorldError::NoSuchEntity(room));
        }
        self.char_from_room(ch)?;
        if let Some(r) = self.rooms.get_mut(room) {
            r.people.insert(0, ch);
        }
        if let Some(c) = self.characters.get_mut(ch) {
            c.room = Some(room);
        }
        Ok(())
    }

    pub fn char_from_room(&mut self, ch: Uid) -> Result<()> {
        let c = self.characters.get_mut(ch).ok_or(WorldError::NoSuchEntity(ch))?;
        if let Some(old) = c.room.take() {
            if let Some(r) = self.rooms.get_mut(old) {
                r.people.retain(|uid| *uid != ch);
            }
        }
        Ok(())
    }

    pub fn obj_to_room(&mut self, obj: Uid, room: Uid) -> Result<()> {
        if !self.rooms.contains(room) {
            return Err(WorldError::NoSuchEntity(room));
        }
        self.obj_from_location(obj)?;
        if let Some(r) = self.rooms.get_mut(room) {
            r.contents.insert(0, obj);
        }
        self.set_location(obj, ObjLocation::Room(room));
        Ok(())
    }

    pub fn obj_to_char(&mut self, obj: Uid, ch: Uid) -> Result<()> {
        if !self.characters.contains(ch) {
            return Err(WorldError::NoSuchEntity(ch));
        }
        self.obj_from_location(obj)?;
        if let Some(c) = self.characters.get_mut(ch) {
            c.inventory.insert(0, obj);
        }
        self.set_location(obj, ObjLocation::Carried(ch));
        Ok(())
    }

    pub fn obj_to_obj(&mut self, obj: Uid, container: Uid) -> Result<()> {
        if obj == container || self.is_inside(container, obj) {
            return Err(WorldError::InvalidPlacement(
                "object cannot contain itself".to_string(),
            ));
        }
        if !self.objects.contains(container) {
            return Err(WorldError::NoSuchEntity(container));
        }
        self.obj_from_location(obj)?;
        if let Some(c) = self.objects.get_mut(container) {
            c.contents.insert(0, obj);
        }
        self.set_location(obj, ObjLocation::Inside(container));
        Ok(())
    }

    /// Wear an object on a specific position
    ///
    /// # Arguments
    /// * `position` - Index into [`crate::constants::WEAR_POSITIONS`]
    pub fn equip(&mut self, ch: Uid, obj: Uid, position: usize) -> Result<()> {
        if position >= NUM_WEARS {
            return Err(WorldError::InvalidPlacement(format!("no wear position {}", position)));
        }
        let c = self.characters.get(ch).ok_or(WorldError::NoSuchEntity(ch))?;
        if c.equipment[position].is_some() {
            return Err(WorldError::InvalidPlacement(format!(
                "wear position {} already in use",
                position
            )));
        }
        self.obj_from_location(obj)?;
        if let Some(c) = self.characters.get_mut(ch) {
            c.equipment[position] = Some(obj);
        }
        self.set_location(obj, ObjLocation::Worn { by: ch, position });
        Ok(())
    }

    fn set_location(&mut self, obj: Uid, location: ObjLocation) {
        if let Some(o) = self.objects.get_mut(obj) {
            o.location = location;
        }
    }

    /// Detach an object from whatever holds it
    pub fn obj_from_location(&mut self, obj: Uid) -> Result<()> {
        let location = self
            .objects
            .get(obj)
            .ok_or(WorldError::NoSuchEntity(obj))?
            .location;
        match location {
            ObjLocation::Nowhere => {}
            ObjLocation::Room(room) => {
                if let Some(r) = self.rooms.get_mut(room) {
                    r.contents.retain(|uid| *uid != obj);
                }
            }
            ObjLocation::Carried(ch) => {
                if let Some(c) = self.characters.get_mut(ch) {
                    c.inventory.retain(|uid| *uid != obj);
                }
            }
            ObjLocation::Worn { by, position } => {
                if let Some(c) = self.characters.get_mut(by) {
                    if c.equipment[position] == Some(obj) {
                        c.equipment[position] = None;
                    }
                }
            }
            ObjLocation::Inside(container) => {
                if let Some(c) = self.objects.get_mut(container) {
                    c.contents.retain(|uid| *uid != obj);
                }
            }
        }
        self.set_location(obj, ObjLocation::Nowhere);
        Ok(())
    }

    fn is_inside(&self, obj: Uid, container: Uid) -> bool {
        let mut current = obj;
        for _ in 0..MAX_NESTING {
            match self.objects.get(current).map(|o| o.location) {
                Some(ObjLocation::Inside(parent)) if parent == container => return true,
                Some(ObjLocation::Inside(parent)) => current = parent,
                _ => return false,
            }
        }
        false
    }

    /// Room an object is ultimately in, following containers and carriers
    pub fn obj_room(&self, obj: Uid) -> Option<Uid> {
        let mut current = obj;
        for _ in 0..MAX_NESTING {
            match self.objects.get(current)?.location {
                ObjLocation::Nowhere => return None,
                ObjLocation::Room(room) => return Some(room),
                ObjLocation::Carried(ch) | ObjLocation::Worn { by: ch, .. } => {
                    return self.characters.get(ch)?.room
                }
                ObjLocation::Inside(parent) => current = parent,
            }
        }
        None
    }

    /// Room any entity is in (a room is in itself)
    pub fn entity_room(&self, uid: Uid) -> Option<Uid> {
        match uid.kind() {
            EntityKind::Character => self.characters.get(uid)?.room,
            EntityKind::Object => self.obj_room(uid),
            EntityKind::Room => self.rooms.contains(uid).then_some(uid),
        }
    }

    // ---- name searches -----------------------------------------------------

    fn char_matches(&self, uid: Uid, name: &str) -> bool {
        match Uid::parse(name) {
            Some(target) => target == uid,
            None => self
                .characters
                .get(uid)
                .map(|ch| ch.matches_name(name))
                .unwrap_or(false),
        }
    }

    fn obj_matches(&self, uid: Uid, name: &str) -> bool {
        match Uid::parse(name) {
            Some(target) => target == uid,
            None => self
                .objects
                .get(uid)
                .map(|obj| isname(name, &obj.name))
                .unwrap_or(false),
        }
    }

    fn char_in_list(&self, list: &[Uid], name: &str) -> Option<Uid> {
        list.iter().copied().find(|uid| self.char_matches(*uid, name))
    }

    fn obj_in_list(&self, list: &[Uid], name: &str) -> Option<Uid> {
        list.iter().copied().find(|uid| self.obj_matches(*uid, name))
    }

    fn char_in_world(&self, name: &str) -> Option<Uid> {
        if let Some(uid) = Uid::parse(name) {
            return self.characters.contains(uid).then_some(uid);
        }
        self.characters
            .iter()
            .find(|(_, ch)| ch.matches_name(name))
            .map(|(uid, _)| uid)
    }

    fn obj_in_world(&self, name: &str) -> Option<Uid> {
        if let Some(uid) = Uid::parse(name) {
            return self.objects.contains(uid).then_some(uid);
        }
        self.objects
            .iter()
            .find(|(_, obj)| isname(name, &obj.name))
            .map(|(uid, _)| uid)
    }

    /// Room named by a vnum or a room handle
    pub fn get_room(&self, name: &str) -> Option<Uid> {
        if let Some(uid) = Uid::parse(name) {
            return self.rooms.contains(uid).then_some(uid);
        }
        name.trim().parse().ok().and_then(|vnum| self.room_by_vnum(vnum))
    }

    /// Find the entity a name refers to, searching outward from `owner`
    ///
    /// # Purpose
    /// A character looks at its equipment, inventory, room occupants and room
    /// floor first; an object at its room; a room at its own occupants and
    /// floor. Every kind then falls back to the whole world and finally to a
    /// room vnum.
    ///
    /// # Returns
    /// The first match, or `None`
    pub fn find_around(&self, owner: Uid, name: &str) -> Option<Uid> {
        if name.is_empty() {
            return None;
        }
        let local = match owner.kind() {
            EntityKind::Character => {
                let ch = self.characters.get(owner)?;
                let worn: Vec<Uid> = ch.equipment.iter().flatten().copied().collect();
                let room = ch.room.and_then(|room| self.rooms.get(room));
                self.obj_in_list(&worn, name)
                    .or_else(|| self.obj_in_list(&ch.inventory, name))
                    .or_else(|| room.and_then(|r| self.char_in_list(&r.people, name)))
                    .or_else(|| room.and_then(|r| self.obj_in_list(&r.contents, name)))
            }
            EntityKind::Object => {
                let obj = self.objects.get(owner)?;
                let room = self.obj_room(owner).and_then(|room| self.rooms.get(room));
                let holder = obj
                    .carried_by()
                    .or(obj.worn_by())
                    .filter(|uid| self.char_matches(*uid, name));
                holder
                    .or_else(|| room.and_then(|r| self.char_in_list(&r.people, name)))
                    .or_else(|| self.obj_in_list(&obj.contents, name))
                    .or_else(|| room.and_then(|r| self.obj_in_list(&r.contents, name)))
            }
            EntityKind::Room => {
                let room = self.rooms.get(owner)?;
                self.char_in_list(&room.people, name)
                    .or_else(|| self.obj_in_list(&room.contents, name))
            }
        };
        local
            .or_else(|| self.char_in_world(name))
            .or_else(|| self.obj_in_world(name))
            .or_else(|| self.get_room(name))
    }

    // ---- extraction --------------------------------------------------------

    /// Everything that disappears if `uid` is extracted: the entity itself and,
    /// recursively, whatever it carries, wears or contains
    pub fn extraction_set(&self, uid: Uid) -> Vec<Uid> {
        let mut out = Vec::new();
        let mut stack = vec![uid];
        while let Some(next) = stack.pop() {
            match next.kind() {
                EntityKind::Character => {
                    if let Some(ch) = self.characters.get(next) {
                        out.push(next);
                        stack.extend(ch.inventory.iter().copied());
                        stack.extend(ch.equipment.iter().flatten().copied());
                    }
                }
                EntityKind::Object => {
                    if let Some(obj) = self.objects.get(next) {
                        out.push(next);
                        stack.extend(obj.contents.iter().copied());
                    }
                }
                EntityKind::Room => {}
            }
        }
        out
    }

    /// Remove a character or object (and its contents) from the world
    ///
    /// # Returns
    /// Every handle that stopped resolving, so callers can drop state keyed on them
    pub fn extract(&mut self, uid: Uid) -> Vec<Uid> {
        let doomed = self.extraction_set(uid);
        if let Some(first) = doomed.first() {
            match first.kind() {
                EntityKind::Character => {
                    let _ = self.char_from_room(*first);
                }
                EntityKind::Object => {
                    let _ = self.obj_from_location(*first);
                }
                EntityKind::Room => {}
            }
        }
        for victim in &doomed {
            match victim.kind() {
                EntityKind::Character => {
                    tracing::debug!("Extracting character {:?}", victim);
                    self.characters.remove(*victim);
                }
                EntityKind::Object => {
                    tracing::debug!("Extracting object {:?}", victim);
                    self.objects.remove(*victim);
                }
                EntityKind::Room => {}
            }
        }
        doomed
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Stance;

    fn temple() -> (World, Uid) {
        let mut world = World::new();
        let room = world.create_room(Room::new(3001, "The Temple", 30));
        (world, room)
    }

    #[test]
    fn test_spawn_and_place() {
        let (mut world, room) = temple();
        world.add_mob_proto(Character::mobile(3000, "priest", "the priest"));
        let priest = world.spawn_mob(3000, room).unwrap();
        assert_eq!(world.character(priest).unwrap().room, Some(room));
        assert_eq!(world.room(room).unwrap().people, vec![priest]);
        assert_eq!(world.count_mobs(3000), 1);
        assert!(matches!(world.spawn_mob(1, room), Err(WorldError::NoSuchMobile(1))));
    }

    #[test]
    fn test_obj_room_follows_carrier() {
        let (mut world, room) = temple();
        let ch = world.create_character(Character::player("Ayla"));
        world.char_to_room(ch, room).unwrap();
        let bag = world.create_object(Object::new(1, "bag", "a bag"));
        let coin = world.create_object(Object::new(2, "coin", "a coin"));
        world.obj_to_char(bag, ch).unwrap();
        world.obj_to_obj(coin, bag).unwrap();
        assert_eq!(world.obj_room(coin), Some(room));
        assert!(world.obj_to_obj(bag, coin).is_err());
    }

    #[test]
    fn test_equip_and_unequip() {
        let (mut world, _) = temple();
        let ch = world.create_character(Character::player("Ayla"));
        let helm = world.create_object(Object::new(5, "helm", "a helm"));
        world.equip(ch, helm, 6).unwrap();
        assert_eq!(world.object(helm).unwrap().worn_by(), Some(ch));
        world.obj_from_location(helm).unwrap();
        assert_eq!(world.character(ch).unwrap().equipment[6], None);
    }

    #[test]
    fn test_extract_invalidates_handles() {
        let (mut world, room) = temple();
        let ch = world.create_character(Character::mobile(10, "guard", "a guard"));
        world.char_to_room(ch, room).unwrap();
        let sword = world.create_object(Object::new(11, "sword", "a sword"));
        world.obj_to_char(sword, ch).unwrap();

        let gone = world.extract(ch);
        assert_eq!(gone.len(), 2);
        assert!(!world.exists(ch));
        assert!(!world.exists(sword));
        assert!(world.room(room).unwrap().people.is_empty());
    }

    #[test]
    fn test_find_around_prefers_local() {
        let (mut world, room) = temple();
        let other = world.create_room(Room::new(3002, "Market", 30));
        let far = world.create_character(Character::mobile(1, "guard", "a far guard"));
        world.char_to_room(far, other).unwrap();
        let near = world.create_character(Character::mobile(1, "guard", "a near guard"));
        world.char_to_room(near, room).unwrap();
        let me = world.create_character(Character::mobile(2, "priest", "the priest"));
        world.char_to_room(me, room).unwrap();

        assert_eq!(world.find_around(me, "guard"), Some(near));
        assert_eq!(world.find_around(me, "3002"), Some(other));
        assert_eq!(world.find_around(me, &far.to_var()), Some(far));
        assert_eq!(world.find_around(me, "nobody"), None);
    }

    #[test]
    fn test_random_room_skips_restricted() {
        let (mut world, temple) = temple();
        let mut vault = Room::new(3099, "Vault", 30);
        crate::constants::set_flag(&mut vault.flags, ROOM_PRIVATE);
        world.create_room(vault);
        let elsewhere = world.create_room(Room::new(5000, "Field", 50));

        for pick in 0..4 {
            assert_eq!(world.random_room(Some(30), |_| pick), Some(temple));
        }
        assert_eq!(world.random_room(Some(50), |_| 0), Some(elsewhere));
        assert_eq!(world.random_room(Some(99), |_| 0), None);
    }

    #[test]
    fn test_zone_has_players() {
        let (mut world, room) = temple();
        assert!(!world.zone_has_players(30));
        let mob = world.create_character(Character::mobile(1, "rat", "a rat"));
        world.char_to_room(mob, room).unwrap();
        assert!(!world.zone_has_players(30));
        let pc = world.create_character(Character::player("Ayla"));
        world.char_to_room(pc, room).unwrap();
        assert!(world.zone_has_players(30));
    }

    #[test]
    fn test_can_see() {
        let (mut world, _) = temple();
        let a = world.create_character(Character::player("Ayla"));
        let b = world.create_character(Character::player("Bren"));
        assert!(world.can_see(a, b));
        world.character_mut(b).unwrap().invis_level = 50;
        assert!(!world.can_see(a, b));
        world.character_mut(a).unwrap().stance = Stance::Sleeping;
        assert!(!world.can_see(a, world.character(b).unwrap().uid.unwrap()));
    }
}
