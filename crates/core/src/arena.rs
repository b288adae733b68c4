//! Generational slot arena handing out [`Uid`]s

use crate::types::{EntityKind, Uid};

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot storage for one entity kind
///
/// Removing an entry bumps its slot generation, so handles issued before the
/// removal never resolve again even after the slot is reused.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    kind: EntityKind,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Arena<T> {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Insert a value built from its own handle
    pub fn insert_with(&mut self, build: impl FnOnce(Uid) -> T) -> Uid {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    value: None,
                });
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        let uid = Uid::new(self.kind, index, slot.generation);
        slot.value = Some(build(uid));
        self.len += 1;
        uid
    }

    pub fn insert(&mut self, value: T) -> Uid {
        self.insert_with(|_| value)
    }

    fn slot(&self, uid: Uid) -> Option<&Slot<T>> {
        if uid.kind() != self.kind {
            return None;
        }
        self.slots
            .get(uid.index() as usize)
            .filter(|slot| slot.generation == uid.generation())
    }

    pub fn get(&self, uid: Uid) -> Option<&T> {
        self.slot(uid)?.value.as_ref()
    }

    pub fn get_mut(&mut self, uid: Uid) -> Option<&mut T> {
        if uid.kind() != self.kind {
            return None;
        }
        self.slots
            .get_mut(uid.index() as usize)
            .filter(|slot| slot.generation == uid.generation())?
            .value
            .as_mut()
    }

    pub fn contains(&self, uid: Uid) -> bool {
        self.get(uid).is_some()
    }

    pub fn remove(&mut self, uid: Uid) -> Option<T> {
        if !self.contains(uid) {
            return None;
        }
        let slot = &mut self.slots[uid.index() as usize];
        let value = slot.value.take();
        slot.generation = slot.generation.wrapping_add(1) & ((1 << 30) - 1);
        self.free.push(uid.index());
        self.len -= 1;
        value
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Live entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Uid, &T)> {
        let kind = self.kind;
        self.slots.iter().enumerate().filter_map(move |(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (Uid::new(kind, index as u32, slot.generation), value))
        })
    }

    pub fn uids(&self) -> Vec<Uid> {
        self.iter().map(|(uid, _)| uid).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut arena = Arena::new(EntityKind::Object);
        let a = arena.insert("sword");
        let b = arena.insert("shield");
        assert_ne!(a, b);
        assert_eq!(arena.get(a), Some(&"sword"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_stale_handle_after_reuse() {
        let mut arena = Arena::new(EntityKind::Character);
        let old = arena.insert(1);
        assert_eq!(arena.remove(old), Some(1));
        let new = arena.insert(2);
        assert_eq!(old.index(), new.index());
        assert!(arena.get(old).is_none());
        assert_eq!(arena.get(new), Some(&2));
        assert!(arena.remove(old).is_none());
    }

    #[test]
    fn test_wrong_kind_does_not_resolve() {
        let mut arena = Arena::new(EntityKind::Room);
        let uid = arena.insert(());
        let forged = Uid::new(EntityKind::Object, uid.index(), uid.generation());
        assert!(!arena.contains(forged));
    }

    #[test]
    fn test_insert_with_sees_own_uid() {
        let mut arena = Arena::new(EntityKind::Object);
        let uid = arena.insert_with(|uid| uid);
        assert_eq!(arena.get(uid), Some(&uid));
        assert_eq!(arena.iter().count(), 1);
    }
}
