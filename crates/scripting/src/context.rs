//! Script contexts
//!
//! A [`ScriptContext`] is everything one entity carries: its attached trigger
//! instances, the global variables they share and the union of their
//! categories.

use crate::trigger::TriggerTemplate;
use crate::vars::VarList;
use fiery_core::{EventHandle, Vnum};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Identifies one attached instance for its whole life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Resumption record of one instance
///
/// Holds everything needed to continue a suspended trigger: where it stopped,
/// how deep in `if` blocks it was, its loop count and locals, and the `done`
/// lines whose `while` it has already entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Next line to execute
    pub cursor: usize,
    /// Open `if` blocks plus one while running; zero when idle
    pub depth: u32,
    /// `while` iterations in this invocation
    pub loops: u32,
    pub locals: VarList,
    /// Key: `done` line, Value: its `while` line
    pub anchors: BTreeMap<usize, usize>,
    /// Pending resume while suspended
    pub wait: Option<EventHandle>,
}

impl Frame {
    /// Back to the idle state; locals are dropped
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.depth = 0;
        self.loops = 0;
        self.locals.clear();
        self.anchors.clear();
        self.wait = None;
    }
}

/// A trigger attached to an entity
#[derive(Debug, Clone)]
pub struct TriggerInstance {
    pub id: InstanceId,
    pub template: Arc<TriggerTemplate>,
    pub trigger_type: u64,
    pub narg: i32,
    pub arglist: String,
    pub frame: Frame,
    pub(crate) running: bool,
}

impl TriggerInstance {
    pub fn new(id: InstanceId, template: Arc<TriggerTemplate>) -> Self {
        Self {
            id,
            trigger_type: template.trigger_type,
            narg: template.narg,
            arglist: template.arglist.clone(),
            template,
            frame: Frame::default(),
            running: false,
        }
    }

    #[inline]
    pub fn vnum(&self) -> Vnum {
        self.template.vnum
    }

    pub fn name(&self) -> &str {
        &self.template.name
    }

    /// Neither running nor suspended
    #[inline]
    pub fn is_idle(&self) -> bool {
        !self.running && self.frame.depth == 0
    }

    /// Suspended on a `wait`
    pub fn is_waiting(&self) -> bool {
        self.frame.wait.is_some()
    }

    /// Has every bit of `category` and is free to start
    pub fn ready_for(&self, category: u64) -> bool {
        self.trigger_type & category != 0 && self.is_idle()
    }
}

/// How [`ScriptContext::remove`] picks instances
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    All,
    /// 1-based position in the list
    Position(usize),
    /// `n`-th instance whose name matches (1-based)
    Name { nth: usize, name: String },
}

impl Selector {
    /// Parse `all`, `3`, `gate` or `2.gate`
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.eq_ignore_ascii_case("all") {
            return Selector::All;
        }
        if let Some((nth, name)) = text.split_once('.') {
            return Selector::Name {
                nth: nth.trim().parse().unwrap_or(1).max(1),
                name: name.to_string(),
            };
        }
        if text.starts_with(|c: char| c.is_ascii_digit()) {
            let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();
            return Selector::Position(digits.parse().unwrap_or(0));
        }
        Selector::Name {
            nth: 1,
            name: text.to_string(),
        }
    }
}

/// Triggers and shared state of one entity
#[derive(Debug, Clone, Default)]
pub struct ScriptContext {
    types: u64,
    triggers: Vec<TriggerInstance>,
    pub globals: VarList,
}

impl ScriptContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union of every attached category
    #[inline]
    pub fn types(&self) -> u64 {
        self.types
    }

    /// True if some attached trigger has any bit of `category`
    #[inline]
    pub fn has_type(&self, category: u64) -> bool {
        self.types & category != 0
    }

    /// Attach an instance. `None` appends, `Some(0)` puts it first, `Some(n)`
    /// places it after the `n`-th instance.
    pub fn add(&mut self, instance: TriggerInstance, location: Option<usize>) {
        self.types |= instance.trigger_type;
        match location {
            None => self.triggers.push(instance),
            Some(pos) => {
                let pos = pos.min(self.triggers.len());
                self.triggers.insert(pos, instance);
            }
        }
    }

    /// Detach instances
    ///
    /// # Returns
    /// The removed instances, so the caller can cancel their waits
    pub fn remove(&mut self, selector: &Selector) -> Vec<TriggerInstance> {
        let removed = match selector {
            Selector::All => std::mem::take(&mut self.triggers),
            Selector::Position(n) => {
                if *n >= 1 && *n <= self.triggers.len() {
                    vec![self.triggers.remove(n - 1)]
                } else {
                    Vec::new()
                }
            }
            Selector::Name { nth, name } => {
                let found = self
                    .triggers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| fiery_world::character::isname(name, t.name()))
                    .nth(nth.saturating_sub(1))
                    .map(|(pos, _)| pos);
                match found {
                    Some(pos) => vec![self.triggers.remove(pos)],
                    None => Vec::new(),
                }
            }
        };
        self.recompute_types();
        removed
    }

    fn recompute_types(&mut self) {
        self.types = self.triggers.iter().fold(0, |acc, t| acc | t.trigger_type);
    }

    pub fn instance(&self, id: InstanceId) -> Option<&TriggerInstance> {
        self.triggers.iter().find(|t| t.id == id)
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> Option<&mut TriggerInstance> {
        self.triggers.iter_mut().find(|t| t.id == id)
    }

    /// Instances in list order
    pub fn instances(&self) -> impl Iterator<Item = &TriggerInstance> {
        self.triggers.iter()
    }

    pub(crate) fn instances_mut(&mut self) -> impl Iterator<Item = &mut TriggerInstance> {
        self.triggers.iter_mut()
    }

    /// Instance ids in list order
    pub fn ids(&self) -> Vec<InstanceId> {
        self.triggers.iter().map(|t| t.id).collect()
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::{AttachType, MTRIG_COMMAND, MTRIG_GREET, MTRIG_RANDOM};

    fn instance(id: u64, name: &str, category: u64) -> TriggerInstance {
        let template = TriggerTemplate::new(id as Vnum, name, AttachType::Mobile, category, "say hi");
        TriggerInstance::new(InstanceId(id), Arc::new(template))
    }

    #[test]
    fn test_types_follow_attach_and_detach() {
        let mut ctx = ScriptContext::new();
        ctx.add(instance(1, "greet", MTRIG_GREET), None);
        ctx.add(instance(2, "bell", MTRIG_COMMAND), None);
        assert!(ctx.has_type(MTRIG_GREET | MTRIG_RANDOM));
        assert!(!ctx.has_type(MTRIG_RANDOM));

        let removed = ctx.remove(&Selector::parse("greet"));
        assert_eq!(removed.len(), 1);
        assert!(!ctx.has_type(MTRIG_GREET));
        assert_eq!(ctx.types(), MTRIG_COMMAND);
    }

    #[test]
    fn test_add_location() {
        let mut ctx = ScriptContext::new();
        ctx.add(instance(1, "a", 0), None);
        ctx.add(instance(2, "b", 0), None);
        ctx.add(instance(3, "c", 0), Some(0));
        ctx.add(instance(4, "d", 0), Some(2));
        ctx.add(instance(5, "e", 0), Some(99));
        let ids: Vec<u64> = ctx.ids().iter().map(|id| id.0).collect();
        assert_eq!(ids, vec![3, 1, 4, 2, 5]);
    }

    #[test]
    fn test_selectors() {
        assert_eq!(Selector::parse("ALL"), Selector::All);
        assert_eq!(Selector::parse("2"), Selector::Position(2));
        assert_eq!(
            Selector::parse("2.gate"),
            Selector::Name { nth: 2, name: "gate".to_string() }
        );

        let mut ctx = ScriptContext::new();
        ctx.add(instance(1, "gate open", 0), None);
        ctx.add(instance(2, "bell", 0), None);
        ctx.add(instance(3, "gate close", 0), None);
        let removed = ctx.remove(&Selector::parse("2.gate"));
        assert_eq!(removed[0].id, InstanceId(3));
        assert!(ctx.remove(&Selector::Position(5)).is_empty());
        assert_eq!(ctx.remove(&Selector::All).len(), 2);
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_frame_serializes() {
        let mut frame = Frame::default();
        frame.cursor = 4;
        frame.depth = 2;
        frame.locals.set("x", "5");
        frame.anchors.insert(7, 2);
        let json = serde_json::to_string(&frame).unwrap();
        let back: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frame);
    }

    #[test]
    fn test_idle() {
        let mut t = instance(1, "a", MTRIG_RANDOM);
        assert!(t.ready_for(MTRIG_RANDOM));
        t.frame.depth = 1;
        assert!(!t.is_idle());
        t.frame.reset();
        assert!(t.is_idle());
    }
}
