//! # Script Engine
//!
//! Owns the trigger index, every entity's [`ScriptContext`], the wait
//! scheduler and the script error log. The world is not owned here: it is
//! borrowed from the [`crate::ScriptHost`] for each call.

use crate::context::{InstanceId, ScriptContext, Selector, TriggerInstance};
use crate::error::{Result, ScriptError};
use crate::expr::eval_expr;
use crate::index::TriggerIndex;
use crate::log::{DiagnosticKind, ScriptLog, TriggerTag};
use crate::resolve::Scope;
use crate::vars::{VarList, VarValue};
use fiery_config::ScriptConfig;
use fiery_core::{EntityKind, EventQueue, Uid, Vnum};
use fiery_world::constants::MOB_NOSCRIPT;
use fiery_world::World;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

/// How [`ScriptEngine::run`] enters a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Fresh start at the first line
    New,
    /// Continue a suspended trigger where it stopped
    Resume,
}

/// Scheduled resumption of a suspended instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WaitEvent {
    pub owner: Uid,
    pub instance: InstanceId,
}

/// The trigger runtime
pub struct ScriptEngine {
    pub(crate) config: ScriptConfig,
    pub(crate) index: TriggerIndex,
    /// Key: owning entity, Value: its triggers and globals
    pub(crate) scripts: HashMap<Uid, ScriptContext>,
    pub(crate) events: EventQueue<WaitEvent>,
    pub(crate) log: ScriptLog,
    /// Nested `run` calls currently on the stack
    pub(crate) depth: u32,
    next_instance: u64,
    pub(crate) rng: StdRng,
}

impl ScriptEngine {
    /// Create an engine over a loaded trigger index
    #[inline]
    pub fn new(config: ScriptConfig, index: TriggerIndex) -> Self {
        tracing::debug!("Creating ScriptEngine");

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            log: ScriptLog::new(config.log_capacity),
            config,
            index,
            scripts: HashMap::new(),
            events: EventQueue::new(),
            depth: 0,
            next_instance: 1,
            rng,
        }
    }

    pub fn config(&self) -> &ScriptConfig {
        &self.config
    }

    pub fn index(&self) -> &TriggerIndex {
        &self.index
    }

    /// Script error log
    pub fn log(&self) -> &ScriptLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut ScriptLog {
        &mut self.log
    }

    /// Current scheduler pulse
    pub fn now(&self) -> u64 {
        self.events.now()
    }

    /// Suspended instances waiting on the scheduler
    pub fn pending_waits(&self) -> usize {
        self.events.len()
    }

    /// Triggers and globals of an entity, if it has any
    pub fn context(&self, owner: Uid) -> Option<&ScriptContext> {
        self.scripts.get(&owner)
    }

    /// Entities carrying scripts
    pub fn owners(&self) -> Vec<Uid> {
        self.scripts.keys().copied().collect()
    }

    // ---- attach / detach ---------------------------------------------------

    /// Attach a trigger template to an entity
    ///
    /// # Arguments
    /// * `world` - Used to validate the owner
    /// * `owner` - Entity receiving the trigger
    /// * `vnum` - Template to instantiate
    /// * `location` - `None` appends, `Some(n)` inserts at position `n`
    ///
    /// # Returns
    /// The new instance's id
    pub fn attach(&mut self, world: &World, owner: Uid, vnum: Vnum, location: Option<usize>) -> Result<InstanceId> {
        let template = self
            .index
            .get(vnum)
            .cloned()
            .ok_or(ScriptError::NoSuchTrigger(vnum))?;

        if !world.exists(owner) {
            return Err(ScriptError::NoSuchOwner(owner));
        }
        if template.attach_type.entity_kind() != owner.kind() {
            return Err(ScriptError::NotScriptable(owner));
        }
        if let Some(ch) = world.character(owner) {
            if !ch.npc || ch.mob_flagged(MOB_NOSCRIPT) {
                return Err(ScriptError::NotScriptable(owner));
            }
        }

        let id = InstanceId(self.next_instance);
        self.next_instance += 1;
        self.index.instance_created(vnum);

        tracing::debug!("Attaching trigger {} ({}) to {} as {}", vnum, template.name, owner, id);
        self.scripts
            .entry(owner)
            .or_default()
            .add(TriggerInstance::new(id, template), location);
        Ok(id)
    }

    /// Attach every trigger of a prototype's list, in order
    ///
    /// Unknown vnums are logged and skipped.
    pub fn assign_triggers(&mut self, world: &World, owner: Uid, vnums: &[Vnum]) -> Vec<InstanceId> {
        let mut ids = Vec::with_capacity(vnums.len());
        for &vnum in vnums {
            match self.attach(world, owner, vnum, None) {
                Ok(id) => ids.push(id),
                Err(e) => self.log.record(
                    DiagnosticKind::Structural,
                    TriggerTag::NONE,
                    format!("cannot assign trigger {} to {}: {}", vnum, owner, e),
                ),
            }
        }
        ids
    }

    /// Detach triggers from an entity
    ///
    /// # Arguments
    /// * `selector` - `all`, a 1-based position, a name or `N.name`
    ///
    /// # Returns
    /// True if anything was removed
    pub fn detach(&mut self, owner: Uid, selector: &Selector) -> bool {
        let Some(ctx) = self.scripts.get_mut(&owner) else {
            return false;
        };
        let removed = ctx.remove(selector);
        if ctx.is_empty() {
            self.scripts.remove(&owner);
        }
        for instance in &removed {
            self.release(instance);
        }
        !removed.is_empty()
    }

    /// Drop everything attached to an entity that no longer exists
    ///
    /// Pending waits are cancelled before the context goes away. An instance
    /// of this owner that is running right now stops at its next step.
    pub fn purge_owner(&mut self, owner: Uid) {
        let Some(mut ctx) = self.scripts.remove(&owner) else {
            return;
        };
        tracing::debug!("Purging scripts of {}", owner);
        for instance in ctx.remove(&Selector::All) {
            self.release(&instance);
        }
    }

    fn release(&mut self, instance: &TriggerInstance) {
        if let Some(handle) = instance.frame.wait {
            self.events.cancel(handle);
        }
        self.index.instance_dropped(instance.vnum());
    }

    // ---- variables ---------------------------------------------------------

    /// Set a local on one instance before it runs
    ///
    /// # Returns
    /// False if the instance does not exist
    pub fn set_local(&mut self, owner: Uid, id: InstanceId, name: &str, value: impl Into<VarValue>) -> bool {
        match self.instance_mut(owner, id) {
            Some(instance) => {
                instance.frame.locals.set(name, value);
                true
            }
            None => false,
        }
    }

    /// A global of an entity's script
    pub fn global(&self, owner: Uid, name: &str) -> Option<&VarValue> {
        self.scripts.get(&owner)?.globals.get(name)
    }

    /// Set a global; the entity must already carry a script
    pub fn set_global(&mut self, owner: Uid, name: &str, value: impl Into<VarValue>) -> bool {
        match self.scripts.get_mut(&owner) {
            Some(ctx) => {
                ctx.globals.set(name, value);
                true
            }
            None => false,
        }
    }

    /// Evaluate an expression as a script on `owner` would, with no locals
    pub fn evaluate(&mut self, world: &World, owner: Uid, expr: &str) -> String {
        let locals = VarList::new();
        let mut scope = self.scope(world, owner, &locals, TriggerTag::NONE);
        eval_expr(&mut scope, expr)
    }

    // ---- internals ---------------------------------------------------------

    pub(crate) fn instance(&self, owner: Uid, id: InstanceId) -> Option<&TriggerInstance> {
        self.scripts.get(&owner)?.instance(id)
    }

    pub(crate) fn instance_mut(&mut self, owner: Uid, id: InstanceId) -> Option<&mut TriggerInstance> {
        self.scripts.get_mut(&owner)?.instance_mut(id)
    }

    /// Resolution scope for code running on `owner`
    pub(crate) fn scope<'a>(
        &'a mut self,
        world: &'a World,
        owner: Uid,
        locals: &'a VarList,
        tag: TriggerTag<'a>,
    ) -> Scope<'a> {
        Scope {
            world,
            owner,
            locals,
            globals: self.scripts.get(&owner).map(|ctx| &ctx.globals),
            rng: &mut self.rng,
            log: &mut self.log,
            tag,
            legacy_string_ge: self.config.legacy_string_ge,
        }
    }

    /// Instances of `owner` ready for `category`, in list order
    pub(crate) fn ready(&self, owner: Uid, category: u64) -> Vec<(InstanceId, i32, String)> {
        match self.scripts.get(&owner) {
            Some(ctx) if ctx.has_type(category) => ctx
                .instances()
                .filter(|t| t.ready_for(category))
                .map(|t| (t.id, t.narg, t.arglist.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Vnum of an entity for diagnostics
    pub(crate) fn owner_vnum(world: &World, owner: Uid) -> Vnum {
        let vnum = match owner.kind() {
            EntityKind::Character => world.character(owner).map(|c| c.vnum),
            EntityKind::Object => world.object(owner).map(|o| o.vnum),
            EntityKind::Room => world.room(owner).map(|r| r.vnum),
        };
        vnum.unwrap_or(-1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::{AttachType, TriggerTemplate, MTRIG_GREET, WTRIG_RESET};
    use fiery_world::{Character, Room};

    fn setup() -> (ScriptEngine, World, Uid, Uid) {
        let mut index = TriggerIndex::new();
        index.insert(TriggerTemplate::new(100, "greeter", AttachType::Mobile, MTRIG_GREET, "say hi"));
        index.insert(TriggerTemplate::new(200, "reset", AttachType::Room, WTRIG_RESET, "echo reset"));
        let engine = ScriptEngine::new(ScriptConfig::default(), index);

        let mut world = World::new();
        let room = world.create_room(Room::new(3001, "Temple", 30));
        let mob = world.create_character(Character::mobile(3060, "guard", "the guard"));
        world.char_to_room(mob, room).unwrap();
        (engine, world, room, mob)
    }

    #[test]
    fn test_attach_and_detach() {
        let (mut engine, world, room, mob) = setup();
        let id = engine.attach(&world, mob, 100, None).unwrap();
        assert!(engine.instance(mob, id).is_some());
        assert_eq!(engine.index().instance_count(100), 1);
        assert!(engine.attach(&world, room, 200, None).is_ok());

        assert!(engine.detach(mob, &Selector::parse("greeter")));
        assert!(engine.context(mob).is_none());
        assert_eq!(engine.index().instance_count(100), 0);
        assert!(!engine.detach(mob, &Selector::All));
    }

    #[test]
    fn test_attach_rejects_bad_targets() {
        let (mut engine, mut world, room, _) = setup();
        assert!(matches!(
            engine.attach(&world, room, 999, None),
            Err(ScriptError::NoSuchTrigger(999))
        ));
        assert!(matches!(
            engine.attach(&world, room, 100, None),
            Err(ScriptError::NotScriptable(_))
        ));

        let player = world.create_character(Character::player("Aldric"));
        assert!(matches!(
            engine.attach(&world, player, 100, None),
            Err(ScriptError::NotScriptable(_))
        ));
    }

    #[test]
    fn test_assign_skips_unknown() {
        let (mut engine, world, _, mob) = setup();
        let ids = engine.assign_triggers(&world, mob, &[100, 555, 100]);
        assert_eq!(ids.len(), 2);
        assert!(engine.log().contains("cannot assign trigger 555"));
    }

    #[test]
    fn test_globals_and_evaluate() {
        let (mut engine, world, _, mob) = setup();
        assert!(!engine.set_global(mob, "gold", "10"));
        engine.attach(&world, mob, 100, None).unwrap();
        assert!(engine.set_global(mob, "gold", "10"));
        assert_eq!(engine.evaluate(&world, mob, "%gold% * 3"), "30");
        assert_eq!(engine.evaluate(&world, mob, "%self.name%"), "the guard");
    }

    #[test]
    fn test_purge_owner_cancels_waits() {
        let (mut engine, world, _, mob) = setup();
        let id = engine.attach(&world, mob, 100, None).unwrap();
        let handle = engine.events.schedule(WaitEvent { owner: mob, instance: id }, 5);
        engine.instance_mut(mob, id).unwrap().frame.wait = Some(handle);
        assert_eq!(engine.pending_waits(), 1);

        engine.purge_owner(mob);
        assert_eq!(engine.pending_waits(), 0);
        assert!(engine.context(mob).is_none());
    }
}
