//! Host seam
//!
//! The engine never executes game commands itself. Lines that are not script
//! keywords are handed to a [`ScriptHost`] together with the engine, so the
//! command can raise further triggers.

use crate::engine::ScriptEngine;
use fiery_core::Uid;
use fiery_world::World;

/// The game side of script execution
pub trait ScriptHost {
    /// World the scripts read from
    fn world(&self) -> &World;

    /// Execute `line` as if typed by a character
    fn char_command(&mut self, engine: &mut ScriptEngine, ch: Uid, line: &str);

    /// Execute an object command
    fn obj_command(&mut self, engine: &mut ScriptEngine, obj: Uid, line: &str);

    /// Execute a room command
    fn room_command(&mut self, engine: &mut ScriptEngine, room: Uid, line: &str);
}

/// Host that records commands instead of executing them
///
/// Understands one command itself: `purge <target>` extracts the target (or
/// the issuer, with no target) and drops the scripts of everything removed.
#[derive(Default)]
pub struct RecordingHost {
    pub world: World,
    pub commands: Vec<(Uid, String)>,
}

impl RecordingHost {
    #[inline]
    pub fn new(world: World) -> Self {
        tracing::debug!("Creating RecordingHost");
        Self {
            world,
            commands: Vec::new(),
        }
    }

    /// Commands issued by one entity, in order
    pub fn commands_of(&self, uid: Uid) -> Vec<&str> {
        self.commands
            .iter()
            .filter(|(issuer, _)| *issuer == uid)
            .map(|(_, line)| line.as_str())
            .collect()
    }

    /// Every recorded command line, in order
    pub fn lines(&self) -> Vec<&str> {
        self.commands.iter().map(|(_, line)| line.as_str()).collect()
    }

    fn execute(&mut self, engine: &mut ScriptEngine, issuer: Uid, line: &str) {
        tracing::debug!("{} issues: {}", issuer, line.escape_debug());
        self.commands.push((issuer, line.to_string()));

        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        if word.eq_ignore_ascii_case("purge") {
            self.purge(engine, issuer, rest.trim());
        }
    }

    fn purge(&mut self, engine: &mut ScriptEngine, issuer: Uid, target: &str) {
        let victim = if target.is_empty() {
            Some(issuer)
        } else {
            self.world.find_around(issuer, target)
        };
        let Some(victim) = victim else {
            tracing::debug!("purge: nothing called '{}'", target);
            return;
        };
        for gone in self.world.extract(victim) {
            engine.purge_owner(gone);
        }
    }
}

impl ScriptHost for RecordingHost {
    fn world(&self) -> &World {
        &self.world
    }

    fn char_command(&mut self, engine: &mut ScriptEngine, ch: Uid, line: &str) {
        self.execute(engine, ch, line);
    }

    fn obj_command(&mut self, engine: &mut ScriptEngine, obj: Uid, line: &str) {
        self.execute(engine, obj, line);
    }

    fn room_command(&mut self, engine: &mut ScriptEngine, room: Uid, line: &str) {
        self.execute(engine, room, line);
    }
}
