//! Command driver
//!
//! Walks a trigger's program line by line. Block keywords move the cursor and
//! the nesting depth; every other line is substituted and then either handled
//! as a script command (`set`, `eval`, `wait` ...) or passed to the host.
//!
//! The frame is taken out of the instance for the duration of a pass and put
//! back afterwards, so a host command that detaches the instance or destroys
//! the owner simply leaves nothing to put it back into.

use crate::context::{Frame, InstanceId};
use crate::engine::{RunMode, ScriptEngine, WaitEvent};
use crate::expr::{eval_condition, eval_expr, eval_op, truthy};
use crate::host::ScriptHost;
use crate::log::{DiagnosticKind, TriggerTag};
use crate::resolve::atoi;
use crate::subst::substitute;
use crate::trigger::{Keyword, Program, TriggerTemplate, MTRIG_DEATH};
use crate::wait::wait_delay;
use fiery_core::{EntityKind, Uid};
use fiery_world::World;
use std::sync::Arc;

/// How a pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    /// End of program, `halt`, or an abort: back to idle
    Finished,
    /// Waiting on the scheduler; the frame is kept
    Suspended,
}

/// State of one pass over one instance
struct Pass<'t> {
    owner: Uid,
    id: InstanceId,
    template: &'t TriggerTemplate,
    trigger_type: u64,
    frame: Frame,
    ret: i32,
    /// `while` iterations since this pass started
    burst: u32,
}

impl Pass<'_> {
    fn tag(&self) -> TriggerTag<'_> {
        TriggerTag {
            vnum: self.template.vnum,
            name: &self.template.name,
        }
    }
}

impl ScriptEngine {
    /// Run or resume one trigger instance
    ///
    /// # Arguments
    /// * `host` - World access and command execution
    /// * `owner` - Entity the instance is attached to
    /// * `id` - The instance
    /// * `mode` - Start fresh or continue after a `wait`
    ///
    /// # Returns
    /// The script's `return` value, 1 by default, 0 if a character owner
    /// could not act
    pub fn run<H: ScriptHost + ?Sized>(&mut self, host: &mut H, owner: Uid, id: InstanceId, mode: RunMode) -> i32 {
        let Some(instance) = self.instance(owner, id) else {
            return 1;
        };
        if instance.running {
            tracing::debug!("Trigger {} on {} is already running", id, owner);
            return 1;
        }
        let template = Arc::clone(&instance.template);
        let trigger_type = instance.trigger_type;

        if self.depth > self.config.max_script_depth {
            let vnum = Self::owner_vnum(host.world(), owner);
            let place = match owner.kind() {
                EntityKind::Character => "on mob",
                EntityKind::Object => "on obj",
                EntityKind::Room => "in room",
            };
            let tag = TriggerTag {
                vnum: template.vnum,
                name: &template.name,
            };
            self.log.record(
                DiagnosticKind::Runaway,
                tag,
                format!("Triggers recursed beyond maximum allowed depth {} {}", place, vnum),
            );
            return 1;
        }

        let Some(instance) = self.instance_mut(owner, id) else {
            return 1;
        };
        let mut frame = std::mem::take(&mut instance.frame);
        instance.running = true;

        let stale_wait = frame.wait.take();
        if mode == RunMode::New {
            if let Some(handle) = stale_wait {
                self.events.cancel(handle);
            }
            frame.cursor = 0;
            frame.depth = 1;
            frame.loops = 0;
            frame.anchors.clear();
        }

        let mut pass = Pass {
            owner,
            id,
            template: &template,
            trigger_type,
            frame,
            ret: 1,
            burst: 0,
        };

        self.depth += 1;
        let exit = self.drive(host, &mut pass);
        self.depth -= 1;

        let Pass { mut frame, ret, .. } = pass;
        if exit == Exit::Finished {
            frame.reset();
        }
        match self.instance_mut(owner, id) {
            Some(instance) => {
                instance.running = false;
                instance.frame = frame;
            }
            None => {
                if let Some(handle) = frame.wait {
                    self.events.cancel(handle);
                }
            }
        }
        ret
    }

    /// Advance the scheduler one pulse and resume every wait that came due
    pub fn pulse<H: ScriptHost + ?Sized>(&mut self, host: &mut H) {
        for (handle, event) in self.events.advance_entries() {
            // A restart earlier in this batch leaves the instance waiting on a newer handle
            let current = self
                .instance(event.owner, event.instance)
                .map_or(false, |t| t.frame.wait == Some(handle));
            if current {
                self.run(host, event.owner, event.instance, RunMode::Resume);
            }
        }
    }

    fn drive<H: ScriptHost + ?Sized>(&mut self, host: &mut H, pass: &mut Pass<'_>) -> Exit {
        let program = Arc::clone(&pass.template.program);

        while pass.frame.depth > 0 {
            let cursor = pass.frame.cursor;
            let Some(line) = program.get(cursor) else {
                break;
            };

            if !self.still_attached(host.world(), pass) {
                return Exit::Finished;
            }

            if pass.owner.kind() == EntityKind::Character && pass.trigger_type & MTRIG_DEATH == 0 {
                let (awake, casting) = host
                    .world()
                    .character(pass.owner)
                    .map(|ch| (ch.awake(), ch.casting))
                    .unwrap_or((false, false));
                if !awake {
                    pass.ret = 0;
                    return Exit::Finished;
                }
                if casting {
                    self.suspend(pass, self.config.casting_pause);
                    return Exit::Suspended;
                }
            }

            pass.frame.cursor = cursor + 1;

            match line.keyword {
                Keyword::Comment | Keyword::Blank | Keyword::Case | Keyword::Default => {}

                Keyword::If => {
                    if self.condition(host.world(), pass, line.argument()) {
                        pass.frame.depth += 1;
                    } else {
                        let found = self.find_else_end(host.world(), pass, &program, cursor);
                        pass.frame.cursor = found.map_or(program.len(), |c| c + 1);
                    }
                }

                Keyword::ElseIf | Keyword::Else => {
                    if pass.frame.depth == 1 {
                        self.note(DiagnosticKind::Structural, pass, "'else' without 'if'.");
                    } else {
                        pass.frame.cursor = match find_end(&program, cursor) {
                            Some(end) => end + 1,
                            None => {
                                self.note(DiagnosticKind::Structural, pass, "'if' without 'end'.");
                                program.len()
                            }
                        };
                        pass.frame.depth -= 1;
                    }
                }

                Keyword::End => {
                    if pass.frame.depth == 1 {
                        self.note(DiagnosticKind::Structural, pass, "'end' without 'if'.");
                    } else {
                        pass.frame.depth -= 1;
                    }
                }

                Keyword::While => match find_done(&program, cursor) {
                    None => {
                        self.note(DiagnosticKind::Structural, pass, "'while' without 'done'.");
                        return Exit::Finished;
                    }
                    Some(done) => {
                        if self.condition(host.world(), pass, line.argument()) {
                            pass.frame.anchors.insert(done, cursor);
                        } else {
                            pass.frame.cursor = done + 1;
                            pass.burst = 0;
                        }
                    }
                },

                Keyword::Switch => {
                    let found = self.find_case(host.world(), pass, &program, cursor, line.argument());
                    if found.is_none() {
                        self.note(DiagnosticKind::Structural, pass, "'switch' without 'done'.");
                    }
                    pass.frame.cursor = found.map_or(program.len(), |c| c + 1);
                }

                Keyword::Done => {
                    let Some(&start) = pass.frame.anchors.get(&cursor) else {
                        if find_opener(&program, cursor).is_none() {
                            self.note(DiagnosticKind::Structural, pass, "'done' without 'while' or 'switch'.");
                        }
                        continue;
                    };
                    let condition = program.get(start).map(|l| l.argument()).unwrap_or("");
                    if self.condition(host.world(), pass, condition) {
                        pass.frame.cursor = start + 1;
                        pass.burst += 1;
                        pass.frame.loops += 1;
                        if pass.burst >= self.config.loop_burst {
                            self.suspend(pass, 1);
                            return Exit::Suspended;
                        }
                        if pass.frame.loops >= self.config.loop_ceiling {
                            self.note(DiagnosticKind::Runaway, pass, "looped too many times");
                            return Exit::Finished;
                        }
                    }
                }

                Keyword::Break => match find_done(&program, cursor) {
                    Some(done) => {
                        let (ifs, ends) = (cursor + 1..done)
                            .filter_map(|c| program.get(c))
                            .fold((0u32, 0u32), |(ifs, ends), l| match l.keyword {
                                Keyword::If => (ifs + 1, ends),
                                Keyword::End => (ifs, ends + 1),
                                _ => (ifs, ends),
                            });
                        let closed = ends.saturating_sub(ifs);
                        pass.frame.depth = pass.frame.depth.saturating_sub(closed).max(1);
                        pass.frame.cursor = done + 1;
                    }
                    None => {
                        self.note(DiagnosticKind::Structural, pass, "'break' without 'while' or 'switch'.");
                        return Exit::Finished;
                    }
                },

                Keyword::Other => {
                    if let Some(exit) = self.command(host, pass, &line.text) {
                        return exit;
                    }
                }
            }
        }
        Exit::Finished
    }

    /// Substitute and execute an ordinary line
    ///
    /// # Returns
    /// `Some` if the pass must stop here
    fn command<H: ScriptHost + ?Sized>(&mut self, host: &mut H, pass: &mut Pass<'_>, text: &str) -> Option<Exit> {
        let cmd = {
            let tag = pass.tag();
            let mut scope = self.scope(host.world(), pass.owner, &pass.frame.locals, tag);
            substitute(&mut scope, text)
        };
        let (word, rest) = split_word(&cmd);

        match word.to_ascii_lowercase().as_str() {
            "eval" => {
                let (name, expr) = split_word(rest);
                if name.is_empty() {
                    self.note(DiagnosticKind::Structural, pass, format!("Eval w/o an arg: '{}'", cmd));
                } else {
                    let result = {
                        let tag = pass.tag();
                        let mut scope = self.scope(host.world(), pass.owner, &pass.frame.locals, tag);
                        eval_expr(&mut scope, expr)
                    };
                    pass.frame.locals.set(name, result);
                }
            }

            "halt" => return Some(Exit::Finished),

            "global" => {
                if rest.is_empty() {
                    self.note(DiagnosticKind::Structural, pass, format!("Global w/o an arg: '{}'", cmd));
                }
                for name in rest.split_whitespace() {
                    match pass.frame.locals.remove(name) {
                        Some(value) => {
                            if let Some(ctx) = self.scripts.get_mut(&pass.owner) {
                                ctx.globals.set(name, value);
                            }
                        }
                        None => self.note(
                            DiagnosticKind::Structural,
                            pass,
                            format!("Local var '{}' not found in global call", name),
                        ),
                    }
                }
            }

            "return" => {
                let (value, _) = split_word(rest);
                if value.is_empty() {
                    self.note(DiagnosticKind::Structural, pass, format!("Return w/o an arg: '{}'", cmd));
                    pass.ret = 1;
                } else {
                    pass.ret = atoi(value);
                }
            }

            "set" => {
                let (name, value) = split_word(rest);
                if name.is_empty() {
                    self.note(DiagnosticKind::Structural, pass, format!("Set w/o an arg: '{}'", cmd));
                } else {
                    pass.frame.locals.set(name, value);
                }
            }

            "unset" => {
                let (name, _) = split_word(rest);
                if name.is_empty() {
                    self.note(DiagnosticKind::Structural, pass, format!("Unset w/o an arg: '{}'", cmd));
                } else {
                    let global = self
                        .scripts
                        .get_mut(&pass.owner)
                        .and_then(|ctx| ctx.globals.remove(name));
                    if global.is_none() {
                        pass.frame.locals.remove(name);
                    }
                }
            }

            "wait" => {
                if rest.is_empty() {
                    self.note(DiagnosticKind::Structural, pass, format!("Wait w/o an arg: '{}'", cmd));
                } else {
                    let delay = wait_delay(rest, self.events.now(), host.world().time.hours, &self.config);
                    self.suspend(pass, delay);
                    return Some(Exit::Suspended);
                }
            }

            _ => {
                match pass.owner.kind() {
                    EntityKind::Character => host.char_command(self, pass.owner, &cmd),
                    EntityKind::Object => host.obj_command(self, pass.owner, &cmd),
                    EntityKind::Room => host.room_command(self, pass.owner, &cmd),
                }
                if !self.still_attached(host.world(), pass) {
                    return Some(Exit::Finished);
                }
            }
        }
        None
    }

    /// Register the pass's wait with the scheduler
    fn suspend(&mut self, pass: &mut Pass<'_>, delay: u64) {
        let event = WaitEvent {
            owner: pass.owner,
            instance: pass.id,
        };
        pass.frame.wait = Some(self.events.schedule(event, delay));
    }

    /// False once the owner is gone or the instance was detached. A vanished
    /// owner's scripts are purged here.
    fn still_attached(&mut self, world: &World, pass: &Pass<'_>) -> bool {
        if !world.exists(pass.owner) {
            self.purge_owner(pass.owner);
            return false;
        }
        self.instance(pass.owner, pass.id).is_some()
    }

    fn condition(&mut self, world: &World, pass: &Pass<'_>, expr: &str) -> bool {
        let tag = pass.tag();
        let mut scope = self.scope(world, pass.owner, &pass.frame.locals, tag);
        eval_condition(&mut scope, expr)
    }

    fn note(&mut self, kind: DiagnosticKind, pass: &Pass<'_>, message: impl Into<String>) {
        self.log.record(kind, pass.tag(), message);
    }

    /// After a false `if`: the `elseif` that holds, an `else`, or the `end`.
    /// Entering an `elseif` or `else` opens a block.
    fn find_else_end(&mut self, world: &World, pass: &mut Pass<'_>, program: &Program, from: usize) -> Option<usize> {
        let mut c = from + 1;
        while let Some(line) = program.get(c) {
            match line.keyword {
                Keyword::If => match find_end(program, c) {
                    Some(end) => c = end,
                    None => break,
                },
                Keyword::ElseIf => {
                    if self.condition(world, pass, line.argument()) {
                        pass.frame.depth += 1;
                        return Some(c);
                    }
                }
                Keyword::Else => {
                    pass.frame.depth += 1;
                    return Some(c);
                }
                Keyword::End => return Some(c),
                _ => {}
            }
            c += 1;
        }
        self.note(DiagnosticKind::Structural, pass, "'if' without 'end'.");
        None
    }

    /// The `case` equal to the switch value, a `default`, or the closing `done`
    fn find_case(
        &mut self,
        world: &World,
        pass: &Pass<'_>,
        program: &Program,
        from: usize,
        condition: &str,
    ) -> Option<usize> {
        let value = {
            let mut scope = self.scope(world, pass.owner, &pass.frame.locals, pass.tag());
            eval_expr(&mut scope, condition)
        };

        let mut c = from + 1;
        while let Some(line) = program.get(c) {
            match line.keyword {
                Keyword::While | Keyword::Switch => c = find_done(program, c)?,
                Keyword::Case => {
                    let legacy = self.config.legacy_string_ge;
                    let case_value = {
                        let mut scope = self.scope(world, pass.owner, &pass.frame.locals, pass.tag());
                        eval_expr(&mut scope, line.argument())
                    };
                    if truthy(&eval_op("==", &value, &case_value, legacy)) {
                        return Some(c);
                    }
                }
                Keyword::Default | Keyword::Done => return Some(c),
                _ => {}
            }
            c += 1;
        }
        None
    }
}

/// The `end` closing the `if` at `from`, skipping nested blocks
fn find_end(program: &Program, from: usize) -> Option<usize> {
    let mut c = from + 1;
    while let Some(line) = program.get(c) {
        match line.keyword {
            Keyword::If => c = find_end(program, c)?,
            Keyword::End => return Some(c),
            _ => {}
        }
        c += 1;
    }
    None
}

/// The `done` closing the `while` or `switch` block containing `from`
fn find_done(program: &Program, from: usize) -> Option<usize> {
    let mut c = from + 1;
    while let Some(line) = program.get(c) {
        match line.keyword {
            Keyword::While | Keyword::Switch => c = find_done(program, c)?,
            Keyword::Done => return Some(c),
            _ => {}
        }
        c += 1;
    }
    None
}

/// The `while` or `switch` a `done` at `from` closes, skipping nested blocks
fn find_opener(program: &Program, from: usize) -> Option<usize> {
    let mut nested = 0u32;
    for c in (0..from).rev() {
        match program.get(c).map(|line| line.keyword) {
            Some(Keyword::Done) => nested += 1,
            Some(Keyword::While | Keyword::Switch) if nested == 0 => return Some(c),
            Some(Keyword::While | Keyword::Switch) => nested -= 1,
            _ => {}
        }
    }
    None
}

/// First word and the rest, both trimmed at the front
fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(pos) => (&text[..pos], text[pos..].trim_start()),
        None => (text, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_done_skips_nested_blocks() {
        let program = Program::parse("while 1\nswitch 2\ncase 2\ndone\nbreak\ndone\nsay after");
        assert_eq!(find_done(&program, 0), Some(5));
        assert_eq!(find_done(&program, 1), Some(3));
        assert_eq!(find_done(&program, 5), None);
    }

    #[test]
    fn test_find_end_skips_nested_ifs() {
        let program = Program::parse("if 1\nif 2\nend\nsay x\nend");
        assert_eq!(find_end(&program, 0), Some(4));
        assert_eq!(find_end(&program, 1), Some(2));
        assert_eq!(find_end(&program, 4), None);
    }

    #[test]
    fn test_find_opener_matches_nesting() {
        let program = Program::parse("while 1\nswitch 2\ndone\ndone\ndone");
        assert_eq!(find_opener(&program, 2), Some(1));
        assert_eq!(find_opener(&program, 3), Some(0));
        assert_eq!(find_opener(&program, 4), None);
    }

    #[test]
    fn test_split_word() {
        assert_eq!(split_word("  set x  5 6"), ("set", "x  5 6"));
        assert_eq!(split_word("halt"), ("halt", ""));
        assert_eq!(split_word(""), ("", ""));
    }
}
