//! Entity field accessors
//!
//! One table per entity kind. Each returns the text for `%var.field[arg]%`
//! once the variable has been resolved to a live entity. Unknown fields log and
//! yield an empty string.

pub(crate) mod character;
pub(crate) mod object;
pub(crate) mod room;

use fiery_core::{uid_var, Uid};

/// `count`, a vnum, or the first entry of a list
///
/// # Arguments
/// * `list` - Entries in list order
/// * `arg` - `count`, a vnum, or empty
/// * `vnum_of` - Vnum of an entry, `None` if it no longer resolves
pub(crate) fn list_query(list: &[Uid], arg: &str, vnum_of: impl Fn(Uid) -> Option<i32>) -> String {
    if arg.eq_ignore_ascii_case("count") {
        list.len().to_string()
    } else if !arg.is_empty() {
        let vnum = crate::resolve::atoi(arg);
        uid_var(list.iter().copied().find(|uid| vnum_of(*uid) == Some(vnum)))
    } else {
        uid_var(list.first().copied())
    }
}

/// `1` or `0`
#[inline]
pub(crate) fn flag(set: bool) -> String {
    let text = if set { "1" } else { "0" };
    text.to_string()
}

/// Resolve `%var.field[arg]%` with `var` bound to `target`
#[cfg(test)]
pub(crate) fn read(
    world: &fiery_world::World,
    owner: Uid,
    target: Uid,
    field: &str,
    arg: &str,
) -> (String, crate::log::ScriptLog) {
    use rand::SeedableRng;

    let mut locals = crate::vars::VarList::new();
    locals.set("it", target);
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let mut log = crate::log::ScriptLog::new(16);
    let out = {
        let mut scope = crate::resolve::Scope {
            world,
            owner,
            locals: &locals,
            globals: None,
            rng: &mut rng,
            log: &mut log,
            tag: crate::log::TriggerTag::NONE,
            legacy_string_ge: true,
        };
        crate::resolve::find_replacement(&mut scope, "it", field, arg)
    };
    (out, log)
}
