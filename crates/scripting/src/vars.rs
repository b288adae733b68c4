//! Script variables
//!
//! Values are tagged at the storage boundary: text that parses as a UID is kept
//! as an entity reference. Whether the entity is still alive is decided when a
//! field is read, never when the value is stored.

use fiery_core::Uid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of a script variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarValue {
    Text(String),
    Entity(Uid),
}

impl VarValue {
    /// Tag raw script text
    pub fn from_text(text: &str) -> Self {
        match Uid::parse(text) {
            Some(uid) => VarValue::Entity(uid),
            None => VarValue::Text(text.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, VarValue::Text(text) if text.is_empty())
    }

    pub fn as_entity(&self) -> Option<Uid> {
        match self {
            VarValue::Entity(uid) => Some(*uid),
            VarValue::Text(_) => None,
        }
    }
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::Text(text) => f.write_str(text),
            VarValue::Entity(uid) => write!(f, "{}", uid),
        }
    }
}

impl From<Uid> for VarValue {
    fn from(uid: Uid) -> Self {
        VarValue::Entity(uid)
    }
}

impl From<&str> for VarValue {
    fn from(text: &str) -> Self {
        VarValue::from_text(text)
    }
}

impl From<String> for VarValue {
    fn from(text: String) -> Self {
        VarValue::from_text(&text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Var {
    pub name: String,
    pub value: VarValue,
}

/// Ordered variable scope with case-insensitive names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarList {
    vars: Vec<Var>,
}

impl VarList {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.vars.iter().position(|var| var.name.eq_ignore_ascii_case(name))
    }

    pub fn get(&self, name: &str) -> Option<&VarValue> {
        self.position(name).map(|pos| &self.vars[pos].value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Set a variable, replacing any previous value
    pub fn set(&mut self, name: &str, value: impl Into<VarValue>) {
        let value = value.into();
        match self.position(name) {
            Some(pos) => self.vars[pos].value = value,
            None => self.vars.push(Var {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<VarValue> {
        self.position(name).map(|pos| self.vars.remove(pos).value)
    }

    pub fn clear(&mut self) {
        self.vars.clear();
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Var> {
        self.vars.iter()
    }
}
