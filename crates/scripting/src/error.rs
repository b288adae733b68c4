//! Error types for the scripting crate
//!
//! Only loading and attach/detach misuse surface as errors. Problems inside a
//! running trigger are recorded in the script log and never returned.

use fiery_core::{FieryError, Uid, Vnum};

/// Script-specific error types
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Malformed trigger file
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// No template with this vnum is loaded
    #[error("No such trigger: {0}")]
    NoSuchTrigger(Vnum),

    /// The owner cannot carry scripts (players, !SCRIPT mobiles)
    #[error("Entity {0:?} cannot carry scripts")]
    NotScriptable(Uid),

    /// The owner is not a live entity
    #[error("No such owner: {0:?}")]
    NoSuchOwner(Uid),

    /// Trigger file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ScriptError> for FieryError {
    fn from(err: ScriptError) -> Self {
        match err {
            ScriptError::Io(e) => FieryError::Io(e),
            other => FieryError::Script(other.to_string()),
        }
    }
}

/// Result type for scripting operations
pub type Result<T> = std::result::Result<T, ScriptError>;
