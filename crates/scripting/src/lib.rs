//! # Fiery Scripting
//!
//! Trigger scripts attached to mobiles, objects and rooms.
//!
//! ## Features
//! - Trigger files loaded into a shared, immutable [`TriggerIndex`]
//! - `%var.field[arg]%` substitution against the live world
//! - Text expression evaluator with a fixed operator priority
//! - Line driver for `if`/`while`/`switch` blocks, variables and `wait`
//! - Suspended triggers resumed by a pulse scheduler
//! - Event hooks (`greet`, `command`, `speech`, random sweeps ...)
//!
//! ## Execution
//!
//! A trigger never blocks. `wait` stores the instance's frame and schedules
//! a resume; [`ScriptEngine::pulse`] fires resumes as they come due. Game
//! commands issued by scripts go through a [`ScriptHost`].

pub mod context;
mod driver;
pub mod engine;
pub mod error;
pub mod expr;
mod fields;
pub mod host;
pub mod index;
pub mod log;
mod resolve;
mod subst;
pub mod trigger;
pub mod triggers;
pub mod vars;
pub mod wait;

pub use context::{Frame, InstanceId, ScriptContext, Selector, TriggerInstance};
pub use engine::{RunMode, ScriptEngine};
pub use error::{Result, ScriptError};
pub use host::{RecordingHost, ScriptHost};
pub use index::TriggerIndex;
pub use log::{DiagnosticKind, LogEntry, ScriptLog};
pub use trigger::{AttachType, Keyword, Program, TriggerTemplate};
pub use vars::{VarList, VarValue};
