//! Fiery Core - Fundamental types and utilities shared by the world model and the script runtime

mod error;
mod types;
mod arena;
mod time;
mod events;

pub use error::*;
pub use types::*;
pub use arena::*;
pub use time::*;
pub use events::*;
