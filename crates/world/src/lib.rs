//! # Fiery World Model
//!
//! The in-memory world that trigger scripts observe and act on.
//!
//! ## Modules
//!
//! - `character` - Mobiles and players
//! - `object` - Items and where they are
//! - `room` - Rooms and exits
//! - `world` - Entity storage, placement, lookups and extraction
//! - `constants` - Flag and name tables shared with script field access

pub mod character;
pub mod constants;
pub mod error;
pub mod object;
pub mod room;
pub mod world;

// Re-export commonly used types
pub use character::{Abilities, Character, Position, QuestStatus, Sex, Stance};
pub use error::{Result, WorldError};
pub use object::{ObjLocation, Object};
pub use room::{Exit, Room};
pub use world::World;
