//! Error types for the world crate

use fiery_core::{FieryError, Uid, Vnum};

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("No mobile prototype: {0}")]
    NoSuchMobile(Vnum),

    #[error("No object prototype: {0}")]
    NoSuchObject(Vnum),

    #[error("No room: {0}")]
    NoSuchRoom(Vnum),

    #[error("Entity not found: {0:?}")]
    NoSuchEntity(Uid),

    #[error("Invalid placement: {0}")]
    InvalidPlacement(String),
}

impl From<WorldError> for FieryError {
    fn from(err: WorldError) -> Self {
        FieryError::World(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WorldError>;
