//! Core error types for Fiery

#[derive(thiserror::Error, Debug)]
pub enum FieryError {
    #[error("Script error: {0}")]
    Script(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("World error: {0}")]
    World(String),
}

pub type Result<T> = std::result::Result<T, FieryError>;
