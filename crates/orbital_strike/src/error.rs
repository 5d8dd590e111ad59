//! Game error types

use orbit_engine::config::ConfigError;
use orbit_engine::ecs::EcsError;
use thiserror::Error;

/// Errors surfaced by the game systems
///
/// Every variant is fatal: the frame driver stops and hands the error back to
/// `main` instead of attempting recovery.
#[derive(Error, Debug)]
pub enum GameError {
    /// A component container invariant was violated
    #[error("ECS error: {0}")]
    Ecs(#[from] EcsError),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A world entity the systems rely on (turn state, sun, aimer, player planet) is missing
    #[error("No {0} entity exists")]
    MissingSingleton(&'static str),

    /// A collaborator could not provide data the core relies on
    #[error("Collaborator data unavailable: {0}")]
    MissingCollaboratorData(String),

    /// A required asset is missing
    #[error("Asset error: {0}")]
    Asset(String),
}

/// Result alias used throughout the game crate
pub type GameResult<T> = Result<T, GameError>;
