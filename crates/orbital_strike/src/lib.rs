//! # Orbital Strike
//!
//! Two players take turns firing missiles from planets that orbit a sun.
//! Missiles bend around every massive body, may pass through a pair of
//! wormholes, and dodge drifting asteroids. A planet whose life reaches zero
//! ends the match.
//!
//! This crate holds the simulation core: the component registry, the entity
//! recipes, the world/physics/collision systems, input translation and the
//! frame driver. Rendering and audio are reached through the traits in
//! [`collaborators`].
//!
//! ## Quick Start
//!
//! ```rust
//! use orbital_strike::prelude::*;
//!
//! let mut sim = Simulation::headless(&GameConfig::default()).unwrap();
//! sim.execute(Command::ShiftPhase).unwrap();
//! sim.frame(16.0).unwrap();
//! assert_eq!(sim.phase().unwrap().phase, WorldPhase::Tut1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::cast_precision_loss
)]

pub mod camera;
pub mod collaborators;
pub mod components;
pub mod config;
pub mod error;
pub mod factory;
pub mod input;
pub mod registry;
pub mod simulation;
pub mod systems;

pub use error::{GameError, GameResult};

/// Common imports for game users
pub mod prelude {
    pub use crate::{
        camera::CameraSystem,
        collaborators::{Audio, Camera, HeadlessRenderer, Renderer, SilentAudio, SoundEffect},
        components::{MissileVariant, Motion, Phase, PhaseSet, Planet, WorldPhase},
        config::GameConfig,
        error::{GameError, GameResult},
        input::{Action, Command, InputEvent, Key, KeyBindings, Modifiers, MouseButton},
        registry::Registry,
        simulation::Simulation,
    };
}
