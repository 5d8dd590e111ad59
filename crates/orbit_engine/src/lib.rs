//! # Orbit Engine
//!
//! The engine layer underneath Orbital Strike: sparse/dense component storage
//! keyed by generation-checked entities, 2D math on top of nalgebra, and the
//! gravity, integration and collision primitives the game's systems are built
//! from.
//!
//! ## Quick Start
//!
//! ```rust
//! use orbit_engine::prelude::*;
//!
//! let mut entities = Entities::new();
//! let mut positions: ComponentContainer<Vec2> = ComponentContainer::new();
//!
//! let ship = entities.create();
//! positions.insert(ship, Vec2::new(10.0, 0.0)).unwrap();
//! assert!(positions.has(ship));
//!
//! positions.remove(ship);
//! assert!(!positions.has(ship));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod foundation;
pub mod physics;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        ecs::{Component, ComponentContainer, ContainerInterface, EcsError, Entities, Entity},
        foundation::math::{Mat3, Transform2D, Vec2, Vec3},
        physics::{
            collision::{BoundingCircle, CollisionMesh},
            gravity::{gravitational_acceleration, GRAVITATIONAL_CONSTANT},
        },
    };
}
