//! Per-frame systems
//!
//! Each frame runs, in order: world rules, physics, collision resolution,
//! camera, HUD visibility and the win check. See [`crate::simulation`].

pub mod collision;
pub mod hud;
pub mod physics;
pub mod world;

pub use collision::resolve_collisions;
pub use hud::update_visibility;
pub use physics::PhysicsSystem;
pub use world::WorldSystem;
