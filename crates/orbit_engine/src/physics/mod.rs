//! Physics primitives
//!
//! Pure functions and value types with no knowledge of the component
//! registry; the game's physics system applies them to its entities.

pub mod collision;
pub mod gravity;
pub mod integration;

pub use collision::{BoundingCircle, CollisionMesh};
pub use gravity::{gravitational_acceleration, GRAVITATIONAL_CONSTANT};
pub use integration::{rotate_about, semi_implicit_euler};
