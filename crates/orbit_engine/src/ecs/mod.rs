//! Entity-Component storage
//!
//! Entities are opaque generation-checked handles; every component kind lives
//! in its own dense [`ComponentContainer`]. There is no entity deletion apart
//! from removing an entity's components from every container.

pub mod component;
pub mod entity;
pub mod storage;

pub use component::Component;
pub use entity::{Entities, Entity};
pub use storage::{ComponentContainer, ContainerInterface};

use thiserror::Error;

/// Container invariant violations
///
/// These signal a programming error in the calling system, not a runtime
/// condition to recover from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The entity already owns a component of this kind
    #[error("{entity:?} already has a {component} component")]
    DuplicateComponent {
        /// Offending entity
        entity: Entity,
        /// Component type name
        component: &'static str,
    },

    /// The entity does not own a component of this kind
    #[error("{entity:?} has no {component} component")]
    MissingComponent {
        /// Offending entity
        entity: Entity,
        /// Component type name
        component: &'static str,
    },
}
