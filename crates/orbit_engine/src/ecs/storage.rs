//! Dense component storage
//!
//! Each component kind lives in a [`ComponentContainer`]: a dense vector of
//! component values, a parallel dense vector of owning entities, and a
//! generation-checked entity→index map for O(1) lookup.
//!
//! Removal swaps the last record into the vacated slot, so iteration order is
//! NOT stable across removals. Systems that destroy entities while walking a
//! container snapshot the entity list first, walk backwards, or defer the
//! removals until the walk is over.

use std::any::type_name;
use std::cmp::Ordering;

use slotmap::SecondaryMap;

use super::{Component, EcsError, Entity};

/// Dense storage for one component kind
#[derive(Debug, Clone)]
pub struct ComponentContainer<T: Component> {
    components: Vec<T>,
    entities: Vec<Entity>,
    index: SecondaryMap<Entity, usize>,
    /// Set once an entity holds more than one record (event-style kinds)
    has_duplicates: bool,
}

impl<T: Component> Default for ComponentContainer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentContainer<T> {
    /// Create an empty container
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
            entities: Vec::new(),
            index: SecondaryMap::new(),
            has_duplicates: false,
        }
    }

    /// Attach a component to an entity
    ///
    /// Fails with [`EcsError::DuplicateComponent`] if the entity already owns
    /// one of this kind.
    pub fn insert(&mut self, entity: Entity, component: T) -> Result<&mut T, EcsError> {
        if self.has(entity) {
            return Err(EcsError::DuplicateComponent {
                entity,
                component: type_name::<T>(),
            });
        }
        Ok(self.push(entity, component))
    }

    /// Attach a component even if the entity already owns one of this kind
    ///
    /// Used for kinds that model several simultaneous events per entity. The
    /// index map points at the most recent record.
    pub fn insert_with_duplicates(&mut self, entity: Entity, component: T) -> &mut T {
        if self.has(entity) {
            self.has_duplicates = true;
        }
        self.push(entity, component)
    }

    fn push(&mut self, entity: Entity, component: T) -> &mut T {
        let slot = self.components.len();
        self.index.insert(entity, slot);
        self.components.push(component);
        self.entities.push(entity);
        &mut self.components[slot]
    }

    fn missing(entity: Entity) -> EcsError {
        EcsError::MissingComponent {
            entity,
            component: type_name::<T>(),
        }
    }

    /// Component owned by `entity`, or [`EcsError::MissingComponent`]
    pub fn get(&self, entity: Entity) -> Result<&T, EcsError> {
        self.try_get(entity).ok_or_else(|| Self::missing(entity))
    }

    /// Mutable component owned by `entity`, or [`EcsError::MissingComponent`]
    pub fn get_mut(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        let slot = self.index_of(entity).ok_or_else(|| Self::missing(entity))?;
        Ok(&mut self.components[slot])
    }

    /// Component owned by `entity`, if any
    pub fn try_get(&self, entity: Entity) -> Option<&T> {
        self.index_of(entity).map(|slot| &self.components[slot])
    }

    /// Mutable component owned by `entity`, if any
    pub fn try_get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.index_of(entity).map(move |slot| &mut self.components[slot])
    }

    /// Whether `entity` owns a component of this kind. Never fails.
    pub fn has(&self, entity: Entity) -> bool {
        self.index.contains_key(entity)
    }

    /// Detach the entity's component
    ///
    /// A no-op returning `false` when the entity owns none. Otherwise O(1)
    /// swap-removal; the formerly last record takes over the vacated slot. On
    /// containers holding duplicates every record of the entity is dropped.
    pub fn remove(&mut self, entity: Entity) -> bool {
        let Some(slot) = self.index.remove(entity) else {
            return false;
        };

        if self.has_duplicates {
            let components = std::mem::take(&mut self.components);
            let entities = std::mem::take(&mut self.entities);
            for (component, owner) in components.into_iter().zip(entities) {
                if owner != entity {
                    self.components.push(component);
                    self.entities.push(owner);
                }
            }
            self.rebuild_index();
        } else {
            self.components.swap_remove(slot);
            self.entities.swap_remove(slot);
            if let Some(&moved) = self.entities.get(slot) {
                self.index.insert(moved, slot);
            }
        }
        true
    }

    /// Empty the container
    pub fn clear(&mut self) {
        self.components.clear();
        self.entities.clear();
        self.index.clear();
        self.has_duplicates = false;
    }

    /// Re-pack both arrays ordered by entity, rebuilding the index map
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Entity, &Entity) -> Ordering,
    {
        let mut records: Vec<(Entity, T)> = std::mem::take(&mut self.entities)
            .into_iter()
            .zip(std::mem::take(&mut self.components))
            .collect();
        records.sort_by(|(a, _), (b, _)| compare(a, b));

        for (entity, component) in records {
            self.entities.push(entity);
            self.components.push(component);
        }
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (slot, &entity) in self.entities.iter().enumerate() {
            self.index.insert(entity, slot);
        }
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the container holds no records
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Owning entities, parallel to [`Self::components`]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Dense component values
    pub fn components(&self) -> &[T] {
        &self.components
    }

    /// Dense component values, mutable
    pub fn components_mut(&mut self) -> &mut [T] {
        &mut self.components
    }

    /// Dense slot of the entity's (most recent) record
    pub fn index_of(&self, entity: Entity) -> Option<usize> {
        self.index.get(entity).copied()
    }

    /// Entity owning the record at `slot`
    pub fn entity_of(&self, slot: usize) -> Option<Entity> {
        self.entities.get(slot).copied()
    }

    /// Iterate `(entity, component)` pairs in dense order
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.components.iter())
    }

    /// Iterate `(entity, component)` pairs in dense order, mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.entities.iter().copied().zip(self.components.iter_mut())
    }
}

/// Type-erased view of a container, used for registry-wide operations
pub trait ContainerInterface {
    /// Empty the container
    fn clear_all(&mut self);

    /// Number of stored records
    fn size(&self) -> usize;

    /// Detach the entity's component(s); no-op when absent
    fn remove_entity(&mut self, entity: Entity) -> bool;

    /// Whether the entity owns a component of this kind
    fn has_entity(&self, entity: Entity) -> bool;

    /// Name of the stored component type
    fn component_name(&self) -> &'static str;
}

impl<T: Component> ContainerInterface for ComponentContainer<T> {
    fn clear_all(&mut self) {
        self.clear();
    }

    fn size(&self) -> usize {
        self.len()
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity)
    }

    fn has_entity(&self, entity: Entity) -> bool {
        self.has(entity)
    }

    fn component_name(&self) -> &'static str {
        type_name::<T>()
    }
}
