//! Entity handles and allocation

use slotmap::{Key, SlotMap};

slotmap::new_key_type! {
    /// Entity identifier
    ///
    /// A slot index paired with a generation counter. A destroyed entity's slot
    /// can be handed out again, but the old handle keeps its old generation and
    /// never resolves to the newcomer.
    pub struct Entity;
}

impl Entity {
    /// Packed slot/generation value, stable for the lifetime of the handle
    pub fn id(self) -> u64 {
        self.data().as_ffi()
    }
}

/// Entity allocator
///
/// Entities carry no data of their own; an entity exists for as long as it
/// has not been destroyed, whether or not it currently owns components.
#[derive(Debug, Default)]
pub struct Entities {
    slots: SlotMap<Entity, ()>,
}

impl Entities {
    /// Create an empty allocator
    pub fn new() -> Self {
        Self { slots: SlotMap::with_key() }
    }

    /// Allocate a fresh entity
    pub fn create(&mut self) -> Entity {
        self.slots.insert(())
    }

    /// Release an entity. Returns `false` for stale or already destroyed handles.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        self.slots.remove(entity).is_some()
    }

    /// Whether the handle still refers to a live entity
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.slots.contains_key(entity)
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no entity is alive
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Release every entity
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entities_are_unique() {
        let mut entities = Entities::new();
        let a = entities.create();
        let b = entities.create();
        assert_ne!(a, b);
        assert_ne!(a.id(), b.id());
        assert_eq!(entities.len(), 2);
    }

    #[test]
    fn test_stale_handle_after_slot_reuse() {
        let mut entities = Entities::new();
        let old = entities.create();
        assert!(entities.destroy(old));
        assert!(!entities.destroy(old));

        let reused = entities.create();
        assert_ne!(old, reused);
        assert!(!entities.is_alive(old));
        assert!(entities.is_alive(reused));
    }
}
