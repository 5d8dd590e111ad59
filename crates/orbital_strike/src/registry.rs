//! Component registry
//!
//! One [`ComponentContainer`] per component kind plus the entity allocator.
//! The registry is owned by the frame driver and handed to every system by
//! reference.

use log::debug;
use orbit_engine::prelude::*;

use crate::components::{
    AngularMotion, Animation, Asteroid, Collision, Color, DebugComponent, Hide, HudComponent, IgnorePhysics, MeshRef,
    Missile, Motion, Phase, Planet, PlanetName, Player, RenderRequest, ScreenState, SmokeParticle, SpeedUp, Sun,
    Timer, Wormhole,
};
use crate::error::{GameError, GameResult};

/// Every component container of a game session
#[derive(Debug, Default)]
pub struct Registry {
    entities: Entities,

    /// Turn state singleton
    pub phases: ComponentContainer<Phase>,
    /// Owner of the turn state
    pub players: ComponentContainer<Player>,
    /// Kinematic bodies
    pub motions: ComponentContainer<Motion>,
    /// Bodies on fixed circular paths
    pub angular_motions: ComponentContainer<AngularMotion>,
    /// Bodies outside gravity and collision
    pub ignore_physics: ComponentContainer<IgnorePhysics>,
    /// Missiles in flight
    pub missiles: ComponentContainer<Missile>,
    /// Player planets
    pub planets: ComponentContainer<Planet>,
    /// Planet labels
    pub planet_names: ComponentContainer<PlanetName>,
    /// Countdowns
    pub timers: ComponentContainer<Timer>,
    /// Launch boosts
    pub speed_ups: ComponentContainer<SpeedUp>,
    /// Contact events of the current frame (duplicates allowed)
    pub collisions: ComponentContainer<Collision>,
    /// Drifting hazards
    pub asteroids: ComponentContainer<Asteroid>,
    /// Stars
    pub suns: ComponentContainer<Sun>,
    /// Missile exhaust
    pub smoke_particles: ComponentContainer<SmokeParticle>,
    /// Wormhole ends
    pub wormholes: ComponentContainer<Wormhole>,
    /// HUD elements
    pub huds: ComponentContainer<HudComponent>,
    /// Entities skipped by the renderer this frame
    pub hidden: ComponentContainer<Hide>,
    /// Draw requests
    pub render_requests: ComponentContainer<RenderRequest>,
    /// Sprite-sheet animations
    pub animations: ComponentContainer<Animation>,
    /// Tints
    pub colors: ComponentContainer<Color>,
    /// Collision meshes
    pub mesh_refs: ComponentContainer<MeshRef>,
    /// Full-screen state
    pub screen_states: ComponentContainer<ScreenState>,
    /// Diagnostic markers
    pub debug_components: ComponentContainer<DebugComponent>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh entity with no components
    pub fn create_entity(&mut self) -> Entity {
        self.entities.create()
    }

    /// Whether the handle still refers to a live entity
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn containers(&self) -> [&dyn ContainerInterface; 23] {
        [
            &self.phases,
            &self.players,
            &self.motions,
            &self.angular_motions,
            &self.ignore_physics,
            &self.missiles,
            &self.planets,
            &self.planet_names,
            &self.timers,
            &self.speed_ups,
            &self.collisions,
            &self.asteroids,
            &self.suns,
            &self.smoke_particles,
            &self.wormholes,
            &self.huds,
            &self.hidden,
            &self.render_requests,
            &self.animations,
            &self.colors,
            &self.mesh_refs,
            &self.screen_states,
            &self.debug_components,
        ]
    }

    fn containers_mut(&mut self) -> [&mut dyn ContainerInterface; 23] {
        [
            &mut self.phases,
            &mut self.players,
            &mut self.motions,
            &mut self.angular_motions,
            &mut self.ignore_physics,
            &mut self.missiles,
            &mut self.planets,
            &mut self.planet_names,
            &mut self.timers,
            &mut self.speed_ups,
            &mut self.collisions,
            &mut self.asteroids,
            &mut self.suns,
            &mut self.smoke_particles,
            &mut self.wormholes,
            &mut self.huds,
            &mut self.hidden,
            &mut self.render_requests,
            &mut self.animations,
            &mut self.colors,
            &mut self.mesh_refs,
            &mut self.screen_states,
            &mut self.debug_components,
        ]
    }

    /// Empty every container and release every entity
    pub fn clear_all_components(&mut self) {
        for container in self.containers_mut() {
            container.clear_all();
        }
        self.entities.clear();
    }

    /// Destroy an entity by detaching it from every container
    ///
    /// Idempotent: stale or already destroyed handles are a no-op.
    pub fn remove_all_components_of(&mut self, entity: Entity) {
        for container in self.containers_mut() {
            container.remove_entity(entity);
        }
        self.entities.destroy(entity);
    }

    /// Log the size of every non-empty container
    pub fn list_all_components(&self) {
        debug!("Debug info on all registry entries:");
        for container in self.containers() {
            if container.size() > 0 {
                debug!("{:4} components of type {}", container.size(), container.component_name());
            }
        }
    }

    /// Log every component kind the entity owns
    pub fn list_all_components_of(&self, entity: Entity) {
        debug!("Debug info on components of entity {}:", entity.id());
        for container in self.containers() {
            if container.has_entity(entity) {
                debug!("type {}", container.component_name());
            }
        }
    }

    /// Entity owning the turn state
    pub fn phase_entity(&self) -> GameResult<Entity> {
        self.phases.entity_of(0).ok_or(GameError::MissingSingleton("Phase"))
    }

    /// Current turn state
    pub fn phase(&self) -> GameResult<&Phase> {
        self.phases.components().first().ok_or(GameError::MissingSingleton("Phase"))
    }

    /// Current turn state, mutable
    pub fn phase_mut(&mut self) -> GameResult<&mut Phase> {
        self.phases.components_mut().first_mut().ok_or(GameError::MissingSingleton("Phase"))
    }

    /// Number of component kinds that have a record for `entity`
    pub fn component_count_of(&self, entity: Entity) -> usize {
        self.containers().iter().filter(|c| c.has_entity(entity)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> (Registry, Entity, Entity) {
        let mut registry = Registry::new();
        let a = registry.create_entity();
        let b = registry.create_entity();

        registry.motions.insert(a, Motion::default()).unwrap();
        registry.asteroids.insert(a, Asteroid).unwrap();
        registry.timers.insert(a, Timer::new(5000.0)).unwrap();
        registry.wormholes.insert(a, Wormhole).unwrap();
        registry.collisions.insert_with_duplicates(a, Collision { other_entity: b });
        registry.collisions.insert_with_duplicates(a, Collision { other_entity: b });

        registry.motions.insert(b, Motion::default()).unwrap();
        registry.planets.insert(b, Planet::default()).unwrap();
        registry.collisions.insert_with_duplicates(b, Collision { other_entity: a });
        (registry, a, b)
    }

    #[test]
    fn test_remove_all_components_of() {
        let (mut registry, a, b) = populated();

        registry.remove_all_components_of(a);
        assert_eq!(registry.component_count_of(a), 0);
        assert!(!registry.wormholes.has(a));
        assert!(!registry.collisions.has(a));
        assert!(!registry.is_alive(a));

        assert_eq!(registry.component_count_of(b), 3);
        assert_eq!(registry.collisions.len(), 1);
    }

    #[test]
    fn test_remove_all_is_idempotent() {
        let (mut registry, a, _) = populated();
        registry.remove_all_components_of(a);
        let motions = registry.motions.len();

        registry.remove_all_components_of(a);
        assert_eq!(registry.motions.len(), motions);
        assert_eq!(registry.entity_count(), 1);
    }

    #[test]
    fn test_clear_all_components() {
        let (mut registry, a, b) = populated();
        registry.clear_all_components();
        assert_eq!(registry.component_count_of(a), 0);
        assert_eq!(registry.component_count_of(b), 0);
        assert_eq!(registry.entity_count(), 0);
    }

    #[test]
    fn test_missing_phase_singleton() {
        let registry = Registry::new();
        assert!(matches!(registry.phase(), Err(GameError::MissingSingleton("Phase"))));
        assert!(registry.phase_entity().is_err());
    }
}
