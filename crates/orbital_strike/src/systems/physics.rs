//! Gravity, integration and missile collision detection

use log::trace;
use orbit_engine::foundation::math::{constants::HALF_PI, utils};
use orbit_engine::physics::{gravitational_acceleration, rotate_about, semi_implicit_euler};
use orbit_engine::prelude::*;

use crate::collaborators::{Audio, Renderer, SoundEffect};
use crate::components::Collision;
use crate::config::PhysicsConfig;
use crate::error::GameResult;
use crate::registry::Registry;

/// Per-frame physics step
///
/// Runs only while the turn state is simulating; during planning every body
/// stays frozen.
#[derive(Debug, Clone)]
pub struct PhysicsSystem {
    gravitational_constant: f32,
}

impl Default for PhysicsSystem {
    fn default() -> Self {
        Self::new(&PhysicsConfig::default())
    }
}

impl PhysicsSystem {
    /// Physics system with the configured constants
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            gravitational_constant: config.gravitational_constant,
        }
    }

    /// Advance every body by `elapsed_ms` and record missile contacts
    pub fn step(
        &self,
        registry: &mut Registry,
        renderer: &dyn Renderer,
        audio: &mut dyn Audio,
        elapsed_ms: f32,
    ) -> GameResult<()> {
        if !registry.phase()?.simulation {
            return Ok(());
        }
        let step_seconds = elapsed_ms / 1000.0;

        self.integrate(registry, step_seconds);
        Self::detect_missile_collisions(registry, renderer, audio)
    }

    /// Gravity sources as they stand at the start of the step
    fn gravity_sources(registry: &Registry) -> Vec<(Entity, Vec2, f32)> {
        registry
            .motions
            .iter()
            .filter(|(entity, _)| !registry.ignore_physics.has(*entity))
            .map(|(entity, motion)| (entity, motion.position, motion.mass))
            .collect()
    }

    /// Summed acceleration on `entity` at `position` from every other source
    pub fn gravity_on(&self, sources: &[(Entity, Vec2, f32)], entity: Entity, position: Vec2) -> Vec2 {
        sources
            .iter()
            .filter(|(other, _, _)| *other != entity)
            .fold(Vec2::zeros(), |total, &(_, source, mass)| {
                total + gravitational_acceleration(self.gravitational_constant, position, source, mass)
            })
    }

    fn integrate(&self, registry: &mut Registry, step_seconds: f32) {
        let sources = Self::gravity_sources(registry);
        let Registry {
            motions,
            speed_ups,
            angular_motions,
            ignore_physics,
            asteroids,
            ..
        } = registry;

        for (entity, motion) in motions.iter_mut() {
            if angular_motions.has(entity) {
                // velocity holds the orbit centre, angle the angular velocity
                motion.position = rotate_about(motion.position, motion.velocity, step_seconds * motion.angle);
                continue;
            }

            let speed_boost = speed_ups.try_get(entity).map_or(1.0, |speed| speed.boost);
            let gravity = if ignore_physics.has(entity) {
                Vec2::zeros()
            } else {
                self.gravity_on(&sources, entity, motion.position)
            };

            let (position, velocity) =
                semi_implicit_euler(motion.position, motion.velocity, gravity, step_seconds, speed_boost);
            motion.position = position;
            motion.velocity = velocity;

            if asteroids.has(entity) {
                motion.angle += step_seconds * HALF_PI;
            } else if motion.velocity.norm_squared() > 0.0 {
                motion.angle = utils::heading(motion.velocity);
            }
        }
    }

    fn detect_missile_collisions(
        registry: &mut Registry,
        renderer: &dyn Renderer,
        audio: &mut dyn Audio,
    ) -> GameResult<()> {
        let mut contacts = Vec::new();

        for &missile in registry.missiles.entities() {
            let mesh = renderer.mesh(registry.mesh_refs.get(missile)?.0)?;
            let missile_position = registry.motions.get(missile)?.position;

            for (other, motion) in registry.motions.iter() {
                if registry.missiles.has(other) || registry.ignore_physics.has(other) {
                    continue;
                }
                let target = BoundingCircle::new(motion.position, motion.radius);
                if mesh.any_vertex_within(missile_position, &target) {
                    contacts.push((missile, other));
                }
            }
        }

        for (missile, other) in contacts {
            trace!("Missile {} touched {}", missile.id(), other.id());
            audio.play(SoundEffect::MissileDestroyed);
            registry.collisions.insert_with_duplicates(missile, Collision { other_entity: other });
            registry.collisions.insert_with_duplicates(other, Collision { other_entity: missile });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{HeadlessRenderer, SilentAudio};
    use crate::components::{AngularMotion, Asteroid, IgnorePhysics, MeshRef, Missile, MissileVariant, Motion, GeometryId};
    use crate::factory;
    use approx::assert_relative_eq;

    fn simulating_registry() -> Registry {
        let mut registry = Registry::new();
        factory::create_phase(&mut registry).unwrap();
        registry.phase_mut().unwrap().simulation = true;
        registry
    }

    fn body(registry: &mut Registry, position: Vec2, mass: f32) -> Entity {
        let entity = registry.create_entity();
        registry
            .motions
            .insert(entity, Motion { position, mass, radius: 10.0, ..Motion::default() })
            .unwrap();
        entity
    }

    #[test]
    fn test_frozen_while_planning() {
        let mut registry = Registry::new();
        factory::create_phase(&mut registry).unwrap();
        let a = body(&mut registry, Vec2::zeros(), 1.0);
        registry.motions.get_mut(a).unwrap().velocity = Vec2::new(10.0, 0.0);

        PhysicsSystem::default()
            .step(&mut registry, &HeadlessRenderer::new(), &mut SilentAudio::new(), 1000.0)
            .unwrap();
        assert_eq!(registry.motions.get(a).unwrap().position, Vec2::zeros());
    }

    #[test]
    fn test_acceleration_ratio_is_inverse_mass_ratio() {
        let mut registry = simulating_registry();
        let light = body(&mut registry, Vec2::zeros(), 2.0);
        let heavy = body(&mut registry, Vec2::new(100.0, 0.0), 6.0);

        PhysicsSystem::default()
            .step(&mut registry, &HeadlessRenderer::new(), &mut SilentAudio::new(), 10.0)
            .unwrap();

        let a_light = registry.motions.get(light).unwrap().velocity / 0.01;
        let a_heavy = registry.motions.get(heavy).unwrap().velocity / 0.01;
        assert_relative_eq!(a_light.x, 10_000.0 * 6.0 / 10_000.0, epsilon = 1e-3);
        assert_relative_eq!(a_light.x / -a_heavy.x, 6.0 / 2.0, epsilon = 1e-4);
        assert_relative_eq!(a_light.x * 2.0, -a_heavy.x * 6.0, epsilon = 1e-3);
    }

    #[test]
    fn test_ignored_bodies_neither_pull_nor_fall() {
        let mut registry = simulating_registry();
        let a = body(&mut registry, Vec2::zeros(), 1.0);
        let ghost = body(&mut registry, Vec2::new(100.0, 0.0), 1000.0);
        registry.ignore_physics.insert(ghost, IgnorePhysics).unwrap();

        PhysicsSystem::default()
            .step(&mut registry, &HeadlessRenderer::new(), &mut SilentAudio::new(), 100.0)
            .unwrap();
        assert_eq!(registry.motions.get(a).unwrap().velocity, Vec2::zeros());
        assert_eq!(registry.motions.get(ghost).unwrap().velocity, Vec2::zeros());
    }

    #[test]
    fn test_angular_bodies_orbit_their_centre() {
        let mut registry = simulating_registry();
        let planet = body(&mut registry, Vec2::new(100.0, 0.0), 1.0);
        registry.angular_motions.insert(planet, AngularMotion).unwrap();
        registry.motions.get_mut(planet).unwrap().angle = HALF_PI;

        PhysicsSystem::default()
            .step(&mut registry, &HeadlessRenderer::new(), &mut SilentAudio::new(), 1000.0)
            .unwrap();
        assert_relative_eq!(registry.motions.get(planet).unwrap().position, Vec2::new(0.0, 100.0), epsilon = 1e-3);
    }

    #[test]
    fn test_asteroids_spin_and_missiles_face_velocity() {
        let mut registry = simulating_registry();
        let rock = body(&mut registry, Vec2::new(5000.0, 0.0), 1.0);
        registry.asteroids.insert(rock, Asteroid).unwrap();
        registry.ignore_physics.insert(rock, IgnorePhysics).unwrap();
        registry.motions.get_mut(rock).unwrap().velocity = Vec2::new(0.0, 5.0);

        let dart = body(&mut registry, Vec2::new(-5000.0, 0.0), 1.0);
        registry.ignore_physics.insert(dart, IgnorePhysics).unwrap();
        registry.motions.get_mut(dart).unwrap().velocity = Vec2::new(0.0, -5.0);

        PhysicsSystem::default()
            .step(&mut registry, &HeadlessRenderer::new(), &mut SilentAudio::new(), 1000.0)
            .unwrap();
        assert_relative_eq!(registry.motions.get(rock).unwrap().angle, HALF_PI);
        assert_relative_eq!(registry.motions.get(dart).unwrap().angle, -HALF_PI);
    }

    #[test]
    fn test_missile_contact_recorded_both_ways() {
        let mut registry = simulating_registry();
        let planet = body(&mut registry, Vec2::new(100.0, 0.0), 0.0);
        registry.motions.get_mut(planet).unwrap().radius = 50.0;
        registry.angular_motions.insert(planet, AngularMotion).unwrap();

        let missile = body(&mut registry, Vec2::new(49.8, 0.0), 0.0);
        registry.missiles.insert(missile, Missile { damage: 50.0, variant: MissileVariant::Standard }).unwrap();
        registry.mesh_refs.insert(missile, MeshRef(GeometryId::Missile)).unwrap();

        let mut audio = SilentAudio::new();
        PhysicsSystem::default()
            .step(&mut registry, &HeadlessRenderer::new(), &mut audio, 0.0)
            .unwrap();

        assert_eq!(registry.collisions.len(), 2);
        assert_eq!(registry.collisions.get(missile).unwrap().other_entity, planet);
        assert_eq!(registry.collisions.get(planet).unwrap().other_entity, missile);
        assert_eq!(audio.count(SoundEffect::MissileDestroyed), 1);
    }
}
