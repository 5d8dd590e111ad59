//! Collision resolution
//!
//! Consumes the contact records left by the physics step. Missiles that reach
//! a wormhole come out of its twin; missiles that reach anything else damage
//! it (planets only) and are destroyed once every record has been handled.

use log::{debug, info};
use orbit_engine::prelude::*;

use crate::collaborators::Renderer;
use crate::components::Animation;
use crate::error::GameResult;
use crate::registry::Registry;

/// Distance past the exit wormhole's centre at which a missile reappears
pub const WORMHOLE_EXIT_OFFSET: f32 = 101.0;

/// Resolve and clear every recorded collision
pub fn resolve_collisions(
    registry: &mut Registry,
    wormholes: Option<(Entity, Entity)>,
    renderer: &dyn Renderer,
) -> GameResult<()> {
    let records: Vec<(Entity, Entity)> = registry
        .collisions
        .iter()
        .map(|(entity, collision)| (entity, collision.other_entity))
        .collect();

    let mut marked = Vec::new();
    for (entity, other) in records {
        let Some(&missile) = registry.missiles.try_get(entity) else {
            continue;
        };

        if registry.wormholes.has(other) {
            let exit = match wormholes {
                Some((first, second)) if other == first => Some(second),
                Some((first, second)) if other == second => Some(first),
                _ => None,
            };
            if let Some(exit) = exit {
                let exit_position = registry.motions.get(exit)?.position;
                let motion = registry.motions.get_mut(entity)?;
                let heading = motion.velocity.try_normalize(f32::EPSILON).unwrap_or_else(Vec2::zeros);
                motion.position = exit_position + WORMHOLE_EXIT_OFFSET * heading;
                debug!("Missile {} warped through wormhole {}", entity.id(), other.id());
            }
            continue;
        }

        if let Some(planet) = registry.planets.try_get_mut(other) {
            planet.old_life = planet.life;
            planet.time_since_change = 0.0;
            planet.life -= missile.damage;
            info!("Planet {} hit for {} (life {})", other.id(), missile.damage, planet.life);
            if planet.life < 0.0 {
                renderer.change_animation(registry, other, Animation::looping(8.0, 8.0))?;
            }
        }
        marked.push(entity);
    }

    for entity in marked {
        registry.remove_all_components_of(entity);
    }
    registry.collisions.clear();
    Ok(())
}
