//! Entity recipes
//!
//! Each function assembles one kind of composite entity. All components of an
//! entity are inserted before the function returns, so systems never observe
//! a half-built entity.

use orbit_engine::foundation::math::{constants::PI, utils};
use orbit_engine::prelude::*;
use rand::Rng;

use crate::collaborators::{Audio, Renderer, SoundEffect};
use crate::components::{
    AngularMotion, Animation, Asteroid, Color, DebugComponent, EffectId, GeometryId, HudComponent, IgnorePhysics,
    MeshRef, Missile, MissileVariant, Motion, Phase, PhaseSet, Planet, PlanetName, Player, RenderRequest, ScreenState,
    SmokeParticle, SpeedUp, Sun, TextureId, Timer, Wormhole,
};
use crate::config::WorldConfig;
use crate::error::GameResult;
use crate::registry::Registry;

/// Launch speed of every missile before variant modifiers
pub const MISSILE_SPEED: f32 = 300.0;

/// Mass of a missile that does not pull on anything
pub const MISSILE_MASS: f32 = 1e-24;

/// Mass given to gravity missiles after launch
pub const GRAVITY_MISSILE_MASS: f32 = 3000.0;

/// Motion entity with an explicit scale
pub fn create_motion_entity(
    registry: &mut Registry,
    request: RenderRequest,
    position: Vec2,
    velocity: Vec2,
    scale: Vec2,
    angle: f32,
    mass: f32,
    radius: f32,
) -> GameResult<Entity> {
    let entity = registry.create_entity();
    registry.motions.insert(
        entity,
        Motion {
            position,
            velocity,
            scale,
            angle,
            mass,
            radius,
        },
    )?;
    registry.render_requests.insert(entity, request)?;
    Ok(entity)
}

/// Motion entity whose scale is relative to its mesh's original size
pub fn create_scaled_motion_entity(
    registry: &mut Registry,
    renderer: &dyn Renderer,
    request: RenderRequest,
    position: Vec2,
    velocity: Vec2,
    scale: f32,
    angle: f32,
    mass: f32,
    radius: f32,
) -> GameResult<Entity> {
    let size = renderer.mesh(request.geometry)?.original_size;
    create_motion_entity(registry, request, position, velocity, size * scale, angle, mass, radius)
}

/// Body circling `centre` at `angular_velocity` rad/s
///
/// The centre is kept in `Motion::velocity` and the angular velocity in
/// `Motion::angle`.
pub fn create_angular_motion_entity(
    registry: &mut Registry,
    renderer: &dyn Renderer,
    request: RenderRequest,
    position: Vec2,
    centre: Vec2,
    angular_velocity: f32,
    scale: f32,
    mass: f32,
    radius: f32,
) -> GameResult<Entity> {
    let entity =
        create_scaled_motion_entity(registry, renderer, request, position, centre, scale, angular_velocity, mass, radius)?;
    registry.angular_motions.insert(entity, AngularMotion)?;
    Ok(entity)
}

/// Owner of the turn state, created once per session
pub fn create_phase(registry: &mut Registry) -> GameResult<Entity> {
    let entity = registry.create_entity();
    registry.phases.insert(entity, Phase::default())?;
    registry.players.insert(entity, Player)?;
    Ok(entity)
}

/// Full-screen state, created once per session
pub fn create_screen_state(registry: &mut Registry) -> GameResult<Entity> {
    let entity = registry.create_entity();
    registry.screen_states.insert(entity, ScreenState::default())?;
    Ok(entity)
}

/// Star field covering the scene while keeping its aspect ratio
pub fn create_background(registry: &mut Registry, scene_size: Vec2) -> GameResult<Entity> {
    const IMAGE_SIZE: (f32, f32) = (25056.0, 15900.0);

    let preferred_ratio = scene_size.x / scene_size.y;
    let image_ratio = IMAGE_SIZE.0 / IMAGE_SIZE.1;
    let scale = if image_ratio > preferred_ratio {
        Vec2::new(scene_size.y * image_ratio, scene_size.y)
    } else {
        Vec2::new(scene_size.x, scene_size.x / image_ratio)
    };

    let entity = create_motion_entity(
        registry,
        RenderRequest::sprite(TextureId::Background),
        Vec2::zeros(),
        Vec2::zeros(),
        scale,
        0.0,
        1.0,
        0.0,
    )?;
    registry.mesh_refs.insert(entity, MeshRef(GeometryId::Sprite))?;
    registry.ignore_physics.insert(entity, IgnorePhysics)?;
    Ok(entity)
}

/// Animated star; its collision radius equals its scale
pub fn create_sun(registry: &mut Registry, renderer: &dyn Renderer, position: Vec2, scale: f32, mass: f32) -> GameResult<Entity> {
    let entity = create_angular_motion_entity(
        registry,
        renderer,
        RenderRequest::animated(TextureId::Sun),
        position,
        Vec2::zeros(),
        0.0,
        scale,
        mass,
        scale,
    )?;
    registry.suns.insert(entity, Sun)?;
    registry.animations.insert(entity, Animation::looping(20.0, 20.0))?;
    Ok(entity)
}

/// Stationary wormhole end with a detection radius of 100
pub fn create_wormhole(registry: &mut Registry, renderer: &dyn Renderer, position: Vec2, scale: f32, mass: f32) -> GameResult<Entity> {
    let entity = create_angular_motion_entity(
        registry,
        renderer,
        RenderRequest::animated(TextureId::Wormhole),
        position,
        position,
        0.0,
        scale,
        mass,
        100.0,
    )?;
    registry.wormholes.insert(entity, Wormhole)?;
    registry.animations.insert(entity, Animation::looping(20.0, 20.0))?;
    Ok(entity)
}

/// Player planet orbiting the origin
///
/// Drawn at twice `scale`, collides at `scale`.
pub fn create_planet(
    registry: &mut Registry,
    renderer: &dyn Renderer,
    position: Vec2,
    scale: f32,
    mass: f32,
    color: Color,
    angular_velocity: f32,
) -> GameResult<Entity> {
    let entity = create_angular_motion_entity(
        registry,
        renderer,
        RenderRequest::animated(TextureId::Ice),
        position,
        Vec2::zeros(),
        angular_velocity,
        2.0 * scale,
        mass,
        scale,
    )?;
    registry.planets.insert(entity, Planet { color, ..Planet::default() })?;
    registry.planet_names.insert(entity, PlanetName)?;
    registry.animations.insert(entity, Animation::looping(20.0, 20.0))?;
    Ok(entity)
}

fn sample_square<R: Rng + ?Sized>(rng: &mut R, extent: f32) -> Vec2 {
    Vec2::new(-extent + 2.0 * extent * rng.gen::<f32>(), -extent + 2.0 * extent * rng.gen::<f32>())
}

fn rejection_sample<R: Rng + ?Sized>(
    rng: &mut R,
    extent: f32,
    attempts: u32,
    accept: impl Fn(Vec2) -> bool,
) -> Option<Vec2> {
    (0..attempts).map(|_| sample_square(rng, extent)).find(|&p| accept(p))
}

/// Spawn positions for a pair of bodies (wormholes or planets)
///
/// Both lie in the spawn square, farther than the minimum distance from the
/// origin, and their distances from the origin differ by more than the
/// minimum separation. Sampling gives up after the configured number of
/// attempts and places the bodies deterministically on opposite sides.
pub fn sample_spawn_pair<R: Rng + ?Sized>(rng: &mut R, world: &WorldConfig) -> (Vec2, Vec2) {
    let far_enough = |p: Vec2| p.norm() > world.spawn_min_distance;

    let first = rejection_sample(rng, world.spawn_extent, world.spawn_max_attempts, far_enough).unwrap_or_else(|| {
        log::warn!("Spawn sampling exhausted, using fallback position");
        let distance = ((world.spawn_min_distance + world.spawn_extent) / 2.0).max(world.spawn_min_distance + 1.0);
        Vec2::new(distance, 0.0)
    });

    let r1 = first.norm();
    let second = rejection_sample(rng, world.spawn_extent, world.spawn_max_attempts, |p| {
        far_enough(p) && (r1 - p.norm()).abs() > world.spawn_min_separation
    })
    .unwrap_or_else(|| {
        log::warn!("Spawn sampling exhausted, using fallback position");
        let outward = r1 + world.spawn_min_separation + 1.0;
        let r2 = if outward <= world.spawn_extent {
            outward
        } else {
            (r1 - world.spawn_min_separation - 1.0).max(world.spawn_min_distance + 1.0)
        };
        -first.try_normalize(f32::EPSILON).unwrap_or_else(|| Vec2::new(1.0, 0.0)) * r2
    });

    (first, second)
}

/// Drifting asteroid heading back towards the centre
///
/// Carries a respawn timer that spawns a replacement when it expires.
pub fn create_asteroid<R: Rng + ?Sized>(
    registry: &mut Registry,
    renderer: &dyn Renderer,
    rng: &mut R,
    world: &WorldConfig,
) -> GameResult<Entity> {
    let position = rejection_sample(rng, world.asteroid_extent, world.spawn_max_attempts, |p| {
        p.norm() > world.spawn_min_distance
    })
    .unwrap_or_else(|| Vec2::repeat(world.asteroid_extent));

    let speed = 100.0 + 200.0 * rng.gen::<f32>();
    let scale = 100.0 + 200.0 * rng.gen::<f32>();
    let texture = match (rng.gen::<f32>() * 10.0).floor() {
        ra if ra < 3.0 => TextureId::Asteroid,
        ra if ra < 6.0 => TextureId::Asteroid2,
        _ => TextureId::Asteroid3,
    };

    let inward = |c: f32| if c > 0.0 { -speed } else { speed };
    let velocity = Vec2::new(inward(position.x), inward(position.y));

    let entity = create_scaled_motion_entity(
        registry,
        renderer,
        RenderRequest::sprite(texture),
        position,
        velocity,
        scale,
        0.0,
        1.0,
        0.0,
    )?;
    registry.asteroids.insert(entity, Asteroid)?;
    registry.ignore_physics.insert(entity, IgnorePhysics)?;
    registry.timers.insert(entity, Timer::new(world.asteroid_respawn_ms))?;
    log::debug!("Spawned asteroid at ({:.0}, {:.0})", position.x, position.y);
    Ok(entity)
}

/// Exhaust puff that drifts briefly and dies after one second of simulation
pub fn create_particle<R: Rng + ?Sized>(
    registry: &mut Registry,
    renderer: &dyn Renderer,
    rng: &mut R,
    position: Vec2,
    scale: f32,
) -> GameResult<Entity> {
    let velocity = Vec2::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0));
    let jitter: f32 = rng.gen_range(0.1..1.0);

    let entity = create_scaled_motion_entity(
        registry,
        renderer,
        RenderRequest::new(None, EffectId::Smoke, GeometryId::Smoke),
        position,
        velocity,
        scale * jitter,
        0.0,
        1.0,
        0.0,
    )?;
    registry.smoke_particles.insert(entity, SmokeParticle)?;
    registry.ignore_physics.insert(entity, IgnorePhysics)?;
    registry.timers.insert(entity, Timer::death(1000.0))?;
    Ok(entity)
}

/// Screen-space element visible in `phases`
pub fn create_hud_component(
    registry: &mut Registry,
    position: Vec2,
    scale: Vec2,
    request: RenderRequest,
    phases: PhaseSet,
) -> GameResult<Entity> {
    let entity = create_motion_entity(registry, request, position, Vec2::zeros(), scale, 0.0, 1.0, 0.0)?;
    registry.huds.insert(entity, HudComponent { phases })?;
    registry.ignore_physics.insert(entity, IgnorePhysics)?;
    Ok(entity)
}

/// Aiming arrow shown next to the active planet while planning
pub fn create_aimer(registry: &mut Registry, renderer: &dyn Renderer, position: Vec2, direction: Vec2) -> GameResult<Entity> {
    let entity = create_scaled_motion_entity(
        registry,
        renderer,
        RenderRequest::new(None, EffectId::Missile, GeometryId::Missile),
        position,
        Vec2::zeros(),
        10.0,
        utils::heading(direction) + PI,
        1.0,
        0.0,
    )?;
    registry.ignore_physics.insert(entity, IgnorePhysics)?;
    registry.colors.insert(entity, Color::new(0.2, 0.2, 0.2))?;
    Ok(entity)
}

/// Single missile; always collides using the standard hull
pub fn create_missile(
    registry: &mut Registry,
    renderer: &dyn Renderer,
    audio: &mut dyn Audio,
    position: Vec2,
    velocity: Vec2,
    scale: f32,
    damage: f32,
    variant: MissileVariant,
    geometry: GeometryId,
) -> GameResult<Entity> {
    let entity = create_scaled_motion_entity(
        registry,
        renderer,
        RenderRequest::new(None, EffectId::Missile, geometry),
        position,
        velocity,
        scale,
        utils::heading(velocity) + PI,
        MISSILE_MASS,
        0.0,
    )?;
    registry.mesh_refs.insert(entity, MeshRef(GeometryId::Missile))?;
    registry.missiles.insert(entity, Missile { damage, variant })?;
    registry.speed_ups.insert(entity, SpeedUp::default())?;
    audio.play(SoundEffect::MissileFire);
    Ok(entity)
}

/// Fire `variant` from the planet described by `planet` towards `direction`
///
/// Cluster shots fan out three small missiles; every other variant fires one.
pub fn launch_missiles(
    registry: &mut Registry,
    renderer: &dyn Renderer,
    audio: &mut dyn Audio,
    planet: &Motion,
    direction: Vec2,
    variant: MissileVariant,
) -> GameResult<Vec<Entity>> {
    let count: u8 = if variant == MissileVariant::Cluster { 3 } else { 1 };
    let scale = if variant == MissileVariant::Cluster { 10.0 } else { 30.0 };
    let radius_minus_missile = 50.0 + planet.scale.y - scale;

    let mut launched = Vec::with_capacity(usize::from(count));
    for i in 0..count {
        let missile_dir = if count == 1 {
            direction
        } else {
            utils::rotate(direction, (PI / 8.0) * f32::from(count - i) / f32::from(count))
        };
        let position = planet.position + radius_minus_missile * direction + scale * missile_dir;
        let mut velocity = MISSILE_SPEED * missile_dir;

        let damage = match variant {
            MissileVariant::Fast => {
                velocity *= 3.0;
                40.0
            }
            MissileVariant::Cluster => 25.0,
            MissileVariant::Standard | MissileVariant::Gravity => 50.0,
        };

        let entity = create_missile(
            registry,
            renderer,
            audio,
            position,
            velocity,
            scale,
            damage,
            variant,
            variant.geometry(),
        )?;
        registry.colors.insert(entity, Color::new(0.0, 0.8, 0.8))?;
        if variant == MissileVariant::Gravity {
            registry.motions.get_mut(entity)?.mass = GRAVITY_MISSILE_MASS;
        }
        launched.push(entity);
    }
    Ok(launched)
}

/// Marker shown in debug mode, cleared on the next world step
pub fn create_debug_marker(registry: &mut Registry, position: Vec2) -> GameResult<Entity> {
    let entity = create_motion_entity(
        registry,
        RenderRequest::new(None, EffectId::Coloured, GeometryId::DebugLine),
        position,
        Vec2::zeros(),
        Vec2::new(4.0, 4.0),
        0.0,
        1.0,
        0.0,
    )?;
    registry.debug_components.insert(entity, DebugComponent)?;
    registry.ignore_physics.insert(entity, IgnorePhysics)?;
    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{HeadlessRenderer, SilentAudio};
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn planet_motion() -> Motion {
        Motion {
            position: Vec2::new(1000.0, 0.0),
            scale: Vec2::new(100.0, 100.0),
            ..Motion::default()
        }
    }

    #[test]
    fn test_standard_missile() {
        let renderer = HeadlessRenderer::new();
        let mut audio = SilentAudio::new();
        let mut registry = Registry::new();

        let launched = launch_missiles(
            &mut registry,
            &renderer,
            &mut audio,
            &planet_motion(),
            Vec2::new(1.0, 0.0),
            MissileVariant::Standard,
        )
        .unwrap();

        assert_eq!(launched.len(), 1);
        let motion = registry.motions.get(launched[0]).unwrap();
        // 50 + 100 - 30 along the direction, then one missile scale further
        assert_relative_eq!(motion.position, Vec2::new(1150.0, 0.0), epsilon = 1e-3);
        assert_relative_eq!(motion.velocity, Vec2::new(300.0, 0.0));
        assert_relative_eq!(motion.scale, Vec2::new(90.0, 30.0), epsilon = 1e-4);
        assert_relative_eq!(motion.angle, PI, epsilon = 1e-6);
        assert_eq!(registry.missiles.get(launched[0]).unwrap().damage, 50.0);
        assert_eq!(registry.mesh_refs.get(launched[0]).unwrap().0, GeometryId::Missile);
        assert!(registry.speed_ups.has(launched[0]));
        assert_eq!(audio.count(SoundEffect::MissileFire), 1);
    }

    #[test]
    fn test_variant_modifiers() {
        let renderer = HeadlessRenderer::new();
        let mut audio = SilentAudio::new();
        let mut registry = Registry::new();
        let dir = Vec2::new(0.0, 1.0);

        let fast = launch_missiles(&mut registry, &renderer, &mut audio, &planet_motion(), dir, MissileVariant::Fast).unwrap();
        assert_relative_eq!(registry.motions.get(fast[0]).unwrap().velocity.norm(), 900.0, epsilon = 1e-3);
        assert_eq!(registry.missiles.get(fast[0]).unwrap().damage, 40.0);
        assert_eq!(registry.render_requests.get(fast[0]).unwrap().geometry, GeometryId::FastMissile);

        let gravity =
            launch_missiles(&mut registry, &renderer, &mut audio, &planet_motion(), dir, MissileVariant::Gravity).unwrap();
        assert_eq!(registry.motions.get(gravity[0]).unwrap().mass, GRAVITY_MISSILE_MASS);

        let cluster =
            launch_missiles(&mut registry, &renderer, &mut audio, &planet_motion(), dir, MissileVariant::Cluster).unwrap();
        assert_eq!(cluster.len(), 3);
        for &missile in &cluster {
            assert_eq!(registry.missiles.get(missile).unwrap().damage, 25.0);
            assert_relative_eq!(registry.motions.get(missile).unwrap().velocity.norm(), 300.0, epsilon = 1e-3);
        }
        let first = registry.motions.get(cluster[0]).unwrap().velocity;
        assert_relative_eq!(utils::heading(first), PI / 2.0 + PI / 8.0, epsilon = 1e-5);
        assert_eq!(audio.count(SoundEffect::MissileFire), 5);
    }

    #[test]
    fn test_spawn_pair_rules() {
        let world = WorldConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let (a, b) = sample_spawn_pair(&mut rng, &world);
            assert!(a.norm() > 500.0 && b.norm() > 500.0);
            assert!((a.norm() - b.norm()).abs() > 200.0);
            assert!(a.x.abs() <= 1500.0 && b.y.abs() <= 1500.0);
        }
    }

    #[test]
    fn test_spawn_pair_fallback_terminates() {
        let world = WorldConfig {
            spawn_extent: 100.0,
            spawn_max_attempts: 10,
            ..WorldConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let (a, b) = sample_spawn_pair(&mut rng, &world);
        assert!(a.norm() > world.spawn_min_distance);
        assert!(b.norm() > world.spawn_min_distance);
        assert_relative_eq!(b.normalize(), -a.normalize(), epsilon = 1e-6);
    }

    #[test]
    fn test_asteroid_heads_inwards() {
        let renderer = HeadlessRenderer::new();
        let mut registry = Registry::new();
        let mut rng = StdRng::seed_from_u64(5);
        let world = WorldConfig::default();

        for _ in 0..20 {
            let asteroid = create_asteroid(&mut registry, &renderer, &mut rng, &world).unwrap();
            let motion = registry.motions.get(asteroid).unwrap();
            assert!(motion.position.x * motion.velocity.x < 0.0);
            assert!(motion.position.y * motion.velocity.y < 0.0);
            assert!((100.0..=300.0).contains(&motion.scale.x));
            assert!(registry.ignore_physics.has(asteroid));
            assert_eq!(registry.timers.get(asteroid).unwrap().ms, 5000.0);
        }
    }

    #[test]
    fn test_particle_dies_with_timer() {
        let renderer = HeadlessRenderer::new();
        let mut registry = Registry::new();
        let mut rng = StdRng::seed_from_u64(9);

        let puff = create_particle(&mut registry, &renderer, &mut rng, Vec2::zeros(), 30.0).unwrap();
        let timer = registry.timers.get(puff).unwrap();
        assert!(timer.death && timer.simulation);
        let motion = registry.motions.get(puff).unwrap();
        assert!(motion.scale.x >= 3.0 && motion.scale.x <= 30.0);
        assert!(motion.velocity.x.abs() <= 10.0);
    }

    #[test]
    fn test_planet_bundle() {
        let renderer = HeadlessRenderer::new();
        let mut registry = Registry::new();
        let planet = create_planet(
            &mut registry,
            &renderer,
            Vec2::new(800.0, 0.0),
            50.0,
            500.0,
            Color::new(0.0, 1.0, 0.0),
            0.3,
        )
        .unwrap();

        let motion = registry.motions.get(planet).unwrap();
        assert_relative_eq!(motion.scale, Vec2::new(100.0, 100.0));
        assert_eq!(motion.radius, 50.0);
        assert_eq!(motion.angle, 0.3);
        assert!(registry.angular_motions.has(planet));
        assert_eq!(registry.planets.get(planet).unwrap().life, 100.0);
        assert_eq!(registry.animations.get(planet).unwrap().nx_frame, 20.0);
    }
}
