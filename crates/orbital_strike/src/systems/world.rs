//! World system: game rules, turn state and input handlers
//!
//! Owns everything about a session that is not component data: the RNG, the
//! handles of the aimer, the weapon highlight and the wormhole pair, the
//! selected weapon and the simulation speed.

use log::{debug, info};
use orbit_engine::foundation::math::{
    constants::{HALF_PI, PI},
    utils,
};
use orbit_engine::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::collaborators::{Camera, Collaborators, Renderer, SoundEffect};
use crate::components::{
    Color, EffectId, MissileVariant, PhaseSet, RenderRequest, TextureId, Timer, WorldPhase,
};
use crate::config::WorldConfig;
use crate::error::{GameError, GameResult};
use crate::factory;
use crate::registry::Registry;

/// Distance of the aimer from the active planet's centre
const AIMER_DISTANCE: f32 = 100.0;

/// Where the aimer is parked while the simulation runs
const AIMER_PARKING: (f32, f32) = (20000.0, 20000.0);

/// Game rules and turn handling
#[derive(Debug)]
pub struct WorldSystem {
    config: WorldConfig,
    rng: StdRng,
    aimer: Option<Entity>,
    highlight: Option<Entity>,
    wormholes: Option<(Entity, Entity)>,
    selected_variant: MissileVariant,
    current_speed: f32,
    debug: bool,
}

impl WorldSystem {
    /// World system with the given rules, seeded for reproducible runs when `seed` is set
    pub fn new(config: WorldConfig, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            config,
            rng,
            aimer: None,
            highlight: None,
            wormholes: None,
            selected_variant: MissileVariant::Standard,
            current_speed: 1.0,
            debug: false,
        }
    }

    /// Create the session singletons and set up the first match
    pub fn init(&mut self, registry: &mut Registry, ctx: &mut Collaborators<'_>) -> GameResult<()> {
        factory::create_phase(registry)?;
        factory::create_screen_state(registry)?;
        self.restart_game(registry, ctx)
    }

    /// Aimer entity of the current match
    pub fn aimer(&self) -> Option<Entity> {
        self.aimer
    }

    /// Weapon highlight of the current match
    pub fn highlight(&self) -> Option<Entity> {
        self.highlight
    }

    /// The wormhole pair of the current match
    pub fn wormholes(&self) -> Option<(Entity, Entity)> {
        self.wormholes
    }

    /// Weapon fired on the next launch
    pub fn selected_variant(&self) -> MissileVariant {
        self.selected_variant
    }

    /// Simulation speed multiplier
    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    /// Whether debug markers are drawn
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Turn debug markers on or off
    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }

    /// Advance the rules by `elapsed_ms`
    pub fn step(&mut self, registry: &mut Registry, ctx: &mut Collaborators<'_>, elapsed_ms: f32) -> GameResult<()> {
        while let Some(marker) = registry.debug_components.entities().last().copied() {
            registry.remove_all_components_of(marker);
        }

        self.asteroid_hazards(registry, ctx)?;
        self.missile_trails(registry, ctx.renderer)?;

        if registry.phase()?.simulation {
            let aimer = self.aimer.ok_or(GameError::MissingSingleton("aimer"))?;
            registry.motions.get_mut(aimer)?.position = Vec2::new(AIMER_PARKING.0, AIMER_PARKING.1);
            Self::decay_speed_ups(registry, elapsed_ms);
        }

        self.tick_timers(registry, ctx, elapsed_ms)?;
        self.update_damage_windows(registry, elapsed_ms);

        if self.debug {
            Self::place_debug_markers(registry, ctx.renderer)?;
        }
        Ok(())
    }

    /// Asteroids break up on the sun, on missiles and on planets
    ///
    /// Walks the asteroid container forwards by slot. A destroyed asteroid's
    /// slot is refilled by the last asteroid, which is therefore skipped
    /// until the next frame.
    fn asteroid_hazards(&self, registry: &mut Registry, ctx: &mut Collaborators<'_>) -> GameResult<()> {
        let sun = registry.suns.entity_of(0).ok_or(GameError::MissingSingleton("sun"))?;
        let sun_position = registry.motions.get(sun)?.position;

        let mut slot = 0;
        while let Some(asteroid) = registry.asteroids.entity_of(slot) {
            slot += 1;
            let motion = *registry.motions.get(asteroid)?;
            let within = |p: Vec2| (p - motion.position).norm() < 0.4 * motion.scale.x;

            if within(sun_position) {
                debug!("Asteroid {} fell into the sun", asteroid.id());
                ctx.audio.play(SoundEffect::MissileDestroyed);
                registry.remove_all_components_of(asteroid);
                continue;
            }

            let struck_missile = registry
                .missiles
                .entities()
                .iter()
                .copied()
                .find(|&missile| registry.motions.try_get(missile).is_some_and(|m| within(m.position)));
            if let Some(missile) = struck_missile {
                debug!("Asteroid {} destroyed by missile {}", asteroid.id(), missile.id());
                registry.remove_all_components_of(asteroid);
                registry.remove_all_components_of(missile);
                ctx.audio.play(SoundEffect::MissileDestroyed);
                continue;
            }

            let struck_planet = registry
                .planets
                .entities()
                .iter()
                .any(|&planet| registry.motions.try_get(planet).is_some_and(|m| within(m.position)));
            if struck_planet {
                debug!("Asteroid {} crashed into a planet", asteroid.id());
                ctx.audio.play(SoundEffect::GameOver);
                registry.remove_all_components_of(asteroid);
            }
        }
        Ok(())
    }

    /// Missiles leave smoke behind and die once fully outside the scene
    ///
    /// Smoke only comes out while simulating, since particle timers are
    /// frozen during planning.
    fn missile_trails(&mut self, registry: &mut Registry, renderer: &dyn Renderer) -> GameResult<()> {
        let simulating = registry.phase()?.simulation;
        let half_width = self.config.scene_width / 2.0;
        let half_height = self.config.scene_height / 2.0;

        let missiles: Vec<Entity> = registry.missiles.entities().to_vec();
        for &missile in missiles.iter().rev() {
            let motion = *registry.motions.get(missile)?;
            let extent = motion.scale.abs();
            let heading = motion.velocity.try_normalize(f32::EPSILON).unwrap_or_else(Vec2::zeros);

            if simulating {
                let exhaust = motion.position - extent.x * heading / 2.0;
                factory::create_particle(registry, renderer, &mut self.rng, exhaust, motion.scale.y)?;
            }

            let outside = motion.position.x - extent.x > half_width
                || motion.position.x + extent.x < -half_width
                || motion.position.y - extent.y > half_height
                || motion.position.y + extent.y < -half_height;
            if outside {
                debug!("Missile {} left the scene", missile.id());
                registry.remove_all_components_of(missile);
            }
        }
        Ok(())
    }

    fn decay_speed_ups(registry: &mut Registry, elapsed_ms: f32) {
        let mut expired = Vec::new();
        for (entity, speed) in registry.speed_ups.iter_mut() {
            speed.boost -= speed.decay_factor;
            speed.ms -= elapsed_ms;
            if speed.ms < 0.0 || speed.boost < 1.0 {
                expired.push(entity);
            }
        }
        for entity in expired {
            registry.speed_ups.remove(entity);
        }
    }

    fn tick_timers(&mut self, registry: &mut Registry, ctx: &mut Collaborators<'_>, elapsed_ms: f32) -> GameResult<()> {
        let timed: Vec<Entity> = registry.timers.entities().to_vec();

        for entity in timed {
            let simulating = registry.phase()?.simulation;
            let Some(timer) = registry.timers.try_get_mut(entity) else {
                continue;
            };
            if timer.simulation && !simulating {
                continue;
            }
            timer.ms -= elapsed_ms;
            if timer.ms >= 0.0 {
                continue;
            }
            let death = timer.death;

            if registry.phases.has(entity) {
                self.shift_stage(registry, ctx.camera)?;
            }
            if registry.asteroids.has(entity) && registry.asteroids.len() < self.config.max_asteroids {
                factory::create_asteroid(registry, ctx.renderer, &mut self.rng, &self.config)?;
            }

            if death {
                registry.remove_all_components_of(entity);
            } else {
                registry.timers.remove(entity);
            }
        }
        Ok(())
    }

    #[allow(clippy::float_cmp)]
    fn update_damage_windows(&self, registry: &mut Registry, elapsed_ms: f32) {
        for planet in registry.planets.components_mut() {
            if planet.old_life == planet.life {
                continue;
            }
            planet.time_since_change += elapsed_ms;
            if planet.time_since_change > self.config.damage_animation_ms {
                planet.time_since_change = 0.0;
                planet.old_life = planet.life;
            }
        }
    }

    fn place_debug_markers(registry: &mut Registry, renderer: &dyn Renderer) -> GameResult<()> {
        let mut points = Vec::new();
        for &missile in registry.missiles.entities() {
            let position = registry.motions.get(missile)?.position;
            let mesh = renderer.mesh(registry.mesh_refs.get(missile)?.0)?;
            points.extend(mesh.vertices.iter().map(|v| position + v));
        }
        for point in points {
            factory::create_debug_marker(registry, point)?;
        }
        Ok(())
    }

    /// Tear the match down and set up a fresh one
    pub fn restart_game(&mut self, registry: &mut Registry, ctx: &mut Collaborators<'_>) -> GameResult<()> {
        registry.list_all_components();
        info!("Restarting");

        self.current_speed = 1.0;

        while let Some(entity) = registry.motions.entities().last().copied() {
            registry.remove_all_components_of(entity);
        }
        while let Some(entity) = registry.timers.entities().last().copied() {
            if registry.timers.get(entity)?.death {
                registry.remove_all_components_of(entity);
            } else {
                registry.timers.remove(entity);
            }
        }
        let phase = registry.phase_mut()?;
        phase.simulation = false;
        phase.player = 0;

        registry.list_all_components();

        let scene_size = Vec2::new(self.config.scene_width, self.config.scene_height);
        factory::create_background(registry, scene_size)?;
        factory::create_sun(registry, ctx.renderer, Vec2::zeros(), 100.0, 1000.0)?;

        let (first, second) = factory::sample_spawn_pair(&mut self.rng, &self.config);
        let worm1 = factory::create_wormhole(registry, ctx.renderer, first, 200.0, 0.0)?;
        let worm2 = factory::create_wormhole(registry, ctx.renderer, second, 200.0, 0.0)?;
        self.wormholes = Some((worm1, worm2));

        let (first, second) = factory::sample_spawn_pair(&mut self.rng, &self.config);
        let spin = PI * (1.0 + self.rng.gen::<f32>()) / 12.0;
        let planet1 = factory::create_planet(registry, ctx.renderer, first, 50.0, 500.0, Color::new(0.0, 0.0, 1.0), spin)?;
        let spin = PI * (1.0 + self.rng.gen::<f32>()) / 12.0;
        factory::create_planet(registry, ctx.renderer, second, 50.0, 500.0, Color::new(0.0, 1.0, 0.0), spin)?;
        ctx.camera.lock_on(planet1);

        factory::create_asteroid(registry, ctx.renderer, &mut self.rng, &self.config)?;

        self.aimer = Some(factory::create_aimer(
            registry,
            ctx.renderer,
            Vec2::new(200.0, 0.0),
            Vec2::new(200.0, 200.0),
        )?);

        let size = ctx.camera.size();
        let keys = [TextureId::Key1, TextureId::Key2, TextureId::Key3, TextureId::Key4];
        let hud_phases = PhaseSet::GAME | PhaseSet::TUT2;
        for (i, (variant, key)) in MissileVariant::ALL.iter().zip(keys).enumerate() {
            let position = Vec2::new((i + 1) as f32 * 100.0 - size.x / 2.0, 50.0 - size.y / 2.0);
            factory::create_hud_component(registry, position, Vec2::new(30.0, 30.0), RenderRequest::sprite(key), hud_phases)?;

            let icon = factory::create_hud_component(
                registry,
                position + Vec2::new(0.0, 100.0),
                Vec2::new(90.0, 30.0),
                RenderRequest::new(None, EffectId::Missile, variant.geometry()),
                hud_phases,
            )?;
            registry.motions.get_mut(icon)?.angle = HALF_PI;
        }

        self.selected_variant = MissileVariant::Standard;
        self.highlight = Some(factory::create_hud_component(
            registry,
            Self::highlight_position(size, self.selected_variant),
            Vec2::new(30.0, 30.0),
            RenderRequest::sprite(TextureId::Highlight),
            PhaseSet::GAME,
        )?);

        info!("Match ready: {} entities", registry.entity_count());
        Ok(())
    }

    fn highlight_position(camera_size: Vec2, variant: MissileVariant) -> Vec2 {
        Vec2::new(
            f32::from(variant.number()) * 100.0 - camera_size.x / 2.0,
            50.0 - camera_size.y / 2.0,
        )
    }

    /// Toggle between planning and simulating
    ///
    /// Entering the simulation arms the stage timer; leaving it disarms the
    /// timer, hands the turn to the other player and moves the camera to
    /// their planet.
    pub fn shift_stage(&mut self, registry: &mut Registry, camera: &mut dyn Camera) -> GameResult<()> {
        let phase_entity = registry.phase_entity()?;
        let phase = *registry.phase()?;

        if phase.simulation {
            registry.timers.remove(phase_entity);
            let player = (phase.player + 1) % 2;
            registry.phase_mut()?.player = player;
            camera.lock_on(Self::player_planet(registry, player)?);
        } else {
            registry
                .timers
                .insert(phase_entity, Timer::new(self.config.stage_duration_ms))?;
        }

        let phase = registry.phase_mut()?;
        phase.simulation = !phase.simulation;
        info!(
            "Stage: {} (player {})",
            if phase.simulation { "simulating" } else { "planning" },
            phase.player
        );
        Ok(())
    }

    /// Advance the narrative phase
    ///
    /// Leaving the match stops the stage and shows the surviving planet;
    /// advancing past the end restarts the match.
    pub fn shift_phase(&mut self, registry: &mut Registry, ctx: &mut Collaborators<'_>) -> GameResult<()> {
        let current = registry.phase()?.phase;

        if current == WorldPhase::Game {
            let phase_entity = registry.phase_entity()?;
            registry.timers.remove(phase_entity);
            let phase = registry.phase_mut()?;
            phase.simulation = false;
            phase.player = 0;
            let survivor = registry.planets.iter().find(|(_, planet)| planet.life > 0.0).map(|(e, _)| e);
            if let Some(survivor) = survivor {
                ctx.camera.lock_on(survivor);
            }
        }

        if current == WorldPhase::End {
            registry.phase_mut()?.phase = WorldPhase::Game;
            self.restart_game(registry, ctx)?;
        } else {
            registry.phase_mut()?.phase = current.next();
        }
        info!("Phase: {:?} -> {:?}", current, registry.phase()?.phase);
        Ok(())
    }

    /// End the match once a planet has fallen
    ///
    /// Returns whether the phase changed.
    pub fn check_game_over(&mut self, registry: &mut Registry, ctx: &mut Collaborators<'_>) -> GameResult<bool> {
        if registry.phase()?.phase != WorldPhase::Game {
            return Ok(false);
        }
        let fallen = registry.planets.iter().find(|(_, planet)| planet.life <= 0.0).map(|(entity, _)| entity);
        if let Some(planet) = fallen {
            registry.list_all_components_of(planet);
            ctx.audio.play(SoundEffect::GameOver);
            self.shift_phase(registry, ctx)?;
            return Ok(true);
        }
        Ok(false)
    }

    fn player_planet(registry: &Registry, player: usize) -> GameResult<Entity> {
        registry
            .planets
            .entity_of(player)
            .ok_or(GameError::MissingSingleton("player planet"))
    }

    fn aim_direction(camera: &dyn Camera, from: Vec2) -> Vec2 {
        (camera.mouse_position_in_world() - from)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| Vec2::new(1.0, 0.0))
    }

    /// Point the aimer from the active planet towards the cursor
    pub fn on_mouse_move(&mut self, registry: &mut Registry, camera: &dyn Camera) -> GameResult<()> {
        let player = registry.phase()?.player;
        let planet = registry.motions.get(Self::player_planet(registry, player)?)?.position;
        let direction = Self::aim_direction(camera, planet);

        let aimer = self.aimer.ok_or(GameError::MissingSingleton("aimer"))?;
        let aim = registry.motions.get_mut(aimer)?;
        aim.position = planet + AIMER_DISTANCE * direction;
        aim.angle = utils::heading(direction);
        Ok(())
    }

    /// Fire the selected weapon at the cursor and start the simulation stage
    ///
    /// Ignored while the simulation is already running.
    pub fn spawn_missile_on_mouse(&mut self, registry: &mut Registry, ctx: &mut Collaborators<'_>) -> GameResult<()> {
        if registry.phase()?.simulation {
            return Ok(());
        }
        self.shift_stage(registry, ctx.camera)?;

        let player = registry.phase()?.player;
        let planet = *registry.motions.get(Self::player_planet(registry, player)?)?;
        let direction = Self::aim_direction(ctx.camera, planet.position);

        let launched =
            factory::launch_missiles(registry, ctx.renderer, ctx.audio, &planet, direction, self.selected_variant)?;
        info!("Player {player} fired {} {:?} missile(s)", launched.len(), self.selected_variant);
        Ok(())
    }

    /// Select the weapon for the next launch
    pub fn change_weapon(&mut self, registry: &mut Registry, camera_size: Vec2, variant: MissileVariant) -> GameResult<()> {
        let highlight = self.highlight.ok_or(GameError::MissingSingleton("weapon highlight"))?;
        registry.motions.get_mut(highlight)?.position = Self::highlight_position(camera_size, variant);
        self.selected_variant = variant;

        let aimer = self.aimer.ok_or(GameError::MissingSingleton("aimer"))?;
        registry.render_requests.get_mut(aimer)?.geometry = variant.geometry();
        info!("Weapon: {variant:?}");
        Ok(())
    }

    /// Adjust the simulation speed, never below zero
    pub fn change_speed(&mut self, delta: f32) {
        self.current_speed = (self.current_speed + delta).max(0.0);
        info!("Current speed = {:.1}", self.current_speed);
    }
}
