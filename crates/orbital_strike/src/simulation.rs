//! Frame driver
//!
//! [`Simulation`] owns the registry, every system and the collaborators, and
//! runs one frame at a time:
//!
//! 1. world rules (timers, hazards, trails)
//! 2. physics (gravity, integration, contact detection)
//! 3. collision resolution
//! 4. camera
//! 5. HUD visibility
//! 6. win check
//!
//! Errors from any step stop the frame and are returned to the caller.

use log::{debug, info};
use orbit_engine::prelude::*;

use crate::camera::CameraSystem;
use crate::collaborators::{Audio, Camera, Collaborators, HeadlessRenderer, Renderer, SilentAudio};
use crate::components::Phase;
use crate::config::GameConfig;
use crate::error::GameResult;
use crate::input::{Command, InputEvent, KeyBindings};
use crate::registry::Registry;
use crate::systems::{resolve_collisions, update_visibility, PhysicsSystem, WorldSystem};

/// A running game session
#[derive(Debug)]
pub struct Simulation<R: Renderer = HeadlessRenderer, A: Audio = SilentAudio> {
    registry: Registry,
    world: WorldSystem,
    physics: PhysicsSystem,
    camera: CameraSystem,
    renderer: R,
    audio: A,
    bindings: KeyBindings,
}

impl Simulation {
    /// Session with the headless renderer and silent audio
    pub fn headless(config: &GameConfig) -> GameResult<Self> {
        Self::new(config, HeadlessRenderer::new(), SilentAudio::new())
    }
}

impl<R: Renderer, A: Audio> Simulation<R, A> {
    /// Set up a session and its first match
    ///
    /// Fails when the renderer is missing any geometry.
    pub fn new(config: &GameConfig, renderer: R, audio: A) -> GameResult<Self> {
        renderer.ensure_assets()?;

        let scene_size = Vec2::new(config.world.scene_width, config.world.scene_height);
        let mut simulation = Self {
            registry: Registry::new(),
            world: WorldSystem::new(config.world.clone(), config.seed),
            physics: PhysicsSystem::new(&config.physics),
            camera: CameraSystem::new(config.camera.clone(), scene_size),
            renderer,
            audio,
            bindings: KeyBindings::default(),
        };

        let Self {
            registry,
            world,
            camera,
            renderer,
            audio,
            ..
        } = &mut simulation;
        let mut ctx = Collaborators {
            renderer: &*renderer,
            camera: &mut *camera,
            audio: &mut *audio,
        };
        world.init(registry, &mut ctx)?;

        info!("Session ready (seed: {:?})", config.seed);
        Ok(simulation)
    }

    /// Run one frame of `elapsed_ms` wall-clock time
    ///
    /// The simulation speed only scales the time seen by physics; timers,
    /// damage windows and the camera run in wall-clock time.
    pub fn frame(&mut self, elapsed_ms: f32) -> GameResult<()> {
        let scaled_ms = elapsed_ms * self.world.current_speed();
        let Self {
            registry,
            world,
            physics,
            camera,
            renderer,
            audio,
            ..
        } = self;

        {
            let mut ctx = Collaborators {
                renderer: &*renderer,
                camera: &mut *camera,
                audio: &mut *audio,
            };
            world.step(registry, &mut ctx, elapsed_ms)?;
        }
        physics.step(registry, &*renderer, &mut *audio, scaled_ms)?;
        resolve_collisions(registry, world.wormholes(), &*renderer)?;
        camera.step(registry, elapsed_ms);
        update_visibility(registry)?;

        let mut ctx = Collaborators {
            renderer: &*renderer,
            camera: &mut *camera,
            audio: &mut *audio,
        };
        world.check_game_over(registry, &mut ctx)?;
        Ok(())
    }

    /// Translate a window event and execute the resulting commands
    pub fn handle_event(&mut self, event: InputEvent) -> GameResult<()> {
        if let InputEvent::CursorMoved { position } = event {
            self.camera.set_cursor(position);
        }
        let phase = self.registry.phase()?.phase;
        for command in self.bindings.translate(&event, phase) {
            self.execute(command)?;
        }
        Ok(())
    }

    /// Execute a single command regardless of phase gating
    pub fn execute(&mut self, command: Command) -> GameResult<()> {
        debug!("Executing {command:?}");
        match command {
            Command::SetDebug(enabled) => {
                if enabled && !self.world.debug() {
                    self.registry.list_all_components();
                }
                self.world.set_debug(enabled);
                return Ok(());
            }
            Command::ChangeSpeed(delta) => {
                self.world.change_speed(delta);
                return Ok(());
            }
            Command::EdgePan(cursor) => {
                self.camera.on_mouse_move(cursor);
                return Ok(());
            }
            Command::Zoom(offset) => {
                self.camera.on_scroll(offset);
                return Ok(());
            }
            Command::Aim(_) => return self.world.on_mouse_move(&mut self.registry, &self.camera),
            Command::SelectWeapon(variant) => {
                return self.world.change_weapon(&mut self.registry, self.camera.size(), variant);
            }
            Command::Restart | Command::ShiftPhase | Command::ShiftStage | Command::Fire => {}
        }

        let Self {
            registry,
            world,
            camera,
            renderer,
            audio,
            ..
        } = self;
        let mut ctx = Collaborators {
            renderer: &*renderer,
            camera: &mut *camera,
            audio: &mut *audio,
        };
        match command {
            Command::Restart => world.restart_game(registry, &mut ctx),
            Command::ShiftPhase => world.shift_phase(registry, &mut ctx),
            Command::ShiftStage => world.shift_stage(registry, ctx.camera),
            _ => world.spawn_missile_on_mouse(registry, &mut ctx),
        }
    }

    /// Component registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable component registry
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Current turn state
    pub fn phase(&self) -> GameResult<Phase> {
        self.registry.phase().copied()
    }

    /// World rules
    pub fn world(&self) -> &WorldSystem {
        &self.world
    }

    /// Physics system
    pub fn physics(&self) -> &PhysicsSystem {
        &self.physics
    }

    /// Camera
    pub fn camera(&self) -> &CameraSystem {
        &self.camera
    }

    /// Renderer collaborator
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Audio collaborator
    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// Binding table, for rebinding
    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::SoundEffect;
    use crate::components::{GeometryId, MissileVariant, WorldPhase};
    use crate::error::GameError;
    use crate::input::{Action, Key, Modifiers};
    use orbit_engine::foundation::logging;

    fn config() -> GameConfig {
        logging::init_for_tests();
        GameConfig {
            seed: Some(3),
            ..GameConfig::default()
        }
    }

    fn release(key: Key) -> InputEvent {
        InputEvent::Key {
            key,
            action: Action::Release,
            modifiers: Modifiers::empty(),
        }
    }

    #[test]
    fn test_missing_assets_fail_startup() {
        let renderer = HeadlessRenderer::empty();
        let result = Simulation::new(&config(), renderer, SilentAudio::new());
        assert!(matches!(result, Err(GameError::Asset(_))));
    }

    #[test]
    fn test_space_walks_through_tutorial() {
        let mut sim = Simulation::headless(&config()).unwrap();
        assert_eq!(sim.phase().unwrap().phase, WorldPhase::Welcome);

        for _ in 0..4 {
            sim.handle_event(release(Key::Space)).unwrap();
        }
        assert_eq!(sim.phase().unwrap().phase, WorldPhase::Game);

        sim.handle_event(release(Key::Space)).unwrap();
        assert_eq!(sim.phase().unwrap().phase, WorldPhase::Game);
    }

    #[test]
    fn test_hud_hidden_until_game() {
        let mut sim = Simulation::headless(&config()).unwrap();
        sim.frame(16.0).unwrap();
        assert_eq!(sim.registry().hidden.len(), sim.registry().huds.len());

        sim.registry_mut().phase_mut().unwrap().phase = WorldPhase::Game;
        sim.frame(16.0).unwrap();
        assert!(sim.registry().hidden.is_empty());
    }

    #[test]
    fn test_weapon_keys_swap_aimer() {
        let mut sim = Simulation::headless(&config()).unwrap();
        sim.registry_mut().phase_mut().unwrap().phase = WorldPhase::Game;

        sim.handle_event(release(Key::Num4)).unwrap();
        assert_eq!(sim.world().selected_variant(), MissileVariant::Gravity);
        let aimer = sim.world().aimer().unwrap();
        assert_eq!(
            sim.registry().render_requests.get(aimer).unwrap().geometry,
            GeometryId::GravityMissile
        );
    }

    /// Move every body away from the line between (0, -1200) and (100, -1200)
    fn clear_flight_path(sim: &mut Simulation) {
        let registry = sim.registry_mut();
        let bodies: Vec<Entity> = registry
            .planets
            .entities()
            .iter()
            .chain(registry.asteroids.entities())
            .copied()
            .collect();
        for (k, body) in bodies.into_iter().enumerate() {
            registry.motions.get_mut(body).unwrap().position = Vec2::new(2500.0, 500.0 * k as f32 - 1500.0);
        }
        for wormhole in registry.wormholes.entities().to_vec() {
            let motion = registry.motions.get_mut(wormhole).unwrap();
            motion.position = Vec2::new(-2500.0, 2500.0);
            motion.velocity = motion.position;
        }
    }

    #[test]
    fn test_speed_scales_physics_time() {
        let mut sim = Simulation::headless(&config()).unwrap();
        sim.registry_mut().phase_mut().unwrap().phase = WorldPhase::Game;
        let shift = Modifiers::SHIFT;
        for _ in 0..11 {
            sim.handle_event(InputEvent::Key {
                key: Key::Comma,
                action: Action::Release,
                modifiers: shift,
            })
            .unwrap();
        }
        assert_eq!(sim.world().current_speed(), 0.0);

        sim.execute(Command::Fire).unwrap();
        clear_flight_path(&mut sim);
        let missile = sim.registry().missiles.entity_of(0).unwrap();
        sim.registry_mut().motions.get_mut(missile).unwrap().position = Vec2::new(0.0, -1200.0);
        let phase_entity = sim.registry().phase_entity().unwrap();

        sim.frame(1000.0).unwrap();

        assert_eq!(sim.registry().motions.get(missile).unwrap().position, Vec2::new(0.0, -1200.0));
        assert_eq!(sim.registry().timers.get(phase_entity).unwrap().ms, 4000.0);
    }

    #[test]
    fn test_speed_does_not_pause_damage_window() {
        let mut sim = Simulation::headless(&config()).unwrap();
        sim.execute(Command::ChangeSpeed(-1.0)).unwrap();
        let planet = sim.registry().planets.entity_of(0).unwrap();
        sim.registry_mut().planets.get_mut(planet).unwrap().life = 50.0;

        sim.frame(1000.0).unwrap();
        sim.frame(1001.0).unwrap();

        assert_eq!(sim.registry().planets.get(planet).unwrap().old_life, 50.0);
    }

    #[test]
    fn test_shift_stage_command_ends_stage_early() {
        let mut sim = Simulation::headless(&config()).unwrap();
        sim.registry_mut().phase_mut().unwrap().phase = WorldPhase::Game;
        let phase_entity = sim.registry().phase_entity().unwrap();

        sim.execute(Command::ShiftStage).unwrap();
        assert!(sim.phase().unwrap().simulation);
        sim.execute(Command::ShiftStage).unwrap();

        let phase = sim.phase().unwrap();
        assert!(!phase.simulation);
        assert_eq!(phase.player, 1);
        assert!(!sim.registry().timers.has(phase_entity));

        sim.execute(Command::Fire).unwrap();
        assert!(sim.phase().unwrap().simulation);
        assert_eq!(sim.registry().missiles.len(), 1);
    }

    #[test]
    fn test_fired_missile_flies_and_smokes() {
        let mut sim = Simulation::headless(&config()).unwrap();
        sim.registry_mut().phase_mut().unwrap().phase = WorldPhase::Game;

        sim.handle_event(InputEvent::MouseButton {
            button: crate::input::MouseButton::Left,
            action: Action::Release,
            modifiers: Modifiers::empty(),
        })
        .unwrap();
        assert_eq!(sim.audio().count(SoundEffect::MissileFire), 1);
        clear_flight_path(&mut sim);
        let missile = sim.registry().missiles.entity_of(0).unwrap();
        {
            let motion = sim.registry_mut().motions.get_mut(missile).unwrap();
            motion.position = Vec2::new(0.0, -1200.0);
            motion.velocity = Vec2::new(300.0, 0.0);
        }

        sim.frame(16.0).unwrap();

        assert!(sim.registry().is_alive(missile));
        assert!(sim.registry().motions.get(missile).unwrap().position.x > 0.0);
        assert_eq!(sim.registry().smoke_particles.len(), 1);
    }
}
