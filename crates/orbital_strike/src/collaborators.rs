//! Contracts with the rendering, camera and audio layers
//!
//! The simulation core only talks to its surroundings through these traits.
//! Headless implementations live here too; they back the binary and the
//! tests.

use std::collections::HashMap;

use log::trace;
use orbit_engine::prelude::*;

use crate::components::{Animation, GeometryId, RenderRequest, TextureId};
use crate::error::{GameError, GameResult};
use crate::registry::Registry;

/// Sound effects the core triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// A missile leaves its planet
    MissileFire,
    /// A missile hit something or an asteroid broke up
    MissileDestroyed,
    /// A planet was struck by an asteroid or fell
    GameOver,
}

/// Rendering collaborator
pub trait Renderer {
    /// Mesh data of a geometry buffer
    fn mesh(&self, geometry: GeometryId) -> GameResult<&CollisionMesh>;

    /// Swap an animated entity's sprite sheet
    ///
    /// Entities without an animation are left untouched.
    fn change_animation(&self, registry: &mut Registry, entity: Entity, animation: Animation) -> GameResult<()>;

    /// Fail unless every geometry buffer is available
    fn ensure_assets(&self) -> GameResult<()> {
        for geometry in GeometryId::ALL {
            self.mesh(geometry)
                .map_err(|_| GameError::Asset(format!("geometry {geometry:?} is not loaded")))?;
        }
        Ok(())
    }
}

/// Camera collaborator
pub trait Camera {
    /// World (or HUD) to clip space transform
    fn projection_matrix(&self, hud: bool) -> Mat3;

    /// Cursor position in world coordinates
    fn mouse_position_in_world(&self) -> Vec2;

    /// Follow an entity
    fn lock_on(&mut self, entity: Entity);

    /// Visible extent at zero zoom, used to lay out the HUD
    fn size(&self) -> Vec2;
}

/// Audio collaborator
pub trait Audio {
    /// Fire and forget
    fn play(&mut self, effect: SoundEffect);
}

/// Collaborators handed to the world system for one call
pub struct Collaborators<'a> {
    /// Mesh data and animation swaps
    pub renderer: &'a dyn Renderer,

    /// Cursor and lock-on
    pub camera: &'a mut dyn Camera,

    /// Sound effects
    pub audio: &'a mut dyn Audio,
}

/// Raw outline of the missile hull
const MISSILE_OUTLINE: [(f32, f32); 8] = [
    (-1.5, 0.25),
    (-1.5, -0.25),
    (-0.5, 0.0),
    (-0.5, 0.5),
    (-0.5, -0.5),
    (0.5, 0.5),
    (0.5, -0.5),
    (1.5, 0.0),
];

const MISSILE_INDICES: [u16; 12] = [0, 1, 2, 3, 4, 6, 3, 6, 5, 5, 6, 7];

/// Renderer that keeps meshes in memory and draws nothing
#[derive(Debug, Clone)]
pub struct HeadlessRenderer {
    meshes: HashMap<GeometryId, CollisionMesh>,
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessRenderer {
    /// Renderer with the built-in meshes
    ///
    /// Every missile hull shares the standard outline.
    pub fn new() -> Self {
        let outline: Vec<Vec2> = MISSILE_OUTLINE.iter().map(|&(x, y)| Vec2::new(x, y)).collect();
        let missile = CollisionMesh::normalized(&outline, MISSILE_INDICES.to_vec());
        let quad = CollisionMesh::normalized(
            &[
                Vec2::new(-0.5, -0.5),
                Vec2::new(0.5, -0.5),
                Vec2::new(0.5, 0.5),
                Vec2::new(-0.5, 0.5),
            ],
            vec![0, 1, 2, 0, 2, 3],
        );

        let mut meshes = HashMap::new();
        for geometry in GeometryId::ALL {
            let mesh = match geometry {
                GeometryId::Missile
                | GeometryId::FastMissile
                | GeometryId::ClusterMissile
                | GeometryId::GravityMissile => missile.clone(),
                _ => quad.clone(),
            };
            meshes.insert(geometry, mesh);
        }
        Self { meshes }
    }

    /// Renderer without any mesh loaded
    pub fn empty() -> Self {
        Self { meshes: HashMap::new() }
    }

    /// Replace or add a mesh
    pub fn with_mesh(mut self, geometry: GeometryId, mesh: CollisionMesh) -> Self {
        self.meshes.insert(geometry, mesh);
        self
    }
}

impl Renderer for HeadlessRenderer {
    fn mesh(&self, geometry: GeometryId) -> GameResult<&CollisionMesh> {
        self.meshes
            .get(&geometry)
            .ok_or_else(|| GameError::MissingCollaboratorData(format!("mesh for {geometry:?}")))
    }

    fn change_animation(&self, registry: &mut Registry, entity: Entity, animation: Animation) -> GameResult<()> {
        if !registry.animations.has(entity) {
            return Ok(());
        }
        registry.render_requests.remove(entity);
        registry.animations.remove(entity);

        registry
            .render_requests
            .insert(entity, RenderRequest::animated(TextureId::Asteroid))?;
        registry.animations.insert(entity, animation)?;
        Ok(())
    }
}

/// Audio sink that records what would have played
#[derive(Debug, Clone, Default)]
pub struct SilentAudio {
    played: Vec<SoundEffect>,
}

impl SilentAudio {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Effects played so far, oldest first
    pub fn played(&self) -> &[SoundEffect] {
        &self.played
    }

    /// How often `effect` was played
    pub fn count(&self, effect: SoundEffect) -> usize {
        self.played.iter().filter(|&&e| e == effect).count()
    }
}

impl Audio for SilentAudio {
    fn play(&mut self, effect: SoundEffect) {
        trace!("Playing {effect:?}");
        self.played.push(effect);
    }
}
