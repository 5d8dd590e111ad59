//! Game configuration
//!
//! Every tunable the systems read, grouped per concern. Missing keys in a
//! config file fall back to the defaults below.

use orbit_engine::config::Config;
use orbit_engine::physics::GRAVITATIONAL_CONSTANT;
use serde::{Deserialize, Serialize};

/// Game configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Physics settings
    pub physics: PhysicsConfig,

    /// World rules and spawn placement
    pub world: WorldConfig,

    /// Camera settings
    pub camera: CameraConfig,

    /// RNG seed; a fresh entropy seed is used when absent
    pub seed: Option<u64>,
}

impl Config for GameConfig {}

/// Physics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravitational constant
    pub gravitational_constant: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: GRAVITATIONAL_CONSTANT,
        }
    }
}

/// World configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Scene width; missiles leaving it are destroyed
    pub scene_width: f32,

    /// Scene height
    pub scene_height: f32,

    /// No asteroid respawns at or above this count
    pub max_asteroids: usize,

    /// Lifetime of an asteroid's respawn timer (ms)
    pub asteroid_respawn_ms: f32,

    /// Length of a simulation stage (ms)
    pub stage_duration_ms: f32,

    /// Length of the planet damage animation window (ms)
    pub damage_animation_ms: f32,

    /// Half-extent of the square planets and wormholes spawn in
    pub spawn_extent: f32,

    /// Minimum spawn distance from the origin
    pub spawn_min_distance: f32,

    /// Minimum difference between the two bodies' distances from the origin
    pub spawn_min_separation: f32,

    /// Rejection-sampling attempts before the deterministic fallback
    pub spawn_max_attempts: u32,

    /// Half-extent of the square asteroids spawn in
    pub asteroid_extent: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            scene_width: 6000.0,
            scene_height: 6000.0,
            max_asteroids: 29,
            asteroid_respawn_ms: 5000.0,
            stage_duration_ms: 5000.0,
            damage_animation_ms: 2000.0,
            spawn_extent: 1500.0,
            spawn_min_distance: 500.0,
            spawn_min_separation: 200.0,
            spawn_max_attempts: 1000,
            asteroid_extent: 5000.0,
        }
    }
}

/// Camera configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Visible width at zero zoom
    pub width: f32,

    /// Visible height at zero zoom
    pub height: f32,

    /// Initial zoom distance
    pub initial_zoom: f32,

    /// Zoom distance a lock-on settles at
    pub lock_on_zoom: f32,

    /// Length of the lock-on transition (ms)
    pub lock_on_ms: f32,

    /// Fraction of the window edge that triggers panning
    pub edge_threshold: f32,

    /// Zoom distance per scroll step
    pub zoom_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            initial_zoom: 1200.0,
            lock_on_zoom: 10.0,
            lock_on_ms: 800.0,
            edge_threshold: 0.05,
            zoom_speed: 50.0,
        }
    }
}
