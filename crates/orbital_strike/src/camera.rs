//! Camera system
//!
//! The camera is a point `(x, y, z)` above the scene: `x, y` is the look-at
//! position and `z` widens the visible area. It either follows a locked-on
//! entity, easing in over a short transition, or pans when the cursor touches
//! a window edge.

use orbit_engine::prelude::*;

use crate::collaborators::Camera;
use crate::config::CameraConfig;
use crate::registry::Registry;

/// Camera state and controls
#[derive(Debug, Clone)]
pub struct CameraSystem {
    config: CameraConfig,
    scene_size: Vec2,
    size: Vec2,
    camera: Vec3,
    velocity: Vec2,
    locked_on: Option<Entity>,
    move_timer: f32,
    cursor: Vec2,
}

impl CameraSystem {
    /// Camera over a scene of `scene_size`, centred on the origin
    pub fn new(config: CameraConfig, scene_size: Vec2) -> Self {
        let mut camera = Self {
            size: Vec2::new(config.width, config.height),
            camera: Vec3::new(0.0, 0.0, config.initial_zoom),
            config,
            scene_size,
            velocity: Vec2::zeros(),
            locked_on: None,
            move_timer: 0.0,
            cursor: Vec2::new(0.5, 0.5),
        };
        camera.enforce_limits();
        camera
    }

    /// Camera position and zoom
    pub fn position(&self) -> Vec3 {
        self.camera
    }

    /// Locked-on entity, if any
    pub fn locked_on(&self) -> Option<Entity> {
        self.locked_on
    }

    /// Remaining lock-on transition time (ms)
    pub fn move_timer(&self) -> f32 {
        self.move_timer
    }

    /// Last known cursor position, normalized to the window (origin top-left)
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    /// Record the cursor position, normalized to the window
    pub fn set_cursor(&mut self, cursor: Vec2) {
        self.cursor = cursor;
    }

    /// Normalized cursor position that points at `world`
    pub fn cursor_for_world(&self, world: Vec2) -> Vec2 {
        let ndc = self.projection(false).transform_point(world);
        Vec2::new((ndc.x + 1.0) / 2.0, (1.0 - ndc.y) / 2.0)
    }

    /// Advance the camera by `elapsed_ms`
    pub fn step(&mut self, registry: &Registry, elapsed_ms: f32) {
        let speed = self.size.y + self.camera.z;
        let mut change = Vec3::new(self.velocity.x, self.velocity.y, 0.0) * speed * (elapsed_ms / 1000.0);

        let target = self.locked_on.and_then(|entity| registry.motions.try_get(entity));
        if let Some(motion) = target {
            change = Vec3::new(motion.position.x, motion.position.y, self.config.lock_on_zoom) - self.camera;
            if self.move_timer > 0.0 {
                if elapsed_ms < self.move_timer {
                    change *= elapsed_ms / self.move_timer;
                }
                self.move_timer -= elapsed_ms;
            }
        }

        self.camera += change;
        self.enforce_limits();
    }

    /// Keep the visible area inside the scene
    fn enforce_limits(&mut self) {
        let limits = Vec2::new(
            (self.scene_size.x - self.size.x) / 2.0 - self.camera.z,
            (self.scene_size.y - self.size.y) / 2.0 - self.camera.z * self.size.y / self.size.x,
        );
        self.camera.x = self.camera.x.min(limits.x).max(-limits.x);
        self.camera.y = self.camera.y.min(limits.y).max(-limits.y);
    }

    /// Zoom towards the cursor; ignored during a lock-on transition
    pub fn on_scroll(&mut self, offset: f32) {
        if self.move_timer > 0.0 {
            return;
        }
        let max_zoom = (self.scene_size.x - self.size.x).min(self.scene_size.y - self.size.y) / 2.0;
        let z_change = (-self.config.zoom_speed * offset)
            .min(max_zoom - self.camera.z)
            .max(-self.camera.z);

        let ndc = Self::to_ndc(self.cursor);
        let shift = -(self.size / self.size.x).component_mul(&ndc);
        self.camera += Vec3::new(shift.x, shift.y, 1.0) * z_change;
        self.locked_on = None;
        self.enforce_limits();
    }

    /// Start or stop edge panning; ignored during a lock-on transition
    pub fn on_mouse_move(&mut self, cursor: Vec2) {
        self.cursor = cursor;
        if self.move_timer > 0.0 {
            return;
        }
        let threshold = self.config.edge_threshold;
        let edge = |low: bool, high: bool| f32::from(u8::from(high)) - f32::from(u8::from(low));
        self.velocity = Vec2::new(
            edge(cursor.x < threshold, cursor.x > 1.0 - threshold),
            edge(cursor.y > 1.0 - threshold, cursor.y < threshold),
        );
        if self.velocity.norm_squared() > 0.0 {
            self.locked_on = None;
        }
    }

    fn to_ndc(cursor: Vec2) -> Vec2 {
        Vec2::new(2.0 * cursor.x - 1.0, 1.0 - 2.0 * cursor.y)
    }

    fn projection(&self, hud: bool) -> Transform2D {
        let z = if hud { 0.0 } else { self.camera.z };
        let scene_size = self.size * (1.0 + 2.0 * z / self.size.x);
        let t = Transform2D::identity().scale(Vec2::new(2.0, 2.0).component_div(&scene_size));
        if hud {
            t
        } else {
            t.translate(-self.camera.xy())
        }
    }
}

impl Camera for CameraSystem {
    fn projection_matrix(&self, hud: bool) -> Mat3 {
        self.projection(hud).mat
    }

    fn mouse_position_in_world(&self) -> Vec2 {
        let ndc = Self::to_ndc(self.cursor);
        self.projection(false)
            .inverse()
            .map_or(self.camera.xy(), |inverse| inverse.transform_point(ndc))
    }

    fn lock_on(&mut self, entity: Entity) {
        self.move_timer = self.config.lock_on_ms;
        self.locked_on = Some(entity);
    }

    fn size(&self) -> Vec2 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Motion;
    use approx::assert_relative_eq;

    fn camera() -> CameraSystem {
        CameraSystem::new(CameraConfig::default(), Vec2::new(6000.0, 6000.0))
    }

    #[test]
    fn test_centre_of_window_maps_to_camera() {
        let camera = camera();
        assert_relative_eq!(camera.mouse_position_in_world(), Vec2::zeros(), epsilon = 1e-3);
    }

    #[test]
    fn test_mouse_to_world_inverts_projection() {
        let mut camera = camera();
        camera.set_cursor(Vec2::new(1.0, 0.0));
        let world = camera.mouse_position_in_world();

        let clip = Transform2D { mat: camera.projection_matrix(false) }.transform_point(world);
        assert_relative_eq!(clip, Vec2::new(1.0, 1.0), epsilon = 1e-5);
        // Half of (1 + 2 * 1200 / 1200) * (1200, 800)
        assert_relative_eq!(world, Vec2::new(1800.0, 1200.0), epsilon = 1e-2);
    }

    #[test]
    fn test_cursor_for_world_round_trips() {
        let mut camera = camera();
        let target = Vec2::new(-700.0, 250.0);
        let cursor = camera.cursor_for_world(target);
        camera.set_cursor(cursor);
        assert_relative_eq!(camera.mouse_position_in_world(), target, epsilon = 1e-2);
    }

    #[test]
    fn test_lock_on_eases_then_follows() {
        let mut registry = Registry::new();
        let target = registry.create_entity();
        registry
            .motions
            .insert(target, Motion { position: Vec2::new(400.0, 0.0), ..Motion::default() })
            .unwrap();

        let mut camera = camera();
        camera.lock_on(target);
        camera.step(&registry, 400.0);
        assert_relative_eq!(camera.position().x, 200.0, epsilon = 1e-3);
        assert_relative_eq!(camera.move_timer(), 400.0);

        camera.step(&registry, 400.0);
        assert_relative_eq!(camera.position().x, 400.0, epsilon = 1e-3);
        assert_relative_eq!(camera.position().z, 10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_edge_panning_unlocks() {
        let registry = Registry::new();
        let mut camera = camera();
        let entity = Registry::new().create_entity();
        camera.locked_on = Some(entity);

        camera.on_mouse_move(Vec2::new(0.99, 0.5));
        assert!(camera.locked_on().is_none());

        let before = camera.position();
        camera.step(&registry, 100.0);
        assert!(camera.position().x > before.x);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut camera = camera();
        camera.on_scroll(-1000.0);
        // max zoom is min(6000 - 1200, 6000 - 800) / 2
        assert_relative_eq!(camera.position().z, 2400.0);

        camera.on_scroll(1000.0);
        assert_relative_eq!(camera.position().z, 0.0);
    }
}
