//! Newtonian point-mass gravity

use crate::foundation::math::Vec2;

/// Gravitational constant in game units
pub const GRAVITATIONAL_CONSTANT: f32 = 10_000.0;

/// Acceleration felt at `position` due to a body of `source_mass` at `source_position`
///
/// `g * m_other / |dp|²` along the normalized separation. Coincident bodies
/// are not guarded against and yield non-finite values.
pub fn gravitational_acceleration(g: f32, position: Vec2, source_position: Vec2, source_mass: f32) -> Vec2 {
    let dp = source_position - position;
    let dist_squared = dp.dot(&dp);
    let magnitude = g * source_mass / dist_squared;
    dp.normalize() * magnitude
}
