//! Motion integration

use crate::foundation::math::{utils, Vec2};

/// Semi-implicit Euler step
///
/// The velocity takes the acceleration first and the position then advances
/// with the updated velocity scaled by `speed_boost`. Returns the new
/// `(position, velocity)`.
pub fn semi_implicit_euler(
    position: Vec2,
    velocity: Vec2,
    acceleration: Vec2,
    dt_seconds: f32,
    speed_boost: f32,
) -> (Vec2, Vec2) {
    let velocity = velocity + acceleration * dt_seconds;
    let position = position + velocity * dt_seconds * speed_boost;
    (position, velocity)
}

/// Rotate `position` counter-clockwise about `center` by `radians`
pub fn rotate_about(position: Vec2, center: Vec2, radians: f32) -> Vec2 {
    utils::rotate(position - center, radians) + center
}
