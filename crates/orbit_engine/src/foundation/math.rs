//! Math utilities and types
//!
//! The simulation is planar; positions, velocities and scales are [`Vec2`] and
//! affine transforms are homogeneous [`Mat3`].

pub use nalgebra::{Matrix3, Rotation2, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// Homogeneous 2D transform builder
///
/// Operations post-multiply, so the last call is applied to points first:
/// `translate(p).rotate(a).scale(s)` scales, then rotates, then translates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    /// Accumulated transform matrix
    pub mat: Mat3,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self { mat: Mat3::identity() }
    }
}

impl Transform2D {
    /// Create an identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Append a non-uniform scale
    pub fn scale(mut self, scale: Vec2) -> Self {
        self.mat *= Mat3::new_nonuniform_scaling(&scale);
        self
    }

    /// Append a counter-clockwise rotation
    pub fn rotate(mut self, radians: f32) -> Self {
        self.mat *= Rotation2::new(radians).to_homogeneous();
        self
    }

    /// Append a translation
    pub fn translate(mut self, offset: Vec2) -> Self {
        self.mat *= Mat3::new_translation(&offset);
        self
    }

    /// Apply the transform to a point
    pub fn transform_point(&self, point: Vec2) -> Vec2 {
        (self.mat * Vec3::new(point.x, point.y, 1.0)).xy()
    }

    /// Inverse transform, if the matrix is invertible
    pub fn inverse(&self) -> Option<Self> {
        self.mat.try_inverse().map(|mat| Self { mat })
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;
}

/// Math utility functions
pub mod utils {
    use super::{Rotation2, Vec2};

    /// Rotate a vector counter-clockwise by `radians`
    pub fn rotate(vector: Vec2, radians: f32) -> Vec2 {
        Rotation2::new(radians) * vector
    }

    /// Heading of a vector, `atan2(y, x)`
    pub fn heading(vector: Vec2) -> f32 {
        vector.y.atan2(vector.x)
    }
}
