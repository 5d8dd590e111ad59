//! Collision primitives
//!
//! Missiles are tested vertex-by-vertex against the bounding circles of the
//! bodies they can hit. Collision meshes are stored in model space, normalized
//! into the unit box centred on the origin, and only translated at test time.

use crate::foundation::math::Vec2;

/// A bounding circle for collision detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingCircle {
    /// The center position of the circle in world space
    pub center: Vec2,
    /// The radius of the circle
    pub radius: f32,
}

impl BoundingCircle {
    /// Creates a new bounding circle with the given center and radius
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Whether the point lies strictly inside the circle
    pub fn contains_point(&self, point: Vec2) -> bool {
        let dp = point - self.center;
        dp.dot(&dp) < self.radius * self.radius
    }
}

/// A collision mesh stored in MODEL SPACE
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionMesh {
    /// Vertices in model space, inside `[-0.5, 0.5]²` once normalized
    pub vertices: Vec<Vec2>,
    /// Triangle indices into `vertices`
    pub indices: Vec<u16>,
    /// Extent of the source geometry before normalization
    pub original_size: Vec2,
}

impl CollisionMesh {
    /// Wrap vertices that are already in model space
    pub fn new(vertices: Vec<Vec2>, indices: Vec<u16>, original_size: Vec2) -> Self {
        Self { vertices, indices, original_size }
    }

    /// Build a mesh from raw geometry, normalizing it into the unit box
    ///
    /// The bounding-box extent becomes `original_size`; an axis with (almost)
    /// no extent is treated as one unit wide.
    pub fn normalized(vertices: &[Vec2], indices: Vec<u16>) -> Self {
        if vertices.is_empty() {
            return Self::new(Vec::new(), indices, Vec2::new(1.0, 1.0));
        }

        let mut min = Vec2::repeat(f32::MAX);
        let mut max = Vec2::repeat(f32::MIN);
        for v in vertices {
            min = min.inf(v);
            max = max.sup(v);
        }

        let mut size = max - min;
        for axis in 0..2 {
            if size[axis].abs() < 0.001 {
                size[axis] = 1.0;
            }
        }

        let normalized = vertices
            .iter()
            .map(|v| (v - min).component_div(&size) - Vec2::repeat(0.5))
            .collect();

        Self::new(normalized, indices, size)
    }

    /// Whether any vertex, translated by `offset`, falls inside `circle`
    pub fn any_vertex_within(&self, offset: Vec2, circle: &BoundingCircle) -> bool {
        self.vertices.iter().any(|v| circle.contains_point(offset + v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_contains_point_is_strict() {
        let circle = BoundingCircle::new(Vec2::new(1.0, 1.0), 2.0);
        assert!(circle.contains_point(Vec2::new(2.0, 2.0)));
        assert!(!circle.contains_point(Vec2::new(3.0, 1.0)));
    }

    #[test]
    fn test_normalized_mesh() {
        let raw = [Vec2::new(-1.5, 0.0), Vec2::new(1.5, 0.5), Vec2::new(0.0, -0.5)];
        let mesh = CollisionMesh::normalized(&raw, vec![0, 1, 2]);

        assert_relative_eq!(mesh.original_size, Vec2::new(3.0, 1.0));
        assert_relative_eq!(mesh.vertices[0], Vec2::new(-0.5, 0.0));
        assert_relative_eq!(mesh.vertices[1], Vec2::new(0.5, 0.5));
        assert_relative_eq!(mesh.vertices[2], Vec2::new(0.0, -0.5));
    }

    #[test]
    fn test_flat_axis_gets_unit_extent() {
        let raw = [Vec2::new(0.0, 2.0), Vec2::new(4.0, 2.0)];
        let mesh = CollisionMesh::normalized(&raw, Vec::new());
        assert_relative_eq!(mesh.original_size, Vec2::new(4.0, 1.0));
    }

    #[test]
    fn test_any_vertex_within() {
        let mesh = CollisionMesh::new(vec![Vec2::new(0.5, 0.0), Vec2::new(-0.5, 0.0)], Vec::new(), Vec2::new(1.0, 1.0));
        let target = BoundingCircle::new(Vec2::new(10.0, 0.0), 1.0);

        assert!(!mesh.any_vertex_within(Vec2::new(8.0, 0.0), &target));
        assert!(mesh.any_vertex_within(Vec2::new(9.0, 0.0), &target));
    }
}
