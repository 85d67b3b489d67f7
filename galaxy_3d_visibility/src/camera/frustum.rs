/// Frustum - a convex set of clipping planes for visibility culling.
///
/// Each plane is represented as a Vec4 (A, B, C, D) where:
/// - (A, B, C) is the inward-pointing unit normal
/// - D is the signed distance
/// - A point P is inside if dot(plane.xyz, P) + D >= 0 for all planes
///
/// Two shapes are produced:
/// - a camera frustum (6 planes) extracted from a view-projection matrix
/// - a portal frustum (N side planes) bounding the solid angle a polygon
///   subtends as seen from an apex, with no near or far cap

use glam::{Mat4, Vec3, Vec4, Vec4Swizzles};
use crate::bounds::BoundingSphere;

/// Frustum plane indices for a camera frustum
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_FAR: usize = 4;
pub const PLANE_NEAR: usize = 5;

/// Below this length an edge plane normal is considered degenerate
const DEGENERATE_NORMAL_EPSILON: f32 = 1e-8;

/// Result of a sphere/frustum test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SphereTest {
    /// The sphere touches the inner side of every plane
    Inside,
    /// The sphere lies fully behind at least one plane
    Culled,
}

/// Convex set of inward-facing planes.
///
/// An empty frustum culls nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frustum {
    /// Camera frustums: left, right, bottom, top, far, near.
    /// Portal frustums: one side plane per polygon edge.
    pub planes: Vec<Vec4>,
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Uses the Gribb & Hartmann method. Works for both perspective
    /// and orthographic projections. glam projections map depth to
    /// [0, 1], so the near plane is row 2 alone.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let row0 = vp.row(0);
        let row1 = vp.row(1);
        let row2 = vp.row(2);
        let row3 = vp.row(3);

        let planes = vec![
            normalize_plane(row3 + row0), // left
            normalize_plane(row3 - row0), // right
            normalize_plane(row3 + row1), // bottom
            normalize_plane(row3 - row1), // top
            normalize_plane(row3 - row2), // far
            normalize_plane(row2),        // near
        ];

        Self { planes }
    }

    /// Side planes of the pyramid with its tip at `apex` whose cross
    /// section is the polygon `vertices`.
    ///
    /// Plane i contains the apex and the edge (vertices[i-1], vertices[i]);
    /// its normal is `cross(vertices[i] - apex, vertices[i-1] - apex)`,
    /// flipped when needed so the polygon centroid is on the inner side.
    /// The result therefore does not depend on the polygon winding.
    /// An edge whose endpoints are collinear with the apex yields a zero
    /// plane, which never culls.
    pub fn from_polygon(vertices: &[Vec3], apex: Vec3) -> Self {
        let count = vertices.len();
        if count < 3 {
            return Self::default();
        }

        let centroid = vertices.iter().copied().sum::<Vec3>() / count as f32;
        let mut planes = Vec::with_capacity(count);

        for i in 0..count {
            let current = vertices[i] - apex;
            let previous = vertices[(i + count - 1) % count] - apex;
            let normal = current.cross(previous);
            let length = normal.length();

            if length < DEGENERATE_NORMAL_EPSILON {
                planes.push(Vec4::ZERO);
                continue;
            }

            let mut normal = normal / length;
            if normal.dot(centroid - apex) < 0.0 {
                normal = -normal;
            }
            planes.push(normal.extend(-normal.dot(apex)));
        }

        Self { planes }
    }

    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    /// Signed distance from `point` to plane `index` (positive = inside)
    pub fn signed_distance(&self, index: usize, point: Vec3) -> f32 {
        let plane = self.planes[index];
        plane.xyz().dot(point) + plane.w
    }

    /// Classify a sphere: inside iff `dot(plane.xyz, center) + plane.w > -radius`
    /// holds for every plane.
    pub fn test_sphere(&self, center: Vec3, radius: f32) -> SphereTest {
        let outside = self
            .planes
            .iter()
            .filter(|plane| **plane != Vec4::ZERO)
            .any(|plane| plane.xyz().dot(center) + plane.w <= -radius);

        if outside { SphereTest::Culled } else { SphereTest::Inside }
    }

    /// Convenience wrapper over [`Frustum::test_sphere`]
    pub fn test_bounding_sphere(&self, sphere: &BoundingSphere) -> SphereTest {
        self.test_sphere(sphere.center, sphere.radius)
    }
}

/// Scale a plane so its normal has unit length
fn normalize_plane(plane: Vec4) -> Vec4 {
    let normal_len = plane.xyz().length();
    if normal_len > 0.0 {
        plane / normal_len
    } else {
        plane
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
