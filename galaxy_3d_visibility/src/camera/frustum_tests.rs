use glam::{Mat4, Vec3, Vec4Swizzles};
use super::*;

fn look_at_origin_frustum(fov: f32) -> Frustum {
    let projection = Mat4::perspective_rh(fov, 1.0, 0.1, 100.0);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    Frustum::from_view_projection(&(projection * view))
}

fn unit_square() -> [Vec3; 4] {
    [
        Vec3::new(-1.0, -1.0, 0.0),
        Vec3::new(1.0, -1.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(-1.0, 1.0, 0.0),
    ]
}

// ============================================================================
// Frustum::from_view_projection
// ============================================================================

#[test]
fn test_frustum_from_identity_matrix() {
    let frustum = Frustum::from_view_projection(&Mat4::IDENTITY);

    assert_eq!(frustum.plane_count(), 6);
    for plane in &frustum.planes {
        let normal_len = plane.xyz().length();
        assert!((normal_len - 1.0).abs() < 1e-5, "plane normal should be unit length");
    }
}

#[test]
fn test_frustum_from_perspective_projection_is_normalized() {
    let frustum = look_at_origin_frustum(std::f32::consts::FRAC_PI_4);
    for plane in &frustum.planes {
        assert!((plane.xyz().length() - 1.0).abs() < 1e-4);
    }
}

#[test]
fn test_near_plane_faces_view_direction() {
    let frustum = look_at_origin_frustum(std::f32::consts::FRAC_PI_2);

    // Camera at z=5 looking down -Z: near plane normal points to -Z
    assert!(frustum.planes[PLANE_NEAR].z < -0.99);
    // The eye sits `near` behind the near plane
    let eye_distance = frustum.signed_distance(PLANE_NEAR, Vec3::new(0.0, 0.0, 5.0));
    assert!((eye_distance + 0.1).abs() < 1e-3, "got {}", eye_distance);
    // Far plane faces back toward the camera
    assert!(frustum.planes[PLANE_FAR].z > 0.99);
}

// ============================================================================
// Frustum::test_sphere
// ============================================================================

#[test]
fn test_sphere_inside_frustum() {
    let frustum = look_at_origin_frustum(std::f32::consts::FRAC_PI_2);
    assert_eq!(frustum.test_sphere(Vec3::ZERO, 1.0), SphereTest::Inside);
}

#[test]
fn test_sphere_outside_frustum() {
    let frustum = look_at_origin_frustum(std::f32::consts::FRAC_PI_4);
    assert_eq!(frustum.test_sphere(Vec3::splat(100.0), 1.0), SphereTest::Culled);
}

#[test]
fn test_sphere_behind_camera_and_beyond_far() {
    let frustum = look_at_origin_frustum(std::f32::consts::FRAC_PI_2);
    assert_eq!(frustum.test_sphere(Vec3::new(0.0, 0.0, 10.0), 1.0), SphereTest::Culled);
    assert_eq!(frustum.test_sphere(Vec3::new(0.0, 0.0, -200.0), 1.0), SphereTest::Culled);
}

#[test]
fn test_sphere_straddling_plane_is_inside() {
    let frustum = look_at_origin_frustum(std::f32::consts::FRAC_PI_2);
    // 90° FOV: at distance 5 the half-width is 5. Centre just outside, radius reaches in.
    assert_eq!(frustum.test_sphere(Vec3::new(5.5, 0.0, 0.0), 1.0), SphereTest::Inside);
    assert_eq!(frustum.test_sphere(Vec3::new(5.5, 0.0, 0.0), 0.1), SphereTest::Culled);
}

#[test]
fn test_empty_frustum_culls_nothing() {
    let frustum = Frustum::default();
    assert!(frustum.is_empty());
    assert_eq!(frustum.test_sphere(Vec3::splat(1e6), 0.0), SphereTest::Inside);
}

// ============================================================================
// Frustum::from_polygon
// ============================================================================

#[test]
fn test_polygon_frustum_contains_centroid() {
    let frustum = Frustum::from_polygon(&unit_square(), Vec3::new(0.0, 0.0, 5.0));

    assert_eq!(frustum.plane_count(), 4);
    for i in 0..4 {
        assert!(frustum.signed_distance(i, Vec3::ZERO) > 0.0, "plane {} rejects centroid", i);
    }
    assert_eq!(frustum.test_sphere(Vec3::ZERO, 0.0), SphereTest::Inside);
}

#[test]
fn test_polygon_frustum_is_winding_independent() {
    let mut reversed = unit_square();
    reversed.reverse();
    let apex = Vec3::new(0.3, -0.2, 4.0);

    let a = Frustum::from_polygon(&unit_square(), apex);
    let b = Frustum::from_polygon(&reversed, apex);
    for point in [Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0), Vec3::new(10.0, 0.0, -10.0)] {
        assert_eq!(a.test_sphere(point, 0.5), b.test_sphere(point, 0.5));
    }
}

#[test]
fn test_polygon_frustum_bounds_solid_angle() {
    let frustum = Frustum::from_polygon(&unit_square(), Vec3::new(0.0, 0.0, 5.0));

    // Straight through the opening
    assert_eq!(frustum.test_sphere(Vec3::new(0.0, 0.0, -10.0), 0.5), SphereTest::Inside);
    // At z=-10 the opening has widened to a half-width of 3
    assert_eq!(frustum.test_sphere(Vec3::new(10.0, 0.0, -10.0), 0.5), SphereTest::Culled);
    // Behind the apex
    assert_eq!(frustum.test_sphere(Vec3::new(0.0, 0.0, 10.0), 0.5), SphereTest::Culled);
}

#[test]
fn test_polygon_frustum_planes_pass_through_apex() {
    let apex = Vec3::new(0.0, 2.0, 6.0);
    let frustum = Frustum::from_polygon(&unit_square(), apex);
    for i in 0..frustum.plane_count() {
        assert!(frustum.signed_distance(i, apex).abs() < 1e-5);
    }
}

#[test]
fn test_polygon_frustum_too_few_vertices() {
    let frustum = Frustum::from_polygon(&[Vec3::ZERO, Vec3::X], Vec3::Z);
    assert!(frustum.is_empty());
}

#[test]
fn test_polygon_frustum_collinear_edge_yields_zero_plane() {
    // Apex on the line through the first edge
    let apex = Vec3::new(-3.0, -1.0, 0.0);
    let frustum = Frustum::from_polygon(&unit_square(), apex);
    assert!(frustum.planes.iter().any(|p| *p == glam::Vec4::ZERO));
}
