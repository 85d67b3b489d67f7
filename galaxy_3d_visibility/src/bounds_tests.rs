use glam::{Mat4, Quat, Vec3};
use super::*;

fn unit_box() -> AABB {
    AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0))
}

// ============================================================================
// AABB
// ============================================================================

#[test]
fn test_aabb_transformed_by_translation() {
    let moved = unit_box().transformed(&Mat4::from_translation(Vec3::new(10.0, 0.0, -5.0)));
    assert_eq!(moved.min, Vec3::new(9.0, -1.0, -6.0));
    assert_eq!(moved.max, Vec3::new(11.0, 1.0, -4.0));
}

#[test]
fn test_aabb_transformed_by_rotation_stays_tight() {
    let rotated = unit_box().transformed(&Mat4::from_quat(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)));
    assert!((rotated.min - Vec3::splat(-1.0)).length() < 1e-5);
    assert!((rotated.max - Vec3::splat(1.0)).length() < 1e-5);
}

#[test]
fn test_aabb_contains_point_boundary_inclusive() {
    let b = unit_box();
    assert!(b.contains_point(Vec3::ZERO));
    assert!(b.contains_point(Vec3::new(1.0, 1.0, 1.0)));
    assert!(!b.contains_point(Vec3::new(1.01, 0.0, 0.0)));
}

#[test]
fn test_aabb_contains_and_intersects() {
    let outer = AABB::new(Vec3::splat(-4.0), Vec3::splat(4.0));
    let inner = unit_box();
    let straddling = AABB::new(Vec3::splat(3.0), Vec3::splat(5.0));
    let far = AABB::new(Vec3::splat(10.0), Vec3::splat(11.0));

    assert!(outer.contains(&inner));
    assert!(!inner.contains(&outer));
    assert!(!outer.contains(&straddling));
    assert!(outer.intersects(&straddling));
    assert!(!outer.intersects(&far));
}

#[test]
fn test_aabb_volume_and_center() {
    let b = AABB::from_center_half_extents(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 2.0, 0.5));
    assert_eq!(b.center(), Vec3::new(1.0, 2.0, 3.0));
    assert!((b.volume() - 8.0).abs() < 1e-6);
}

// ============================================================================
// BoundingSphere
// ============================================================================

#[test]
fn test_bounding_sphere_encloses_corners() {
    let sphere = unit_box().bounding_sphere();
    assert_eq!(sphere.center, Vec3::ZERO);
    assert!((sphere.radius - 3.0_f32.sqrt()).abs() < 1e-6);
    assert!(sphere.contains_point(Vec3::new(1.0, 1.0, 1.0) * 0.999));
    assert!(!sphere.contains_point(Vec3::new(2.0, 0.0, 0.0)));
}
