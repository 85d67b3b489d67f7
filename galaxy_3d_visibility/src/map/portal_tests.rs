/// Tests for Portal
///
/// These tests validate child-camera derivation through Normal and Mirror
/// portals, normals from corner winding, and arrival masks.

use super::*;
use crate::camera::{SphereTest, Viewport};
use crate::world::TextureInfo;
use slotmap::SlotMap;
use std::f32::consts::FRAC_PI_2;

// ============================================================================
// Helper Functions
// ============================================================================

fn parent_camera() -> Camera {
    Camera::new(
        Vec3::ZERO,
        Vec3::NEG_Z,
        Vec3::Y,
        FRAC_PI_2,
        0.1,
        100.0,
        Viewport::new(800.0, 600.0),
    )
}

/// 2x2 quad at z = -5, counter-clockwise seen from +Z
fn quad_at_minus_five() -> [Vec3; 4] {
    [
        Vec3::new(-1.0, -1.0, -5.0),
        Vec3::new(1.0, -1.0, -5.0),
        Vec3::new(1.0, 1.0, -5.0),
        Vec3::new(-1.0, 1.0, -5.0),
    ]
}

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn test_from_corners_normal_follows_winding() {
    let portal = Portal::from_corners(quad_at_minus_five(), PortalKind::Normal { link: None });

    assert!((portal.normal() - Vec3::Z).length() < 1e-6);
    assert_eq!(portal.center(), Vec3::new(0.0, 0.0, -5.0));
}

#[test]
fn test_new_normalizes_normal() {
    let portal = Portal::new(quad_at_minus_five(), Vec3::new(0.0, 0.0, 3.0), PortalKind::Normal { link: None });
    assert!((portal.normal().length() - 1.0).abs() < 1e-6);
}

#[test]
fn test_link_of_mirror_is_none() {
    let mut textures: SlotMap<TextureKey, ()> = SlotMap::with_key();
    let texture = textures.insert(());

    let portal = Portal::from_corners(quad_at_minus_five(), PortalKind::Mirror { texture });
    assert!(portal.is_mirror());
    assert_eq!(portal.link(), None);
}

#[test]
fn test_link_of_normal_portal() {
    let mut submaps: SlotMap<SubMapKey, ()> = SlotMap::with_key();
    let mut portals: SlotMap<PortalKey, ()> = SlotMap::with_key();
    let target = PortalId::new(submaps.insert(()), portals.insert(()));

    let portal = Portal::from_corners(quad_at_minus_five(), PortalKind::Normal { link: Some(target) });
    assert!(!portal.is_mirror());
    assert_eq!(portal.link(), Some(target));
}

#[test]
fn test_arrival_mask() {
    let mut portal = Portal::from_corners(quad_at_minus_five(), PortalKind::Normal { link: None });
    assert_eq!(portal.arrival_mask(), Some(1));

    portal.set_arrival_bit(3);
    assert_eq!(portal.arrival_mask(), Some(8));

    portal.set_arrival_bit(63);
    assert_eq!(portal.arrival_mask(), Some(1u64 << 63));

    portal.set_arrival_bit(64);
    assert_eq!(portal.arrival_mask(), None);
}

// ============================================================================
// Viewing Camera Tests
// ============================================================================

#[test]
fn test_viewing_camera_through_normal_portal() {
    let parent = parent_camera();
    let portal = Portal::from_corners(quad_at_minus_five(), PortalKind::Normal { link: None });

    let child = portal.make_viewing_camera(&parent, &AssetRegistry::new());

    assert_eq!(child.position(), Vec3::new(0.0, 0.0, -5.0));
    assert!((child.forward() - Vec3::NEG_Z).length() < 1e-6);
    assert_eq!(child.near(), parent.near());
    assert_eq!(child.far(), parent.far());
    assert_eq!(child.fov_y(), parent.fov_y());
    assert_eq!(child.viewport(), parent.viewport());
}

#[test]
fn test_viewing_camera_frustum_is_portal_opening() {
    let parent = parent_camera();
    let portal = Portal::from_corners(quad_at_minus_five(), PortalKind::Normal { link: None });

    let child = portal.make_viewing_camera(&parent, &AssetRegistry::new());
    let frustum = child.frustum();

    // 4 side planes, no near or far cap
    assert_eq!(frustum.plane_count(), 4);
    // Straight through the opening
    assert_eq!(frustum.test_sphere(Vec3::new(0.0, 0.0, -50.0), 0.1), SphereTest::Inside);
    // Inside the parent's 90 degree FOV but outside the opening
    assert_eq!(frustum.test_sphere(Vec3::new(5.0, 0.0, -10.0), 0.1), SphereTest::Culled);
    // Far beyond the parent's far plane: no cap
    assert_eq!(frustum.test_sphere(Vec3::new(0.0, 0.0, -1000.0), 0.1), SphereTest::Inside);
}

#[test]
fn test_viewing_camera_through_mirror_reflects_forward() {
    let mut assets = AssetRegistry::new();
    let texture = assets.add_texture(TextureInfo::new("mirror", 256, 128));

    let parent = parent_camera();
    let portal = Portal::new(quad_at_minus_five(), Vec3::Z, PortalKind::Mirror { texture });

    let child = portal.make_viewing_camera(&parent, &assets);

    assert!((child.forward() - Vec3::Z).length() < 1e-6);
    assert_eq!(child.viewport().width, 256.0);
    assert_eq!(child.viewport().height, 128.0);
    assert_eq!(child.look_at(), child.position() + Vec3::Z);
}

#[test]
fn test_viewing_camera_mirror_without_texture_keeps_viewport() {
    let mut other = AssetRegistry::new();
    let texture = other.add_texture(TextureInfo::new("elsewhere", 64, 64));

    let parent = parent_camera();
    let portal = Portal::new(quad_at_minus_five(), Vec3::Z, PortalKind::Mirror { texture });

    let child = portal.make_viewing_camera(&parent, &AssetRegistry::new());
    assert_eq!(child.viewport(), parent.viewport());
}
