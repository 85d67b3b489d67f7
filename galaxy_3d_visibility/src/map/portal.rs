/// Portals - edges of the submap graph.
///
/// A portal is a quad owned by one SubMap. A Normal portal links to a
/// partner portal in another SubMap and is traversed; a Mirror portal
/// is rendered into a texture by a separate, recursive WorldRender.

use glam::Vec3;
use slotmap::new_key_type;
use crate::camera::{Camera, Frustum};
use crate::world::{AssetRegistry, TextureKey};
use super::map::SubMapKey;

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable key for a Portal within its SubMap.
    pub struct PortalKey;
}

/// Graph-wide identity of a portal: owning submap plus portal key.
///
/// Used both as the link stored by a Normal portal and as the tag
/// stored in a WorldRender's visible-portal list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortalId {
    pub submap: SubMapKey,
    pub portal: PortalKey,
}

impl PortalId {
    pub fn new(submap: SubMapKey, portal: PortalKey) -> Self {
        Self { submap, portal }
    }
}

/// What lies on the other side of a portal
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PortalKind {
    /// Opening into another SubMap. `None` until linked.
    Normal { link: Option<PortalId> },
    /// Reflective surface rendered into `texture`
    Mirror { texture: TextureKey },
}

/// A quad connecting two SubMaps, or a mirror surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Portal {
    corners: [Vec3; 4],
    normal: Vec3,
    kind: PortalKind,
    /// Bit index in the owning submap's arrival mask, assigned on insertion
    arrival_bit: u32,
}

impl Portal {
    /// Create a portal from its 4 world-space corners and facing normal.
    pub fn new(corners: [Vec3; 4], normal: Vec3, kind: PortalKind) -> Self {
        Self {
            corners,
            normal: normal.try_normalize().unwrap_or(Vec3::Z),
            kind,
            arrival_bit: 0,
        }
    }

    /// Create a portal whose normal follows the corner winding
    /// (counter-clockwise seen from the front).
    pub fn from_corners(corners: [Vec3; 4], kind: PortalKind) -> Self {
        let normal = (corners[1] - corners[0]).cross(corners[2] - corners[0]);
        Self::new(corners, normal, kind)
    }

    pub fn corners(&self) -> &[Vec3; 4] {
        &self.corners
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn kind(&self) -> &PortalKind {
        &self.kind
    }

    pub fn is_mirror(&self) -> bool {
        matches!(self.kind, PortalKind::Mirror { .. })
    }

    /// Partner portal of a linked Normal portal
    pub fn link(&self) -> Option<PortalId> {
        match self.kind {
            PortalKind::Normal { link } => link,
            PortalKind::Mirror { .. } => None,
        }
    }

    /// Arithmetic mean of the 4 corners
    pub fn center(&self) -> Vec3 {
        self.corners.iter().copied().sum::<Vec3>() * 0.25
    }

    pub fn arrival_bit(&self) -> u32 {
        self.arrival_bit
    }

    /// `1 << arrival_bit`, or `None` if the bit does not fit in the mask
    pub fn arrival_mask(&self) -> Option<u64> {
        1u64.checked_shl(self.arrival_bit)
    }

    pub(crate) fn set_arrival_bit(&mut self, bit: u32) {
        self.arrival_bit = bit;
    }

    pub(crate) fn set_kind(&mut self, kind: PortalKind) {
        self.kind = kind;
    }

    /// Derive the camera used to continue traversal through this portal.
    ///
    /// - near/far/FOV copied from the parent
    /// - viewport: the parent's, or the target texture size for a mirror
    /// - position: centre of the 4 corners
    /// - forward: the parent's, reflected about the normal for a mirror
    /// - frustum: the opening as seen from the parent position, not a
    ///   fresh FOV frustum
    pub fn make_viewing_camera(&self, parent: &Camera, assets: &AssetRegistry) -> Camera {
        let mut viewport = *parent.viewport();
        let mut forward = parent.forward();

        if let PortalKind::Mirror { texture } = self.kind {
            match assets.texture(texture) {
                Some(info) => {
                    viewport.x = 0.0;
                    viewport.y = 0.0;
                    viewport.width = info.width as f32;
                    viewport.height = info.height as f32;
                }
                None => {
                    crate::engine_warn!("galaxy3d::Portal",
                        "Mirror texture {:?} not registered, keeping parent viewport", texture);
                }
            }
            forward = reflect(forward, self.normal);
        }

        let position = self.center();
        let mut camera = Camera::new(
            position,
            position + forward,
            parent.up(),
            parent.fov_y(),
            parent.near(),
            parent.far(),
            viewport,
        );
        camera.set_frustum(Frustum::from_polygon(&self.corners, parent.position()));
        camera
    }
}

/// Reflect `direction` about the plane with unit `normal`
fn reflect(direction: Vec3, normal: Vec3) -> Vec3 {
    direction - 2.0 * direction.dot(normal) * normal
}

#[cfg(test)]
#[path = "portal_tests.rs"]
mod tests;
