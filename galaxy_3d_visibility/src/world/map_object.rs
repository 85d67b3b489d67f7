/// MapObject - static geometry placed in the level.
///
/// MapObjects are owned by the World and referenced from SubMaps by key.
/// Their world bounds are the mesh's local bounds moved by the object's
/// transform.

use bitflags::bitflags;
use glam::{Mat4, Quat, Vec3, Vec4};
use slotmap::new_key_type;
use crate::bounds::AABB;
use super::assets::{AssetRegistry, MeshKey, TextureKey};

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable key for a MapObject within the World.
    pub struct MapObjectKey;
}

bitflags! {
    /// Placement flags of a MapObject.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ObjectFlags: u32 {
        /// May act as the outer object of inside pairs
        const CONTAINER      = 1 << 0;
        /// Contents stay visible when this container is drawn (glass, cages)
        const SHOW_CONTAINED = 1 << 1;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapObject {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    /// RGBA tint passed through to the draw call
    pub colour: Vec4,
    pub mesh: MeshKey,
    pub texture: Option<TextureKey>,
    pub flags: ObjectFlags,
}

impl MapObject {
    /// Untinted, unrotated object at `position`.
    pub fn new(mesh: MeshKey, position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            colour: Vec4::ONE,
            mesh,
            texture: None,
            flags: ObjectFlags::empty(),
        }
    }

    pub fn with_flags(mut self, flags: ObjectFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_texture(mut self, texture: TextureKey) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// World-space bounds, `None` if the mesh is not registered.
    pub fn world_bounds(&self, assets: &AssetRegistry) -> Option<AABB> {
        assets
            .mesh(self.mesh)
            .map(|mesh| mesh.bounds.transformed(&self.world_matrix()))
    }
}
