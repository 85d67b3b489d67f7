/// GameObject - a mobile object tracked by the spatial index.
///
/// Unlike MapObjects, GameObjects are not referenced by SubMaps at load
/// time. Each one is a member of at most one SubMap's dynamic list,
/// the SubMap containing its current position, recorded in
/// `current_submap`.

use glam::{Mat4, Quat, Vec3, Vec4};
use slotmap::new_key_type;
use crate::bounds::AABB;
use crate::map::SubMapKey;
use super::assets::{AssetRegistry, MeshKey, TextureKey};
use super::physics::{Physics, Shading};

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable key for a GameObject within the World.
    pub struct GameObjectKey;
}

#[derive(Debug)]
pub struct GameObject {
    pub position: Vec3,
    pub rotation: Quat,
    pub colour: Vec4,
    pub mesh: MeshKey,
    pub texture: Option<TextureKey>,
    pub(crate) current_submap: Option<SubMapKey>,
    pub physics: Option<Box<dyn Physics>>,
    pub shading: Option<Box<dyn Shading>>,
}

impl GameObject {
    pub fn new(mesh: MeshKey, position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            colour: Vec4::ONE,
            mesh,
            texture: None,
            current_submap: None,
            physics: None,
            shading: None,
        }
    }

    pub fn with_texture(mut self, texture: TextureKey) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_physics(mut self, physics: impl Physics + 'static) -> Self {
        self.physics = Some(Box::new(physics));
        self
    }

    pub fn with_shading(mut self, shading: impl Shading + 'static) -> Self {
        self.shading = Some(Box::new(shading));
        self
    }

    /// SubMap whose dynamic list holds this object, if any
    pub fn current_submap(&self) -> Option<SubMapKey> {
        self.current_submap
    }

    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// World-space bounds, `None` if the mesh is not registered.
    pub fn world_bounds(&self, assets: &AssetRegistry) -> Option<AABB> {
        assets
            .mesh(self.mesh)
            .map(|mesh| mesh.bounds.transformed(&self.world_matrix()))
    }

    /// Base colour after the shading capability, if any
    pub fn shaded_colour(&self) -> Vec4 {
        self.shading
            .as_ref()
            .map_or(self.colour, |shading| shading.modulate(self.colour))
    }

    /// Run the physics capability for one tick. Returns whether it moved.
    pub(crate) fn integrate(&mut self, dt: f32) -> bool {
        let Some(physics) = self.physics.as_mut() else {
            return false;
        };
        let before = (self.position, self.rotation);
        physics.step(&mut self.position, &mut self.rotation, dt);
        before != (self.position, self.rotation)
    }
}
