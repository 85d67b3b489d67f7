/// Read-mostly asset registry.
///
/// Meshes contribute the local-space bounds used by culling; textures
/// give mirror portals their viewport size. The registry is an explicit
/// value owned by the World and passed by reference into the traversal,
/// so each test can build an isolated fixture.

use slotmap::{new_key_type, SlotMap};
use crate::bounds::AABB;

// ===== SLOT MAP KEYS =====

new_key_type! {
    /// Stable key for a mesh in the AssetRegistry.
    pub struct MeshKey;
}

new_key_type! {
    /// Stable key for a texture in the AssetRegistry.
    pub struct TextureKey;
}

/// Culling-relevant data of a mesh
#[derive(Debug, Clone, PartialEq)]
pub struct MeshInfo {
    pub name: String,
    /// Local-space bounds, transformed by the owner's world matrix
    pub bounds: AABB,
}

impl MeshInfo {
    pub fn new(name: impl Into<String>, bounds: AABB) -> Self {
        Self { name: name.into(), bounds }
    }
}

/// Render-target relevant data of a texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl TextureInfo {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self { name: name.into(), width, height }
    }
}

#[derive(Debug, Default)]
pub struct AssetRegistry {
    meshes: SlotMap<MeshKey, MeshInfo>,
    textures: SlotMap<TextureKey, TextureInfo>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== MESHES =====

    pub fn add_mesh(&mut self, mesh: MeshInfo) -> MeshKey {
        self.meshes.insert(mesh)
    }

    pub fn remove_mesh(&mut self, key: MeshKey) -> Option<MeshInfo> {
        self.meshes.remove(key)
    }

    pub fn mesh(&self, key: MeshKey) -> Option<&MeshInfo> {
        self.meshes.get(key)
    }

    /// Find a mesh by name (linear scan).
    pub fn mesh_by_name(&self, name: &str) -> Option<MeshKey> {
        self.meshes.iter().find(|(_, mesh)| mesh.name == name).map(|(key, _)| key)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    // ===== TEXTURES =====

    pub fn add_texture(&mut self, texture: TextureInfo) -> TextureKey {
        self.textures.insert(texture)
    }

    pub fn remove_texture(&mut self, key: TextureKey) -> Option<TextureInfo> {
        self.textures.remove(key)
    }

    pub fn texture(&self, key: TextureKey) -> Option<&TextureInfo> {
        self.textures.get(key)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}
