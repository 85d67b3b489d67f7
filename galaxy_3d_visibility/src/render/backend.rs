/// Draw contract between the visibility core and a renderer.
///
/// The core decides what is visible; a `RenderBackend` sets up views,
/// draws the objects it is handed, and copies finished views into
/// textures for mirror portals.

use bitflags::bitflags;
use glam::{Mat4, Vec3, Vec4};
use crate::camera::Camera;
use crate::error::Result;
use crate::map::Light;
use crate::world::{MeshKey, TextureKey};
use super::world_render::{GameObjectTag, ObjectTag};

/// Outcome of a single draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawResult {
    Drawn,
    /// The backend ran its own test and rejected the object
    Culled,
    /// Hidden for a reason other than culling (disabled, fully transparent)
    NotVisible,
    /// Stop drawing the current view
    Cancelled,
    Error,
}

bitflags! {
    /// Per-draw flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct DrawFlags: u32 {
        /// Visibility already decided, skip the backend's own cull test
        const ALREADY_CULLED = 1 << 0;
        /// Mobile object (GameObject)
        const DYNAMIC        = 1 << 1;
    }
}

bitflags! {
    /// Per-view setup flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ViewFlags: u32 {
        const CLEAR         = 1 << 0;
        const SKYBOX        = 1 << 1;
        const DEBUG_PORTALS = 1 << 2;
        /// Render target is a mirror texture, not the screen
        const OFFSCREEN     = 1 << 3;
    }
}

/// Everything `begin_view` needs to prepare a view
#[derive(Debug, Clone, Copy)]
pub struct ViewSetup<'a> {
    pub camera: &'a Camera,
    pub flags: ViewFlags,
    pub clear_color: Vec4,
    /// Lights collected by the traversal
    pub lights: &'a [Light],
}

/// Which visible-list entry a draw request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawSource {
    Static(ObjectTag),
    Dynamic(GameObjectTag),
}

/// A resolved object, ready to draw
#[derive(Debug, Clone, Copy)]
pub struct DrawRequest<'a> {
    pub source: DrawSource,
    pub mesh: MeshKey,
    pub texture: Option<TextureKey>,
    pub world_matrix: Mat4,
    pub colour: Vec4,
    /// Shader requested by the object's shading capability
    pub shader: Option<&'a str>,
    pub flags: DrawFlags,
}

pub trait RenderBackend {
    /// Clear, set the viewport and optionally draw the skybox.
    fn begin_view(&mut self, view: &ViewSetup<'_>) -> Result<()>;

    /// Draw one object.
    fn draw_object(&mut self, request: &DrawRequest<'_>) -> DrawResult;

    /// Debug outline of a collected portal.
    fn draw_portal_outline(&mut self, _corners: &[Vec3; 4], _mirror: bool) {}

    /// Finish the current view.
    fn end_view(&mut self) -> Result<()> {
        Ok(())
    }

    /// Copy the colour buffer, bounded by `camera`'s viewport, into `texture`.
    fn capture_into(&mut self, camera: &Camera, texture: TextureKey) -> Result<()>;

    /// Fill a mirror texture that is too deep to render.
    fn fill_placeholder(&mut self, texture: TextureKey) -> Result<()>;
}
