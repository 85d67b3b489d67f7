/// Camera - viewing parameters plus the frustum planes derived from them.
///
/// Unlike a passive render camera, this camera carries the high-level
/// parameters (position, look-at, up, FOV, near/far) because the portal
/// traversal derives child cameras from them. The frustum is stored
/// separately: a main camera computes it from its own projection, while a
/// camera looking through a portal inherits a clipped polygon frustum.

use glam::{Mat4, Vec3};
use super::frustum::Frustum;

/// Viewport rectangle and depth range, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-depth viewport at the origin
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    /// Width over height, 1.0 for a degenerate viewport
    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 && self.width > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Orthographic overlay volume (HUD, debug text) drawn over a view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoOverlay {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl OrthoOverlay {
    /// Pixel-space overlay covering a viewport
    pub fn for_viewport(viewport: &Viewport) -> Self {
        Self {
            left: 0.0,
            right: viewport.width,
            bottom: viewport.height,
            top: 0.0,
            near: -1.0,
            far: 1.0,
        }
    }
}

/// Perspective camera.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    look_at: Vec3,
    up: Vec3,
    /// Vertical field of view, radians
    fov_y: f32,
    near: f32,
    far: f32,
    viewport: Viewport,
    frustum: Frustum,
    overlay: Option<OrthoOverlay>,
}

impl Camera {
    /// Create a camera and compute its 6 frustum planes.
    pub fn new(
        position: Vec3,
        look_at: Vec3,
        up: Vec3,
        fov_y: f32,
        near: f32,
        far: f32,
        viewport: Viewport,
    ) -> Self {
        let mut camera = Self {
            position,
            look_at,
            up,
            fov_y,
            near,
            far,
            viewport,
            frustum: Frustum::default(),
            overlay: None,
        };
        camera.compute_frustum_planes();
        camera
    }

    // ===== GETTERS =====

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Unit view direction. Falls back to -Z when look-at equals position.
    pub fn forward(&self) -> Vec3 {
        (self.look_at - self.position).try_normalize().unwrap_or(Vec3::NEG_Z)
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Current culling planes.
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    pub fn overlay(&self) -> Option<&OrthoOverlay> {
        self.overlay.as_ref()
    }

    /// View matrix (right-handed look-at).
    pub fn view_matrix(&self) -> Mat4 {
        let forward = self.forward();
        let up = if forward.cross(self.up).length_squared() < 1e-8 {
            forward.any_orthonormal_vector()
        } else {
            self.up
        };
        Mat4::look_at_rh(self.position, self.position + forward, up)
    }

    /// Perspective projection matrix (depth mapped to [0, 1]).
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.viewport.aspect_ratio(), self.near, self.far)
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Orthographic projection of the overlay, if one is set.
    pub fn overlay_projection(&self) -> Option<Mat4> {
        self.overlay.map(|o| Mat4::orthographic_rh(o.left, o.right, o.bottom, o.top, o.near, o.far))
    }

    // ===== FRUSTUM =====

    /// Replace the frustum with the 6 planes of this camera's own
    /// projection × view. Valid until the view changes.
    pub fn compute_frustum_planes(&mut self) {
        self.frustum = Frustum::from_view_projection(&self.view_projection_matrix());
    }

    /// Install an externally computed frustum (e.g. a portal polygon frustum).
    pub fn set_frustum(&mut self, frustum: Frustum) {
        self.frustum = frustum;
    }

    // ===== SETTERS - store only; call compute_frustum_planes() afterwards =====

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_look_at(&mut self, look_at: Vec3) {
        self.look_at = look_at;
    }

    pub fn set_up(&mut self, up: Vec3) {
        self.up = up;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_overlay(&mut self, overlay: Option<OrthoOverlay>) {
        self.overlay = overlay;
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
