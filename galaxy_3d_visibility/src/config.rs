/// Render configuration shared by a WorldRender and its mirror passes.

use glam::Vec4;
use crate::render::ViewFlags;

/// WorldRender configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Mirror nesting levels rendered before placeholders are used.
    /// 0 disables mirror rendering.
    pub max_mirror_depth: u32,
    /// Draw the skybox before the objects
    pub draw_skybox: bool,
    /// Outline every collected portal after the objects
    pub debug_draw_portals: bool,
    /// Only collect lights whose radius reaches the frustum
    pub cull_lights: bool,
    /// Colour the view is cleared to
    pub clear_color: Vec4,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_mirror_depth: 2,
            draw_skybox: true,
            debug_draw_portals: false,
            cull_lights: true,
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
        }
    }
}

impl RenderConfig {
    /// View setup flags for the main pass
    pub fn view_flags(&self) -> ViewFlags {
        let mut flags = ViewFlags::CLEAR;
        flags.set(ViewFlags::SKYBOX, self.draw_skybox);
        flags.set(ViewFlags::DEBUG_PORTALS, self.debug_draw_portals);
        flags
    }
}
