/// Point light owned by a SubMap.
///
/// Lights are plain values: the traversal copies the ones that reach the
/// view frustum into the WorldRender, and the backend receives them with
/// `begin_view`.

use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
    /// Linear RGB intensity
    pub colour: Vec3,
    /// Influence radius. `f32::INFINITY` never culls.
    pub radius: f32,
}

impl Light {
    pub fn new(position: Vec3, colour: Vec3, radius: f32) -> Self {
        Self { position, colour, radius }
    }
}
