/// Capabilities attached to GameObjects by composition.
///
/// A GameObject optionally carries a `Physics` integrator, advanced by
/// `World::update`, and a `Shading` description consumed by the draw
/// layer. Neither is required for visibility.

use glam::{Quat, Vec3, Vec4};
use std::fmt::Debug;

/// Per-tick motion integrator.
pub trait Physics: Debug {
    /// Advance `position` and `rotation` by `dt` seconds.
    fn step(&mut self, position: &mut Vec3, rotation: &mut Quat, dt: f32);
}

/// Custom shading applied when the object is drawn.
pub trait Shading: Debug {
    /// Shader program the backend should bind
    fn shader_name(&self) -> &str;

    /// Adjust the object's base colour for this frame
    fn modulate(&self, colour: Vec4) -> Vec4 {
        colour
    }
}

/// Constant linear and angular velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearMotion {
    /// Units per second
    pub velocity: Vec3,
    /// Axis scaled by radians per second
    pub angular_velocity: Vec3,
}

impl LinearMotion {
    pub fn new(velocity: Vec3) -> Self {
        Self { velocity, angular_velocity: Vec3::ZERO }
    }

    pub fn with_angular_velocity(mut self, angular_velocity: Vec3) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }
}

impl Physics for LinearMotion {
    fn step(&mut self, position: &mut Vec3, rotation: &mut Quat, dt: f32) {
        *position += self.velocity * dt;

        let angle = self.angular_velocity.length() * dt;
        if angle > 0.0 {
            let spin = Quat::from_axis_angle(self.angular_velocity.normalize(), angle);
            *rotation = (spin * *rotation).normalize();
        }
    }
}

/// Flat tint over the base colour.
#[derive(Debug, Clone, PartialEq)]
pub struct TintShading {
    pub shader: String,
    pub tint: Vec4,
}

impl Shading for TintShading {
    fn shader_name(&self) -> &str {
        &self.shader
    }

    fn modulate(&self, colour: Vec4) -> Vec4 {
        colour * self.tint
    }
}
