/*!
# Galaxy 3D Visibility

Portal-based visibility core for the Galaxy 3D engine.

A level is a [`Map`](galaxy3d::map::Map) of SubMaps (visibility cells)
joined by portals. Each frame, a [`WorldRender`](galaxy3d::render::WorldRender)
walks the SubMap graph from the viewer's cell, narrowing the frustum to
each portal opening, and produces flat lists of what is visible. Mirror
portals are rendered into textures by nested, independent passes.
Drawing goes through the [`RenderBackend`](galaxy3d::render::RenderBackend)
trait, so the core carries no GPU dependency.

## Architecture

- **Camera / Frustum**: viewing parameters, 6-plane and polygon frustums
- **Map / SubMap / Portal**: the static level graph and occlusion hints
- **World**: placed objects, mobile objects, assets, dynamic spatial index
- **WorldRender**: per-frame traversal with cycle guard and mirror passes
*/

// Internal modules
mod bounds;
mod config;
mod error;
mod engine;
mod utils;
pub mod log;
pub mod camera;
pub mod map;
pub mod render;
pub mod world;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging hub
    pub use crate::engine::Engine;

    // Configuration
    pub use crate::config::RenderConfig;

    // Bounding volumes
    pub use crate::bounds::{AABB, BoundingSphere};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, MemoryLogger};
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Level graph sub-module
    pub mod map {
        pub use crate::map::*;
    }

    // Object store sub-module
    pub mod world {
        pub use crate::world::*;
    }

    // Traversal and draw contract sub-module
    pub mod render {
        pub use crate::render::*;
    }
}

// Re-export math library at crate root
pub use glam;
