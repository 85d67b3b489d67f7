//! Camera module - viewing parameters and frustum planes.
//!
//! The main camera is owned by the caller. Portal traversal creates
//! transient child cameras (see `Portal::make_viewing_camera`) whose
//! frustum is clipped to the portal opening.

mod camera;
mod frustum;

pub use camera::{Camera, Viewport, OrthoOverlay};
pub use frustum::{
    Frustum, SphereTest,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_FAR, PLANE_NEAR,
};
