/// Mock RenderBackend for unit tests (no GPU required)
///
/// Records every call in order so tests can check what the traversal
/// asked the renderer to do, and can be scripted to return a fixed
/// DrawResult or fail a capture.

use glam::Vec3;
use crate::camera::Camera;
use crate::error::{Error, Result};
use crate::world::{MeshKey, TextureKey};
use super::backend::{DrawFlags, DrawRequest, DrawResult, DrawSource, RenderBackend, ViewFlags, ViewSetup};

#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    BeginView { flags: ViewFlags, position: Vec3, lights: usize },
    Draw { source: DrawSource, mesh: MeshKey, texture: Option<TextureKey>, flags: DrawFlags },
    PortalOutline { center: Vec3, mirror: bool },
    EndView,
    Capture { texture: TextureKey, width: f32, height: f32 },
    Placeholder { texture: TextureKey },
}

#[derive(Debug)]
pub struct MockBackend {
    pub calls: Vec<MockCall>,
    /// Returned by every draw_object
    pub draw_result: DrawResult,
    /// Return `Cancelled` once this many objects were drawn
    pub cancel_after: Option<usize>,
    pub fail_capture: bool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            draw_result: DrawResult::Drawn,
            cancel_after: None,
            fail_capture: false,
        }
    }

    pub fn draws(&self) -> Vec<&MockCall> {
        self.calls.iter().filter(|c| matches!(c, MockCall::Draw { .. })).collect()
    }

    pub fn views(&self) -> Vec<ViewFlags> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                MockCall::BeginView { flags, .. } => Some(*flags),
                _ => None,
            })
            .collect()
    }

    pub fn captures(&self) -> Vec<TextureKey> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                MockCall::Capture { texture, .. } => Some(*texture),
                _ => None,
            })
            .collect()
    }

    pub fn placeholders(&self) -> Vec<TextureKey> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                MockCall::Placeholder { texture } => Some(*texture),
                _ => None,
            })
            .collect()
    }
}

impl RenderBackend for MockBackend {
    fn begin_view(&mut self, view: &ViewSetup<'_>) -> Result<()> {
        self.calls.push(MockCall::BeginView {
            flags: view.flags,
            position: view.camera.position(),
            lights: view.lights.len(),
        });
        Ok(())
    }

    fn draw_object(&mut self, request: &DrawRequest<'_>) -> DrawResult {
        if self.cancel_after.is_some_and(|limit| self.draws().len() >= limit) {
            return DrawResult::Cancelled;
        }
        self.calls.push(MockCall::Draw {
            source: request.source,
            mesh: request.mesh,
            texture: request.texture,
            flags: request.flags,
        });
        self.draw_result
    }

    fn draw_portal_outline(&mut self, corners: &[Vec3; 4], mirror: bool) {
        let center = corners.iter().copied().sum::<Vec3>() * 0.25;
        self.calls.push(MockCall::PortalOutline { center, mirror });
    }

    fn end_view(&mut self) -> Result<()> {
        self.calls.push(MockCall::EndView);
        Ok(())
    }

    fn capture_into(&mut self, camera: &Camera, texture: TextureKey) -> Result<()> {
        if self.fail_capture {
            return Err(Error::BackendError("capture failed".to_string()));
        }
        self.calls.push(MockCall::Capture {
            texture,
            width: camera.viewport().width,
            height: camera.viewport().height,
        });
        Ok(())
    }

    fn fill_placeholder(&mut self, texture: TextureKey) -> Result<()> {
        self.calls.push(MockCall::Placeholder { texture });
        Ok(())
    }
}
