//! Portal traversal and the draw contract.

mod backend;
mod world_render;

#[cfg(test)]
pub(crate) mod mock_backend;

pub use backend::{DrawFlags, DrawRequest, DrawResult, DrawSource, RenderBackend, ViewFlags, ViewSetup};
pub use world_render::{
    BuildState, DrawSummary, GameObjectTag, MirrorOutcome, MirrorPass, ObjectTag, TraversalStats, WorldRender,
};
