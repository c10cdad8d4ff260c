//! Selectable render scenes.
//!
//! A scene owns whatever GPU resources it builds in [`Scene::setup`] and
//! records one frame at a time into the command buffer it is handed.

mod clear;
mod registry;
mod triangle;

pub use clear::ClearScene;
pub use registry::SceneRegistry;
pub use triangle::{TriangleScene, TRIANGLE_SHADERS};

use crate::gpu::{CommandBuffer, GpuContext, GpuError, RenderTarget, ShaderLibrary};
use crate::time::FrameTime;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SceneInfo {
    pub name: &'static str,
    pub description: &'static str,
}

pub trait Scene {
    fn info(&self) -> SceneInfo;

    /// Shaders this scene needs registered on the GPU context.
    fn shader_library(&self) -> Option<ShaderLibrary> {
        None
    }

    /// Called once, with the context current, before the first frame.
    fn setup(&mut self, gpu: &GpuContext) -> Result<(), GpuError>;

    /// Records this frame's passes into `buffer`.
    ///
    /// `target` already carries the frame's depth attachment. Returning an
    /// error aborts the frame; nothing recorded is submitted.
    fn render(
        &mut self,
        gpu: &GpuContext,
        target: &RenderTarget,
        buffer: &mut CommandBuffer,
        time: FrameTime,
    ) -> Result<(), GpuError>;
}

/// The scenes shipped with the engine, in display order.
pub fn builtin_scenes() -> Vec<Box<dyn Scene>> {
    vec![Box::new(ClearScene::new()), Box::new(TriangleScene::new())]
}
