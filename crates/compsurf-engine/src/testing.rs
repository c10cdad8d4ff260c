//! Test doubles for the EGL surface, the GLES backend and scenes.

use std::cell::{Cell, RefCell};
use std::ffi::c_void;
use std::ptr;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use khronos_egl as egl;
use slotmap::SlotMap;

use crate::core::{ContextParams, RenderContext};
use crate::device::{DeviceError, GlSurface};
use crate::gpu::{
    Backend, BufferId, CommandBuffer, DeviceBuffer, EncodedPass, GpuContext, GpuError, ISize,
    PipelineDescriptor, PipelineId, Release, RenderTarget, TextureDescriptor, TextureId,
};
use crate::scene::{Scene, SceneInfo};
use crate::time::FrameTime;

thread_local! {
    static CURRENT: Cell<Option<u64>> = const { Cell::new(None) };
}

static NEXT_SURFACE: AtomicU64 = AtomicU64::new(1);

/// Id of the mock surface current on this thread.
pub fn current_surface() -> Option<u64> {
    CURRENT.with(Cell::get)
}

#[derive(Default)]
struct SurfaceState {
    id: u64,
    binds: Cell<u32>,
    swaps: Cell<u32>,
    fail_bind: Cell<bool>,
    fail_swap: Cell<bool>,
}

pub struct MockSurface {
    state: Rc<SurfaceState>,
}

pub struct SurfaceProbe {
    state: Rc<SurfaceState>,
}

impl MockSurface {
    pub fn new() -> (Self, SurfaceProbe) {
        let state = Rc::new(SurfaceState {
            id: NEXT_SURFACE.fetch_add(1, Ordering::Relaxed),
            ..Default::default()
        });
        (Self { state: state.clone() }, SurfaceProbe { state })
    }
}

impl SurfaceProbe {
    pub fn id(&self) -> u64 {
        self.state.id
    }

    pub fn binds(&self) -> u32 {
        self.state.binds.get()
    }

    pub fn swaps(&self) -> u32 {
        self.state.swaps.get()
    }

    pub fn fail_bind(&self, fail: bool) {
        self.state.fail_bind.set(fail);
    }

    pub fn fail_swap(&self, fail: bool) {
        self.state.fail_swap.set(fail);
    }
}

impl GlSurface for MockSurface {
    fn make_current(&self) -> Result<(), DeviceError> {
        if self.state.fail_bind.get() {
            return Err(DeviceError::Egl {
                call: "eglMakeCurrent",
                source: egl::Error::BadAccess,
            });
        }
        CURRENT.with(|c| c.set(Some(self.state.id)));
        self.state.binds.set(self.state.binds.get() + 1);
        Ok(())
    }

    fn release_current(&self) -> Result<(), DeviceError> {
        CURRENT.with(|c| c.set(None));
        Ok(())
    }

    fn swap_buffers(&self) -> Result<(), DeviceError> {
        if current_surface() != Some(self.state.id) || self.state.fail_swap.get() {
            return Err(DeviceError::Egl {
                call: "eglSwapBuffers",
                source: egl::Error::BadSurface,
            });
        }
        self.state.swaps.set(self.state.swaps.get() + 1);
        Ok(())
    }

    fn proc_address(&self, _name: &str) -> *const c_void {
        ptr::null()
    }
}

#[derive(Default)]
struct BackendState {
    textures: RefCell<SlotMap<TextureId, ISize>>,
    buffers: RefCell<SlotMap<BufferId, usize>>,
    pipelines: RefCell<SlotMap<PipelineId, String>>,
    passes: RefCell<Vec<EncodedPass>>,
    executed: Cell<usize>,
    released: Cell<usize>,
    calls_without_context: Cell<usize>,
}

impl BackendState {
    fn touch(&self) {
        if current_surface().is_none() {
            self.calls_without_context
                .set(self.calls_without_context.get() + 1);
        }
    }
}

/// In-memory [`Backend`] recording what it is asked to do.
pub struct MockBackend {
    state: Rc<BackendState>,
}

pub struct BackendProbe {
    state: Rc<BackendState>,
}

impl MockBackend {
    pub fn new() -> (Self, BackendProbe) {
        let state = Rc::new(BackendState::default());
        (Self { state: state.clone() }, BackendProbe { state })
    }
}

impl BackendProbe {
    /// Number of command buffers executed.
    pub fn executed(&self) -> usize {
        self.state.executed.get()
    }

    pub fn released(&self) -> usize {
        self.state.released.get()
    }

    /// Backend calls made while no mock surface was current.
    pub fn calls_without_context(&self) -> usize {
        self.state.calls_without_context.get()
    }

    /// Depth attachment size of every executed pass, in order.
    pub fn depth_sizes(&self) -> Vec<ISize> {
        self.state
            .passes
            .borrow()
            .iter()
            .filter_map(|pass| pass.depth.map(|depth| depth.size))
            .collect()
    }
}

impl Backend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn create_texture(&self, desc: &TextureDescriptor) -> Result<TextureId, GpuError> {
        self.state.touch();
        Ok(self.state.textures.borrow_mut().insert(desc.size))
    }

    fn create_buffer(&self, _label: &str, contents: &[u8]) -> Result<BufferId, GpuError> {
        self.state.touch();
        Ok(self.state.buffers.borrow_mut().insert(contents.len()))
    }

    fn create_pipeline(&self, desc: &PipelineDescriptor) -> Result<PipelineId, GpuError> {
        self.state.touch();
        Ok(self.state.pipelines.borrow_mut().insert(desc.label.clone()))
    }

    fn release(&self, resource: Release) {
        self.state.touch();
        // Reactor tests release ids that were never created.
        match resource {
            Release::Texture(id) => {
                self.state.textures.borrow_mut().remove(id);
            }
            Release::Buffer(id) => {
                self.state.buffers.borrow_mut().remove(id);
            }
            Release::Pipeline(id) => {
                self.state.pipelines.borrow_mut().remove(id);
            }
        }
        self.state.released.set(self.state.released.get() + 1);
    }

    fn execute(&self, _label: &str, passes: &[EncodedPass]) -> Result<(), GpuError> {
        self.state.touch();
        for pass in passes {
            if let Some(depth) = &pass.depth
                && !self.state.textures.borrow().contains_key(depth.texture)
            {
                return Err(GpuError::UnknownResource("texture"));
            }
        }
        self.state.passes.borrow_mut().extend_from_slice(passes);
        self.state.executed.set(self.state.executed.get() + 1);
        Ok(())
    }
}

/// Scene that allocates one buffer at setup and clears every frame, failing
/// where told to.
pub struct ScriptedScene {
    name: &'static str,
    fail_setup: bool,
    fail_frames: Vec<u64>,
    buffer: Option<DeviceBuffer>,
}

impl ScriptedScene {
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            fail_setup: false,
            fail_frames: Vec::new(),
            buffer: None,
        }
    }

    pub fn failing_setup(mut self) -> Self {
        self.fail_setup = true;
        self
    }

    pub fn failing_on_frames(mut self, frames: &[u64]) -> Self {
        self.fail_frames = frames.to_vec();
        self
    }
}

impl Scene for ScriptedScene {
    fn info(&self) -> SceneInfo {
        SceneInfo {
            name: self.name,
            description: "scripted test scene",
        }
    }

    fn setup(&mut self, gpu: &GpuContext) -> Result<(), GpuError> {
        if self.fail_setup {
            return Err(GpuError::Scene(format!("{} refused to set up", self.name)));
        }
        self.buffer = Some(gpu.create_buffer(self.name, &[0u8; 16])?);
        Ok(())
    }

    fn render(
        &mut self,
        _gpu: &GpuContext,
        target: &RenderTarget,
        buffer: &mut CommandBuffer,
        time: FrameTime,
    ) -> Result<(), GpuError> {
        if self.fail_frames.contains(&time.frame_index) {
            return Err(GpuError::Scene(format!(
                "{} failed frame {}",
                self.name, time.frame_index
            )));
        }

        let mut pass = buffer.create_render_pass(target);
        pass.set_label(self.name);
        pass.encode_commands()
    }
}

/// Render context over a mock surface and backend.
pub fn mock_context(
    width: u32,
    height: u32,
    scenes: Vec<Box<dyn Scene>>,
) -> anyhow::Result<(RenderContext<MockSurface>, SurfaceProbe, BackendProbe)> {
    let (surface, surface_probe) = MockSurface::new();
    let (backend, backend_probe) = MockBackend::new();
    let params = ContextParams {
        access_token: "test-token".to_owned(),
        width,
        height,
        ..Default::default()
    };

    let ctx = RenderContext::with_backend(params, None, surface, Box::new(backend), scenes)?;
    Ok((ctx, surface_probe, backend_probe))
}
