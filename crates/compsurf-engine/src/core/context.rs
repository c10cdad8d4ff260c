use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::device::{load_egl, CurrentContext, EglSurface, GlSurface, NativeWindow};
use crate::gpu::{
    Backend, DepthAttachment, GlesBackend, GpuContext, ISize, LoadAction, PixelFormat, ProcTable,
    SampleCount, StorageMode, StoreAction, Surface, TextureDescriptor, TextureType, TextureUsage,
    ThreadReactorWorker, WorkerId,
};
use crate::scene::{Scene, SceneInfo, SceneRegistry};
use crate::time::FrameClock;

use super::frame::{FrameError, FrameStatus};
use super::params::ContextParams;

const COLOR_FORMAT: PixelFormat = PixelFormat::R8G8B8A8UNormInt;
const DEPTH_FORMAT: PixelFormat = PixelFormat::D24UNormS8UInt;

/// One native window's rendering state: GPU context, presentable surface and
/// scenes.
///
/// Every public operation binds the context on entry and leaves nothing
/// current on return. Fields drop in declaration order, so scenes go before
/// the GPU context and the GPU context before the EGL surface.
pub struct RenderContext<S: GlSurface = EglSurface> {
    scenes: SceneRegistry,
    worker: Arc<ThreadReactorWorker>,
    worker_id: WorkerId,
    gpu: GpuContext,
    surface: S,

    params: ContextParams,
    native: Option<NativeWindow>,
    width: u32,
    height: u32,
    clock: FrameClock,
    deinitialized: bool,
}

impl RenderContext<EglSurface> {
    /// Creates the EGL context and window surface on `native`, resolves GLES
    /// and sets up every scene.
    pub fn new(
        params: ContextParams,
        native: NativeWindow,
        scenes: Vec<Box<dyn Scene>>,
    ) -> anyhow::Result<Self> {
        native.validate().context("invalid native window")?;

        log::info!("assets path: {}", params.assets_path.display());
        log::info!("cache path: {}", params.cache_path.display());
        log::info!("misc path: {}", params.misc_path.display());

        let egl = load_egl().context("failed to load EGL")?;
        let surface = EglSurface::new(egl, &native, &params.surface)
            .context("failed to create the EGL window surface")?;

        let backend = {
            let _current =
                CurrentContext::bind(&surface).context("failed to make the EGL context current")?;
            // SAFETY: the context the resolver serves is current for this scope.
            let procs = unsafe { ProcTable::new(|name| surface.proc_address(name)) }
                .context("failed to resolve GLES entry points")?;
            GlesBackend::new(procs).context("unsupported GLES context")?
        };

        Self::with_backend(params, Some(native), surface, Box::new(backend), scenes)
    }
}

impl<S: GlSurface> RenderContext<S> {
    /// Builds the context around an existing surface and backend.
    pub fn with_backend(
        params: ContextParams,
        native: Option<NativeWindow>,
        surface: S,
        backend: Box<dyn Backend>,
        scenes: Vec<Box<dyn Scene>>,
    ) -> anyhow::Result<Self> {
        let mut scenes = SceneRegistry::new(scenes)?;

        let gpu = GpuContext::new(backend, &scenes.shader_libraries())
            .context("failed to create the GPU context")?;

        let worker = Arc::new(ThreadReactorWorker::new());
        worker.set_reactions_allowed_on_current_thread(true);
        let worker_id = gpu
            .add_reactor_worker(worker.clone())
            .context("failed to register the reactor worker")?;

        {
            let _current =
                CurrentContext::bind(&surface).context("failed to make the GPU context current")?;
            let setup = scenes.setup_all(&gpu);
            if setup.is_err() {
                // Release whatever the scenes that did set up allocated.
                scenes.teardown();
                gpu.shutdown();
            }
            setup?;
        }

        log::info!(
            "render context ready: {}x{} on {}, {} scene(s)",
            params.width,
            params.height,
            gpu.backend_name(),
            scenes.len()
        );

        Ok(Self {
            scenes,
            worker,
            worker_id,
            gpu,
            surface,
            width: params.width,
            height: params.height,
            params,
            native,
            clock: FrameClock::new(),
            deinitialized: false,
        })
    }

    /// Renders and presents one frame of the selected scene.
    ///
    /// `time` is the host timestamp in milliseconds; it drives animation.
    /// The calling thread may differ from frame to frame; a thread seen for
    /// the first time is allowed to submit.
    pub fn draw_frame(&mut self, time: u32) -> Result<FrameStatus, FrameError> {
        self.worker.allow_current_thread_if_unmarked();
        let result = self.render_frame(time);
        if let Err(err) = &result {
            if err.is_fatal() {
                log::error!("frame failed: {err}");
            } else {
                log::warn!("frame dropped: {err}");
            }
        }
        result
    }

    fn render_frame(&mut self, time: u32) -> Result<FrameStatus, FrameError> {
        if self.deinitialized {
            return Err(FrameError::Deinitialized);
        }

        let size = ISize::new(self.width, self.height);
        if size.is_empty() {
            return Ok(FrameStatus::Skipped);
        }

        let _current = CurrentContext::bind(&self.surface).map_err(FrameError::Bind)?;
        let frame_time = self.clock.advance(time);

        let surface = &self.surface;
        let swap = move || match surface.swap_buffers() {
            Ok(()) => true,
            Err(err) => {
                log::warn!("buffer swap failed: {err}");
                false
            }
        };
        let Some(mut presentable) = Surface::wrap_fbo(swap, COLOR_FORMAT, size) else {
            return Ok(FrameStatus::Skipped);
        };

        let mut buffer = self
            .gpu
            .create_command_buffer()
            .map_err(FrameError::CommandBuffer)?;
        buffer.set_label("Command Buffer");

        let info = self.scenes.selected_info();
        let scene = self.scenes.selected_mut().ok_or(FrameError::Deinitialized)?;

        let target_size = presentable.target().render_target_size();
        let depth = self
            .gpu
            .create_texture(&TextureDescriptor {
                kind: TextureType::Texture2D,
                format: DEPTH_FORMAT,
                size: target_size,
                usage: TextureUsage::RENDER_TARGET,
                sample_count: SampleCount::Count1,
                storage_mode: StorageMode::DevicePrivate,
            })
            .map_err(FrameError::DepthAttachment)?;
        presentable.target_mut().set_depth_attachment(DepthAttachment {
            texture: depth,
            load_action: LoadAction::Clear,
            store_action: StoreAction::DontCare,
            clear_depth: 1.0,
        });

        scene
            .render(&self.gpu, presentable.target(), &mut buffer, frame_time)
            .map_err(|error| FrameError::Scene {
                scene: info.name,
                error,
            })?;

        self.gpu.submit(buffer).map_err(FrameError::Submit)?;

        if !presentable.present() {
            return Err(FrameError::Present);
        }
        Ok(FrameStatus::Presented)
    }

    /// Records the new size; frames are skipped while either side is zero.
    ///
    /// The host resizes its `wl_egl_window` itself.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        log::debug!("resize {}x{} -> {width}x{height}", self.width, self.height);
        self.width = width;
        self.height = height;
    }

    /// Drops every scene and flushes the GPU objects they held.
    ///
    /// Afterwards [`draw_frame`](Self::draw_frame) fails with
    /// [`FrameError::Deinitialized`]. Calling it again does nothing.
    pub fn de_initialize(&mut self) {
        if self.deinitialized {
            return;
        }
        self.deinitialized = true;
        self.worker.allow_current_thread_if_unmarked();

        match CurrentContext::bind(&self.surface) {
            Ok(_current) => {
                self.scenes.teardown();
                self.gpu.shutdown();
            }
            Err(err) => {
                log::error!("de-initializing without a current context: {err}");
                // Without a context the queued GL objects cannot be deleted.
                self.scenes.teardown();
            }
        }

        self.gpu.remove_reactor_worker(self.worker_id);
        log::info!("render context de-initialized");
    }

    /// Performs deferred GPU releases if this thread may react.
    ///
    /// Like [`draw_frame`](Self::draw_frame), a thread seen for the first time
    /// is allowed.
    pub fn run_task(&self) -> bool {
        if self.deinitialized {
            return false;
        }
        self.worker.allow_current_thread_if_unmarked();

        match CurrentContext::bind(&self.surface) {
            Ok(_current) => self.gpu.react(),
            Err(err) => {
                log::warn!("run_task skipped: {err}");
                false
            }
        }
    }

    /// Marks the calling thread as allowed (or not) to submit and release GPU work.
    ///
    /// An explicit mark overrides the first-use default.
    pub fn set_reactions_allowed_on_current_thread(&self, allowed: bool) {
        self.worker.set_reactions_allowed_on_current_thread(allowed);
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn access_token(&self) -> &str {
        &self.params.access_token
    }

    #[inline]
    pub fn assets_path(&self) -> &Path {
        &self.params.assets_path
    }

    #[inline]
    pub fn cache_path(&self) -> &Path {
        &self.params.cache_path
    }

    #[inline]
    pub fn misc_path(&self) -> &Path {
        &self.params.misc_path
    }

    #[inline]
    pub fn native_window(&self) -> Option<&NativeWindow> {
        self.native.as_ref()
    }

    #[inline]
    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    pub fn scene_names(&self) -> Vec<&'static str> {
        self.scenes.names().collect()
    }

    #[inline]
    pub fn selected_scene(&self) -> SceneInfo {
        self.scenes.selected_info()
    }

    #[inline]
    pub fn selected_scene_index(&self) -> usize {
        self.scenes.selected_index()
    }

    pub fn select_scene(&mut self, index: i64) -> SceneInfo {
        self.scenes.select(index);
        self.log_selection()
    }

    pub fn next_scene(&mut self) -> SceneInfo {
        self.scenes.select_next();
        self.log_selection()
    }

    pub fn previous_scene(&mut self) -> SceneInfo {
        self.scenes.select_previous();
        self.log_selection()
    }

    fn log_selection(&self) -> SceneInfo {
        let info = self.scenes.selected_info();
        log::info!("scene {}: {}", self.scenes.selected_index(), info.name);
        info
    }
}

impl<S: GlSurface> Drop for RenderContext<S> {
    fn drop(&mut self) {
        self.de_initialize();
    }
}

#[cfg(test)]
mod tests {
    use crate::gpu::GpuError;
    use crate::testing::{current_surface, mock_context, MockSurface, ScriptedScene};

    use super::*;

    fn two_scenes() -> Vec<Box<dyn Scene>> {
        vec![
            Box::new(ScriptedScene::named("first")),
            Box::new(ScriptedScene::named("second")),
        ]
    }

    #[test]
    fn construction_leaves_nothing_current() {
        let (ctx, surface, backend) = mock_context(1920, 1080, two_scenes()).unwrap();
        assert_eq!(current_surface(), None);
        assert_eq!(surface.binds(), 1);
        assert_eq!(backend.calls_without_context(), 0);
        assert_eq!(ctx.scene_names(), ["first", "second"]);
        assert_eq!((ctx.width(), ctx.height()), (1920, 1080));
    }

    #[test]
    fn three_frames_swap_three_times() {
        let (mut ctx, surface, backend) = mock_context(1920, 1080, two_scenes()).unwrap();

        for time in [0, 16, 33] {
            assert_eq!(ctx.draw_frame(time).unwrap(), FrameStatus::Presented);
            assert_eq!(current_surface(), None);
        }

        assert_eq!(surface.swaps(), 3);
        assert_eq!(backend.executed(), 3);
        assert_eq!(ctx.selected_scene_index(), 0);
        assert_eq!(backend.calls_without_context(), 0);
    }

    #[test]
    fn failed_frame_is_not_presented() {
        let scenes: Vec<Box<dyn Scene>> =
            vec![Box::new(ScriptedScene::named("flaky").failing_on_frames(&[1]))];
        let (mut ctx, surface, backend) = mock_context(1920, 1080, scenes).unwrap();

        assert!(ctx.draw_frame(0).is_ok());
        assert_eq!(surface.swaps(), 1);

        let err = ctx.draw_frame(16).unwrap_err();
        assert!(matches!(err, FrameError::Scene { scene: "flaky", .. }));
        assert!(!err.is_fatal());
        assert_eq!(current_surface(), None);
        assert_eq!(surface.swaps(), 1);
        assert_eq!(backend.executed(), 1);

        assert!(ctx.draw_frame(33).is_ok());
        assert_eq!(surface.swaps(), 2);
        assert_eq!(current_surface(), None);
    }

    #[test]
    fn depth_attachment_tracks_target_size() {
        let (mut ctx, _surface, backend) = mock_context(1920, 1080, two_scenes()).unwrap();

        ctx.draw_frame(0).unwrap();
        ctx.resize(800, 600);
        ctx.draw_frame(16).unwrap();

        assert_eq!(
            backend.depth_sizes(),
            [ISize::new(1920, 1080), ISize::new(800, 600)]
        );
        assert_eq!((ctx.width(), ctx.height()), (800, 600));
    }

    #[test]
    fn zero_area_frames_are_skipped() {
        let (mut ctx, surface, _backend) = mock_context(1920, 1080, two_scenes()).unwrap();
        ctx.resize(0, 600);
        assert_eq!(ctx.draw_frame(0).unwrap(), FrameStatus::Skipped);
        assert_eq!(surface.swaps(), 0);

        ctx.resize(640, 480);
        assert_eq!(ctx.draw_frame(16).unwrap(), FrameStatus::Presented);
        assert_eq!(surface.swaps(), 1);
    }

    #[test]
    fn bind_failure_is_fatal() {
        let (mut ctx, surface, _backend) = mock_context(1920, 1080, two_scenes()).unwrap();
        surface.fail_bind(true);

        let err = ctx.draw_frame(0).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(surface.swaps(), 0);
        assert_eq!(current_surface(), None);

        surface.fail_bind(false);
        assert!(ctx.draw_frame(16).is_ok());
    }

    #[test]
    fn swap_failure_is_recoverable() {
        let (mut ctx, surface, backend) = mock_context(1920, 1080, two_scenes()).unwrap();
        surface.fail_swap(true);

        let err = ctx.draw_frame(0).unwrap_err();
        assert!(matches!(err, FrameError::Present));
        assert_eq!(backend.executed(), 1);
        assert_eq!(current_surface(), None);
    }

    #[test]
    fn disallowed_thread_cannot_submit() {
        let (mut ctx, surface, backend) = mock_context(1920, 1080, two_scenes()).unwrap();
        ctx.set_reactions_allowed_on_current_thread(false);

        let err = ctx.draw_frame(0).unwrap_err();
        assert!(matches!(err, FrameError::Submit(GpuError::ReactionsNotAllowed)));
        assert_eq!(surface.swaps(), 0);
        assert_eq!(backend.executed(), 0);
        assert!(!ctx.run_task());

        ctx.set_reactions_allowed_on_current_thread(true);
        assert!(ctx.draw_frame(16).is_ok());
    }

    #[test]
    fn failed_bind_does_not_advance_the_clock() {
        let scenes: Vec<Box<dyn Scene>> =
            vec![Box::new(ScriptedScene::named("flaky").failing_on_frames(&[1]))];
        let (mut ctx, surface, _backend) = mock_context(1920, 1080, scenes).unwrap();

        assert!(ctx.draw_frame(0).is_ok());

        surface.fail_bind(true);
        assert!(ctx.draw_frame(16).unwrap_err().is_fatal());

        // Still frame 1, which the scene rejects.
        surface.fail_bind(false);
        let err = ctx.draw_frame(33).unwrap_err();
        assert!(matches!(err, FrameError::Scene { scene: "flaky", .. }));
        assert!(ctx.draw_frame(50).is_ok());
        assert_eq!(surface.swaps(), 2);
    }

    /// Hands the context to one other thread at a time, the way a C host
    /// passes its pointer around.
    struct ContextPtr(*mut RenderContext<MockSurface>);

    // SAFETY: the owning thread does not touch the context until the
    // borrowing thread has been joined.
    unsafe impl Send for ContextPtr {}

    impl ContextPtr {
        fn draw(&self, time: u32) -> Result<FrameStatus, FrameError> {
            // SAFETY: see the `Send` impl.
            unsafe { (*self.0).draw_frame(time) }
        }

        fn run_task(&self) -> bool {
            // SAFETY: see the `Send` impl.
            unsafe { (*self.0).run_task() }
        }

        fn de_initialize(&self) {
            // SAFETY: see the `Send` impl.
            unsafe { (*self.0).de_initialize() }
        }
    }

    #[test]
    fn frames_can_be_drawn_from_another_thread() {
        let (mut ctx, surface, backend) = mock_context(1920, 1080, two_scenes()).unwrap();
        let ptr = ContextPtr(&mut ctx);

        let statuses = std::thread::scope(|scope| {
            scope
                .spawn(move || {
                    let statuses: Vec<_> = [0, 16, 33].into_iter().map(|t| ptr.draw(t)).collect();
                    assert!(ptr.run_task());
                    assert_eq!(current_surface(), None);
                    statuses
                })
                .join()
                .unwrap()
        });

        for status in statuses {
            assert_eq!(status.unwrap(), FrameStatus::Presented);
        }
        assert_eq!(surface.swaps(), 3);
        assert_eq!(backend.executed(), 3);
        assert_eq!(backend.calls_without_context(), 0);

        // The constructing thread keeps working afterwards.
        assert_eq!(ctx.draw_frame(50).unwrap(), FrameStatus::Presented);
        assert_eq!(surface.swaps(), 4);
    }

    #[test]
    fn de_initialize_from_another_thread_releases_everything() {
        let (mut ctx, _surface, backend) = mock_context(1920, 1080, two_scenes()).unwrap();
        ctx.draw_frame(0).unwrap();
        let ptr = ContextPtr(&mut ctx);

        std::thread::scope(|scope| {
            scope.spawn(move || ptr.de_initialize()).join().unwrap();
        });

        // Two scene buffers and the last depth texture.
        assert_eq!(backend.released(), 3);
        assert_eq!(ctx.gpu.reactor().pending_releases(), 0);
    }

    #[test]
    fn depth_textures_are_released_by_the_next_frame() {
        let (mut ctx, _surface, backend) = mock_context(1920, 1080, two_scenes()).unwrap();

        ctx.draw_frame(0).unwrap();
        assert_eq!(ctx.gpu.reactor().pending_releases(), 1);
        assert_eq!(backend.released(), 0);

        ctx.draw_frame(16).unwrap();
        assert_eq!(ctx.gpu.reactor().pending_releases(), 1);
        assert_eq!(backend.released(), 1);

        assert!(ctx.run_task());
        assert_eq!(ctx.gpu.reactor().pending_releases(), 0);
        assert_eq!(backend.released(), 2);
        assert_eq!(current_surface(), None);
    }

    #[test]
    fn de_initialize_releases_scene_resources() {
        let (mut ctx, _surface, backend) = mock_context(1920, 1080, two_scenes()).unwrap();
        ctx.draw_frame(0).unwrap();

        ctx.de_initialize();
        // Two scene buffers and the last depth texture.
        assert_eq!(backend.released(), 3);
        assert_eq!(current_surface(), None);

        assert!(matches!(ctx.draw_frame(16), Err(FrameError::Deinitialized)));
        assert!(!ctx.run_task());
        ctx.de_initialize();
        assert_eq!(backend.released(), 3);
        assert_eq!(backend.calls_without_context(), 0);
    }

    #[test]
    fn scene_setup_failure_fails_construction() {
        let scenes: Vec<Box<dyn Scene>> = vec![
            Box::new(ScriptedScene::named("ok")),
            Box::new(ScriptedScene::named("broken").failing_setup()),
        ];
        let err = mock_context(1920, 1080, scenes).err().unwrap();
        assert!(format!("{err:#}").contains("`broken`"));
        assert_eq!(current_surface(), None);
    }

    #[test]
    fn empty_scene_list_fails_construction() {
        assert!(mock_context(1920, 1080, Vec::new()).is_err());
    }

    #[test]
    fn scene_selection_wraps() {
        let (mut ctx, _surface, _backend) = mock_context(1920, 1080, two_scenes()).unwrap();
        assert_eq!(ctx.previous_scene().name, "second");
        assert_eq!(ctx.next_scene().name, "first");
        assert_eq!(ctx.select_scene(-3).name, "second");
        assert_eq!(ctx.selected_scene_index(), 1);
    }
}
