mod host;

use std::time::Instant;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::wayland::EventLoopBuilderExtWayland;
use winit::window::{Window, WindowId};

use compsurf_engine::logging::{LoggingConfig, init_logging};
use compsurf_engine::{ContextParams, RenderContext, builtin_scenes};

use host::EglWindow;

/// Demo host configuration.
#[derive(Debug, Clone)]
struct StudioConfig {
    title: String,
    initial_size: LogicalSize<f64>,
    logging: LoggingConfig,
    params: ContextParams,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            title: "compsurf studio".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            logging: LoggingConfig::default(),
            params: ContextParams {
                access_token: "studio".to_string(),
                assets_path: "assets".into(),
                cache_path: std::env::temp_dir().join("compsurf-cache"),
                misc_path: std::env::temp_dir().join("compsurf-misc"),
                ..ContextParams::default()
            },
        }
    }
}

// Fields drop in order: render context, then the EGL window, then the window.
struct WindowEntry {
    ctx: RenderContext,
    egl_window: EglWindow,
    window: Window,
}

struct Studio {
    config: StudioConfig,
    entry: Option<WindowEntry>,
    started: Instant,
    exit_requested: bool,
}

impl Studio {
    fn new(config: StudioConfig) -> Self {
        Self {
            config,
            entry: None,
            started: Instant::now(),
            exit_requested: false,
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;
        let size = window.inner_size();

        let egl_window = EglWindow::new(&window, size)?;
        let native = host::native_window(&window, &egl_window)?;

        let params = ContextParams {
            width: size.width,
            height: size.height,
            ..self.config.params.clone()
        };
        let ctx = RenderContext::new(params, native, builtin_scenes())
            .context("failed to create the render context")?;

        log::info!("scenes: {}", ctx.scene_names().join(", "));
        window.request_redraw();

        self.entry = Some(WindowEntry {
            ctx,
            egl_window,
            window,
        });
        Ok(())
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        self.entry = None;
        event_loop.exit();
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }

        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };

        match code {
            KeyCode::Escape => self.request_exit(event_loop),
            KeyCode::ArrowRight => {
                if let Some(entry) = &mut self.entry {
                    entry.ctx.next_scene();
                }
            }
            KeyCode::ArrowLeft => {
                if let Some(entry) = &mut self.entry {
                    entry.ctx.previous_scene();
                }
            }
            _ => {}
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = &mut self.entry else {
            return;
        };

        // Host timestamps are 32-bit milliseconds and wrap.
        let time = self.started.elapsed().as_millis() as u32;
        if let Err(err) = entry.ctx.draw_frame(time)
            && err.is_fatal()
        {
            log::error!("render context lost, exiting");
            self.request_exit(event_loop);
        }
    }
}

impl ApplicationHandler for Studio {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            log::error!("failed to create initial window: {e:#}");
            self.request_exit(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; scenes animate.
        if let Some(entry) = &self.entry {
            entry.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if self.entry.as_ref().is_none_or(|e| e.window.id() != window_id) {
            return;
        }

        match &event {
            WindowEvent::CloseRequested => self.request_exit(event_loop),

            WindowEvent::KeyboardInput { event, .. } => self.on_key(event_loop, event),

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = &mut self.entry {
                    entry.egl_window.resize(*new_size);
                    entry.ctx.resize(new_size.width, new_size.height);
                    entry.window.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let config = StudioConfig::default();
    init_logging(config.logging.clone());

    let event_loop = EventLoop::builder()
        .with_wayland()
        .build()
        .context("failed to create a Wayland event loop")?;

    let mut studio = Studio::new(config);
    event_loop
        .run_app(&mut studio)
        .context("winit event loop terminated with error")?;

    Ok(())
}
