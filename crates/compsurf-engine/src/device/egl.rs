use std::ffi::c_void;
use std::ptr;
use std::sync::{Arc, OnceLock};

use khronos_egl as egl;

use super::{DeviceError, GlSurface, NativeWindow, SurfaceConfig};

/// Dynamically loaded EGL 1.4 entry points.
pub type Egl = egl::DynamicInstance<egl::EGL1_4>;

/// Loads the system EGL library.
pub fn load_egl() -> Result<Arc<Egl>, DeviceError> {
    // SAFETY: libEGL is a system library whose initializers have no preconditions.
    let egl = unsafe { Egl::load_required() }.map_err(|err| DeviceError::Load(err.to_string()))?;
    Ok(Arc::new(egl))
}

type CreatePlatformWindowSurfaceExt = unsafe extern "system" fn(
    display: *mut c_void,
    config: *mut c_void,
    native_window: *mut c_void,
    attrib_list: *const egl::Int,
) -> *mut c_void;

static CREATE_PLATFORM_WINDOW_SURFACE: OnceLock<Option<CreatePlatformWindowSurfaceExt>> =
    OnceLock::new();

/// Returns true if a client extension string advertises a Wayland platform.
pub fn has_wayland_platform_extension(extensions: &str) -> bool {
    extensions
        .split_ascii_whitespace()
        .any(|ext| ext == "EGL_EXT_platform_wayland" || ext == "EGL_KHR_platform_wayland")
}

/// Picks the first config whose buffer size reaches `min_buffer_size`.
///
/// Configs whose size cannot be queried are skipped.
pub(crate) fn select_config<C: Copy>(
    configs: &[C],
    min_buffer_size: egl::Int,
    mut buffer_size: impl FnMut(C) -> Option<egl::Int>,
) -> Option<C> {
    configs
        .iter()
        .copied()
        .find(|&config| buffer_size(config).is_some_and(|size| size >= min_buffer_size))
}

/// Resolves `eglCreatePlatformWindowSurfaceEXT` once per process.
fn platform_window_surface_fn(egl: &Egl) -> Option<CreatePlatformWindowSurfaceExt> {
    *CREATE_PLATFORM_WINDOW_SURFACE.get_or_init(|| {
        let extensions = egl.query_string(None, egl::EXTENSIONS).ok()?.to_string_lossy();
        if !has_wayland_platform_extension(&extensions) {
            return None;
        }

        let f = egl.get_proc_address("eglCreatePlatformWindowSurfaceEXT")?;
        // SAFETY: the symbol is eglCreatePlatformWindowSurfaceEXT, whose C signature
        // is the one declared by `CreatePlatformWindowSurfaceExt`.
        Some(unsafe { std::mem::transmute::<extern "system" fn(), CreatePlatformWindowSurfaceExt>(f) })
    })
}

fn create_window_surface(
    egl: &Egl,
    display: egl::Display,
    config: egl::Config,
    native_window: *mut c_void,
) -> Result<egl::Surface, DeviceError> {
    if let Some(create) = platform_window_surface_fn(egl) {
        log::debug!("creating window surface through eglCreatePlatformWindowSurfaceEXT");
        // SAFETY: display and config are live objects of an initialized display and
        // native_window is the host's wl_egl_window.
        let raw = unsafe { create(display.as_ptr(), config.as_ptr(), native_window, ptr::null()) };
        if raw.is_null() {
            return Err(DeviceError::NoSurface("eglCreatePlatformWindowSurfaceEXT"));
        }
        // SAFETY: non-null surface freshly returned by EGL.
        return Ok(unsafe { egl::Surface::from_ptr(raw) });
    }

    log::debug!("creating window surface through eglCreateWindowSurface");
    // SAFETY: same preconditions as above.
    unsafe { egl.create_window_surface(display, config, native_window, None) }
        .map_err(DeviceError::egl("eglCreateWindowSurface"))
}

/// EGL context + window surface bound to one native window.
///
/// Destroys both on drop. The display itself belongs to the host and is never
/// terminated here.
pub struct EglSurface {
    egl: Arc<Egl>,
    display: egl::Display,
    surface: egl::Surface,
    context: egl::Context,
}

impl EglSurface {
    /// Negotiates a config and creates the context and window surface.
    pub fn new(
        egl: Arc<Egl>,
        native: &NativeWindow,
        config: &SurfaceConfig,
    ) -> Result<Self, DeviceError> {
        native.validate()?;

        // SAFETY: the host guarantees `egl_display` is the EGLDisplay of its connection.
        let display = unsafe { egl::Display::from_ptr(native.egl_display) };

        let (major, minor) = egl
            .initialize(display)
            .map_err(DeviceError::egl("eglInitialize"))?;
        log::debug!("EGL {major}.{minor} initialized");

        egl.bind_api(egl::OPENGL_ES_API)
            .map_err(DeviceError::egl("eglBindAPI"))?;

        let count = egl
            .get_config_count(display)
            .map_err(DeviceError::egl("eglGetConfigs"))?;
        if count == 0 {
            return Err(DeviceError::NoConfigs);
        }

        let mut configs = Vec::with_capacity(count);
        egl.choose_config(display, &config.config_attribs(), &mut configs)
            .map_err(DeviceError::egl("eglChooseConfig"))?;

        let chosen = select_config(&configs, config.min_buffer_size, |c| {
            egl.get_config_attrib(display, c, egl::BUFFER_SIZE).ok()
        })
        .ok_or(DeviceError::NoQualifyingConfig(config.min_buffer_size))?;
        log::debug!("selected an EGL config out of {} candidates", configs.len());

        let context = egl
            .create_context(display, chosen, None, &config.context_attribs())
            .map_err(DeviceError::egl("eglCreateContext"))?;

        let surface = match create_window_surface(&egl, display, chosen, native.egl_window) {
            Ok(surface) => surface,
            Err(err) => {
                if let Err(destroy) = egl.destroy_context(display, context) {
                    log::warn!("failed to destroy EGL context after surface error: {destroy}");
                }
                return Err(err);
            }
        };

        Ok(Self {
            egl,
            display,
            surface,
            context,
        })
    }
}

impl GlSurface for EglSurface {
    fn make_current(&self) -> Result<(), DeviceError> {
        self.egl
            .make_current(
                self.display,
                Some(self.surface),
                Some(self.surface),
                Some(self.context),
            )
            .map_err(DeviceError::egl("eglMakeCurrent"))
    }

    fn release_current(&self) -> Result<(), DeviceError> {
        self.egl
            .make_current(self.display, None, None, None)
            .map_err(DeviceError::egl("eglMakeCurrent"))
    }

    fn swap_buffers(&self) -> Result<(), DeviceError> {
        self.egl
            .swap_buffers(self.display, self.surface)
            .map_err(DeviceError::egl("eglSwapBuffers"))
    }

    fn proc_address(&self, name: &str) -> *const c_void {
        self.egl
            .get_proc_address(name)
            .map_or(ptr::null(), |f| f as *const c_void)
    }
}

impl Drop for EglSurface {
    fn drop(&mut self) {
        if let Err(err) = self.egl.destroy_surface(self.display, self.surface) {
            log::warn!("failed to destroy EGL surface: {err}");
        }
        if let Err(err) = self.egl.destroy_context(self.display, self.context) {
            log::warn!("failed to destroy EGL context: {err}");
        }
    }
}
