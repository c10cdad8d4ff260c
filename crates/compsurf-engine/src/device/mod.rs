//! EGL surface + context management.
//!
//! This module is responsible for:
//! - reading the host's native window handle
//! - negotiating an EGL config and creating the GLES context and window surface
//! - binding/unbinding the context on the calling thread

mod egl;
mod error;
mod init;
mod native;
mod surface;

pub use self::egl::{has_wayland_platform_extension, load_egl, Egl, EglSurface};
pub use error::DeviceError;
pub use init::SurfaceConfig;
pub use native::NativeWindow;
pub use surface::{CurrentContext, GlSurface};

pub use khronos_egl;
