//! Compositor-surface render harness.
//!
//! Creates an EGL/GLES context on a host-supplied Wayland window and drives a
//! per-frame loop over a fixed set of selectable scenes. Hosts link either the
//! Rust API ([`RenderContext`]) or the C ABI in [`ffi`].

pub mod core;
pub mod device;
pub mod ffi;
pub mod gpu;
pub mod logging;
pub mod scene;
pub mod time;

#[cfg(test)]
mod testing;

pub use crate::core::{ContextParams, FrameError, FrameStatus, RenderContext};
pub use crate::device::{NativeWindow, SurfaceConfig};
pub use crate::scene::{builtin_scenes, Scene, SceneInfo};

/// Crate version packed as `(major << 16) | (minor << 8) | patch`.
pub fn version() -> u32 {
    let part = |s: &str| s.parse::<u32>().unwrap_or(0);
    (part(env!("CARGO_PKG_VERSION_MAJOR")) << 16)
        | (part(env!("CARGO_PKG_VERSION_MINOR")) << 8)
        | part(env!("CARGO_PKG_VERSION_PATCH"))
}
