use std::ffi::c_void;
use std::ptr::NonNull;

use anyhow::{Context, Result, bail};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle};
use wayland_sys::egl::{wayland_egl_handle, wl_egl_window};
use wayland_sys::ffi_dispatch;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use compsurf_engine::device::load_egl;
use compsurf_engine::NativeWindow;

/// `wl_egl_window` for a winit Wayland window. Destroyed on drop, so it must
/// be dropped after the render context and before the window.
pub struct EglWindow {
    ptr: NonNull<wl_egl_window>,
}

impl EglWindow {
    pub fn new(window: &Window, size: PhysicalSize<u32>) -> Result<Self> {
        let handle = window
            .window_handle()
            .context("window has no raw handle")?
            .as_raw();
        let RawWindowHandle::Wayland(handle) = handle else {
            bail!("studio requires a Wayland window, got {handle:?}");
        };

        let (width, height) = clamp_size(size);
        // SAFETY: the surface belongs to `window`, which outlives this object.
        let ptr = unsafe {
            ffi_dispatch!(
                wayland_egl_handle(),
                wl_egl_window_create,
                handle.surface.as_ptr().cast(),
                width,
                height
            )
        };
        let ptr = NonNull::new(ptr).context("wl_egl_window_create returned null")?;

        Ok(Self { ptr })
    }

    pub fn resize(&self, size: PhysicalSize<u32>) {
        let (width, height) = clamp_size(size);
        // SAFETY: `ptr` is a live wl_egl_window.
        unsafe {
            ffi_dispatch!(
                wayland_egl_handle(),
                wl_egl_window_resize,
                self.ptr.as_ptr(),
                width,
                height,
                0,
                0
            )
        }
    }

    pub fn as_ptr(&self) -> *mut c_void {
        self.ptr.as_ptr().cast()
    }
}

impl Drop for EglWindow {
    fn drop(&mut self) {
        // SAFETY: created by wl_egl_window_create and destroyed exactly once.
        unsafe { ffi_dispatch!(wayland_egl_handle(), wl_egl_window_destroy, self.ptr.as_ptr()) }
    }
}

/// Wayland rejects zero-sized buffers; keep at least one pixel.
fn clamp_size(size: PhysicalSize<u32>) -> (i32, i32) {
    let clamp = |v: u32| i32::try_from(v.max(1)).unwrap_or(i32::MAX);
    (clamp(size.width), clamp(size.height))
}

/// Builds the handle the render context consumes, creating the EGL display
/// for the window's Wayland connection.
pub fn native_window(window: &Window, egl_window: &EglWindow) -> Result<NativeWindow> {
    let display = window
        .display_handle()
        .context("window has no raw display handle")?
        .as_raw();
    let handle = window
        .window_handle()
        .context("window has no raw handle")?
        .as_raw();

    let RawDisplayHandle::Wayland(wayland) = display else {
        bail!("studio requires a Wayland display, got {display:?}");
    };

    let egl = load_egl().context("failed to load EGL")?;
    // SAFETY: `wayland.display` is the live wl_display of the event loop.
    let egl_display = unsafe { egl.get_display(wayland.display.as_ptr()) }
        .context("eglGetDisplay returned no display for the Wayland connection")?;

    let size = window.inner_size();
    NativeWindow::from_raw_handles(
        display,
        handle,
        egl_display.as_ptr(),
        egl_window.as_ptr(),
        size.width,
        size.height,
    )
    .context("invalid native window")
}
