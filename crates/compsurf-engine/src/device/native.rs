use std::ffi::c_void;
use std::ptr;

use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

use super::DeviceError;

/// Native window handle supplied by the embedding host.
///
/// The layout matches the host's C struct, so a pointer handed across the C ABI
/// can be read directly. All pointers are borrowed: the host owns the Wayland
/// objects and must keep them alive for the lifetime of the render context.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct NativeWindow {
    pub wl_display: *mut c_void,
    pub wl_surface: *mut c_void,
    pub egl_display: *mut c_void,
    pub egl_window: *mut c_void,
    pub width: u32,
    pub height: u32,
}

impl NativeWindow {
    /// Builds a handle from `raw-window-handle` values plus the EGL objects the
    /// host created for the surface.
    ///
    /// Only Wayland display/window handles are accepted.
    pub fn from_raw_handles(
        display: RawDisplayHandle,
        window: RawWindowHandle,
        egl_display: *mut c_void,
        egl_window: *mut c_void,
        width: u32,
        height: u32,
    ) -> Result<Self, DeviceError> {
        let (RawDisplayHandle::Wayland(display), RawWindowHandle::Wayland(window)) =
            (display, window)
        else {
            return Err(DeviceError::UnsupportedHandle);
        };

        let native = Self {
            wl_display: display.display.as_ptr(),
            wl_surface: window.surface.as_ptr(),
            egl_display,
            egl_window,
            width,
            height,
        };
        native.validate()?;
        Ok(native)
    }

    /// Checks the fields EGL surface creation depends on.
    pub fn validate(&self) -> Result<(), DeviceError> {
        if self.egl_display.is_null() {
            return Err(DeviceError::MissingHandle("egl_display"));
        }
        if self.egl_window.is_null() {
            return Err(DeviceError::MissingHandle("egl_window"));
        }
        Ok(())
    }
}

impl Default for NativeWindow {
    fn default() -> Self {
        Self {
            wl_display: ptr::null_mut(),
            wl_surface: ptr::null_mut(),
            egl_display: ptr::null_mut(),
            egl_window: ptr::null_mut(),
            width: 0,
            height: 0,
        }
    }
}
