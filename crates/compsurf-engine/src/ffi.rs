//! C ABI for compositor-surface hosts.
//!
//! The host owns the returned context pointer and must hand it back to
//! `comp_surf_destroy`. Every function ignores a null context.

use std::ffi::{CStr, c_char, c_int};
use std::path::PathBuf;
use std::ptr;

use crate::core::{ContextParams, RenderContext};
use crate::device::NativeWindow;
use crate::logging::{LoggingConfig, init_logging};
use crate::scene::builtin_scenes;

/// Reads a C string; null becomes empty.
///
/// # Safety
/// A non-null `s` must point to a NUL-terminated string.
unsafe fn lossy_string(s: *const c_char) -> String {
    if s.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(s) }.to_string_lossy().into_owned()
}

fn dimension(value: c_int) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

#[unsafe(no_mangle)]
pub extern "C" fn comp_surf_version() -> u32 {
    crate::version()
}

/// Creates a render context with the built-in scenes, or returns null.
///
/// # Safety
/// `native_window` must be null or point to a valid `NativeWindow` whose
/// handles outlive the context. String arguments must be null or
/// NUL-terminated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn comp_surf_initialize(
    access_token: *const c_char,
    width: c_int,
    height: c_int,
    native_window: *const NativeWindow,
    assets_path: *const c_char,
    cache_path: *const c_char,
    misc_path: *const c_char,
) -> *mut RenderContext {
    init_logging(LoggingConfig::default());

    let Some(native) = (unsafe { native_window.as_ref() }).copied() else {
        log::error!("comp_surf_initialize: native window is null");
        return ptr::null_mut();
    };

    let params = unsafe {
        ContextParams {
            access_token: lossy_string(access_token),
            width: dimension(width),
            height: dimension(height),
            assets_path: PathBuf::from(lossy_string(assets_path)),
            cache_path: PathBuf::from(lossy_string(cache_path)),
            misc_path: PathBuf::from(lossy_string(misc_path)),
            ..Default::default()
        }
    };

    match RenderContext::new(params, native, builtin_scenes()) {
        Ok(ctx) => Box::into_raw(Box::new(ctx)),
        Err(err) => {
            log::error!("comp_surf_initialize failed: {err:#}");
            ptr::null_mut()
        }
    }
}

/// # Safety
/// `ctx` must be null or a pointer returned by `comp_surf_initialize`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn comp_surf_de_initialize(ctx: *mut RenderContext) {
    if let Some(ctx) = unsafe { ctx.as_mut() } {
        ctx.de_initialize();
    }
}

/// # Safety
/// `ctx` must be null or a pointer returned by `comp_surf_initialize`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn comp_surf_run_task(ctx: *mut RenderContext) -> bool {
    match unsafe { ctx.as_ref() } {
        Some(ctx) => ctx.run_task(),
        None => false,
    }
}

/// Marks the calling thread as allowed (or not) to submit GPU work.
///
/// Threads that were never marked are allowed the first time they draw or run
/// tasks; this is for hosts that want to revoke a thread or mark one upfront.
///
/// # Safety
/// `ctx` must be null or a pointer returned by `comp_surf_initialize`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn comp_surf_set_reactions_allowed_on_current_thread(
    ctx: *mut RenderContext,
    allowed: bool,
) {
    if let Some(ctx) = unsafe { ctx.as_ref() } {
        ctx.set_reactions_allowed_on_current_thread(allowed);
    }
}

/// Returns true if the frame was presented.
///
/// # Safety
/// `ctx` must be null or a pointer returned by `comp_surf_initialize`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn comp_surf_draw_frame(ctx: *mut RenderContext, time: u32) -> bool {
    match unsafe { ctx.as_mut() } {
        Some(ctx) => matches!(ctx.draw_frame(time), Ok(crate::core::FrameStatus::Presented)),
        None => false,
    }
}

/// Negative dimensions are treated as zero.
///
/// # Safety
/// `ctx` must be null or a pointer returned by `comp_surf_initialize`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn comp_surf_resize(ctx: *mut RenderContext, width: c_int, height: c_int) {
    if let Some(ctx) = unsafe { ctx.as_mut() } {
        ctx.resize(dimension(width), dimension(height));
    }
}

/// # Safety
/// `ctx` must be null or a pointer returned by `comp_surf_initialize`, not
/// yet destroyed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn comp_surf_destroy(ctx: *mut RenderContext) {
    if !ctx.is_null() {
        drop(unsafe { Box::from_raw(ctx) });
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;

    use super::*;

    #[test]
    fn version_matches_package() {
        let expected = (env!("CARGO_PKG_VERSION_MAJOR").parse::<u32>().unwrap() << 16)
            | (env!("CARGO_PKG_VERSION_MINOR").parse::<u32>().unwrap() << 8)
            | env!("CARGO_PKG_VERSION_PATCH").parse::<u32>().unwrap();
        assert_eq!(comp_surf_version(), expected);
    }

    #[test]
    fn null_context_is_ignored() {
        unsafe {
            comp_surf_de_initialize(ptr::null_mut());
            assert!(!comp_surf_run_task(ptr::null_mut()));
            comp_surf_set_reactions_allowed_on_current_thread(ptr::null_mut(), true);
            assert!(!comp_surf_draw_frame(ptr::null_mut(), 16));
            comp_surf_resize(ptr::null_mut(), 800, 600);
            comp_surf_destroy(ptr::null_mut());
        }
    }

    #[test]
    fn null_native_window_fails() {
        let token = CString::new("token").unwrap();
        let ctx = unsafe {
            comp_surf_initialize(
                token.as_ptr(),
                1920,
                1080,
                ptr::null(),
                ptr::null(),
                ptr::null(),
                ptr::null(),
            )
        };
        assert!(ctx.is_null());
    }

    #[test]
    fn incomplete_native_window_fails() {
        let native = NativeWindow { width: 1920, height: 1080, ..Default::default() };
        let ctx = unsafe {
            comp_surf_initialize(
                ptr::null(),
                1920,
                1080,
                &native,
                ptr::null(),
                ptr::null(),
                ptr::null(),
            )
        };
        assert!(ctx.is_null());
    }

    #[test]
    fn negative_dimensions_clamp_to_zero() {
        assert_eq!(dimension(-5), 0);
        assert_eq!(dimension(0), 0);
        assert_eq!(dimension(1080), 1080);
    }

    #[test]
    fn null_strings_read_as_empty() {
        let s = CString::new("/tmp/assets").unwrap();
        unsafe {
            assert_eq!(lossy_string(ptr::null()), "");
            assert_eq!(lossy_string(s.as_ptr()), "/tmp/assets");
        }
    }
}
