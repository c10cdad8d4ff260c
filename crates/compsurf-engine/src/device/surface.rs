use std::ffi::c_void;

use super::DeviceError;

/// A GPU context paired with the presentable surface it draws into.
///
/// Implemented by [`EglSurface`](super::EglSurface); the frame driver only
/// depends on this trait.
pub trait GlSurface {
    /// Makes the context and surface current on the calling thread.
    fn make_current(&self) -> Result<(), DeviceError>;

    /// Leaves no context and no surface current on the calling thread.
    fn release_current(&self) -> Result<(), DeviceError>;

    /// Presents the back buffer.
    fn swap_buffers(&self) -> Result<(), DeviceError>;

    /// Resolves a GL entry point, or null when unavailable.
    fn proc_address(&self, name: &str) -> *const c_void;
}

/// Scope during which a [`GlSurface`] is current on this thread.
///
/// The binding is released when the guard drops, on every exit path of the
/// enclosing scope including early returns and unwinding.
#[must_use = "the context is released as soon as the guard is dropped"]
pub struct CurrentContext<'a, S: GlSurface + ?Sized> {
    surface: &'a S,
}

impl<'a, S: GlSurface + ?Sized> CurrentContext<'a, S> {
    pub fn bind(surface: &'a S) -> Result<Self, DeviceError> {
        surface.make_current()?;
        Ok(Self { surface })
    }
}

impl<S: GlSurface + ?Sized> Drop for CurrentContext<'_, S> {
    fn drop(&mut self) {
        if let Err(err) = self.surface.release_current() {
            log::error!("failed to release the current GPU context: {err}");
        }
    }
}
