use super::formats::{ISize, PixelFormat};
use super::render_target::RenderTarget;

/// Callback that presents the framebuffer; returns false if the swap failed.
pub type SwapCallback<'a> = Box<dyn FnOnce() -> bool + 'a>;

/// The window's default framebuffer wrapped as a one-shot presentable target.
///
/// Created fresh every frame from the current size, so a resize is picked up
/// without recreating anything.
pub struct Surface<'a> {
    target: RenderTarget,
    swap: SwapCallback<'a>,
}

impl<'a> Surface<'a> {
    /// Wraps framebuffer 0. Returns `None` for a zero-area size.
    pub fn wrap_fbo(
        swap: impl FnOnce() -> bool + 'a,
        format: PixelFormat,
        size: ISize,
    ) -> Option<Self> {
        if size.is_empty() {
            return None;
        }

        Some(Self {
            target: RenderTarget::for_default_framebuffer(size, format),
            swap: Box::new(swap),
        })
    }

    #[inline]
    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    #[inline]
    pub fn target_mut(&mut self) -> &mut RenderTarget {
        &mut self.target
    }

    /// Presents the frame. Consumes the surface; the target is released after
    /// the swap.
    pub fn present(self) -> bool {
        (self.swap)()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn zero_area_is_not_wrapped() {
        assert!(Surface::wrap_fbo(|| true, PixelFormat::R8G8B8A8UNormInt, ISize::new(0, 720)).is_none());
    }

    #[test]
    fn present_runs_swap_once() {
        let swaps = Cell::new(0);
        let surface = Surface::wrap_fbo(
            || {
                swaps.set(swaps.get() + 1);
                true
            },
            PixelFormat::R8G8B8A8UNormInt,
            ISize::new(1280, 720),
        )
        .unwrap();

        assert_eq!(surface.target().render_target_size(), ISize::new(1280, 720));
        assert!(surface.target().depth_attachment().is_none());
        assert!(surface.present());
        assert_eq!(swaps.get(), 1);
    }

    #[test]
    fn dropping_without_present_does_not_swap() {
        let swaps = Cell::new(0);
        let surface = Surface::wrap_fbo(
            || {
                swaps.set(swaps.get() + 1);
                true
            },
            PixelFormat::R8G8B8A8UNormInt,
            ISize::new(64, 64),
        );
        drop(surface);
        assert_eq!(swaps.get(), 0);
    }
}
