use crate::device::DeviceError;
use crate::gpu::GpuError;

/// Outcome of a frame that did not fail.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameStatus {
    /// Recorded, submitted and swapped.
    Presented,
    /// The surface has zero area; nothing was drawn.
    Skipped,
}

/// Why a frame was dropped.
///
/// Only [`FrameError::Bind`] is fatal; after any other error the next frame
/// may succeed. No variant leaves a context current.
///
/// The message already carries the underlying error, so a plain `{}` is
/// enough for logging.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("failed to make the GPU context current: {0}")]
    Bind(DeviceError),

    #[error("the render context has been de-initialized")]
    Deinitialized,

    #[error("failed to create a command buffer: {0}")]
    CommandBuffer(GpuError),

    #[error("failed to allocate the depth attachment: {0}")]
    DepthAttachment(GpuError),

    #[error("scene `{scene}` failed to render: {error}")]
    Scene { scene: &'static str, error: GpuError },

    #[error("failed to submit the command buffer: {0}")]
    Submit(GpuError),

    #[error("failed to present the frame")]
    Present,
}

impl FrameError {
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Bind(_))
    }
}
