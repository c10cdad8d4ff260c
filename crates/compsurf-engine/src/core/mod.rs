//! Host-facing render context and per-frame results.

mod context;
mod frame;
mod params;

pub use context::RenderContext;
pub use frame::{FrameError, FrameStatus};
pub use params::ContextParams;
