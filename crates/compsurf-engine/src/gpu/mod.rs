//! Minimal GLES rendering engine: resources, command buffers and a reactor
//! that defers GPU object finalization to allowed threads.

mod backend;
mod command;
mod context;
mod error;
mod formats;
mod gles;
mod proc_table;
mod reactor;
mod render_target;
mod resources;
mod shader;
mod surface;
mod worker;

pub use backend::Backend;
pub use command::{
    CommandBuffer, DrawCommand, EncodedPass, PassColor, PassDepth, RenderPass, Uniform,
    UniformValue,
};
pub use context::GpuContext;
pub use error::GpuError;
pub use formats::{
    Color, ISize, LoadAction, PixelFormat, SampleCount, StorageMode, StoreAction, TextureType,
    TextureUsage,
};
pub use gles::GlesBackend;
pub use proc_table::{missing_entry_points, ProcTable, REQUIRED_ENTRY_POINTS};
pub use reactor::{Reactor, ReactorWorker, Release, WorkerId};
pub use render_target::{ColorAttachment, DepthAttachment, RenderTarget};
pub use resources::{
    BufferId, DeviceBuffer, Pipeline, PipelineDescriptor, PipelineId, Texture, TextureDescriptor,
    TextureId, VertexAttribute,
};
pub use shader::{ShaderEntry, ShaderLibrary};
pub use surface::{Surface, SwapCallback};
pub use worker::ThreadReactorWorker;
