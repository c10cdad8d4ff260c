use super::command::EncodedPass;
use super::error::GpuError;
use super::reactor::Release;
use super::resources::{BufferId, PipelineId, PipelineDescriptor, TextureDescriptor, TextureId};

/// Device-level operations the engine needs from a graphics API.
///
/// Every call is made with the GPU context current on the calling thread.
/// Implementations own the API objects behind the returned ids.
pub trait Backend {
    fn name(&self) -> &'static str;

    fn create_texture(&self, desc: &TextureDescriptor) -> Result<TextureId, GpuError>;

    fn create_buffer(&self, label: &str, contents: &[u8]) -> Result<BufferId, GpuError>;

    fn create_pipeline(&self, desc: &PipelineDescriptor) -> Result<PipelineId, GpuError>;

    /// Deletes the API object behind `resource`. Unknown ids are ignored.
    fn release(&self, resource: Release);

    /// Executes the encoded passes of one command buffer, in order.
    fn execute(&self, label: &str, passes: &[EncodedPass]) -> Result<(), GpuError>;
}
