use std::fmt;
use std::sync::Arc;

use slotmap::new_key_type;

use super::formats::{ISize, PixelFormat, SampleCount, StorageMode, TextureType, TextureUsage};
use super::reactor::{Reactor, Release};

new_key_type! {
    /// Backend handle of a texture.
    pub struct TextureId;
    /// Backend handle of a device buffer.
    pub struct BufferId;
    /// Backend handle of a render pipeline.
    pub struct PipelineId;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureDescriptor {
    pub kind: TextureType,
    pub format: PixelFormat,
    pub size: ISize,
    pub usage: TextureUsage,
    pub sample_count: SampleCount,
    pub storage_mode: StorageMode,
}

impl Default for TextureDescriptor {
    fn default() -> Self {
        Self {
            kind: TextureType::Texture2D,
            format: PixelFormat::R8G8B8A8UNormInt,
            size: ISize::default(),
            usage: TextureUsage::SHADER_READ,
            sample_count: SampleCount::Count1,
            storage_mode: StorageMode::DevicePrivate,
        }
    }
}

/// One float vertex attribute inside an interleaved vertex buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Attribute name in the vertex shader.
    pub name: &'static str,
    /// Number of `f32` components (1-4).
    pub components: u8,
    /// Byte offset inside one vertex.
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineDescriptor {
    pub label: String,
    pub vertex_shader: String,
    pub fragment_shader: String,
    pub attributes: Vec<VertexAttribute>,
    /// Byte size of one vertex.
    pub stride: u32,
    pub depth_test: bool,
}

/// GPU texture. The backend object is released through the reactor on drop.
pub struct Texture {
    id: TextureId,
    desc: TextureDescriptor,
    reactor: Arc<Reactor>,
}

impl Texture {
    pub(crate) fn new(id: TextureId, desc: TextureDescriptor, reactor: Arc<Reactor>) -> Self {
        Self { id, desc, reactor }
    }

    #[inline]
    pub fn id(&self) -> TextureId {
        self.id
    }

    #[inline]
    pub fn size(&self) -> ISize {
        self.desc.size
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.reactor.defer_release(Release::Texture(self.id));
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("id", &self.id)
            .field("desc", &self.desc)
            .finish()
    }
}

/// Immutable vertex data living on the device.
pub struct DeviceBuffer {
    id: BufferId,
    len: usize,
    reactor: Arc<Reactor>,
}

impl DeviceBuffer {
    pub(crate) fn new(id: BufferId, len: usize, reactor: Arc<Reactor>) -> Self {
        Self { id, len, reactor }
    }

    #[inline]
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for DeviceBuffer {
    fn drop(&mut self) {
        self.reactor.defer_release(Release::Buffer(self.id));
    }
}

impl fmt::Debug for DeviceBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("id", &self.id)
            .field("len", &self.len)
            .finish()
    }
}

/// Compiled and linked shader program plus its vertex layout.
pub struct Pipeline {
    id: PipelineId,
    label: String,
    reactor: Arc<Reactor>,
}

impl Pipeline {
    pub(crate) fn new(id: PipelineId, label: String, reactor: Arc<Reactor>) -> Self {
        Self { id, label, reactor }
    }

    #[inline]
    pub fn id(&self) -> PipelineId {
        self.id
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.reactor.defer_release(Release::Pipeline(self.id));
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish()
    }
}
