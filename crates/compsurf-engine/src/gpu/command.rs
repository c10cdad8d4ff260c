use super::error::GpuError;
use super::formats::{Color, ISize, LoadAction, PixelFormat, StoreAction};
use super::render_target::RenderTarget;
use super::resources::{BufferId, PipelineId, TextureId};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec4([f32; 4]),
    /// Column-major 4x4 matrix.
    Mat4([f32; 16]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Uniform {
    pub name: &'static str,
    pub value: UniformValue,
}

impl Uniform {
    pub fn new(name: &'static str, value: UniformValue) -> Self {
        Self { name, value }
    }
}

/// One non-indexed triangle-list draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub label: String,
    pub pipeline: PipelineId,
    pub vertex_buffer: BufferId,
    pub first_vertex: u32,
    pub vertex_count: u32,
    pub uniforms: Vec<Uniform>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PassColor {
    pub format: PixelFormat,
    pub load_action: LoadAction,
    pub store_action: StoreAction,
    pub clear_color: Color,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PassDepth {
    pub texture: TextureId,
    pub size: ISize,
    pub load_action: LoadAction,
    pub store_action: StoreAction,
    pub clear_depth: f32,
}

/// A finished render pass, reduced to plain data the backend can execute.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedPass {
    pub label: String,
    pub size: ISize,
    pub color: PassColor,
    pub depth: Option<PassDepth>,
    pub commands: Vec<DrawCommand>,
}

/// A recorded batch of render passes, submitted together.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    label: String,
    passes: Vec<EncodedPass>,
}

impl CommandBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Starts recording a pass into `target`. The pass is only added to the
    /// buffer once [`RenderPass::encode_commands`] succeeds.
    pub fn create_render_pass(&mut self, target: &RenderTarget) -> RenderPass<'_> {
        let color = target.color_attachment();
        let depth = target.depth_attachment().map(|depth| PassDepth {
            texture: depth.texture.id(),
            size: depth.texture.size(),
            load_action: depth.load_action,
            store_action: depth.store_action,
            clear_depth: depth.clear_depth,
        });

        RenderPass {
            buffer: self,
            pass: EncodedPass {
                label: String::new(),
                size: target.render_target_size(),
                color: PassColor {
                    format: color.format,
                    load_action: color.load_action,
                    store_action: color.store_action,
                    clear_color: color.clear_color,
                },
                depth,
                commands: Vec::new(),
            },
        }
    }

    #[inline]
    pub fn encoded_passes(&self) -> &[EncodedPass] {
        &self.passes
    }

    pub(crate) fn into_parts(self) -> (String, Vec<EncodedPass>) {
        (self.label, self.passes)
    }
}

/// Records draws for one pass. Dropping it without encoding discards the pass.
#[derive(Debug)]
pub struct RenderPass<'a> {
    buffer: &'a mut CommandBuffer,
    pass: EncodedPass,
}

impl RenderPass<'_> {
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.pass.label = label.into();
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.pass.color.clear_color = color;
    }

    pub fn draw(&mut self, command: DrawCommand) {
        self.pass.commands.push(command);
    }

    pub fn encode_commands(self) -> Result<(), GpuError> {
        if self.pass.size.is_empty() {
            return Err(GpuError::EmptyRenderTarget);
        }
        self.buffer.passes.push(self.pass);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(width: u32, height: u32) -> RenderTarget {
        RenderTarget::for_default_framebuffer(
            ISize::new(width, height),
            PixelFormat::R8G8B8A8UNormInt,
        )
    }

    #[test]
    fn encoded_pass_copies_target_state() {
        let mut buffer = CommandBuffer::new();
        buffer.set_label("Command Buffer");

        let mut pass = buffer.create_render_pass(&target(800, 600));
        pass.set_label("clear");
        pass.set_clear_color(Color::WHITE);
        pass.encode_commands().unwrap();

        let passes = buffer.encoded_passes();
        assert_eq!(buffer.label(), "Command Buffer");
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].label, "clear");
        assert_eq!(passes[0].size, ISize::new(800, 600));
        assert_eq!(passes[0].color.clear_color, Color::WHITE);
        assert_eq!(passes[0].color.load_action, LoadAction::Clear);
        assert!(passes[0].depth.is_none());
    }

    #[test]
    fn dropped_pass_is_not_recorded() {
        let mut buffer = CommandBuffer::new();
        let mut pass = buffer.create_render_pass(&target(16, 16));
        pass.set_label("abandoned");
        drop(pass);
        assert!(buffer.encoded_passes().is_empty());
    }

    #[test]
    fn empty_target_fails_to_encode() {
        let mut buffer = CommandBuffer::new();
        let pass = buffer.create_render_pass(&target(0, 16));
        assert_eq!(pass.encode_commands(), Err(GpuError::EmptyRenderTarget));
        assert!(buffer.encoded_passes().is_empty());
    }
}
