use std::cell::RefCell;
use std::fmt;

use glow::HasContext;
use slotmap::SlotMap;

use super::backend::Backend;
use super::command::{DrawCommand, EncodedPass, UniformValue};
use super::error::GpuError;
use super::formats::{LoadAction, PixelFormat, SampleCount, StoreAction, TextureUsage};
use super::proc_table::ProcTable;
use super::reactor::Release;
use super::resources::{BufferId, PipelineDescriptor, PipelineId, TextureDescriptor, TextureId};

struct GlPipeline {
    program: glow::NativeProgram,
    /// (location, components, byte offset)
    attributes: Vec<(u32, i32, i32)>,
    stride: i32,
    depth_test: bool,
}

fn require_gles3(is_embedded: bool, major: u32, minor: u32) -> Result<(), GpuError> {
    if is_embedded && major >= 3 {
        return Ok(());
    }
    let api = if is_embedded { "GLES" } else { "desktop GL" };
    Err(GpuError::UnsupportedContext(format!("{api} {major}.{minor}")))
}

/// [`Backend`] executing on a current GLES 3 context.
pub struct GlesBackend {
    gl: glow::Context,
    renderbuffers: RefCell<SlotMap<TextureId, glow::NativeRenderbuffer>>,
    buffers: RefCell<SlotMap<BufferId, glow::NativeBuffer>>,
    pipelines: RefCell<SlotMap<PipelineId, GlPipeline>>,
}

impl GlesBackend {
    /// The context the proc table was resolved for must be current.
    ///
    /// Fails unless the context is GLES 3.0 or newer.
    pub fn new(procs: ProcTable) -> Result<Self, GpuError> {
        let gl = procs.into_context();
        let version = gl.version();
        require_gles3(version.is_embedded, version.major, version.minor)?;

        unsafe {
            log::info!(
                "GLES backend: {} ({})",
                gl.get_parameter_string(glow::VERSION),
                gl.get_parameter_string(glow::RENDERER)
            );
        }

        Ok(Self {
            gl,
            renderbuffers: RefCell::new(SlotMap::with_key()),
            buffers: RefCell::new(SlotMap::with_key()),
            pipelines: RefCell::new(SlotMap::with_key()),
        })
    }

    fn compile(&self, kind: u32, label: &str, source: &str) -> Result<glow::NativeShader, GpuError> {
        let gl = &self.gl;
        unsafe {
            let shader = gl.create_shader(kind).map_err(|reason| GpuError::Allocation {
                kind: "shader",
                reason,
            })?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);

            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(GpuError::ShaderCompilation { label: label.to_owned(), log });
            }
            Ok(shader)
        }
    }

    fn draw(&self, command: &DrawCommand, has_depth: bool) -> Result<(), GpuError> {
        let pipelines = self.pipelines.borrow();
        let pipeline = pipelines
            .get(command.pipeline)
            .ok_or(GpuError::UnknownResource("pipeline"))?;
        let buffer = *self
            .buffers
            .borrow()
            .get(command.vertex_buffer)
            .ok_or(GpuError::UnknownResource("buffer"))?;

        let gl = &self.gl;
        unsafe {
            gl.use_program(Some(pipeline.program));

            if pipeline.depth_test && has_depth {
                gl.enable(glow::DEPTH_TEST);
                gl.depth_func(glow::LEQUAL);
            } else {
                gl.disable(glow::DEPTH_TEST);
            }

            gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            for &(location, components, offset) in &pipeline.attributes {
                gl.enable_vertex_attrib_array(location);
                gl.vertex_attrib_pointer_f32(
                    location,
                    components,
                    glow::FLOAT,
                    false,
                    pipeline.stride,
                    offset,
                );
            }

            for uniform in &command.uniforms {
                let Some(location) = gl.get_uniform_location(pipeline.program, uniform.name) else {
                    log::trace!("{}: uniform `{}` is inactive", command.label, uniform.name);
                    continue;
                };
                match uniform.value {
                    UniformValue::Float(v) => gl.uniform_1_f32(Some(&location), v),
                    UniformValue::Vec4([x, y, z, w]) => gl.uniform_4_f32(Some(&location), x, y, z, w),
                    UniformValue::Mat4(m) => gl.uniform_matrix_4_f32_slice(Some(&location), false, &m),
                }
            }

            gl.draw_arrays(
                glow::TRIANGLES,
                command.first_vertex as i32,
                command.vertex_count as i32,
            );

            for &(location, _, _) in &pipeline.attributes {
                gl.disable_vertex_attrib_array(location);
            }
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }

        Ok(())
    }

    fn execute_pass(&self, pass: &EncodedPass) -> Result<(), GpuError> {
        let gl = &self.gl;

        if let Some(depth) = &pass.depth
            && !self.renderbuffers.borrow().contains_key(depth.texture)
        {
            return Err(GpuError::UnknownResource("texture"));
        }

        unsafe {
            // Framebuffer 0 carries the window's own depth/stencil buffer; the
            // pass's depth texture only decides how that buffer is loaded and stored.
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            gl.viewport(0, 0, pass.size.width as i32, pass.size.height as i32);

            let mut mask = 0;
            if pass.color.load_action == LoadAction::Clear {
                let c = pass.color.clear_color;
                gl.clear_color(c.r, c.g, c.b, c.a);
                mask |= glow::COLOR_BUFFER_BIT;
            }
            if let Some(depth) = &pass.depth
                && depth.load_action == LoadAction::Clear
            {
                gl.depth_mask(true);
                gl.clear_depth_f32(depth.clear_depth);
                mask |= glow::DEPTH_BUFFER_BIT | glow::STENCIL_BUFFER_BIT;
            }
            if mask != 0 {
                gl.clear(mask);
            }
        }

        for command in &pass.commands {
            self.draw(command, pass.depth.is_some())?;
        }

        unsafe {
            gl.use_program(None);
            gl.disable(glow::DEPTH_TEST);

            let mut discard = Vec::with_capacity(3);
            if pass.color.store_action == StoreAction::DontCare {
                discard.push(glow::COLOR);
            }
            if pass.depth.is_some_and(|d| d.store_action == StoreAction::DontCare) {
                discard.push(glow::DEPTH);
                discard.push(glow::STENCIL);
            }
            if !discard.is_empty() {
                gl.invalidate_framebuffer(glow::FRAMEBUFFER, &discard);
            }
        }

        Ok(())
    }
}

impl Backend for GlesBackend {
    fn name(&self) -> &'static str {
        "gles3"
    }

    fn create_texture(&self, desc: &TextureDescriptor) -> Result<TextureId, GpuError> {
        if !desc.usage.contains(TextureUsage::RENDER_TARGET) {
            return Err(GpuError::Allocation {
                kind: "texture",
                reason: format!("usage {:?} is not supported, only render targets", desc.usage),
            });
        }
        if desc.size.is_empty() {
            return Err(GpuError::Allocation {
                kind: "texture",
                reason: "zero-area size".to_owned(),
            });
        }

        let internal_format = match desc.format {
            PixelFormat::D24UNormS8UInt => glow::DEPTH24_STENCIL8,
            PixelFormat::S8UInt => glow::STENCIL_INDEX8,
            PixelFormat::R8G8B8A8UNormInt | PixelFormat::B8G8R8A8UNormInt => glow::RGBA8,
        };
        let (width, height) = (desc.size.width as i32, desc.size.height as i32);

        let gl = &self.gl;
        let renderbuffer = unsafe {
            let renderbuffer = gl.create_renderbuffer().map_err(|reason| GpuError::Allocation {
                kind: "texture",
                reason,
            })?;
            gl.bind_renderbuffer(glow::RENDERBUFFER, Some(renderbuffer));
            match desc.sample_count {
                SampleCount::Count1 => {
                    gl.renderbuffer_storage(glow::RENDERBUFFER, internal_format, width, height)
                }
                count => gl.renderbuffer_storage_multisample(
                    glow::RENDERBUFFER,
                    count.samples() as i32,
                    internal_format,
                    width,
                    height,
                ),
            }
            gl.bind_renderbuffer(glow::RENDERBUFFER, None);
            renderbuffer
        };

        Ok(self.renderbuffers.borrow_mut().insert(renderbuffer))
    }

    fn create_buffer(&self, label: &str, contents: &[u8]) -> Result<BufferId, GpuError> {
        let gl = &self.gl;
        let buffer = unsafe {
            let buffer = gl.create_buffer().map_err(|reason| GpuError::Allocation {
                kind: "buffer",
                reason: format!("{label}: {reason}"),
            })?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, contents, glow::STATIC_DRAW);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            buffer
        };

        Ok(self.buffers.borrow_mut().insert(buffer))
    }

    fn create_pipeline(&self, desc: &PipelineDescriptor) -> Result<PipelineId, GpuError> {
        let vertex = self.compile(glow::VERTEX_SHADER, &desc.label, &desc.vertex_shader)?;
        let fragment = match self.compile(glow::FRAGMENT_SHADER, &desc.label, &desc.fragment_shader) {
            Ok(fragment) => fragment,
            Err(e) => {
                unsafe { self.gl.delete_shader(vertex) };
                return Err(e);
            }
        };

        let gl = &self.gl;
        unsafe {
            let program = match gl.create_program() {
                Ok(program) => program,
                Err(reason) => {
                    gl.delete_shader(vertex);
                    gl.delete_shader(fragment);
                    return Err(GpuError::Allocation { kind: "pipeline", reason });
                }
            };
            gl.attach_shader(program, vertex);
            gl.attach_shader(program, fragment);
            gl.link_program(program);
            gl.detach_shader(program, vertex);
            gl.detach_shader(program, fragment);
            gl.delete_shader(vertex);
            gl.delete_shader(fragment);

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(GpuError::PipelineLink { label: desc.label.clone(), log });
            }

            let mut attributes = Vec::with_capacity(desc.attributes.len());
            for attribute in &desc.attributes {
                match gl.get_attrib_location(program, attribute.name) {
                    Some(location) => attributes.push((
                        location,
                        i32::from(attribute.components),
                        attribute.offset as i32,
                    )),
                    None => log::warn!(
                        "pipeline `{}`: attribute `{}` is inactive",
                        desc.label,
                        attribute.name
                    ),
                }
            }

            log::debug!("linked pipeline `{}`", desc.label);
            Ok(self.pipelines.borrow_mut().insert(GlPipeline {
                program,
                attributes,
                stride: desc.stride as i32,
                depth_test: desc.depth_test,
            }))
        }
    }

    fn release(&self, resource: Release) {
        let gl = &self.gl;
        unsafe {
            match resource {
                Release::Texture(id) => {
                    if let Some(rb) = self.renderbuffers.borrow_mut().remove(id) {
                        gl.delete_renderbuffer(rb);
                    }
                }
                Release::Buffer(id) => {
                    if let Some(buffer) = self.buffers.borrow_mut().remove(id) {
                        gl.delete_buffer(buffer);
                    }
                }
                Release::Pipeline(id) => {
                    if let Some(pipeline) = self.pipelines.borrow_mut().remove(id) {
                        gl.delete_program(pipeline.program);
                    }
                }
            }
        }
    }

    fn execute(&self, label: &str, passes: &[EncodedPass]) -> Result<(), GpuError> {
        log::trace!("executing `{label}`: {} pass(es)", passes.len());
        for pass in passes {
            self.execute_pass(pass)?;
        }
        unsafe { self.gl.flush() };
        Ok(())
    }
}

impl fmt::Debug for GlesBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlesBackend")
            .field("renderbuffers", &self.renderbuffers.borrow().len())
            .field("buffers", &self.buffers.borrow().len())
            .field("pipelines", &self.pipelines.borrow().len())
            .finish()
    }
}
