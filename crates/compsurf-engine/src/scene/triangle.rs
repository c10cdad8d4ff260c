use glam::{Mat4, Vec3};

use crate::gpu::{
    Color, CommandBuffer, DeviceBuffer, DrawCommand, GpuContext, GpuError, Pipeline,
    PipelineDescriptor, RenderTarget, ShaderEntry, ShaderLibrary, Uniform, UniformValue,
    VertexAttribute,
};
use crate::time::FrameTime;

use super::{Scene, SceneInfo};

pub const TRIANGLE_SHADERS: ShaderLibrary = ShaderLibrary::new(
    "triangle",
    &[
        ShaderEntry {
            name: "triangle.vert",
            source: include_str!("shaders/triangle.vert"),
        },
        ShaderEntry {
            name: "triangle.frag",
            source: include_str!("shaders/triangle.frag"),
        },
    ],
);

/// Radians per second.
const SPIN_SPEED: f32 = 1.2;

const BACKGROUND: Color = Color::new(0.08, 0.08, 0.1, 1.0);

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    color: [f32; 4],
}

#[rustfmt::skip]
const VERTICES: [Vertex; 3] = [
    Vertex { position: [ 0.0,    0.6,  0.0], color: [1.0, 0.2, 0.2, 1.0] },
    Vertex { position: [-0.52, -0.3,  0.0], color: [0.2, 1.0, 0.2, 1.0] },
    Vertex { position: [ 0.52, -0.3,  0.0], color: [0.2, 0.2, 1.0, 1.0] },
];

/// Aspect-corrected rotation about the view axis.
fn mvp(angle: f32, aspect: f32) -> Mat4 {
    Mat4::from_scale(Vec3::new(1.0 / aspect, 1.0, 1.0)) * Mat4::from_rotation_z(angle)
}

/// A spinning, depth-tested RGB triangle.
#[derive(Debug, Default)]
pub struct TriangleScene {
    angle: f32,
    pipeline: Option<Pipeline>,
    vertices: Option<DeviceBuffer>,
}

impl TriangleScene {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scene for TriangleScene {
    fn info(&self) -> SceneInfo {
        SceneInfo {
            name: "Triangle",
            description: "A rotating vertex-coloured triangle drawn with depth testing.",
        }
    }

    fn shader_library(&self) -> Option<ShaderLibrary> {
        Some(TRIANGLE_SHADERS)
    }

    fn setup(&mut self, gpu: &GpuContext) -> Result<(), GpuError> {
        let pipeline = gpu.create_pipeline(&PipelineDescriptor {
            label: "Triangle Pipeline".to_owned(),
            vertex_shader: gpu.shader_source("triangle.vert")?.to_owned(),
            fragment_shader: gpu.shader_source("triangle.frag")?.to_owned(),
            attributes: vec![
                VertexAttribute { name: "a_position", components: 3, offset: 0 },
                VertexAttribute { name: "a_color", components: 4, offset: 12 },
            ],
            stride: size_of::<Vertex>() as u32,
            depth_test: true,
        })?;
        let vertices = gpu.create_buffer("Triangle Vertices", bytemuck::cast_slice(&VERTICES))?;

        self.pipeline = Some(pipeline);
        self.vertices = Some(vertices);
        Ok(())
    }

    fn render(
        &mut self,
        _gpu: &GpuContext,
        target: &RenderTarget,
        buffer: &mut CommandBuffer,
        time: FrameTime,
    ) -> Result<(), GpuError> {
        let (Some(pipeline), Some(vertices)) = (&self.pipeline, &self.vertices) else {
            return Err(GpuError::Scene("triangle scene was not set up".to_owned()));
        };

        self.angle = (self.angle + time.dt * SPIN_SPEED) % std::f32::consts::TAU;
        let aspect = target.render_target_size().aspect_ratio();

        let mut pass = buffer.create_render_pass(target);
        pass.set_label("Triangle");
        pass.set_clear_color(BACKGROUND);
        pass.draw(DrawCommand {
            label: "triangle".to_owned(),
            pipeline: pipeline.id(),
            vertex_buffer: vertices.id(),
            first_vertex: 0,
            vertex_count: VERTICES.len() as u32,
            uniforms: vec![Uniform::new(
                "u_mvp",
                UniformValue::Mat4(mvp(self.angle, aspect).to_cols_array()),
            )],
        });
        pass.encode_commands()
    }
}
