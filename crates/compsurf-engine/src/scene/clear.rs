use crate::gpu::{Color, CommandBuffer, GpuContext, GpuError, RenderTarget};
use crate::time::FrameTime;

use super::{Scene, SceneInfo};

/// Hue rotation speed, in degrees per second.
const HUE_SPEED: f32 = 45.0;

/// Clears the window to a colour cycling through the hue wheel.
#[derive(Debug, Default)]
pub struct ClearScene {
    hue: f32,
}

impl ClearScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Colour the next frame will clear to.
    pub fn color(&self) -> Color {
        Color::from_hsv(self.hue, 0.6, 0.85)
    }
}

impl Scene for ClearScene {
    fn info(&self) -> SceneInfo {
        SceneInfo {
            name: "Clear",
            description: "Clears the surface with a hue-cycling colour.",
        }
    }

    fn setup(&mut self, _gpu: &GpuContext) -> Result<(), GpuError> {
        Ok(())
    }

    fn render(
        &mut self,
        _gpu: &GpuContext,
        target: &RenderTarget,
        buffer: &mut CommandBuffer,
        time: FrameTime,
    ) -> Result<(), GpuError> {
        self.hue = (self.hue + time.dt * HUE_SPEED).rem_euclid(360.0);

        let mut pass = buffer.create_render_pass(target);
        pass.set_label("Clear");
        pass.set_clear_color(self.color());
        pass.encode_commands()
    }
}
