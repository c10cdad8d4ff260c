use super::formats::{Color, ISize, LoadAction, PixelFormat, StoreAction};
use super::resources::Texture;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorAttachment {
    pub format: PixelFormat,
    pub load_action: LoadAction,
    pub store_action: StoreAction,
    pub clear_color: Color,
}

#[derive(Debug)]
pub struct DepthAttachment {
    pub texture: Texture,
    pub load_action: LoadAction,
    pub store_action: StoreAction,
    pub clear_depth: f32,
}

/// Attachments a render pass draws into.
///
/// The color attachment is always the window's default framebuffer.
#[derive(Debug)]
pub struct RenderTarget {
    size: ISize,
    color: ColorAttachment,
    depth: Option<DepthAttachment>,
}

impl RenderTarget {
    /// Target for framebuffer 0, cleared to black and stored.
    pub fn for_default_framebuffer(size: ISize, format: PixelFormat) -> Self {
        Self {
            size,
            color: ColorAttachment {
                format,
                load_action: LoadAction::Clear,
                store_action: StoreAction::Store,
                clear_color: Color::BLACK,
            },
            depth: None,
        }
    }

    #[inline]
    pub fn render_target_size(&self) -> ISize {
        self.size
    }

    #[inline]
    pub fn color_attachment(&self) -> &ColorAttachment {
        &self.color
    }

    pub fn set_color_attachment(&mut self, color: ColorAttachment) {
        self.color = color;
    }

    #[inline]
    pub fn depth_attachment(&self) -> Option<&DepthAttachment> {
        self.depth.as_ref()
    }

    /// Replaces the depth attachment; the previous texture (if any) is released.
    pub fn set_depth_attachment(&mut self, depth: DepthAttachment) {
        self.depth = Some(depth);
    }
}
