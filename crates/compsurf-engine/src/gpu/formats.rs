use bitflags::bitflags;

/// Integer extent in physical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct ISize {
    pub width: u32,
    pub height: u32,
}

impl ISize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True if either dimension is zero.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height, or `1.0` for an empty extent.
    #[inline]
    pub fn aspect_ratio(self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    R8G8B8A8UNormInt,
    B8G8R8A8UNormInt,
    D24UNormS8UInt,
    S8UInt,
}

impl PixelFormat {
    #[inline]
    pub const fn is_depth_stencil(self) -> bool {
        matches!(self, Self::D24UNormS8UInt | Self::S8UInt)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum TextureType {
    #[default]
    Texture2D,
}

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u8 {
        const SHADER_READ = 1 << 0;
        const RENDER_TARGET = 1 << 1;
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum SampleCount {
    #[default]
    Count1,
    Count4,
}

impl SampleCount {
    #[inline]
    pub const fn samples(self) -> u32 {
        match self {
            Self::Count1 => 1,
            Self::Count4 => 4,
        }
    }
}

/// Where a texture's memory lives.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum StorageMode {
    #[default]
    DevicePrivate,
}

/// What happens to an attachment's contents when a pass begins.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum LoadAction {
    #[default]
    DontCare,
    Load,
    Clear,
}

/// What happens to an attachment's contents when a pass ends.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum StoreAction {
    #[default]
    DontCare,
    Store,
}

/// Straight-alpha RGBA color with components in `[0, 1]`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from hue (degrees, wrapped), saturation and value in `[0, 1]`.
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = saturation.clamp(0.0, 1.0);
        let v = value.clamp(0.0, 1.0);

        let c = v * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = v - c;

        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        Self::new(r + m, g + m, b + m, 1.0)
    }
}
