use khronos_egl as egl;

/// `EGL_OPENGL_ES3_BIT`, defined by EGL 1.5 / `EGL_KHR_create_context`.
const OPENGL_ES3_BIT: egl::Int = 0x0040;

/// The shaders and the backend need GLES 3.
const GLES_CLIENT_VERSION: egl::Int = 3;

/// Buffer characteristics requested from the EGL display.
///
/// The defaults ask for an RGBA8 window surface with a 24-bit depth buffer,
/// an 8-bit stencil buffer and 4x multisampling, usable by a GLES 3 context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceConfig {
    pub red_bits: egl::Int,
    pub green_bits: egl::Int,
    pub blue_bits: egl::Int,
    pub alpha_bits: egl::Int,
    pub depth_bits: egl::Int,
    pub stencil_bits: egl::Int,

    /// Multisample count. `0` disables multisampling.
    pub samples: egl::Int,

    /// Minimum `EGL_BUFFER_SIZE` a matching config must report.
    pub min_buffer_size: egl::Int,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            alpha_bits: 8,
            depth_bits: 24,
            stencil_bits: 8,
            samples: 4,
            min_buffer_size: 24,
        }
    }
}

impl SurfaceConfig {
    /// Attribute list for `eglChooseConfig`, `EGL_NONE` terminated.
    #[rustfmt::skip]
    pub fn config_attribs(&self) -> Vec<egl::Int> {
        vec![
            egl::SURFACE_TYPE, egl::WINDOW_BIT,
            egl::RENDERABLE_TYPE, OPENGL_ES3_BIT,
            egl::RED_SIZE, self.red_bits,
            egl::GREEN_SIZE, self.green_bits,
            egl::BLUE_SIZE, self.blue_bits,
            egl::ALPHA_SIZE, self.alpha_bits,
            egl::DEPTH_SIZE, self.depth_bits,
            egl::STENCIL_SIZE, self.stencil_bits,
            egl::SAMPLES, self.samples,
            egl::NONE,
        ]
    }

    /// Attribute list for `eglCreateContext`, `EGL_NONE` terminated.
    pub fn context_attribs(&self) -> [egl::Int; 3] {
        [egl::CONTEXT_CLIENT_VERSION, GLES_CLIENT_VERSION, egl::NONE]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_of(attribs: &[egl::Int], key: egl::Int) -> Option<egl::Int> {
        attribs
            .chunks(2)
            .find(|pair| pair[0] == key)
            .and_then(|pair| pair.get(1).copied())
    }

    #[test]
    fn default_attribs_request_depth_stencil_and_msaa() {
        let attribs = SurfaceConfig::default().config_attribs();
        assert_eq!(attribs.last(), Some(&egl::NONE));
        assert_eq!(value_of(&attribs, egl::DEPTH_SIZE), Some(24));
        assert_eq!(value_of(&attribs, egl::STENCIL_SIZE), Some(8));
        assert_eq!(value_of(&attribs, egl::SAMPLES), Some(4));
        assert_eq!(value_of(&attribs, egl::ALPHA_SIZE), Some(8));
        assert_eq!(value_of(&attribs, egl::RENDERABLE_TYPE), Some(OPENGL_ES3_BIT));
    }

    #[test]
    fn context_always_requests_gles3() {
        let config = SurfaceConfig {
            samples: 0,
            ..SurfaceConfig::default()
        };
        let attribs = config.config_attribs();
        assert_eq!(value_of(&attribs, egl::RENDERABLE_TYPE), Some(OPENGL_ES3_BIT));
        assert_eq!(config.context_attribs(), [egl::CONTEXT_CLIENT_VERSION, 3, egl::NONE]);
    }
}
