use khronos_egl as egl;

/// Failures of the EGL surface/context layer.
///
/// Every variant is fatal for construction. During a frame only
/// `make_current` failures surface here; see `FrameError::Bind`.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("failed to load the EGL library: {0}")]
    Load(String),

    #[error("native window is missing `{0}`")]
    MissingHandle(&'static str),

    #[error("native window handle is not a Wayland handle")]
    UnsupportedHandle,

    #[error("{call} failed: {source}")]
    Egl {
        call: &'static str,
        #[source]
        source: egl::Error,
    },

    #[error("the EGL display exposes no configs")]
    NoConfigs,

    #[error("no EGL config with a buffer size of at least {0} bits")]
    NoQualifyingConfig(egl::Int),

    #[error("{0} returned no surface")]
    NoSurface(&'static str),
}

impl DeviceError {
    pub(crate) fn egl(call: &'static str) -> impl FnOnce(egl::Error) -> Self {
        move |source| Self::Egl { call, source }
    }
}
