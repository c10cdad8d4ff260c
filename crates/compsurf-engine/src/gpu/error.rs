/// Errors raised by the rendering engine.
///
/// Construction-time variants (`UnsupportedContext`, `IncompleteProcTable`,
/// `DuplicateShader`) are fatal for the render context; everything else fails
/// a single frame or a single scene setup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GpuError {
    #[error("GLES 3.0 or newer is required, the context reports {0}")]
    UnsupportedContext(String),

    #[error("GLES proc table is missing {} entry point(s): {}", .0.len(), .0.join(", "))]
    IncompleteProcTable(Vec<&'static str>),

    #[error("shader `{0}` is provided by more than one shader library")]
    DuplicateShader(&'static str),

    #[error("shader `{0}` not found in any shader library")]
    ShaderNotFound(String),

    #[error("failed to compile `{label}`: {log}")]
    ShaderCompilation { label: String, log: String },

    #[error("failed to link pipeline `{label}`: {log}")]
    PipelineLink { label: String, log: String },

    #[error("failed to allocate {kind}: {reason}")]
    Allocation { kind: &'static str, reason: String },

    #[error("unknown {0} handle")]
    UnknownResource(&'static str),

    #[error("render target has zero area")]
    EmptyRenderTarget,

    #[error("GPU reactions are not allowed on the current thread")]
    ReactionsNotAllowed,

    #[error("the GPU context has been shut down")]
    ContextShutDown,

    #[error("{0}")]
    Scene(String),
}
