use std::ffi::c_void;
use std::fmt;

use super::error::GpuError;

/// GLES entry points the backend calls. Resolution of each is checked before
/// the `glow` context is built, so a broken driver fails at construction
/// instead of on the first frame.
pub const REQUIRED_ENTRY_POINTS: &[&str] = &[
    "glGetString",
    "glGetIntegerv",
    "glGetError",
    "glViewport",
    "glClear",
    "glClearColor",
    "glClearDepthf",
    "glDepthMask",
    "glDepthFunc",
    "glEnable",
    "glDisable",
    "glFlush",
    "glBindFramebuffer",
    "glGenRenderbuffers",
    "glBindRenderbuffer",
    "glRenderbufferStorage",
    "glRenderbufferStorageMultisample",
    "glDeleteRenderbuffers",
    "glGenBuffers",
    "glBindBuffer",
    "glBufferData",
    "glDeleteBuffers",
    "glCreateShader",
    "glShaderSource",
    "glCompileShader",
    "glGetShaderiv",
    "glGetShaderInfoLog",
    "glDeleteShader",
    "glCreateProgram",
    "glAttachShader",
    "glDetachShader",
    "glLinkProgram",
    "glGetProgramiv",
    "glGetProgramInfoLog",
    "glUseProgram",
    "glDeleteProgram",
    "glGetAttribLocation",
    "glGetUniformLocation",
    "glEnableVertexAttribArray",
    "glDisableVertexAttribArray",
    "glVertexAttribPointer",
    "glUniform1f",
    "glUniform4f",
    "glUniformMatrix4fv",
    "glDrawArrays",
];

/// Names from [`REQUIRED_ENTRY_POINTS`] the resolver returns null for.
pub fn missing_entry_points(
    resolver: &mut impl FnMut(&str) -> *const c_void,
) -> Vec<&'static str> {
    REQUIRED_ENTRY_POINTS
        .iter()
        .copied()
        .filter(|name| resolver(name).is_null())
        .collect()
}

/// Resolved GLES function table.
pub struct ProcTable {
    gl: glow::Context,
}

impl ProcTable {
    /// Resolves the GLES entry points through `resolver` (usually
    /// `eglGetProcAddress`).
    ///
    /// # Safety
    /// A GLES context must be current on the calling thread, and `resolver`
    /// must return valid function pointers for that context.
    pub unsafe fn new(mut resolver: impl FnMut(&str) -> *const c_void) -> Result<Self, GpuError> {
        let missing = missing_entry_points(&mut resolver);
        if !missing.is_empty() {
            return Err(GpuError::IncompleteProcTable(missing));
        }

        let gl = unsafe { glow::Context::from_loader_function(resolver) };
        Ok(Self { gl })
    }

    pub(crate) fn into_context(self) -> glow::Context {
        self.gl
    }
}

impl fmt::Debug for ProcTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcTable").finish_non_exhaustive()
    }
}
