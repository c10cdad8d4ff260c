/// One named shader source.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ShaderEntry {
    pub name: &'static str,
    pub source: &'static str,
}

/// A named set of GLSL ES sources embedded in the binary.
///
/// Libraries are handed to the GPU context at construction; scenes look
/// shaders up by entry name.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ShaderLibrary {
    name: &'static str,
    entries: &'static [ShaderEntry],
}

impl ShaderLibrary {
    pub const fn new(name: &'static str, entries: &'static [ShaderEntry]) -> Self {
        Self { name, entries }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn entries(&self) -> &'static [ShaderEntry] {
        self.entries
    }
}
