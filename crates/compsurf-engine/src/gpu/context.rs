use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::backend::Backend;
use super::command::CommandBuffer;
use super::error::GpuError;
use super::reactor::{Reactor, ReactorWorker, WorkerId};
use super::resources::{DeviceBuffer, Pipeline, PipelineDescriptor, Texture, TextureDescriptor};
use super::shader::ShaderLibrary;

/// Handle through which GPU resources are allocated and commands submitted.
///
/// Created once per render context and reused every frame. All calls expect
/// the owning GL context to be current on the calling thread.
pub struct GpuContext {
    backend: Box<dyn Backend>,
    reactor: Arc<Reactor>,
    shaders: HashMap<&'static str, &'static str>,
    shut_down: Cell<bool>,
}

impl GpuContext {
    /// Libraries sharing a name are registered once; two distinct libraries
    /// providing the same shader name are an error.
    pub fn new(backend: Box<dyn Backend>, libraries: &[ShaderLibrary]) -> Result<Self, GpuError> {
        let mut seen_libraries: Vec<&'static str> = Vec::new();
        let mut shaders = HashMap::new();

        for library in libraries {
            if seen_libraries.contains(&library.name()) {
                continue;
            }
            seen_libraries.push(library.name());

            for entry in library.entries() {
                if shaders.insert(entry.name, entry.source).is_some() {
                    return Err(GpuError::DuplicateShader(entry.name));
                }
            }
        }

        log::debug!(
            "GPU context on {}: {} shader librar(ies), {} shader(s)",
            backend.name(),
            seen_libraries.len(),
            shaders.len()
        );

        Ok(Self {
            backend,
            reactor: Arc::new(Reactor::new()),
            shaders,
            shut_down: Cell::new(false),
        })
    }

    #[inline]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn shader_source(&self, name: &str) -> Result<&'static str, GpuError> {
        self.shaders
            .get(name)
            .copied()
            .ok_or_else(|| GpuError::ShaderNotFound(name.to_owned()))
    }

    #[inline]
    pub fn reactor(&self) -> &Arc<Reactor> {
        &self.reactor
    }

    /// Returns `None` once the context has been shut down.
    pub fn add_reactor_worker(&self, worker: Arc<dyn ReactorWorker>) -> Option<WorkerId> {
        if self.shut_down.get() {
            return None;
        }
        Some(self.reactor.add_worker(worker))
    }

    pub fn remove_reactor_worker(&self, id: WorkerId) -> bool {
        self.reactor.remove_worker(id)
    }

    pub fn create_command_buffer(&self) -> Result<CommandBuffer, GpuError> {
        self.ensure_live()?;
        Ok(CommandBuffer::new())
    }

    pub fn create_texture(&self, desc: &TextureDescriptor) -> Result<Texture, GpuError> {
        self.ensure_live()?;
        let id = self.backend.create_texture(desc)?;
        Ok(Texture::new(id, *desc, Arc::clone(&self.reactor)))
    }

    pub fn create_buffer(&self, label: &str, contents: &[u8]) -> Result<DeviceBuffer, GpuError> {
        self.ensure_live()?;
        let id = self.backend.create_buffer(label, contents)?;
        Ok(DeviceBuffer::new(id, contents.len(), Arc::clone(&self.reactor)))
    }

    pub fn create_pipeline(&self, desc: &PipelineDescriptor) -> Result<Pipeline, GpuError> {
        self.ensure_live()?;
        let id = self.backend.create_pipeline(desc)?;
        Ok(Pipeline::new(id, desc.label.clone(), Arc::clone(&self.reactor)))
    }

    /// Submits the buffer's passes.
    ///
    /// Pending releases are performed first; if the calling thread may not
    /// react, nothing is executed.
    pub fn submit(&self, buffer: CommandBuffer) -> Result<(), GpuError> {
        self.ensure_live()?;
        if !self.reactor.react(self.backend.as_ref()) {
            return Err(GpuError::ReactionsNotAllowed);
        }

        let (label, passes) = buffer.into_parts();
        self.backend.execute(&label, &passes)
    }

    /// Performs pending releases on the calling thread if allowed.
    pub fn react(&self) -> bool {
        self.reactor.react(self.backend.as_ref())
    }

    /// Flushes pending releases and refuses further allocations or submissions.
    pub fn shutdown(&self) {
        if self.shut_down.replace(true) {
            return;
        }

        if !self.react() && self.reactor.pending_releases() > 0 {
            log::warn!(
                "GPU context shut down off a reactor thread; {} release(s) leaked",
                self.reactor.pending_releases()
            );
        }
    }

    #[inline]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.get()
    }

    fn ensure_live(&self) -> Result<(), GpuError> {
        if self.shut_down.get() {
            Err(GpuError::ContextShutDown)
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for GpuContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuContext")
            .field("backend", &self.backend.name())
            .field("reactor", &self.reactor)
            .field("shaders", &self.shaders.len())
            .field("shut_down", &self.shut_down.get())
            .finish()
    }
}
