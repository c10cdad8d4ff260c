use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

use super::backend::Backend;
use super::resources::{BufferId, PipelineId, TextureId};

/// Decides, per calling thread, whether the reactor may touch GL right now.
///
/// Queried from whichever thread attempts a reaction, possibly concurrently.
pub trait ReactorWorker: Send + Sync {
    fn can_reactor_react_on_current_thread_now(&self, reactor: &Reactor) -> bool;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct WorkerId(u64);

/// A backend object whose finalization has been deferred.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Release {
    Texture(TextureId),
    Buffer(BufferId),
    Pipeline(PipelineId),
}

/// Defers GPU object finalization to threads where a worker allows it.
///
/// Dropping a resource handle may happen on any thread and at any time, but the
/// GL object can only be deleted with the context current on a reactor-safe
/// thread. Releases are queued here and performed by [`Reactor::react`].
pub struct Reactor {
    workers: RwLock<Vec<(WorkerId, Arc<dyn ReactorWorker>)>>,
    pending: Mutex<Vec<Release>>,
    next_worker: AtomicU64,
}

impl Reactor {
    pub(crate) fn new() -> Self {
        Self {
            workers: RwLock::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
            next_worker: AtomicU64::new(0),
        }
    }

    pub fn add_worker(&self, worker: Arc<dyn ReactorWorker>) -> WorkerId {
        let id = WorkerId(self.next_worker.fetch_add(1, Ordering::Relaxed));
        self.workers.write().push((id, worker));
        id
    }

    /// Returns false if no worker with that id is registered.
    pub fn remove_worker(&self, id: WorkerId) -> bool {
        let mut workers = self.workers.write();
        let before = workers.len();
        workers.retain(|(worker_id, _)| *worker_id != id);
        workers.len() != before
    }

    /// True if any registered worker allows reactions on the calling thread.
    pub fn can_react_on_current_thread(&self) -> bool {
        // Snapshot so a worker may call back into the reactor without deadlocking.
        let workers: Vec<_> = self
            .workers
            .read()
            .iter()
            .map(|(_, worker)| Arc::clone(worker))
            .collect();

        workers
            .iter()
            .any(|worker| worker.can_reactor_react_on_current_thread_now(self))
    }

    pub(crate) fn defer_release(&self, release: Release) {
        self.pending.lock().push(release);
    }

    /// Number of releases waiting for a reactor-safe thread.
    pub fn pending_releases(&self) -> usize {
        self.pending.lock().len()
    }

    /// Performs queued releases if the calling thread may react.
    ///
    /// The GPU context must be current. Returns false, leaving the queue
    /// untouched, when no worker allows reactions on this thread.
    pub(crate) fn react(&self, backend: &dyn Backend) -> bool {
        if !self.can_react_on_current_thread() {
            return false;
        }

        let drained = std::mem::take(&mut *self.pending.lock());
        if !drained.is_empty() {
            log::trace!("reactor releasing {} GPU object(s)", drained.len());
        }
        for release in drained {
            backend.release(release);
        }

        true
    }
}

impl fmt::Debug for Reactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reactor")
            .field("workers", &self.workers.read().len())
            .field("pending", &self.pending.lock().len())
            .finish()
    }
}
