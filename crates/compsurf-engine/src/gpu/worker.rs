use std::collections::HashMap;
use std::thread::{self, ThreadId};

use parking_lot::RwLock;

use super::reactor::{Reactor, ReactorWorker};

/// Reactor worker gated by a per-thread eligibility map.
///
/// Checks take the read lock and may run concurrently; changing a thread's
/// eligibility takes the write lock. Threads never marked are not allowed.
#[derive(Debug, Default)]
pub struct ThreadReactorWorker {
    reactions_allowed: RwLock<HashMap<ThreadId, bool>>,
}

impl ThreadReactorWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reactions_allowed_on_current_thread(&self, allowed: bool) {
        self.reactions_allowed
            .write()
            .insert(thread::current().id(), allowed);
    }

    pub fn reactions_allowed_on_current_thread(&self) -> bool {
        self.reactions_allowed
            .read()
            .get(&thread::current().id())
            .copied()
            .unwrap_or(false)
    }

    /// Allows the current thread unless it has been marked already.
    ///
    /// An explicit `false` from [`set_reactions_allowed_on_current_thread`]
    /// stays in effect.
    ///
    /// [`set_reactions_allowed_on_current_thread`]: Self::set_reactions_allowed_on_current_thread
    pub fn allow_current_thread_if_unmarked(&self) {
        let id = thread::current().id();
        if self.reactions_allowed.read().contains_key(&id) {
            return;
        }
        self.reactions_allowed.write().entry(id).or_insert(true);
    }
}

impl ReactorWorker for ThreadReactorWorker {
    fn can_reactor_react_on_current_thread_now(&self, _reactor: &Reactor) -> bool {
        self.reactions_allowed_on_current_thread()
    }
}
