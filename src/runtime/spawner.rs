use crate::error::{Result, StoreError};
use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tracing::trace;

/// Runs background futures for stores.
pub trait Spawner: Send + Sync {
    /// Start `task`; it must run to completion without being awaited.
    fn spawn(&self, task: BoxFuture<'static, ()>);
}

/// Spawns onto a Tokio runtime.
#[derive(Clone, Debug)]
pub struct TokioSpawner {
    handle: Handle,
}

impl TokioSpawner {
    /// Spawn onto the runtime behind `handle`.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Bind to the runtime the caller is running on.
    ///
    /// # Examples
    ///
    /// ```
    /// use grocer::runtime::TokioSpawner;
    ///
    /// assert!(TokioSpawner::current().is_err());
    ///
    /// let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    /// rt.block_on(async {
    ///     assert!(TokioSpawner::current().is_ok());
    /// });
    /// ```
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| StoreError::NoRuntime(e.to_string()))
    }
}

impl Spawner for TokioSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        trace!("spawning store task");
        // Detached: the store only cares about the task's side effects.
        drop(self.handle.spawn(task));
    }
}
