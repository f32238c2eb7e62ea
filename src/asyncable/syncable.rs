use super::AsyncValue;
use crate::error::{Result, StoreError};
use crate::runtime::{Spawner, TokioSpawner};
use crate::store::{derived_with, Derived, Readable, Subscriber, Subscription, WritableHandle};
use futures::future::{join_all, FutureExt};
use std::sync::Arc;
use tracing::warn;

/// Outcome of one input of [`syncable_all`].
pub type Settled<T> = std::result::Result<T, StoreError>;

/// A read-only store holding the settled values of async inputs.
pub struct SyncStore<T> {
    store: Derived<T>,
}

impl<T: Clone + Send + Sync + 'static> SyncStore<T> {
    /// Last settled value, without starting the store.
    pub fn peek(&self) -> T {
        self.store.peek()
    }
}

impl<T: Clone + Send + Sync + 'static> Readable<T> for SyncStore<T> {
    fn subscribe_boxed(&self, callback: Subscriber<T>) -> Subscription {
        self.store.subscribe_boxed(callback)
    }
}

impl<T> Clone for SyncStore<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

/// Follow the resolved value of a single async store, on the current Tokio
/// runtime.
///
/// Subscribers see `initial` until the input's value resolves. A failed
/// value is logged and leaves the store unchanged.
pub fn syncable<T>(
    input: Arc<dyn Readable<AsyncValue<T>>>,
    initial: Option<T>,
) -> Result<SyncStore<Option<T>>>
where
    T: Clone + Send + Sync + 'static,
{
    Ok(syncable_on(Arc::new(TokioSpawner::current()?), input, initial))
}

/// [`syncable`] with an explicit spawner.
pub fn syncable_on<T>(
    spawner: Arc<dyn Spawner>,
    input: Arc<dyn Readable<AsyncValue<T>>>,
    initial: Option<T>,
) -> SyncStore<Option<T>>
where
    T: Clone + Send + Sync + 'static,
{
    let store = derived_with(
        vec![input],
        initial,
        move |values: &[AsyncValue<T>], set: &WritableHandle<Option<T>>| {
            let Some(value) = values.first().cloned() else {
                return;
            };
            let set = set.clone();
            spawner.spawn(
                async move {
                    match value.await {
                        Ok(value) => set.set(Some(value)),
                        Err(err) => warn!(error = %err, "input failed to resolve; keeping previous value"),
                    }
                }
                .boxed(),
            );
        },
    );
    SyncStore { store }
}

/// Follow the settled values of several async stores, on the current Tokio
/// runtime.
///
/// Every change awaits all inputs together and publishes one outcome per
/// input, in order. A failing input does not hide the others.
pub fn syncable_all<T>(
    inputs: Vec<Arc<dyn Readable<AsyncValue<T>>>>,
    initial: Option<Vec<Settled<T>>>,
) -> Result<SyncStore<Option<Vec<Settled<T>>>>>
where
    T: Clone + Send + Sync + 'static,
{
    Ok(syncable_all_on(
        Arc::new(TokioSpawner::current()?),
        inputs,
        initial,
    ))
}

/// [`syncable_all`] with an explicit spawner.
pub fn syncable_all_on<T>(
    spawner: Arc<dyn Spawner>,
    inputs: Vec<Arc<dyn Readable<AsyncValue<T>>>>,
    initial: Option<Vec<Settled<T>>>,
) -> SyncStore<Option<Vec<Settled<T>>>>
where
    T: Clone + Send + Sync + 'static,
{
    let store = derived_with(
        inputs,
        initial,
        move |values: &[AsyncValue<T>], set: &WritableHandle<Option<Vec<Settled<T>>>>| {
            let pending = values.to_vec();
            let set = set.clone();
            spawner.spawn(
                async move {
                    set.set(Some(join_all(pending).await));
                }
                .boxed(),
            );
        },
    );
    SyncStore { store }
}
