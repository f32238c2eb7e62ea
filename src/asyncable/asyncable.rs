use super::AsyncValue;
use crate::error::{Result, StoreError};
use crate::store::{self, derived, Readable, Subscriber, Subscription, Writable, WritableHandle};
use futures::channel::oneshot;
use futures::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

/// Outcome of one getter run: a value to publish, `None` to publish nothing
/// this cycle, or an error that leaves the current value in place.
pub type GetterResult<T> = Result<Option<AsyncValue<T>>>;

/// Confirms a write of `new` over `old`. An error rolls the write back.
///
/// `old` is `None` when the value being replaced had failed.
pub type Setter<T> = Arc<dyn Fn(T, Option<T>) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Box an async closure as a [`Setter`].
///
/// ```
/// use grocer::{setter, Setter};
///
/// let save: Setter<Vec<String>> = setter(|new: Vec<String>, _old| async move {
///     println!("saving {} items", new.len());
///     Ok(())
/// });
/// ```
pub fn setter<T, F, Fut>(f: F) -> Setter<T>
where
    F: Fn(T, Option<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move |new, old| f(new, old).boxed())
}

/// A store holding an [`AsyncValue`], computed by a getter and written through
/// an optional async setter.
///
/// Writes are optimistic: the new value is published before the setter runs
/// and the previous value is restored if the setter fails. Concurrent writes
/// are not serialized; whichever publishes last wins.
pub struct Asyncable<T> {
    store: Writable<AsyncValue<T>>,
    setter: Option<Setter<T>>,
}

/// Create an [`Asyncable`] whose getter reads `inputs`.
///
/// The getter runs with the inputs' current values every time one of them
/// changes, but only while the store has subscribers. Until the first value is
/// produced the store holds a pending placeholder that resolves to it.
///
/// Without a setter, `set` and `update` do nothing.
pub fn asyncable<I, T, G>(
    getter: G,
    setter: Option<Setter<T>>,
    inputs: Vec<Arc<dyn Readable<I>>>,
) -> Asyncable<T>
where
    I: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    G: Fn(&[I]) -> GetterResult<T> + Send + Sync + 'static,
{
    let (resolve, placeholder) = oneshot::channel::<AsyncValue<T>>();
    let initial = AsyncValue::from_future(async move {
        match placeholder.await {
            Ok(first) => first.await,
            Err(oneshot::Canceled) => Err(StoreError::Abandoned),
        }
    });
    let resolve = Arc::new(Mutex::new(Some(resolve)));

    let combined = derived(inputs, Vec::new(), |values: &[I]| values.to_vec());
    let getter = Arc::new(getter);

    let store = Writable::with_start(initial, move |set: WritableHandle<AsyncValue<T>>| {
        let getter = Arc::clone(&getter);
        let resolve = Arc::clone(&resolve);
        combined.subscribe(move |values: &Vec<I>| {
            let value = match getter(values.as_slice()) {
                Ok(Some(value)) => value,
                Ok(None) => {
                    trace!(inputs = values.len(), "getter produced no value; skipping");
                    return;
                }
                Err(err) => {
                    error!(error = %err, "getter failed; keeping current value");
                    return;
                }
            };
            set.set(value.clone());
            if let Some(first) = resolve.lock().take() {
                // The receiver only goes away with the placeholder itself.
                let _ = first.send(value);
            }
        })
    });

    Asyncable { store, setter }
}

impl<T: Clone + Send + Sync + 'static> Asyncable<T> {
    /// Create an [`Asyncable`] with no inputs; the getter runs once per
    /// activation.
    pub fn new<G>(getter: G, setter: Option<Setter<T>>) -> Self
    where
        G: Fn() -> GetterResult<T> + Send + Sync + 'static,
    {
        asyncable(move |_: &[()]| getter(), setter, Vec::new())
    }

    /// The current value.
    ///
    /// Reading starts the store if it has no subscribers, which runs the
    /// getter.
    pub fn get(&self) -> AsyncValue<T> {
        store::get(&self.store)
    }

    /// Whether writes reach a setter. Without one they are ignored.
    pub fn has_setter(&self) -> bool {
        self.setter.is_some()
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Asyncable<T> {
    /// Write `value`.
    ///
    /// Resolves once the setter has confirmed or rejected the write. On
    /// rejection the previous value is restored and the setter's error is
    /// returned.
    pub async fn set(&self, value: T) -> Result<()> {
        self.set_with(futures::future::ready(Ok(value))).await
    }

    /// Write the outcome of a pending value.
    ///
    /// A failed current value is still replaced: `new` is committed with no old
    /// value, and the read error is returned once the setter has accepted it.
    /// A failing candidate commits nothing.
    pub async fn set_with<F>(&self, value: F) -> Result<()>
    where
        F: Future<Output = Result<T>>,
    {
        let Some(setter) = &self.setter else {
            trace!("no setter configured; ignoring set");
            return Ok(());
        };
        let previous = self.get();
        let old = previous.resolve().await;
        let new = value.await?;
        match old {
            Ok(old) => self.commit(setter, new, Some(old), previous).await,
            Err(read_err) => {
                debug!(error = %read_err, "current value failed; writing over it");
                self.commit(setter, new, None, previous).await?;
                Err(read_err)
            }
        }
    }

    /// Write the result of applying `reducer` to the current value.
    ///
    /// The reducer works on a copy, so the value restored on rollback is the
    /// one read before the reducer ran.
    pub async fn update<F>(&self, reducer: F) -> Result<()>
    where
        F: FnOnce(T) -> T,
    {
        self.update_async(move |value| futures::future::ready(Ok(reducer(value))))
            .await
    }

    /// Like [`update`](Self::update) with an async, fallible reducer.
    ///
    /// A failing reducer leaves nothing to commit: the store is not touched
    /// and the reducer's error is returned. So does a failed current value,
    /// since the reducer has nothing to work on.
    pub async fn update_async<F, Fut>(&self, reducer: F) -> Result<()>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let Some(setter) = &self.setter else {
            trace!("no setter configured; ignoring update");
            return Ok(());
        };
        let previous = self.get();
        let old = previous.resolve().await?;
        let new = match reducer(old.clone()).await {
            Ok(new) => new,
            Err(err) => {
                debug!(error = %err, "reducer failed; nothing to commit");
                return Err(err);
            }
        };
        self.commit(setter, new, Some(old), previous).await
    }

    /// `previous` is the value `old` was read from; rollback restores it.
    async fn commit(
        &self,
        setter: &Setter<T>,
        new: T,
        old: Option<T>,
        previous: AsyncValue<T>,
    ) -> Result<()> {
        if old.as_ref() == Some(&new) {
            trace!("write matches current value; skipping setter");
            return Ok(());
        }

        self.store.set(AsyncValue::ready(new.clone()));
        trace!("published optimistic value");

        match setter(new, old).await {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(error = %err, "setter rejected write; rolling back");
                self.store.set(previous);
                Err(err)
            }
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Readable<AsyncValue<T>> for Asyncable<T> {
    fn subscribe_boxed(&self, callback: Subscriber<AsyncValue<T>>) -> Subscription {
        self.store.subscribe_boxed(callback)
    }
}

impl<T: Clone> Clone for Asyncable<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            setter: self.setter.clone(),
        }
    }
}
