//! Reactive store substrate.
//!
//! Stores hold a value and push it to subscribers. A subscriber receives the
//! current value as soon as it subscribes and again after every change, until
//! its [`Subscription`] is dropped. Writable cells may carry a `start` hook
//! that runs when the first subscriber arrives and is torn down when the last
//! one leaves, which is how [`derived`] stores attach to their inputs lazily.

mod derived;
mod writable;

pub use derived::{derived, derived_with, Derived};
pub use writable::{Writable, WritableHandle};

use parking_lot::Mutex;
use std::sync::Arc;

/// Callback invoked with the store's value.
pub type Subscriber<T> = Box<dyn Fn(&T) + Send + Sync>;

/// A store that can be subscribed to.
pub trait Readable<T>: Send + Sync {
    /// Subscribe with a boxed callback.
    ///
    /// Implementations must call `callback` with the current value before
    /// returning.
    fn subscribe_boxed(&self, callback: Subscriber<T>) -> Subscription;

    /// Subscribe to value changes.
    fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
        Self: Sized,
    {
        self.subscribe_boxed(Box::new(callback))
    }

    /// Erase the concrete store type, for use as a [`derived`] input.
    fn into_readable(self) -> Arc<dyn Readable<T>>
    where
        Self: Sized + 'static,
    {
        Arc::new(self)
    }
}

impl<T, S> Readable<T> for Arc<S>
where
    S: Readable<T> + ?Sized,
{
    fn subscribe_boxed(&self, callback: Subscriber<T>) -> Subscription {
        (**self).subscribe_boxed(callback)
    }
}

/// RAII guard for a store subscription.
///
/// Dropping the guard unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    stop: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Create a guard that runs `stop` when dropped.
    pub fn new<F>(stop: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            stop: Some(Box::new(stop)),
        }
    }

    /// A guard with nothing to tear down.
    pub fn noop() -> Self {
        Self { stop: None }
    }

    /// Unsubscribe now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            stop();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.stop.is_some())
            .finish()
    }
}

/// Read a store's current value without keeping a subscription.
///
/// This subscribes and immediately unsubscribes, so a store with no other
/// subscribers is started and stopped around the read.
///
/// # Panics
///
/// Panics if `store` does not call a new subscriber with its current value
/// before `subscribe_boxed` returns. Every store in this crate does.
pub fn get<T, S>(store: &S) -> T
where
    T: Clone + Send + 'static,
    S: Readable<T> + ?Sized,
{
    let slot = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&slot);
    let subscription = store.subscribe_boxed(Box::new(move |value: &T| {
        *sink.lock() = Some(value.clone());
    }));
    drop(subscription);

    let value = slot.lock().take();
    value.unwrap_or_else(|| unreachable!("Readable::subscribe_boxed must deliver the current value"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn subscription_runs_stop_once() {
        let stops = Arc::new(AtomicUsize::new(0));
        let counter = stops.clone();

        let subscription = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(stops.load(Ordering::SeqCst), 0);

        subscription.unsubscribe();
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn get_reads_through_dyn_readable() {
        let store: Arc<dyn Readable<i32>> = Writable::new(7).into_readable();
        assert_eq!(get(&store), 7);
        assert_eq!(get(&*store), 7);
    }

    struct Silent;

    impl Readable<u8> for Silent {
        fn subscribe_boxed(&self, _callback: Subscriber<u8>) -> Subscription {
            Subscription::noop()
        }
    }

    #[test]
    #[should_panic(expected = "must deliver the current value")]
    fn get_panics_on_silent_store() {
        get(&Silent);
    }
}
