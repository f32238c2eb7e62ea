use super::{Readable, Subscriber, Subscription};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

type StartFn<T> = Box<dyn Fn(WritableHandle<T>) -> Subscription + Send + Sync>;

struct State<T> {
    value: T,
    subscribers: Vec<(u64, Arc<dyn Fn(&T) + Send + Sync>)>,
    next_id: u64,
    /// Guard returned by the start hook while the store is running.
    stop: Option<Subscription>,
    running: bool,
}

struct Inner<T> {
    state: Mutex<State<T>>,
    start: Option<StartFn<T>>,
}

impl<T: Clone + Send + Sync + 'static> Inner<T> {
    fn set(&self, new_value: T) {
        let notify = {
            let mut state = self.state.lock();
            state.value = new_value;
            if !state.running {
                return;
            }
            let subscribers: Vec<_> = state.subscribers.iter().map(|(_, s)| s.clone()).collect();
            (state.value.clone(), subscribers)
        };

        let (value, subscribers) = notify;
        for subscriber in subscribers {
            subscriber(&value);
        }
    }
}

/// A thread-safe writable store.
///
/// Every `set` replaces the value and notifies subscribers, but only while the
/// store is running (it has at least one subscriber). Values are not compared,
/// so setting an equal value still notifies.
pub struct Writable<T> {
    inner: Arc<Inner<T>>,
}

impl<T: Clone + Send + Sync + 'static> Writable<T> {
    /// Create a new store with the given initial value.
    pub fn new(initial: T) -> Self {
        Self::build(initial, None)
    }

    /// Create a store with a start hook.
    ///
    /// `start` runs when the first subscriber arrives; the guard it returns is
    /// dropped when the last subscriber leaves. Values pushed through the
    /// handle during `start` are delivered to the subscriber that triggered it.
    pub fn with_start<F>(initial: T, start: F) -> Self
    where
        F: Fn(WritableHandle<T>) -> Subscription + Send + Sync + 'static,
    {
        Self::build(initial, Some(Box::new(start)))
    }

    fn build(initial: T, start: Option<StartFn<T>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    value: initial,
                    subscribers: Vec::new(),
                    next_id: 0,
                    stop: None,
                    running: false,
                }),
                start,
            }),
        }
    }

    /// Get a clone of the current value without starting the store.
    pub fn peek(&self) -> T {
        self.inner.state.lock().value.clone()
    }

    /// Set a new value.
    pub fn set(&self, new_value: T) {
        self.inner.set(new_value);
    }

    /// Update the value using a function.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        let mut value = self.peek();
        f(&mut value);
        self.set(value);
    }

    /// Read the value without cloning it.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let state = self.inner.state.lock();
        f(&state.value)
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.state.lock().subscribers.len()
    }

    /// A weak handle for pushing values from start hooks and spawned tasks.
    pub fn handle(&self) -> WritableHandle<T> {
        WritableHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    fn start(&self) {
        let stop = match &self.inner.start {
            Some(start) => start(self.handle()),
            None => Subscription::noop(),
        };

        let orphaned = {
            let mut state = self.inner.state.lock();
            if state.subscribers.is_empty() {
                // Everyone left while the start hook was running.
                Some(stop)
            } else {
                state.stop = Some(stop);
                state.running = true;
                None
            }
        };
        drop(orphaned);
    }
}

impl<T: Clone + Send + Sync + 'static> Readable<T> for Writable<T> {
    fn subscribe_boxed(&self, callback: Subscriber<T>) -> Subscription {
        let callback: Arc<dyn Fn(&T) + Send + Sync> = Arc::from(callback);

        let (id, first) = {
            let mut state = self.inner.state.lock();
            let id = state.next_id;
            state.next_id += 1;
            state.subscribers.push((id, callback.clone()));
            (id, state.subscribers.len() == 1 && !state.running)
        };

        if first {
            self.start();
        }

        let value = self.peek();
        callback(&value);

        let weak = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let stop = {
                let mut state = inner.state.lock();
                state.subscribers.retain(|(sid, _)| *sid != id);
                if state.subscribers.is_empty() && state.running {
                    state.running = false;
                    state.stop.take()
                } else {
                    None
                }
            };
            // Tear down upstream outside the lock.
            drop(stop);
        })
    }
}

impl<T> Clone for Writable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Writable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Writable")
            .field("value", &state.value)
            .field("subscribers", &state.subscribers.len())
            .field("running", &state.running)
            .finish()
    }
}

/// Weak setter for a [`Writable`].
///
/// Pushing through a handle whose store has been dropped does nothing.
pub struct WritableHandle<T> {
    inner: Weak<Inner<T>>,
}

impl<T: Clone + Send + Sync + 'static> WritableHandle<T> {
    /// Set a new value on the underlying store, if it is still alive.
    pub fn set(&self, new_value: T) {
        if let Some(inner) = self.inner.upgrade() {
            inner.set(new_value);
        }
    }
}

impl<T> Clone for WritableHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}
