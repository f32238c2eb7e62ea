use super::{Readable, Subscriber, Subscription, Writable, WritableHandle};
use parking_lot::Mutex;
use std::sync::Arc;

/// A read-only store computed from other stores.
///
/// Input subscriptions are held only while the derived store itself has
/// subscribers.
pub struct Derived<T> {
    store: Writable<T>,
}

impl<T: Clone + Send + Sync + 'static> Derived<T> {
    /// Last computed value, without starting the store.
    pub fn peek(&self) -> T {
        self.store.peek()
    }
}

impl<T: Clone + Send + Sync + 'static> Readable<T> for Derived<T> {
    fn subscribe_boxed(&self, callback: Subscriber<T>) -> Subscription {
        self.store.subscribe_boxed(callback)
    }
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

struct Combiner<I> {
    values: Vec<Option<I>>,
    started: bool,
}

impl<I: Clone> Combiner<I> {
    /// Current input values, once every input has delivered one.
    fn ready(&self) -> Option<Vec<I>> {
        if !self.started {
            return None;
        }
        self.values.iter().cloned().collect()
    }
}

/// Derive a store whose value is computed from `inputs`.
///
/// `f` receives the inputs' current values in order and runs again after
/// every input notification.
pub fn derived<I, T, F>(inputs: Vec<Arc<dyn Readable<I>>>, initial: T, f: F) -> Derived<T>
where
    I: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    F: Fn(&[I]) -> T + Send + Sync + 'static,
{
    derived_with(inputs, initial, move |values, set| set.set(f(values)))
}

/// Derive a store that pushes its value through a handle.
///
/// Unlike [`derived`], `f` decides when (and whether) to set a value, which
/// lets it hand the handle to a task that completes later. Subscribers see
/// `initial` until the first push.
pub fn derived_with<I, T, F>(inputs: Vec<Arc<dyn Readable<I>>>, initial: T, f: F) -> Derived<T>
where
    I: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    F: Fn(&[I], &WritableHandle<T>) + Send + Sync + 'static,
{
    let inputs: Arc<[Arc<dyn Readable<I>>]> = inputs.into();
    let f = Arc::new(f);

    let store = Writable::with_start(initial, move |set: WritableHandle<T>| {
        let combiner = Arc::new(Mutex::new(Combiner {
            values: vec![None; inputs.len()],
            started: false,
        }));

        let subscriptions: Vec<Subscription> = inputs
            .iter()
            .enumerate()
            .map(|(index, input)| {
                let combiner = Arc::clone(&combiner);
                let set = set.clone();
                let f = Arc::clone(&f);
                input.subscribe_boxed(Box::new(move |value: &I| {
                    let ready = {
                        let mut combiner = combiner.lock();
                        combiner.values[index] = Some(value.clone());
                        combiner.ready()
                    };
                    if let Some(values) = ready {
                        f(values.as_slice(), &set);
                    }
                }))
            })
            .collect();

        let ready = {
            let mut combiner = combiner.lock();
            combiner.started = true;
            combiner.ready()
        };
        if let Some(values) = ready {
            f(values.as_slice(), &set);
        }

        Subscription::new(move || {
            combiner.lock().started = false;
            drop(subscriptions);
        })
    });

    Derived { store }
}
