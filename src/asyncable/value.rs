use crate::error::{Result, StoreError};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

type SharedResult<T> = Shared<BoxFuture<'static, Result<T>>>;

enum Repr<T> {
    Resolved(Result<T>),
    Pending(SharedResult<T>),
}

/// A value that may still be computing.
///
/// Clones of a pending value share one computation: the first clone to be
/// awaited drives it and every clone observes the same outcome. Like any Rust
/// future, a pending computation makes no progress until someone awaits it.
///
/// ```
/// use grocer::AsyncValue;
///
/// let value = AsyncValue::ready(3);
/// assert!(value.is_resolved());
/// assert_eq!(futures::executor::block_on(value).unwrap(), 3);
/// ```
pub struct AsyncValue<T> {
    repr: Repr<T>,
}

impl<T: Clone + Send + Sync + 'static> AsyncValue<T> {
    /// An already resolved value.
    pub fn ready(value: T) -> Self {
        Self {
            repr: Repr::Resolved(Ok(value)),
        }
    }

    /// An already failed value.
    pub fn failed(error: StoreError) -> Self {
        Self {
            repr: Repr::Resolved(Err(error)),
        }
    }

    /// Wrap a pending computation.
    pub fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            repr: Repr::Pending(future.boxed().shared()),
        }
    }

    /// The outcome, if it is already known.
    pub fn peek(&self) -> Option<&Result<T>> {
        match &self.repr {
            Repr::Resolved(outcome) => Some(outcome),
            Repr::Pending(shared) => shared.peek(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.peek().is_some()
    }

    /// Await the outcome without consuming this handle.
    pub async fn resolve(&self) -> Result<T> {
        self.clone().await
    }
}

impl<T: Clone + Send + Sync + 'static> From<T> for AsyncValue<T> {
    fn from(value: T) -> Self {
        AsyncValue::ready(value)
    }
}

// No field is ever pinned structurally; the pending arm is a `Shared`, which
// is `Unpin` itself.
impl<T> Unpin for AsyncValue<T> {}

impl<T: Clone> Future for AsyncValue<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().repr {
            Repr::Resolved(outcome) => Poll::Ready(outcome.clone()),
            Repr::Pending(shared) => Pin::new(shared).poll(cx),
        }
    }
}

impl<T: Clone> Clone for AsyncValue<T> {
    fn clone(&self) -> Self {
        let repr = match &self.repr {
            Repr::Resolved(outcome) => Repr::Resolved(outcome.clone()),
            Repr::Pending(shared) => Repr::Pending(shared.clone()),
        };
        Self { repr }
    }
}

impl<T: fmt::Debug + Clone> fmt::Debug for AsyncValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match &self.repr {
            Repr::Resolved(outcome) => Some(outcome),
            Repr::Pending(shared) => shared.peek(),
        };
        match outcome {
            Some(outcome) => f.debug_tuple("AsyncValue").field(outcome).finish(),
            None => f.write_str("AsyncValue(<pending>)"),
        }
    }
}
