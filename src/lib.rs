//! # Grocer
//!
//! Reactive stores over asynchronous values, and the grocery-list state built
//! on them.
//!
//! ## Store substrate
//!
//! Minimal subscribe/notify primitives:
//! - `Writable<T>` - Thread-safe value cell with lazy start/stop hooks
//! - `derived` / `derived_with` - Stores computed from other stores
//! - `get` - Snapshot read of any `Readable<T>`
//!
//! ## Async stores
//!
//! - `Asyncable<T>` - Holds an `AsyncValue<T>` computed from input stores,
//!   with optimistic `set`/`update` that roll back when the setter fails
//! - `SyncStore<T>` - Follows the settled value(s) of async stores
//!
//! ```
//! use grocer::{setter, Asyncable, AsyncValue, StoreError};
//! use futures::executor::block_on;
//!
//! let store = Asyncable::new(
//!     || Ok(Some(AsyncValue::ready(1))),
//!     Some(setter(|new: i32, _old| async move {
//!         if new < 0 {
//!             Err(StoreError::setter("negative"))
//!         } else {
//!             Ok(())
//!         }
//!     })),
//! );
//! let _subscription = grocer::Readable::subscribe(&store, |_: &AsyncValue<i32>| {});
//!
//! block_on(store.set(2)).unwrap();
//! assert!(block_on(store.set(-5)).is_err());
//! assert_eq!(block_on(store.get()).unwrap(), 2);
//! ```
//!
//! ## Groceries
//!
//! The ingredient catalog, saved meals and the shopping list, persisted through
//! a small key-value `Storage`.

pub mod asyncable;
pub mod error;
pub mod groceries;
pub mod runtime;
pub mod store;

// Re-export main types for convenience
pub use asyncable::{
    asyncable, setter, syncable, syncable_all, syncable_all_on, syncable_on, AsyncValue,
    Asyncable, GetterResult, Settled, Setter, SyncStore,
};
pub use error::{Result, StoreError};
pub use store::{derived, derived_with, get, Derived, Readable, Subscription, Writable};
