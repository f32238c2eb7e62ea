//! Stores over asynchronous values.
//!
//! - [`Asyncable<T>`] holds an [`AsyncValue<T>`] produced by a getter from its
//!   input stores, and writes through an optional async setter with optimistic
//!   updates and rollback.
//! - [`SyncStore<T>`] turns one or more async stores back into plain values
//!   once they settle.

#[allow(clippy::module_inception)]
mod asyncable;
mod syncable;
mod value;

pub use asyncable::{asyncable, setter, Asyncable, GetterResult, Setter};
pub use syncable::{syncable, syncable_all, syncable_all_on, syncable_on, Settled, SyncStore};
pub use value::AsyncValue;
