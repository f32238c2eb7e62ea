//! Runtime support for async stores.
//!
//! Stores never block on async work themselves. Where a store has to drive a
//! future to completion in the background (see [`syncable`](crate::syncable)),
//! it hands the future to a [`Spawner`].

mod spawner;

pub use spawner::{Spawner, TokioSpawner};
