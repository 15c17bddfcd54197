//! In-process backend adapters.
//!
//! Each adapter keeps its state behind a mutex and can be switched offline
//! so callers can observe `Unavailable` failures without a network.

mod identity_provider;
mod key_value_store;
mod profile_store;
mod record_store;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use identity_provider::InMemoryIdentityProvider;
pub use key_value_store::InMemoryKeyValueStore;
pub use profile_store::InMemoryProfileStore;
pub use record_store::InMemoryRecordStore;

/// Lock `mutex`, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
