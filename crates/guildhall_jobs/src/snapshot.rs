//! Atomically replaced configuration snapshots.
//!
//! Readers take one `Arc` clone per operation and compute against it; a
//! reload swaps the whole `Arc`. A reader therefore sees either the old table
//! or the new one, never a mix, and an in-flight computation keeps its
//! snapshot alive until it finishes.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// A reloadable, immutable value.
pub struct Snapshot<T> {
    current: RwLock<Arc<T>>,
}

impl<T> Snapshot<T> {
    /// Wraps an initial value.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(value)),
        }
    }

    /// Returns the current value. The read lock is held only for the clone.
    #[inline]
    #[must_use]
    pub fn load(&self) -> Arc<T> {
        Arc::clone(&self.current.read())
    }

    /// Replaces the value, returning the previous one.
    pub fn replace(&self, value: T) -> Arc<T> {
        std::mem::replace(&mut *self.current.write(), Arc::new(value))
    }
}

impl<T: Default> Default for Snapshot<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Snapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Snapshot").field(&*self.load()).finish()
    }
}
