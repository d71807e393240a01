//! Cache Entry Module
//!
//! Defines the type-tagged value stored under each cache key.

use std::any::{type_name, Any};
use std::sync::Arc;

// == Cache Entry ==
/// A single cached value together with the name of its concrete type.
///
/// The value is held behind an `Arc` so a hit hands out a cheap shared
/// reference instead of cloning the domain object.
#[derive(Clone)]
pub struct CacheEntry {
    /// The stored value
    value: Arc<dyn Any + Send + Sync>,
    /// Name of the stored value's concrete type, reported on mismatch
    type_name: &'static str,
}

impl CacheEntry {
    // == Constructor ==
    /// Wraps a value that is already shared.
    pub fn from_arc<T>(value: Arc<T>) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            value,
            type_name: type_name::<T>(),
        }
    }

    // == Type Name ==
    /// Returns the name of the stored value's type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    // == Downcast ==
    /// Returns the stored value as a `T`, or `None` if it holds another type.
    pub fn downcast<T>(&self) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        Arc::clone(&self.value).downcast::<T>().ok()
    }
}

impl std::fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
