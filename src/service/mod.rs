//! Entity services
//!
//! Each service reads through the shared [`ObjectCache`] and invalidates it
//! after every write.
//!
//! # Caller protocol
//! - Read: try the cache; on a miss load from the store and, only if the
//!   store has the entity, put it. Absence is never cached.
//! - Write: persist first, then evict the affected keys. Writes never put
//!   the new value, so a value that might still be rolled back is never
//!   cached.
//!
//! A crash between the store write and the evict leaves the old value
//! cached until the next write to that key.

mod note;
mod tag;
mod user;

pub use note::NoteService;
pub use tag::TagService;
pub use user::UserService;

use std::any::Any;
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::error::Result;
use crate::repository::StoreResult;

// == Read Through ==
/// Returns the cached value for `key`, loading and caching it on a miss.
///
/// `Ok(None)` means the store does not have it either.
pub(crate) fn read_through<T, F>(
    cache: &ObjectCache,
    key: &str,
    load: F,
) -> Result<Option<Arc<T>>>
where
    T: Any + Send + Sync,
    F: FnOnce() -> StoreResult<Option<T>>,
{
    if let Some(hit) = cache.get::<T>(key)? {
        return Ok(Some(hit));
    }

    match load()? {
        Some(value) => {
            let value = Arc::new(value);
            cache.put_arc(key, Arc::clone(&value));
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

// == Evict All ==
/// Evicts every key in `keys`.
pub(crate) fn evict_all<I>(cache: &ObjectCache, keys: I)
where
    I: IntoIterator<Item = String>,
{
    for key in keys {
        cache.evict(&key);
    }
}
