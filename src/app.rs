//! Application context
//!
//! Wires the shared cache and a backing store into the entity services.

use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::config::Config;
use crate::repository::{MemoryStore, NoteRepository, TagRepository, UserRepository};
use crate::service::{NoteService, TagService, UserService};

/// Everything a request handler needs, built once at startup.
///
/// Cloning is cheap: every field is reference counted, and all clones share
/// one cache.
#[derive(Clone)]
pub struct AppState {
    /// Object cache shared by every service
    pub cache: Arc<ObjectCache>,
    pub notes: NoteService,
    pub tags: TagService,
    pub users: UserService,
}

impl AppState {
    /// Creates the services over `store`, all sharing `cache`.
    pub fn new<S>(store: Arc<S>, cache: Arc<ObjectCache>) -> Self
    where
        S: NoteRepository + TagRepository + UserRepository + 'static,
    {
        let notes: Arc<dyn NoteRepository> = store.clone();
        let tags: Arc<dyn TagRepository> = store.clone();
        let users: Arc<dyn UserRepository> = store;

        Self {
            notes: NoteService::new(notes.clone(), tags.clone(), users.clone(), cache.clone()),
            tags: TagService::new(tags.clone(), notes.clone(), users.clone(), cache.clone()),
            users: UserService::new(users, notes, tags, cache.clone()),
            cache,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Uses the in-memory store and a cache sized by `cache_capacity`.
    pub fn from_config(config: &Config) -> Self {
        let cache = Arc::new(ObjectCache::new(config.cache_capacity));
        Self::new(Arc::new(MemoryStore::new()), cache)
    }
}
