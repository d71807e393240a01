//! Backing store interfaces
//!
//! The services only ever talk to the store through these traits. Each
//! call is independent: the store and the cache are synchronized
//! separately, so there is no transaction spanning both.

mod memory;

pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::models::{Note, Tag, User};

/// Result type for store calls.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == Note Repository ==
/// Durable storage for notes.
pub trait NoteRepository: Send + Sync {
    fn find_by_id(&self, id: i64) -> StoreResult<Option<Note>>;

    /// Notes whose title contains `fragment`.
    fn find_by_title_containing(&self, fragment: &str) -> StoreResult<Vec<Note>>;

    /// Notes linked to the tag called `name`.
    fn find_by_tag_name(&self, name: &str) -> StoreResult<Vec<Note>>;

    fn find_by_username(&self, username: &str) -> StoreResult<Vec<Note>>;

    /// Stores a new note under a fresh id and returns it with that id.
    fn insert(&self, note: Note) -> StoreResult<Note>;

    /// Replaces the note with the same id.
    fn save(&self, note: Note) -> StoreResult<Note>;

    /// Returns true if a note was removed.
    fn delete(&self, id: i64) -> StoreResult<bool>;
}

// == Tag Repository ==
/// Durable storage for tags.
pub trait TagRepository: Send + Sync {
    fn find_by_id(&self, id: i64) -> StoreResult<Option<Tag>>;

    fn find_by_name(&self, name: &str) -> StoreResult<Option<Tag>>;

    fn find_all(&self) -> StoreResult<Vec<Tag>>;

    fn find_by_username(&self, username: &str) -> StoreResult<Vec<Tag>>;

    /// Stores a new tag under a fresh id and returns it with that id.
    fn insert(&self, tag: Tag) -> StoreResult<Tag>;

    /// Replaces the tag with the same id.
    fn save(&self, tag: Tag) -> StoreResult<Tag>;

    fn delete(&self, id: i64) -> StoreResult<bool>;
}

// == User Repository ==
/// Durable storage for users, keyed by username.
pub trait UserRepository: Send + Sync {
    fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    fn find_all(&self) -> StoreResult<Vec<User>>;

    /// Inserts or replaces the user with the same username.
    fn save(&self, user: User) -> StoreResult<User>;

    fn delete(&self, username: &str) -> StoreResult<bool>;
}
