//! User service

use std::sync::Arc;

use tracing::info;

use super::{evict_all, read_through};
use crate::cache::ObjectCache;
use crate::error::{Result, ServiceError};
use crate::models::{Note, Tag, User, UserDraft};
use crate::repository::{NoteRepository, TagRepository, UserRepository};

/// Reads and writes users, keeping `user_{username}` fresh. Deleting a
/// user also removes, and evicts, everything the user owns.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    notes: Arc<dyn NoteRepository>,
    tags: Arc<dyn TagRepository>,
    cache: Arc<ObjectCache>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        notes: Arc<dyn NoteRepository>,
        tags: Arc<dyn TagRepository>,
        cache: Arc<ObjectCache>,
    ) -> Self {
        Self {
            users,
            notes,
            tags,
            cache,
        }
    }

    pub fn find_all(&self) -> Result<Vec<User>> {
        Ok(self.users.find_all()?)
    }

    /// Returns the user called `username`, from the cache when possible.
    pub fn find_by_username(&self, username: &str) -> Result<Arc<User>> {
        read_through(&self.cache, &User::cache_key(username), || {
            self.users.find_by_username(username)
        })?
        .ok_or_else(|| user_not_found(username))
    }

    pub fn create(&self, draft: UserDraft) -> Result<User> {
        if let Some(msg) = draft.validate() {
            return Err(ServiceError::BadRequest(msg));
        }
        if self.users.find_by_username(&draft.username)?.is_some() {
            return Err(ServiceError::BadRequest(format!(
                "User with name {} already exists",
                draft.username
            )));
        }

        let saved = self.users.save(User {
            username: draft.username,
            email: draft.email,
            password: draft.password,
        })?;
        self.cache.evict(&User::cache_key(&saved.username));

        info!(username = %saved.username, "User created");
        Ok(saved)
    }

    /// Replaces email and password. The username itself is immutable.
    pub fn update(&self, username: &str, draft: UserDraft) -> Result<User> {
        let mut existing = self
            .users
            .find_by_username(username)?
            .ok_or_else(|| user_not_found(username))?;

        if let Some(msg) = draft.validate() {
            return Err(ServiceError::BadRequest(msg));
        }
        if draft.username != username {
            return Err(ServiceError::BadRequest(
                "Username cannot be changed".to_string(),
            ));
        }

        existing.email = draft.email;
        existing.password = draft.password;
        let saved = self.users.save(existing)?;
        self.cache.evict(&User::cache_key(username));

        info!(username, "User updated");
        Ok(saved)
    }

    /// Deletes the user together with their notes and tags.
    pub fn delete(&self, username: &str) -> Result<()> {
        if self.users.find_by_username(username)?.is_none() {
            return Err(user_not_found(username));
        }

        let notes = self.notes.find_by_username(username)?;
        let tags = self.tags.find_by_username(username)?;
        for note in &notes {
            self.notes.delete(note.id)?;
        }
        for tag in &tags {
            self.tags.delete(tag.id)?;
        }
        self.users.delete(username)?;

        self.cache.evict(&User::cache_key(username));
        evict_all(&self.cache, notes.iter().map(|n| Note::cache_key(n.id)));
        evict_all(&self.cache, tags.iter().map(|t| Tag::cache_key(t.id)));

        info!(
            username,
            notes = notes.len(),
            tags = tags.len(),
            "User deleted"
        );
        Ok(())
    }
}

fn user_not_found(username: &str) -> ServiceError {
    ServiceError::NotFound(format!("User with name {} not found", username))
}
