//! Tag service

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use super::{evict_all, read_through};
use crate::cache::ObjectCache;
use crate::error::{Result, ServiceError};
use crate::models::{Note, Tag, TagDraft};
use crate::repository::{NoteRepository, TagRepository, UserRepository};

/// Reads and writes tags, keeping `tag_{id}` and linked `note_{id}` cache
/// entries fresh.
#[derive(Clone)]
pub struct TagService {
    tags: Arc<dyn TagRepository>,
    notes: Arc<dyn NoteRepository>,
    users: Arc<dyn UserRepository>,
    cache: Arc<ObjectCache>,
}

impl TagService {
    pub fn new(
        tags: Arc<dyn TagRepository>,
        notes: Arc<dyn NoteRepository>,
        users: Arc<dyn UserRepository>,
        cache: Arc<ObjectCache>,
    ) -> Self {
        Self {
            tags,
            notes,
            users,
            cache,
        }
    }

    /// Every tag, straight from the store.
    pub fn find_all(&self) -> Result<Vec<Tag>> {
        Ok(self.tags.find_all()?)
    }

    /// Returns the tag with `id`, from the cache when possible.
    pub fn find_by_id(&self, id: i64) -> Result<Arc<Tag>> {
        read_through(&self.cache, &Tag::cache_key(id), || self.tags.find_by_id(id))?
            .ok_or_else(|| tag_not_found(id))
    }

    /// Creates a tag and attaches it to the draft's notes.
    ///
    /// Every note must exist and belong to the tag's owner.
    pub fn create(&self, draft: TagDraft) -> Result<Tag> {
        if let Some(msg) = draft.validate_new() {
            return Err(ServiceError::BadRequest(msg));
        }
        if self.users.find_by_username(&draft.username)?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "User with name {} not found",
                draft.username
            )));
        }
        let note_ids = draft.note_ids.as_deref().unwrap_or_default();
        let notes = self.owned_notes(note_ids, &draft.username)?;

        let tag = Tag {
            id: 0,
            name: draft.name,
            username: draft.username,
            note_ids: notes.iter().map(|n| n.id).collect(),
        };
        let saved = self.tags.insert(tag)?;

        let mut touched = Vec::with_capacity(notes.len());
        for mut note in notes {
            note.tag_ids.insert(saved.id);
            touched.push(self.notes.save(note)?.id);
        }

        self.cache.evict(&Tag::cache_key(saved.id));
        evict_all(&self.cache, touched.into_iter().map(Note::cache_key));

        info!(id = saved.id, name = %saved.name, "Tag created");
        Ok(saved)
    }

    /// Renames the tag; reattaches notes when the draft lists them.
    pub fn update(&self, id: i64, draft: TagDraft) -> Result<Tag> {
        let mut existing = self
            .tags
            .find_by_id(id)?
            .ok_or_else(|| tag_not_found(id))?;

        if let Some(msg) = draft.validate() {
            return Err(ServiceError::BadRequest(msg));
        }
        existing.name = draft.name;

        let mut relink = None;
        if let Some(note_ids) = draft.note_ids.as_deref() {
            let wanted = self.owned_notes(note_ids, &existing.username)?;
            let wanted_ids: BTreeSet<i64> = wanted.iter().map(|n| n.id).collect();
            let stale: Vec<i64> = existing.note_ids.difference(&wanted_ids).copied().collect();
            existing.note_ids = wanted_ids;
            relink = Some((stale, wanted));
        }

        // Name conflicts surface here, before any note is rewritten.
        let saved = self.tags.save(existing)?;

        let mut touched = BTreeSet::new();
        let linked = match relink {
            Some((stale, wanted)) => self.relink_notes(id, stale, wanted, &mut touched),
            None => Ok(()),
        };

        self.cache.evict(&Tag::cache_key(id));
        evict_all(&self.cache, touched.into_iter().map(Note::cache_key));
        linked?;

        info!(id, "Tag updated");
        Ok(saved)
    }

    /// Detaches tag `id` from `stale` notes and attaches it to `wanted`,
    /// recording each note id in `touched` before writing it.
    fn relink_notes(
        &self,
        id: i64,
        stale: Vec<i64>,
        wanted: Vec<Note>,
        touched: &mut BTreeSet<i64>,
    ) -> Result<()> {
        for old_id in stale {
            if let Some(mut note) = self.notes.find_by_id(old_id)? {
                touched.insert(old_id);
                note.tag_ids.remove(&id);
                self.notes.save(note)?;
            }
        }
        for mut note in wanted {
            if note.tag_ids.insert(id) {
                touched.insert(note.id);
                self.notes.save(note)?;
            }
        }
        Ok(())
    }

    /// Removes the tag from every note carrying it, then deletes it.
    pub fn delete(&self, id: i64) -> Result<()> {
        let tag = self
            .tags
            .find_by_id(id)?
            .ok_or_else(|| tag_not_found(id))?;

        for note_id in &tag.note_ids {
            if let Some(mut note) = self.notes.find_by_id(*note_id)? {
                note.tag_ids.remove(&id);
                self.notes.save(note)?;
            }
        }
        self.tags.delete(id)?;

        self.cache.evict(&Tag::cache_key(id));
        evict_all(&self.cache, tag.note_ids.iter().copied().map(Note::cache_key));

        info!(id, "Tag deleted");
        Ok(())
    }

    fn owned_notes(&self, ids: &[i64], username: &str) -> Result<Vec<Note>> {
        let mut notes = Vec::with_capacity(ids.len());
        for id in ids.iter().copied().collect::<BTreeSet<_>>() {
            match self.notes.find_by_id(id)? {
                Some(note) if note.username == username => notes.push(note),
                _ => {
                    return Err(ServiceError::NotFound(format!(
                        "Note with id {} not found",
                        id
                    )))
                }
            }
        }
        Ok(notes)
    }
}

fn tag_not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("Tag with id {} not found", id))
}
