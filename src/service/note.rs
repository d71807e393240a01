//! Note service

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::{evict_all, read_through};
use crate::cache::ObjectCache;
use crate::error::{Result, ServiceError, StoreError};
use crate::models::{Note, NoteDraft, Tag};
use crate::repository::{NoteRepository, TagRepository, UserRepository};

/// Reads and writes notes, keeping `note_{id}` and linked `tag_{id}`
/// cache entries fresh.
#[derive(Clone)]
pub struct NoteService {
    notes: Arc<dyn NoteRepository>,
    tags: Arc<dyn TagRepository>,
    users: Arc<dyn UserRepository>,
    cache: Arc<ObjectCache>,
}

impl NoteService {
    pub fn new(
        notes: Arc<dyn NoteRepository>,
        tags: Arc<dyn TagRepository>,
        users: Arc<dyn UserRepository>,
        cache: Arc<ObjectCache>,
    ) -> Self {
        Self {
            notes,
            tags,
            users,
            cache,
        }
    }

    // == Find By Id ==
    /// Returns the note with `id`, from the cache when possible.
    pub fn find_by_id(&self, id: i64) -> Result<Arc<Note>> {
        read_through(&self.cache, &Note::cache_key(id), || {
            self.notes.find_by_id(id)
        })?
        .ok_or_else(|| note_not_found(id))
    }

    // == Queries ==
    /// Notes whose title contains `fragment`.
    pub fn find_by_title(&self, fragment: &str) -> Result<Vec<Note>> {
        Ok(self.notes.find_by_title_containing(fragment)?)
    }

    /// Notes carrying the tag called `name`.
    pub fn find_by_tag_name(&self, name: &str) -> Result<Vec<Note>> {
        if self.tags.find_by_name(name)?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Tag with name {} not found",
                name
            )));
        }
        Ok(self.notes.find_by_tag_name(name)?)
    }

    /// Notes owned by `username`.
    pub fn find_by_username(&self, username: &str) -> Result<Vec<Note>> {
        if self.users.find_by_username(username)?.is_none() {
            return Err(user_not_found(username));
        }
        Ok(self.notes.find_by_username(username)?)
    }

    // == Create ==
    /// Creates a note and links it to the draft's tags.
    ///
    /// Every tag must exist and belong to the note's owner.
    pub fn create(&self, draft: NoteDraft) -> Result<Note> {
        if let Some(msg) = draft.validate_new() {
            return Err(ServiceError::BadRequest(msg));
        }
        self.insert(draft, Utc::now())
    }

    // == Create Bulk ==
    /// Creates several notes with one shared timestamp.
    ///
    /// Every draft is checked before any is stored: fields, owner, tags and
    /// title uniqueness, both against the store and within the batch. Only
    /// a store failure partway through can leave the earlier notes stored.
    pub fn create_bulk(&self, drafts: Vec<NoteDraft>) -> Result<Vec<Note>> {
        if drafts.is_empty() {
            return Err(ServiceError::BadRequest(
                "Note list cannot be empty".to_string(),
            ));
        }
        if let Some(msg) = drafts.iter().find_map(NoteDraft::validate_new) {
            return Err(ServiceError::BadRequest(msg));
        }

        let mut titles = BTreeSet::new();
        for draft in &drafts {
            if !titles.insert(draft.title.as_str()) || self.title_taken(&draft.title)? {
                return Err(StoreError::Conflict(format!(
                    "Note title '{}' already exists",
                    draft.title
                ))
                .into());
            }
            self.owner_tags(draft)?;
        }

        let now = Utc::now();
        let saved = drafts
            .into_iter()
            .map(|draft| self.insert(draft, now))
            .collect::<Result<Vec<_>>>()?;

        info!(count = saved.len(), "Bulk notes created");
        Ok(saved)
    }

    fn title_taken(&self, title: &str) -> Result<bool> {
        Ok(self
            .notes
            .find_by_title_containing(title)?
            .iter()
            .any(|n| n.title == title))
    }

    /// Checks the draft's owner exists and loads the tags it asks for.
    fn owner_tags(&self, draft: &NoteDraft) -> Result<Vec<Tag>> {
        if self.users.find_by_username(&draft.username)?.is_none() {
            return Err(user_not_found(&draft.username));
        }
        let tag_ids = draft.tag_ids.as_deref().unwrap_or_default();
        self.owned_tags(tag_ids, &draft.username)
    }

    // Reloads tags: an earlier note in the same batch may have linked one.
    fn insert(&self, draft: NoteDraft, now: DateTime<Utc>) -> Result<Note> {
        let tags = self.owner_tags(&draft)?;

        let note = Note {
            id: 0,
            title: draft.title,
            content: draft.content,
            username: draft.username,
            tag_ids: tags.iter().map(|t| t.id).collect(),
            created_at: now,
            updated_at: now,
        };
        let saved = self.notes.insert(note)?;

        let mut touched = Vec::with_capacity(tags.len());
        for mut tag in tags {
            tag.note_ids.insert(saved.id);
            touched.push(self.tags.save(tag)?.id);
        }

        self.cache.evict(&Note::cache_key(saved.id));
        evict_all(&self.cache, touched.into_iter().map(Tag::cache_key));

        info!(id = saved.id, title = %saved.title, "Note created");
        Ok(saved)
    }

    // == Update ==
    /// Replaces title and content; relinks tags when the draft lists them.
    pub fn update(&self, id: i64, draft: NoteDraft) -> Result<Note> {
        let mut existing = self
            .notes
            .find_by_id(id)?
            .ok_or_else(|| note_not_found(id))?;

        if let Some(msg) = draft.validate() {
            return Err(ServiceError::BadRequest(msg));
        }

        existing.title = draft.title;
        existing.content = draft.content;
        existing.updated_at = Utc::now();

        let mut relink = None;
        if let Some(tag_ids) = draft.tag_ids.as_deref() {
            let wanted = self.owned_tags(tag_ids, &existing.username)?;
            let wanted_ids: BTreeSet<i64> = wanted.iter().map(|t| t.id).collect();
            let stale: Vec<i64> = existing.tag_ids.difference(&wanted_ids).copied().collect();
            existing.tag_ids = wanted_ids;
            relink = Some((stale, wanted));
        }

        // The note row owns the unique title, so a conflict stops us here
        // before any tag is rewritten.
        let saved = self.notes.save(existing)?;

        let mut touched = BTreeSet::new();
        let linked = match relink {
            Some((stale, wanted)) => self.relink_tags(id, stale, wanted, &mut touched),
            None => Ok(()),
        };

        self.cache.evict(&Note::cache_key(id));
        evict_all(&self.cache, touched.into_iter().map(Tag::cache_key));
        linked?;

        info!(id, "Note updated");
        Ok(saved)
    }

    /// Detaches note `id` from `stale` tags and attaches it to `wanted`.
    ///
    /// Every tag id written to, or about to be, lands in `touched` so the
    /// caller can evict it even when a save fails halfway.
    fn relink_tags(
        &self,
        id: i64,
        stale: Vec<i64>,
        wanted: Vec<Tag>,
        touched: &mut BTreeSet<i64>,
    ) -> Result<()> {
        for old_id in stale {
            if let Some(mut tag) = self.tags.find_by_id(old_id)? {
                touched.insert(old_id);
                tag.note_ids.remove(&id);
                self.tags.save(tag)?;
            }
        }
        for mut tag in wanted {
            if tag.note_ids.insert(id) {
                touched.insert(tag.id);
                self.tags.save(tag)?;
            }
        }
        Ok(())
    }

    // == Delete ==
    /// Removes the note and unlinks it from its tags.
    pub fn delete(&self, id: i64) -> Result<()> {
        let note = self
            .notes
            .find_by_id(id)?
            .ok_or_else(|| note_not_found(id))?;

        for tag_id in &note.tag_ids {
            if let Some(mut tag) = self.tags.find_by_id(*tag_id)? {
                tag.note_ids.remove(&id);
                self.tags.save(tag)?;
            }
        }
        self.notes.delete(id)?;

        self.cache.evict(&Note::cache_key(id));
        evict_all(&self.cache, note.tag_ids.iter().copied().map(Tag::cache_key));

        info!(id, "Note deleted");
        Ok(())
    }

    /// Loads every tag in `ids`, all of which must belong to `username`.
    fn owned_tags(&self, ids: &[i64], username: &str) -> Result<Vec<Tag>> {
        let mut tags = Vec::with_capacity(ids.len());
        for id in ids.iter().copied().collect::<BTreeSet<_>>() {
            match self.tags.find_by_id(id)? {
                Some(tag) if tag.username == username => tags.push(tag),
                _ => {
                    return Err(ServiceError::NotFound(format!(
                        "Tag with id {} not found",
                        id
                    )))
                }
            }
        }
        Ok(tags)
    }
}

fn note_not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("Note with id {} not found", id))
}

fn user_not_found(username: &str) -> ServiceError {
    ServiceError::NotFound(format!("User with name {} not found", username))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::repository::MemoryStore;

    struct Fixture {
        store: Arc<MemoryStore>,
        cache: Arc<ObjectCache>,
        service: NoteService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(ObjectCache::new(100));
        let service = NoteService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            cache.clone(),
        );
        for name in ["alice", "bob"] {
            UserRepository::save(
                store.as_ref(),
                User {
                    username: name.to_string(),
                    email: format!("{}@example.com", name),
                    password: "secret".to_string(),
                },
            )
            .unwrap();
        }
        Fixture {
            store,
            cache,
            service,
        }
    }

    fn add_tag(store: &MemoryStore, name: &str, username: &str) -> Tag {
        TagRepository::insert(
            store,
            Tag {
                id: 0,
                name: name.to_string(),
                username: username.to_string(),
                note_ids: BTreeSet::new(),
            },
        )
        .unwrap()
    }

    fn draft(title: &str, username: &str, tag_ids: Option<Vec<i64>>) -> NoteDraft {
        NoteDraft {
            title: title.to_string(),
            content: None,
            username: username.to_string(),
            tag_ids,
        }
    }

    #[test]
    fn test_find_by_id_populates_cache() {
        let f = fixture();
        let note = f.service.create(draft("Groceries", "alice", None)).unwrap();

        assert!(!f.cache.contains_key(&Note::cache_key(note.id)));
        let found = f.service.find_by_id(note.id).unwrap();

        assert_eq!(found.title, "Groceries");
        assert!(f.cache.contains_key(&Note::cache_key(note.id)));
    }

    #[test]
    fn test_find_by_id_missing() {
        let f = fixture();
        let result = f.service.find_by_id(99);
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
        assert!(f.cache.is_empty());
    }

    #[test]
    fn test_create_requires_title_and_username() {
        let f = fixture();
        assert!(matches!(
            f.service.create(draft(" ", "alice", None)),
            Err(ServiceError::BadRequest(_))
        ));
        assert!(matches!(
            f.service.create(draft("Groceries", "", None)),
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[test]
    fn test_create_unknown_user() {
        let f = fixture();
        let result = f.service.create(draft("Groceries", "carol", None));
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn test_create_links_tags_and_evicts_them() {
        let f = fixture();
        let work = add_tag(&f.store, "work", "alice");
        f.cache.put(Tag::cache_key(work.id), work.clone());

        let note = f
            .service
            .create(draft("Meeting", "alice", Some(vec![work.id])))
            .unwrap();

        assert!(note.tag_ids.contains(&work.id));
        let stored = TagRepository::find_by_id(f.store.as_ref(), work.id)
            .unwrap()
            .unwrap();
        assert!(stored.note_ids.contains(&note.id));
        assert!(!f.cache.contains_key(&Tag::cache_key(work.id)));
    }

    #[test]
    fn test_create_rejects_foreign_tag() {
        let f = fixture();
        let bobs = add_tag(&f.store, "bobs", "bob");

        let result = f
            .service
            .create(draft("Meeting", "alice", Some(vec![bobs.id])));

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
        assert!(f.service.find_by_title("Meeting").unwrap().is_empty());
    }

    #[test]
    fn test_create_bulk() {
        let f = fixture();
        let notes = f
            .service
            .create_bulk(vec![draft("a", "alice", None), draft("b", "bob", None)])
            .unwrap();

        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].created_at, notes[1].created_at);
    }

    #[test]
    fn test_create_bulk_validates_everything_first() {
        let f = fixture();
        assert!(matches!(
            f.service.create_bulk(Vec::new()),
            Err(ServiceError::BadRequest(_))
        ));

        let result = f
            .service
            .create_bulk(vec![draft("a", "alice", None), draft("", "alice", None)]);
        assert!(matches!(result, Err(ServiceError::BadRequest(_))));
        assert!(f.service.find_by_username("alice").unwrap().is_empty());
    }

    #[test]
    fn test_create_bulk_unknown_user_stores_nothing() {
        let f = fixture();

        let result = f
            .service
            .create_bulk(vec![draft("a", "alice", None), draft("b", "ghost", None)]);

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
        assert!(f.service.find_by_username("alice").unwrap().is_empty());
    }

    #[test]
    fn test_create_bulk_foreign_tag_stores_nothing() {
        let f = fixture();
        let bobs = add_tag(&f.store, "bobs", "bob");

        let result = f.service.create_bulk(vec![
            draft("a", "alice", None),
            draft("b", "alice", Some(vec![bobs.id])),
        ]);

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
        assert!(f.service.find_by_username("alice").unwrap().is_empty());
    }

    #[test]
    fn test_create_bulk_title_conflicts_store_nothing() {
        let f = fixture();
        f.service.create(draft("taken", "bob", None)).unwrap();

        let against_store = f
            .service
            .create_bulk(vec![draft("a", "alice", None), draft("taken", "alice", None)]);
        let within_batch = f
            .service
            .create_bulk(vec![draft("a", "alice", None), draft("a", "alice", None)]);

        for result in [against_store, within_batch] {
            assert!(matches!(
                result,
                Err(ServiceError::Store(StoreError::Conflict(_)))
            ));
        }
        assert!(f.service.find_by_username("alice").unwrap().is_empty());
    }

    #[test]
    fn test_create_bulk_shared_tag_links_every_note() {
        let f = fixture();
        let work = add_tag(&f.store, "work", "alice");

        let notes = f
            .service
            .create_bulk(vec![
                draft("a", "alice", Some(vec![work.id])),
                draft("b", "alice", Some(vec![work.id])),
            ])
            .unwrap();

        let tag = TagRepository::find_by_id(f.store.as_ref(), work.id)
            .unwrap()
            .unwrap();
        assert_eq!(tag.note_ids, notes.iter().map(|n| n.id).collect::<BTreeSet<_>>());
    }

    #[test]
    fn test_update_evicts_and_reloads() {
        let f = fixture();
        let note = f.service.create(draft("Groceries", "alice", None)).unwrap();
        f.service.find_by_id(note.id).unwrap();

        f.service
            .update(note.id, draft("Errands", "", None))
            .unwrap();

        assert!(!f.cache.contains_key(&Note::cache_key(note.id)));
        assert_eq!(f.service.find_by_id(note.id).unwrap().title, "Errands");
    }

    #[test]
    fn test_update_relinks_tags() {
        let f = fixture();
        let work = add_tag(&f.store, "work", "alice");
        let home = add_tag(&f.store, "home", "alice");
        let note = f
            .service
            .create(draft("Plan", "alice", Some(vec![work.id])))
            .unwrap();

        let updated = f
            .service
            .update(note.id, draft("Plan", "", Some(vec![home.id])))
            .unwrap();

        assert_eq!(updated.tag_ids, BTreeSet::from([home.id]));
        assert!(f.service.find_by_tag_name("work").unwrap().is_empty());
        assert_eq!(f.service.find_by_tag_name("home").unwrap().len(), 1);
    }

    #[test]
    fn test_update_title_conflict_leaves_links_intact() {
        let f = fixture();
        let work = add_tag(&f.store, "work", "alice");
        let home = add_tag(&f.store, "home", "alice");
        let one = f
            .service
            .create(draft("One", "alice", Some(vec![work.id])))
            .unwrap();
        f.service.create(draft("Two", "alice", None)).unwrap();
        let cached = TagRepository::find_by_id(f.store.as_ref(), work.id)
            .unwrap()
            .unwrap();
        f.cache.put(Tag::cache_key(work.id), cached);

        let result = f
            .service
            .update(one.id, draft("Two", "", Some(vec![home.id])));

        assert!(matches!(
            result,
            Err(ServiceError::Store(StoreError::Conflict(_)))
        ));
        let note = NoteRepository::find_by_id(f.store.as_ref(), one.id)
            .unwrap()
            .unwrap();
        assert_eq!(note.title, "One");
        assert_eq!(note.tag_ids, BTreeSet::from([work.id]));
        let stored_work = TagRepository::find_by_id(f.store.as_ref(), work.id)
            .unwrap()
            .unwrap();
        let stored_home = TagRepository::find_by_id(f.store.as_ref(), home.id)
            .unwrap()
            .unwrap();
        assert_eq!(stored_work.note_ids, BTreeSet::from([one.id]));
        assert!(stored_home.note_ids.is_empty());
        let cached_work = f.cache.get::<Tag>(&Tag::cache_key(work.id)).unwrap().unwrap();
        assert_eq!(cached_work.note_ids, stored_work.note_ids);
    }

    #[test]
    fn test_update_missing_note() {
        let f = fixture();
        let result = f.service.update(5, draft("x", "", None));
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn test_delete_unlinks_and_evicts() {
        let f = fixture();
        let work = add_tag(&f.store, "work", "alice");
        let note = f
            .service
            .create(draft("Plan", "alice", Some(vec![work.id])))
            .unwrap();
        f.service.find_by_id(note.id).unwrap();

        f.service.delete(note.id).unwrap();

        assert!(!f.cache.contains_key(&Note::cache_key(note.id)));
        assert!(matches!(
            f.service.find_by_id(note.id),
            Err(ServiceError::NotFound(_))
        ));
        let tag = TagRepository::find_by_id(f.store.as_ref(), work.id)
            .unwrap()
            .unwrap();
        assert!(tag.note_ids.is_empty());
    }

    #[test]
    fn test_find_by_tag_name_unknown_tag() {
        let f = fixture();
        assert!(matches!(
            f.service.find_by_tag_name("nope"),
            Err(ServiceError::NotFound(_))
        ));
    }
}
