//! In-process backing store
//!
//! Keeps every table in ordered maps behind one lock. Useful as the
//! default store and as a fixture for tests.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::{NoteRepository, StoreResult, TagRepository, UserRepository};
use crate::error::StoreError;
use crate::models::{Note, Tag, User};

#[derive(Debug, Default)]
struct Tables {
    notes: BTreeMap<i64, Note>,
    tags: BTreeMap<i64, Tag>,
    users: BTreeMap<String, User>,
    last_note_id: i64,
    last_tag_id: i64,
}

impl Tables {
    fn title_taken(&self, title: &str, except: Option<i64>) -> bool {
        self.notes
            .values()
            .any(|n| n.title == title && Some(n.id) != except)
    }

    fn tag_name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.tags
            .values()
            .any(|t| t.name == name && Some(t.id) != except)
    }
}

// == Memory Store ==
/// Thread-safe in-memory implementation of every repository trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NoteRepository for MemoryStore {
    fn find_by_id(&self, id: i64) -> StoreResult<Option<Note>> {
        Ok(self.tables.read().notes.get(&id).cloned())
    }

    fn find_by_title_containing(&self, fragment: &str) -> StoreResult<Vec<Note>> {
        Ok(self
            .tables
            .read()
            .notes
            .values()
            .filter(|n| n.title.contains(fragment))
            .cloned()
            .collect())
    }

    fn find_by_tag_name(&self, name: &str) -> StoreResult<Vec<Note>> {
        let tables = self.tables.read();
        let Some(tag) = tables.tags.values().find(|t| t.name == name) else {
            return Ok(Vec::new());
        };
        Ok(tables
            .notes
            .values()
            .filter(|n| n.tag_ids.contains(&tag.id))
            .cloned()
            .collect())
    }

    fn find_by_username(&self, username: &str) -> StoreResult<Vec<Note>> {
        Ok(self
            .tables
            .read()
            .notes
            .values()
            .filter(|n| n.username == username)
            .cloned()
            .collect())
    }

    fn insert(&self, mut note: Note) -> StoreResult<Note> {
        let mut tables = self.tables.write();
        if tables.title_taken(&note.title, None) {
            return Err(StoreError::Conflict(format!(
                "Note title '{}' already exists",
                note.title
            )));
        }
        tables.last_note_id += 1;
        note.id = tables.last_note_id;
        tables.notes.insert(note.id, note.clone());
        Ok(note)
    }

    fn save(&self, note: Note) -> StoreResult<Note> {
        let mut tables = self.tables.write();
        if tables.title_taken(&note.title, Some(note.id)) {
            return Err(StoreError::Conflict(format!(
                "Note title '{}' already exists",
                note.title
            )));
        }
        tables.last_note_id = tables.last_note_id.max(note.id);
        tables.notes.insert(note.id, note.clone());
        Ok(note)
    }

    fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().notes.remove(&id).is_some())
    }
}

impl TagRepository for MemoryStore {
    fn find_by_id(&self, id: i64) -> StoreResult<Option<Tag>> {
        Ok(self.tables.read().tags.get(&id).cloned())
    }

    fn find_by_name(&self, name: &str) -> StoreResult<Option<Tag>> {
        Ok(self
            .tables
            .read()
            .tags
            .values()
            .find(|t| t.name == name)
            .cloned())
    }

    fn find_all(&self) -> StoreResult<Vec<Tag>> {
        Ok(self.tables.read().tags.values().cloned().collect())
    }

    fn find_by_username(&self, username: &str) -> StoreResult<Vec<Tag>> {
        Ok(self
            .tables
            .read()
            .tags
            .values()
            .filter(|t| t.username == username)
            .cloned()
            .collect())
    }

    fn insert(&self, mut tag: Tag) -> StoreResult<Tag> {
        let mut tables = self.tables.write();
        if tables.tag_name_taken(&tag.name, None) {
            return Err(StoreError::Conflict(format!(
                "Tag name '{}' already exists",
                tag.name
            )));
        }
        tables.last_tag_id += 1;
        tag.id = tables.last_tag_id;
        tables.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    fn save(&self, tag: Tag) -> StoreResult<Tag> {
        let mut tables = self.tables.write();
        if tables.tag_name_taken(&tag.name, Some(tag.id)) {
            return Err(StoreError::Conflict(format!(
                "Tag name '{}' already exists",
                tag.name
            )));
        }
        tables.last_tag_id = tables.last_tag_id.max(tag.id);
        tables.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().tags.remove(&id).is_some())
    }
}

impl UserRepository for MemoryStore {
    fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self.tables.read().users.get(username).cloned())
    }

    fn find_all(&self) -> StoreResult<Vec<User>> {
        Ok(self.tables.read().users.values().cloned().collect())
    }

    fn save(&self, user: User) -> StoreResult<User> {
        self.tables
            .write()
            .users
            .insert(user.username.clone(), user.clone());
        Ok(user)
    }

    fn delete(&self, username: &str) -> StoreResult<bool> {
        Ok(self.tables.write().users.remove(username).is_some())
    }
}
