//! Note record

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::entity_key;

/// A note owned by a user and linked to any number of tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Store-assigned identifier
    pub id: i64,
    /// Title, unique per store
    pub title: String,
    /// Free-form body
    #[serde(default)]
    pub content: Option<String>,
    /// Owner's username
    pub username: String,
    /// Linked tags
    #[serde(default)]
    pub tag_ids: BTreeSet<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Cache key prefix for notes
    pub const KIND: &'static str = "note";

    /// Returns the cache key for the note with `id`.
    pub fn cache_key(id: i64) -> String {
        entity_key(Self::KIND, id)
    }
}
