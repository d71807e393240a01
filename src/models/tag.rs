//! Tag record

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::cache::entity_key;

/// A label owned by a user and attached to any number of notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Store-assigned identifier
    pub id: i64,
    /// Name, unique per store
    pub name: String,
    /// Owner's username
    pub username: String,
    /// Notes carrying this tag
    #[serde(default)]
    pub note_ids: BTreeSet<i64>,
}

impl Tag {
    /// Cache key prefix for tags
    pub const KIND: &'static str = "tag";

    /// Returns the cache key for the tag with `id`.
    pub fn cache_key(id: i64) -> String {
        entity_key(Self::KIND, id)
    }
}
