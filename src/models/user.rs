//! User record

use serde::{Deserialize, Serialize};

use crate::cache::entity_key;

/// An account, keyed by its username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl User {
    /// Cache key prefix for users
    pub const KIND: &'static str = "user";

    /// Returns the cache key for `username`.
    pub fn cache_key(username: &str) -> String {
        entity_key(Self::KIND, username)
    }
}
