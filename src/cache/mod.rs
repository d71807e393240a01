//! Cache Module
//!
//! Provides the in-process object cache shared by the entity services.

mod entry;
mod stats;
mod store;


use std::fmt::Display;

// Re-export public types
pub use entry::CacheEntry;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::ObjectCache;

// == Public Constants ==
/// Default number of entries held before a flush
pub const DEFAULT_CAPACITY: usize = 100;

// == Entity Key ==
/// Builds the conventional `{kind}_{id}` cache key, e.g. `note_42`.
pub fn entity_key(kind: &str, id: impl Display) -> String {
    format!("{}_{}", kind, id)
}
