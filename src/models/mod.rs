//! Domain records and input drafts
//!
//! Notes, tags and users as the services see them, plus the drafts callers
//! submit to create or update them.

pub mod note;
pub mod requests;
pub mod tag;
pub mod user;

// Re-export commonly used types
pub use note::Note;
pub use requests::{NoteDraft, TagDraft, UserDraft};
pub use tag::Tag;
pub use user::User;
