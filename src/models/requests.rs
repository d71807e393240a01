//! Input drafts for the entity services
//!
//! Defines what callers submit to create or update notes, tags and users.

use serde::Deserialize;

/// Helper for the "required text" checks shared by every draft.
fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Draft for creating or updating a note
///
/// # Fields
/// - `title`: Required, non-blank
/// - `content`: Optional body
/// - `username`: Owner, required on create
/// - `tag_ids`: Tags to link; `None` leaves links untouched on update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub tag_ids: Option<Vec<i64>>,
}

impl NoteDraft {
    /// Validates the fields every write needs.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if is_blank(&self.title) {
            return Some("Note title cannot be empty".to_string());
        }
        None
    }

    /// Validates a draft that creates a new note.
    pub fn validate_new(&self) -> Option<String> {
        self.validate().or_else(|| {
            is_blank(&self.username).then(|| "Username cannot be empty".to_string())
        })
    }
}

/// Draft for creating or updating a tag
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagDraft {
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub note_ids: Option<Vec<i64>>,
}

impl TagDraft {
    /// Validates the fields every write needs.
    pub fn validate(&self) -> Option<String> {
        if is_blank(&self.name) {
            return Some("Tag name cannot be empty".to_string());
        }
        None
    }

    /// Validates a draft that creates a new tag.
    pub fn validate_new(&self) -> Option<String> {
        self.validate().or_else(|| {
            is_blank(&self.username).then(|| "Username cannot be empty".to_string())
        })
    }
}

/// Draft for creating or updating a user
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserDraft {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl UserDraft {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.username.is_empty() {
            return Some("Username cannot be empty".to_string());
        }
        if self.email.is_empty() {
            return Some("Email cannot be empty".to_string());
        }
        if self.password.is_empty() {
            return Some("Password cannot be empty".to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_draft_deserialize() {
        let json = r#"{"title": "Groceries", "username": "alice"}"#;
        let draft: NoteDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.title, "Groceries");
        assert!(draft.content.is_none());
        assert!(draft.tag_ids.is_none());
    }

    #[test]
    fn test_note_draft_with_tags() {
        let json = r#"{"title": "Groceries", "username": "alice", "tag_ids": [1, 2]}"#;
        let draft: NoteDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.tag_ids, Some(vec![1, 2]));
    }

    #[test]
    fn test_note_draft_blank_title() {
        let draft = NoteDraft {
            title: "   ".to_string(),
            username: "alice".to_string(),
            ..Default::default()
        };
        assert!(draft.validate().is_some());
        assert!(draft.validate_new().is_some());
    }

    #[test]
    fn test_note_draft_missing_username_only_fails_on_create() {
        let draft = NoteDraft {
            title: "Groceries".to_string(),
            ..Default::default()
        };
        assert!(draft.validate().is_none());
        assert_eq!(
            draft.validate_new().as_deref(),
            Some("Username cannot be empty")
        );
    }

    #[test]
    fn test_tag_draft_validation() {
        let draft = TagDraft {
            name: "".to_string(),
            username: "alice".to_string(),
            note_ids: None,
        };
        assert!(draft.validate().is_some());

        let draft = TagDraft {
            name: "Work".to_string(),
            username: "alice".to_string(),
            note_ids: None,
        };
        assert!(draft.validate_new().is_none());
    }

    #[test]
    fn test_user_draft_validation() {
        let mut draft = UserDraft {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret".to_string(),
        };
        assert!(draft.validate().is_none());

        draft.password.clear();
        assert_eq!(draft.validate().as_deref(), Some("Password cannot be empty"));
    }
}
