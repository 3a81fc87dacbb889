use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A stored note. Serialized in the camelCase shape the mobile client expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub owner_uid: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub dirty: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub has_todos: bool,
    #[serde(default)]
    pub todos: Vec<String>,
}

impl Note {
    /// Builds a fresh record for `owner_uid`, keeping a client-supplied id when there is one.
    pub fn new(input: NoteCreate, owner_uid: &str) -> Self {
        let now = Utc::now();
        Self {
            id: input.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            title: input.title,
            content: input.content,
            owner_uid: owner_uid.to_string(),
            created_at: now,
            updated_at: now,
            dirty: false,
            deleted: false,
            has_todos: false,
            todos: Vec::new(),
        }
    }

    pub fn is_owned_by(&self, owner_uid: &str) -> bool {
        self.owner_uid == owner_uid
    }

    /// Applies the provided fields of `patch` and bumps `updated_at`.
    pub fn apply(&mut self, patch: NoteUpdate) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NoteCreate {
    #[serde(default)]
    pub id: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(max = 10000))]
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NoteUpdate {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    #[validate(length(max = 10000))]
    pub content: Option<String>,
}

/// Body of the summarize and extract-todos endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnnotationRequest {
    #[validate(length(min = 5, max = 10000))]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub summary: String,
    pub key_points: Vec<String>,
    pub word_count: usize,
    pub original_word_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoResult {
    pub has_todos: bool,
    pub todos: Vec<String>,
    pub original_content: String,
}

impl TodoResult {
    pub fn new(todos: Vec<String>, original_content: &str) -> Self {
        Self {
            has_todos: !todos.is_empty(),
            todos,
            original_content: original_content.to_string(),
        }
    }

    pub fn empty(original_content: &str) -> Self {
        Self::new(Vec::new(), original_content)
    }
}

/// Caller identity resolved from a request credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}
