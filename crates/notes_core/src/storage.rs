use async_trait::async_trait;
use crate::types::{Note, NoteCreate, NoteUpdate};
use crate::Result;

/// Listings never return more than this many notes.
pub const LIST_LIMIT: usize = 100;

/// Owner-scoped note persistence. A note owned by someone else behaves as if it did not exist.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Store a new note for `owner_uid`
    async fn create(&self, input: NoteCreate, owner_uid: &str) -> Result<Note>;

    /// Fetch a note by id, soft-deleted ones included
    async fn get(&self, id: &str, owner_uid: &str) -> Result<Option<Note>>;

    /// Patch the provided fields of a note
    async fn update(&self, id: &str, owner_uid: &str, patch: NoteUpdate) -> Result<Option<Note>>;

    /// Mark a note as deleted, returns false when there was nothing to delete
    async fn soft_delete(&self, id: &str, owner_uid: &str) -> Result<bool>;

    /// Remove a note permanently
    async fn hard_delete(&self, id: &str, owner_uid: &str) -> Result<bool>;

    /// Attach extracted todos and raise the `has_todos` flag. Fails with `NotFound` when absent.
    async fn set_todos(&self, id: &str, owner_uid: &str, todos: Vec<String>) -> Result<Note>;

    /// Live notes of `owner_uid`, most recently updated first
    async fn list_by_owner(&self, owner_uid: &str) -> Result<Vec<Note>>;
}
