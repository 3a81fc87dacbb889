use async_trait::async_trait;
use chrono::Utc;
use notes_core::{Note, NoteCreate, NoteStore, NoteUpdate, Result, LIST_LIMIT};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::{StorageBackend, StorageConfig};

#[derive(Default)]
pub struct MemoryStore {
    notes: HashMap<String, Note>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn owned_mut(&mut self, id: &str, owner_uid: &str) -> Option<&mut Note> {
        self.notes.get_mut(id).filter(|note| note.is_owned_by(owner_uid))
    }

    pub fn create(&mut self, input: NoteCreate, owner_uid: &str) -> Result<Note> {
        let note = Note::new(input, owner_uid);
        // A client-supplied id may replace the caller's own note, never someone else's.
        if let Some(existing) = self.notes.get(&note.id) {
            if !existing.is_owned_by(owner_uid) {
                return Err(notes_core::Error::Validation(format!("note id {} is already taken", note.id)));
            }
        }
        self.notes.insert(note.id.clone(), note.clone());
        Ok(note)
    }

    pub fn get(&self, id: &str, owner_uid: &str) -> Option<Note> {
        self.notes
            .get(id)
            .filter(|note| note.is_owned_by(owner_uid))
            .cloned()
    }

    pub fn update(&mut self, id: &str, owner_uid: &str, patch: NoteUpdate) -> Option<Note> {
        let note = self.owned_mut(id, owner_uid)?;
        note.apply(patch);
        Some(note.clone())
    }

    pub fn soft_delete(&mut self, id: &str, owner_uid: &str) -> bool {
        match self.owned_mut(id, owner_uid) {
            Some(note) => {
                note.deleted = true;
                note.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn hard_delete(&mut self, id: &str, owner_uid: &str) -> bool {
        if self.owned_mut(id, owner_uid).is_none() {
            return false;
        }
        self.notes.remove(id).is_some()
    }

    pub fn set_todos(&mut self, id: &str, owner_uid: &str, todos: Vec<String>) -> Result<Note> {
        let note = self
            .owned_mut(id, owner_uid)
            .ok_or_else(|| notes_core::Error::NotFound(format!("note {}", id)))?;
        note.has_todos = true;
        note.todos = todos;
        note.updated_at = Utc::now();
        Ok(note.clone())
    }

    pub fn list_by_owner(&self, owner_uid: &str) -> Vec<Note> {
        let mut notes = self
            .notes
            .values()
            .filter(|note| note.is_owned_by(owner_uid) && !note.deleted)
            .cloned()
            .collect::<Vec<_>>();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        notes.truncate(LIST_LIMIT);
        notes
    }
}

pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore::new())),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn open(_config: &StorageConfig) -> Result<Self> {
        Ok(MemoryStorage::new())
    }
}

#[async_trait]
impl NoteStore for MemoryStorage {
    async fn create(&self, input: NoteCreate, owner_uid: &str) -> Result<Note> {
        self.store.write().await.create(input, owner_uid)
    }

    async fn get(&self, id: &str, owner_uid: &str) -> Result<Option<Note>> {
        Ok(self.store.read().await.get(id, owner_uid))
    }

    async fn update(&self, id: &str, owner_uid: &str, patch: NoteUpdate) -> Result<Option<Note>> {
        Ok(self.store.write().await.update(id, owner_uid, patch))
    }

    async fn soft_delete(&self, id: &str, owner_uid: &str) -> Result<bool> {
        Ok(self.store.write().await.soft_delete(id, owner_uid))
    }

    async fn hard_delete(&self, id: &str, owner_uid: &str) -> Result<bool> {
        Ok(self.store.write().await.hard_delete(id, owner_uid))
    }

    async fn set_todos(&self, id: &str, owner_uid: &str, todos: Vec<String>) -> Result<Note> {
        self.store.write().await.set_todos(id, owner_uid, todos)
    }

    async fn list_by_owner(&self, owner_uid: &str) -> Result<Vec<Note>> {
        Ok(self.store.read().await.list_by_owner(owner_uid))
    }
}
